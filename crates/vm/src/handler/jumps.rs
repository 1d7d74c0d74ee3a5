// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! Jump opcodes: Jump, JumpIfFalse.

use super::HandlerContext;
use crate::{error::Result, vmcore::machine::DispatchResult};

/// Jump - unconditional jump to an absolute offset.
pub fn jump(ctx: &mut HandlerContext) -> Result<DispatchResult> {
	let target = ctx.read_u32()? as usize;
	ctx.reader.seek(target)?;
	Ok(DispatchResult::Continue)
}

/// JumpIfFalse - pops the condition; null counts as false.
pub fn jump_if_false(ctx: &mut HandlerContext) -> Result<DispatchResult> {
	let target = ctx.read_u32()? as usize;
	let condition = ctx.pop()?;
	if !condition.is_true() {
		ctx.reader.seek(target)?;
	}
	Ok(DispatchResult::Continue)
}
