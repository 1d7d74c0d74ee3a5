// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! Stack opcodes: LoadValue, Pop, Dup.

use super::HandlerContext;
use crate::{error::Result, vmcore::machine::DispatchResult};

pub fn load_value(ctx: &mut HandlerContext) -> Result<DispatchResult> {
	let index = ctx.read_u16()?;
	let value = ctx.vm.program.constant(index)?.clone();
	ctx.push(value)?;
	Ok(DispatchResult::Continue)
}

pub fn pop(ctx: &mut HandlerContext) -> Result<DispatchResult> {
	ctx.pop()?;
	Ok(DispatchResult::Continue)
}

pub fn dup(ctx: &mut HandlerContext) -> Result<DispatchResult> {
	let top = ctx.vm.peek(ctx.opcode.name())?.clone();
	ctx.push(top)?;
	Ok(DispatchResult::Continue)
}
