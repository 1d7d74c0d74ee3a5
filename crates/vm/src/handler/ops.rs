// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! Operator opcodes: Binary, Unary.

use super::HandlerContext;
use crate::{
	bytecode::opcode::{decode_binary, decode_unary},
	error::Result,
	vmcore::machine::DispatchResult,
};

pub fn binary(ctx: &mut HandlerContext) -> Result<DispatchResult> {
	let op = decode_binary(ctx.read_u8()?)?;
	let right = ctx.pop()?;
	let left = ctx.pop()?;
	ctx.push(flux_type::binary(op, &left, &right)?)?;
	Ok(DispatchResult::Continue)
}

pub fn unary(ctx: &mut HandlerContext) -> Result<DispatchResult> {
	let op = decode_unary(ctx.read_u8()?)?;
	let operand = ctx.pop()?;
	ctx.push(flux_type::unary(op, &operand)?)?;
	Ok(DispatchResult::Continue)
}
