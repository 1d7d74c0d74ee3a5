// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! Scope opcodes: ScopeLookup, ScopeSet, OptionSet.

use super::HandlerContext;
use crate::{
	error::{Result, VmError},
	vmcore::machine::DispatchResult,
};

pub fn scope_lookup(ctx: &mut HandlerContext) -> Result<DispatchResult> {
	let index = ctx.read_u16()?;
	let name = ctx.vm.program.name(index)?;
	let Some(value) = ctx.scope()?.lookup(name) else {
		return Err(VmError::UndefinedIdentifier(name.to_string()));
	};
	ctx.push(value)?;
	Ok(DispatchResult::Continue)
}

pub fn scope_set(ctx: &mut HandlerContext) -> Result<DispatchResult> {
	let index = ctx.read_u16()?;
	let value = ctx.pop()?;
	let name = ctx.vm.program.name(index)?.to_string();
	ctx.scope()?.set(name, value);
	Ok(DispatchResult::Continue)
}

pub fn option_set(ctx: &mut HandlerContext) -> Result<DispatchResult> {
	let index = ctx.read_u16()?;
	let value = ctx.pop()?;
	let name = ctx.vm.program.name(index)?.to_string();
	ctx.scope()?.set_option(&name, value);
	Ok(DispatchResult::Continue)
}
