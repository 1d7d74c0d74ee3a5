// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! Call opcodes: Call, Ret, MakeClosure.

use std::sync::Arc;

use flux_type::{Arguments, Error, Function, Record, Type, Value, error::diagnostic::value::null_operand};

use super::HandlerContext;
use crate::{
	bytecode::program::PIPE_ARGUMENT,
	error::{Result, VmError},
	vmcore::{closure::Closure, machine::DispatchResult},
};

/// Call - pops `arity` named arguments and the callee, pushes the result.
pub fn call(ctx: &mut HandlerContext) -> Result<DispatchResult> {
	let arity = ctx.read_u8()? as usize;
	let list = ctx.read_u16()?;
	let names = ctx.vm.program.name_list(list)?.to_vec();
	let values = ctx.pop_n(arity)?;
	let function = match ctx.pop()? {
		Value::Function(function) => function,
		Value::Null(_) => return Err(Error::new(null_operand("call")).into()),
		other => return Err(VmError::NotCallable(other.nature())),
	};

	let mut record = Record::new();
	for (name, value) in names.into_iter().zip(values) {
		let name = if name == PIPE_ARGUMENT {
			pipe_parameter(function.as_ref())?
		} else {
			name
		};
		record = record.set(name, value);
	}

	let args = Arguments::new(function.name(), record);
	let result = function.call(&args)?;
	args.check_unused()?;
	ctx.push(result)?;
	Ok(DispatchResult::Continue)
}

fn pipe_parameter(function: &dyn Function) -> Result<String> {
	if let Type::Function {
		params,
		..
	} = function.ty()
	{
		if let Some(param) = params.into_iter().find(|p| p.pipe) {
			return Ok(param.name);
		}
	}
	Err(VmError::NoPipeParameter {
		function: function.name().to_string(),
	})
}

/// Ret - leaves the current frame with the value on top of the stack.
pub fn ret(ctx: &mut HandlerContext) -> Result<DispatchResult> {
	let value = ctx.pop()?;
	let Some(frame) = ctx.vm.frames.pop() else {
		return Err(VmError::StackUnderflow {
			opcode: "RET",
		});
	};
	ctx.vm.stack.truncate(frame.frame_pointer);
	Ok(DispatchResult::Return(value))
}

/// MakeClosure - pops the evaluated defaults and captures the current scope.
pub fn make_closure(ctx: &mut HandlerContext) -> Result<DispatchResult> {
	let index = ctx.read_u16()?;
	let names: Vec<String> =
		ctx.vm.program.chunk(index)?.params.iter().filter(|p| p.has_default).map(|p| p.name.clone()).collect();
	let defaults = ctx.pop_n(names.len())?;
	let closure = Closure::new(
		Arc::clone(&ctx.vm.program),
		index,
		ctx.scope()?,
		names.into_iter().zip(defaults).collect(),
		ctx.vm.env.clone(),
	);
	ctx.push(Value::function(Arc::new(closure)))?;
	Ok(DispatchResult::Continue)
}
