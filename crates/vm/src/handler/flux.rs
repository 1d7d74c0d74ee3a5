// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! Program lifecycle opcodes: ProgramStart, ConsSideEffects,
//! AppendSideEffect, ExecuteFlux, FindRecord, Stop.

use std::sync::Arc;

use flux_type::{Arguments, Array, Function, Nature, Record, Time, Type, Value};
use tracing::{debug, info};

use super::HandlerContext;
use crate::{
	compile::NOW_OPTION,
	error::{Result, VmError},
	vmcore::machine::DispatchResult,
};

/// `now` after the program started; every call returns the same instant.
#[derive(Debug)]
struct FrozenNow(Time);

impl Function for FrozenNow {
	fn name(&self) -> &str {
		NOW_OPTION
	}

	fn ty(&self) -> Type {
		Type::function(vec![], Type::TIME)
	}

	fn call(&self, _args: &Arguments) -> flux_type::Result<Value> {
		Ok(Value::time(self.0))
	}
}

/// ProgramStart - evaluates the `now` option once and freezes it.
pub fn program_start(ctx: &mut HandlerContext) -> Result<DispatchResult> {
	let sites = ctx.read_u16()?;
	if ctx.vm.env.now.is_some() {
		return Err(VmError::DuplicateProgramStart);
	}
	let scope = ctx.scope()?;
	let now = match scope.lookup(NOW_OPTION) {
		Some(Value::Time(time)) => time,
		Some(Value::Function(function)) => {
			let args = Arguments::new(function.name(), Record::new());
			function.call(&args)?.as_time()?
		}
		Some(other) => other.as_time()?,
		None => return Err(VmError::NoNow),
	};
	ctx.vm.env.now = Some(now);
	scope.set_option(NOW_OPTION, Value::function(Arc::new(FrozenNow(now))));
	debug!(now = %now, side_effects = sites, "program started");
	Ok(DispatchResult::Continue)
}

pub fn cons_side_effects(ctx: &mut HandlerContext) -> Result<DispatchResult> {
	ctx.push(Value::array(Array::new(Type::Basic(Nature::TableObject), Vec::new())))?;
	Ok(DispatchResult::Continue)
}

/// AppendSideEffect - keeps the statement's value if it is a table object.
pub fn append_side_effect(ctx: &mut HandlerContext) -> Result<DispatchResult> {
	let value = ctx.pop()?;
	let list = ctx.pop()?;
	let list = match (list, value) {
		(Value::Array(list), Value::TableObject(object)) => {
			let mut values = list.values().to_vec();
			values.push(Value::TableObject(object));
			Value::array(Array::new(list.elem_type().clone(), values))
		}
		(list, _) => list,
	};
	ctx.push(list)?;
	Ok(DispatchResult::Continue)
}

/// ExecuteFlux - hands the collected table objects to the host.
pub fn execute_flux(ctx: &mut HandlerContext) -> Result<DispatchResult> {
	let list = ctx.pop()?;
	let side_effects = list
		.as_array()?
		.iter()
		.filter_map(|value| match value {
			Value::TableObject(object) => Some(Arc::clone(object)),
			_ => None,
		})
		.collect::<Vec<_>>();
	let host = ctx.vm.env.host.clone().ok_or(VmError::NoHost)?;
	let now = ctx.vm.env.now.ok_or(VmError::NoNow)?;
	info!(side_effects = side_effects.len(), "executing query");
	let result = host.execute(side_effects, now)?;
	ctx.push(result)?;
	Ok(DispatchResult::Continue)
}

/// FindRecord - stack holds table, predicate (or null) and index.
pub fn find_record(ctx: &mut HandlerContext) -> Result<DispatchResult> {
	let index = ctx.pop()?.as_int()?;
	let predicate = match ctx.pop()? {
		Value::Function(function) => Some(function),
		_ => None,
	};
	let table = Arc::clone(ctx.pop()?.as_table_object()?);
	let host = ctx.vm.env.host.clone().ok_or(VmError::NoHost)?;
	let now = ctx.vm.env.now.ok_or(VmError::NoNow)?;
	let record = host.find_record(table, predicate, index, now)?;
	ctx.push(record)?;
	Ok(DispatchResult::Continue)
}

pub fn stop(ctx: &mut HandlerContext) -> Result<DispatchResult> {
	let value = if ctx.vm.stack.is_empty() {
		Value::null(Nature::Stream)
	} else {
		ctx.pop()?
	};
	Ok(DispatchResult::Stop(value))
}
