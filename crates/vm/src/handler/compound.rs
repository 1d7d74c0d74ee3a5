// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! Compound value opcodes: MakeRecord, RecordWith, MakeArray, MakeDict,
//! GetMember, GetIndex.

use flux_type::{
	Array, Dict, Error, Nature, Record, Type, Value, array_get, error::diagnostic::value::kind_mismatch,
	record_with as merge_record,
};

use super::HandlerContext;
use crate::{error::Result, vmcore::machine::DispatchResult};

fn build_record(ctx: &mut HandlerContext) -> Result<Record> {
	let list = ctx.read_u16()?;
	let names = ctx.vm.program.name_list(list)?.to_vec();
	let values = ctx.pop_n(names.len())?;
	Ok(names.into_iter().zip(values).collect())
}

pub fn make_record(ctx: &mut HandlerContext) -> Result<DispatchResult> {
	let record = build_record(ctx)?;
	ctx.push(Value::record(record))?;
	Ok(DispatchResult::Continue)
}

/// RecordWith - `{base with ...}`; the base sits below the new properties.
pub fn record_with(ctx: &mut HandlerContext) -> Result<DispatchResult> {
	let overrides = build_record(ctx)?;
	let base = ctx.pop()?;
	ctx.push(merge_record(&base, &overrides)?)?;
	Ok(DispatchResult::Continue)
}

fn element_type<'a>(values: impl Iterator<Item = &'a Value>) -> Type {
	values.filter(|v| !v.is_null()).map(Value::ty).next().unwrap_or(Type::Var(0))
}

pub fn make_array(ctx: &mut HandlerContext) -> Result<DispatchResult> {
	let len = ctx.read_u16()? as usize;
	let values = ctx.pop_n(len)?;
	let elem = element_type(values.iter());
	ctx.push(Value::array(Array::new(elem, values)))?;
	Ok(DispatchResult::Continue)
}

pub fn make_dict(ctx: &mut HandlerContext) -> Result<DispatchResult> {
	let len = ctx.read_u16()? as usize;
	let flat = ctx.pop_n(len * 2)?;
	let mut entries = Vec::with_capacity(len);
	let mut iter = flat.into_iter();
	while let (Some(key), Some(value)) = (iter.next(), iter.next()) {
		entries.push((key, value));
	}
	let key = element_type(entries.iter().map(|(k, _)| k));
	let value = element_type(entries.iter().map(|(_, v)| v));
	ctx.push(Value::dict(Dict::from_entries(key, value, entries)?))?;
	Ok(DispatchResult::Continue)
}

/// GetMember - a missing property reads as null.
pub fn get_member(ctx: &mut HandlerContext) -> Result<DispatchResult> {
	let index = ctx.read_u16()?;
	let object = ctx.pop()?;
	let name = ctx.vm.program.name(index)?;
	let value = match &object {
		Value::Record(record) => record.get(name).cloned().unwrap_or(Value::null(Nature::Invalid)),
		Value::Null(_) => Value::null(Nature::Invalid),
		other => return Err(Error::new(kind_mismatch(Nature::Record, other.nature())).into()),
	};
	ctx.push(value)?;
	Ok(DispatchResult::Continue)
}

pub fn get_index(ctx: &mut HandlerContext) -> Result<DispatchResult> {
	let index = ctx.pop()?;
	let array = ctx.pop()?;
	let value = array_get(&array, index.as_int()?)?;
	ctx.push(value)?;
	Ok(DispatchResult::Continue)
}
