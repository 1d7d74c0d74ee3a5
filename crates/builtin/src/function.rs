// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::{
	fmt::{Debug, Formatter},
	sync::Arc,
};

use flux_runtime::SharedClock;
use flux_type::{
	Arguments, Function, Nature, Param, Record, Result, TableObject, Type, Value,
	error::diagnostic::value::argument_type, return_error,
};

/// A function whose call only records a [`TableObject`]. The query is
/// planned and run later, from the table objects the program produced.
///
/// Parameters typed as streams (or arrays of streams) become the parents of
/// the table object; every other argument is kept for the operation factory.
#[derive(Debug, Clone)]
pub struct TableFunction {
	name: &'static str,
	kind: &'static str,
	params: Vec<Param>,
}

impl TableFunction {
	pub fn new(name: &'static str, kind: &'static str, params: Vec<Param>) -> Self {
		Self {
			name,
			kind,
			params,
		}
	}

	pub fn kind(&self) -> &str {
		self.kind
	}
}

fn is_table_param(param: &Param) -> bool {
	match &param.ty {
		Type::Stream => true,
		Type::Array(elem) => **elem == Type::Stream,
		_ => false,
	}
}

fn collect_parents(args: &Arguments, name: &str, value: &Value, parents: &mut Vec<Arc<TableObject>>) -> Result<()> {
	match value {
		Value::TableObject(object) => parents.push(Arc::clone(object)),
		Value::Array(array) => {
			for elem in array.iter() {
				collect_parents(args, name, elem, parents)?;
			}
		}
		other => {
			return_error!(argument_type(args.function(), name, Nature::TableObject, other.nature()))
		}
	}
	Ok(())
}

impl Function for TableFunction {
	fn name(&self) -> &str {
		self.name
	}

	fn ty(&self) -> Type {
		Type::function(self.params.clone(), Type::Stream)
	}

	fn call(&self, args: &Arguments) -> Result<Value> {
		let mut record = Record::new();
		let mut parents = Vec::new();
		for param in &self.params {
			let value = if param.required {
				args.get_required(&param.name)?
			} else {
				match args.get(&param.name) {
					Some(value) => value,
					None => continue,
				}
			};
			if is_table_param(param) {
				collect_parents(args, &param.name, &value, &mut parents)?;
			} else {
				record = record.set(param.name.clone(), value);
			}
		}
		Ok(Value::table_object(TableObject::new(self.kind, record, parents)))
	}
}

/// `now()`: the current instant of the injected clock.
#[derive(Clone)]
pub struct Now {
	clock: SharedClock,
}

impl Now {
	pub fn new(clock: SharedClock) -> Self {
		Self {
			clock,
		}
	}
}

impl Debug for Now {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		f.write_str("Now")
	}
}

impl Function for Now {
	fn name(&self) -> &str {
		"now"
	}

	fn ty(&self) -> Type {
		Type::function(Vec::new(), Type::TIME)
	}

	fn call(&self, _args: &Arguments) -> Result<Value> {
		Ok(Value::time(self.clock.now()))
	}
}

#[cfg(test)]
mod tests {
	use flux_runtime::FixedClock;
	use flux_type::{Array, Time};

	use super::*;

	fn source() -> Value {
		Value::table_object(TableObject::new("array.from", Record::new(), vec![]))
	}

	fn limit() -> TableFunction {
		TableFunction::new(
			"limit",
			"limit",
			vec![Param::pipe("tables"), Param::required("n", Type::INT), Param::optional("offset", Type::INT)],
		)
	}

	#[test]
	fn test_call_records_args_and_parent() {
		let record: Record = [("tables", source()), ("n", Value::int(2))].into_iter().collect();
		let args = Arguments::new("limit", record);
		let value = limit().call(&args).unwrap();
		args.check_unused().unwrap();

		let object = value.as_table_object().unwrap();
		assert_eq!(object.kind, "limit");
		assert_eq!(object.parents.len(), 1);
		assert_eq!(object.parents[0].kind, "array.from");
		assert_eq!(object.args.get("n"), Some(&Value::int(2)));
		assert!(!object.args.contains("tables"));
		assert!(!object.args.contains("offset"));
	}

	#[test]
	fn test_missing_required_argument() {
		let record: Record = [("tables", source())].into_iter().collect();
		let err = limit().call(&Arguments::new("limit", record)).unwrap_err();
		assert_eq!(err.code(), "VALUE_006");
	}

	#[test]
	fn test_unknown_argument_left_unused() {
		let record: Record = [("tables", source()), ("n", Value::int(1)), ("bogus", Value::bool(true))].into_iter().collect();
		let args = Arguments::new("limit", record);
		limit().call(&args).unwrap();
		assert_eq!(args.check_unused().unwrap_err().code(), "VALUE_005");
	}

	#[test]
	fn test_array_of_tables_becomes_parents() {
		let union = TableFunction::new("union", "union", vec![Param::required("tables", Type::array(Type::Stream))]);
		let tables = Value::array(Array::from_values(vec![source(), source()]));
		let record: Record = [("tables", tables)].into_iter().collect();
		let value = union.call(&Arguments::new("union", record)).unwrap();
		assert_eq!(value.as_table_object().unwrap().parents.len(), 2);
	}

	#[test]
	fn test_table_param_rejects_other_values() {
		let record: Record = [("tables", Value::int(1)), ("n", Value::int(1))].into_iter().collect();
		let err = limit().call(&Arguments::new("limit", record)).unwrap_err();
		assert_eq!(err.code(), "VALUE_007");
	}

	#[test]
	fn test_now_reads_clock() {
		let clock = Arc::new(FixedClock::new(Time::from_secs(42)));
		let now = Now::new(clock.clone());
		let args = Arguments::new("now", Record::new());
		assert_eq!(now.call(&args).unwrap(), Value::time(Time::from_secs(42)));
		clock.set(Time::from_secs(43));
		assert_eq!(now.call(&args).unwrap(), Value::time(Time::from_secs(43)));
	}
}
