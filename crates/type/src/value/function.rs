// SPDX-License-Identifier: MIT
// Copyright (c) 2025 ReifyDB

use std::{
	cell::RefCell,
	collections::BTreeSet,
	fmt::Debug,
	sync::Arc,
};

use crate::{
	Error, Result,
	error::diagnostic::value::{argument_type, missing_argument, unused_arguments},
	return_error,
	value::{Array, Duration, Nature, Record, TableObject, Time, Type, Value},
};

/// A callable value: a builtin or a closure.
pub trait Function: Debug + Send + Sync {
	fn name(&self) -> &str;

	fn ty(&self) -> Type;

	/// Functions with side effects are evaluated when the program runs even
	/// if their result is unused.
	fn has_side_effect(&self) -> bool {
		false
	}

	fn call(&self, args: &Arguments) -> Result<Value>;
}

/// Named call arguments. Tracks which parameters the callee consumed so
/// unexpected arguments can be reported.
#[derive(Debug)]
pub struct Arguments {
	function: String,
	record: Record,
	used: RefCell<BTreeSet<String>>,
}

impl Arguments {
	pub fn new(function: impl Into<String>, record: Record) -> Self {
		Self {
			function: function.into(),
			record,
			used: RefCell::new(BTreeSet::new()),
		}
	}

	pub fn function(&self) -> &str {
		&self.function
	}

	pub fn record(&self) -> &Record {
		&self.record
	}

	pub fn get(&self, name: &str) -> Option<Value> {
		let value = self.record.get(name)?;
		self.used.borrow_mut().insert(name.to_string());
		Some(value.clone())
	}

	pub fn get_required(&self, name: &str) -> Result<Value> {
		match self.get(name) {
			Some(value) => Ok(value),
			None => return_error!(missing_argument(&self.function, name)),
		}
	}

	fn typed<T>(&self, name: &str, expected: Nature, extract: impl Fn(&Value) -> Option<T>) -> Result<Option<T>> {
		let Some(value) = self.get(name) else {
			return Ok(None);
		};
		match extract(&value) {
			Some(v) => Ok(Some(v)),
			None => Err(self.type_error(name, expected, &value)),
		}
	}

	fn type_error(&self, name: &str, expected: Nature, actual: &Value) -> Error {
		Error::new(argument_type(&self.function, name, expected, actual.nature()))
	}

	fn required<T>(&self, name: &str, value: Option<T>) -> Result<T> {
		match value {
			Some(v) => Ok(v),
			None => return_error!(missing_argument(&self.function, name)),
		}
	}

	pub fn get_bool(&self, name: &str) -> Result<Option<bool>> {
		self.typed(name, Nature::Bool, |v| v.as_bool().ok())
	}

	pub fn get_int(&self, name: &str) -> Result<Option<i64>> {
		self.typed(name, Nature::Int, |v| v.as_int().ok())
	}

	pub fn get_float(&self, name: &str) -> Result<Option<f64>> {
		self.typed(name, Nature::Float, |v| v.as_float().ok())
	}

	pub fn get_string(&self, name: &str) -> Result<Option<String>> {
		self.typed(name, Nature::String, |v| v.as_str().ok().map(str::to_string))
	}

	pub fn get_time(&self, name: &str) -> Result<Option<Time>> {
		self.typed(name, Nature::Time, |v| v.as_time().ok())
	}

	pub fn get_duration(&self, name: &str) -> Result<Option<Duration>> {
		self.typed(name, Nature::Duration, |v| v.as_duration().ok())
	}

	pub fn get_array(&self, name: &str) -> Result<Option<Array>> {
		self.typed(name, Nature::Array, |v| v.as_array().ok().cloned())
	}

	pub fn get_record(&self, name: &str) -> Result<Option<Record>> {
		self.typed(name, Nature::Record, |v| v.as_record().ok().cloned())
	}

	pub fn get_function(&self, name: &str) -> Result<Option<Arc<dyn Function>>> {
		self.typed(name, Nature::Function, |v| v.as_function().ok().cloned())
	}

	pub fn get_table_object(&self, name: &str) -> Result<Option<Arc<TableObject>>> {
		self.typed(name, Nature::TableObject, |v| v.as_table_object().ok().cloned())
	}

	pub fn get_required_bool(&self, name: &str) -> Result<bool> {
		let value = self.get_bool(name)?;
		self.required(name, value)
	}

	pub fn get_required_int(&self, name: &str) -> Result<i64> {
		let value = self.get_int(name)?;
		self.required(name, value)
	}

	pub fn get_required_string(&self, name: &str) -> Result<String> {
		let value = self.get_string(name)?;
		self.required(name, value)
	}

	pub fn get_required_time(&self, name: &str) -> Result<Time> {
		let value = self.get_time(name)?;
		self.required(name, value)
	}

	pub fn get_required_array(&self, name: &str) -> Result<Array> {
		let value = self.get_array(name)?;
		self.required(name, value)
	}

	pub fn get_required_record(&self, name: &str) -> Result<Record> {
		let value = self.get_record(name)?;
		self.required(name, value)
	}

	pub fn get_required_function(&self, name: &str) -> Result<Arc<dyn Function>> {
		let value = self.get_function(name)?;
		self.required(name, value)
	}

	pub fn get_required_table_object(&self, name: &str) -> Result<Arc<TableObject>> {
		let value = self.get_table_object(name)?;
		self.required(name, value)
	}

	/// Time-like argument: an absolute time, or a duration relative to `now`.
	pub fn get_time_relative(&self, name: &str, now: Time) -> Result<Option<Time>> {
		let Some(value) = self.get(name) else {
			return Ok(None);
		};
		match &value {
			Value::Time(t) => Ok(Some(*t)),
			Value::Duration(d) => Ok(Some(now.add(*d))),
			Value::Int(secs) => Ok(Some(Time::from_secs(*secs))),
			other => Err(self.type_error(name, Nature::Time, other)),
		}
	}

	/// Names of arguments the callee never read, sorted.
	pub fn unused(&self) -> Vec<String> {
		let used = self.used.borrow();
		let mut unused: Vec<String> = self.record.keys().filter(|k| !used.contains(*k)).map(str::to_string).collect();
		unused.sort();
		unused
	}

	pub fn check_unused(&self) -> Result<()> {
		let unused = self.unused();
		if !unused.is_empty() {
			return_error!(unused_arguments(&self.function, &unused));
		}
		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn args() -> Arguments {
		let record: Record = [("n", Value::int(5)), ("column", Value::string("_value")), ("extra", Value::bool(true))]
			.into_iter()
			.collect();
		Arguments::new("limit", record)
	}

	#[test]
	fn test_typed_getters() {
		let args = args();
		assert_eq!(args.get_required_int("n").unwrap(), 5);
		assert_eq!(args.get_string("column").unwrap(), Some("_value".to_string()));
		assert_eq!(args.get_int("offset").unwrap(), None);
	}

	#[test]
	fn test_wrong_type() {
		let err = args().get_required_int("column").unwrap_err();
		assert_eq!(err.code(), "VALUE_007");
	}

	#[test]
	fn test_missing_required() {
		let err = args().get_required_int("offset").unwrap_err();
		assert_eq!(err.code(), "VALUE_006");
	}

	#[test]
	fn test_check_unused_lists_names() {
		let args = args();
		args.get_required_int("n").unwrap();
		let err = args.check_unused().unwrap_err();
		assert_eq!(err.code(), "VALUE_005");
		assert!(err.message.contains("column, extra"));
	}

	#[test]
	fn test_relative_time() {
		let record: Record = [("start", Value::duration(Duration::from_secs(-60)))].into_iter().collect();
		let args = Arguments::new("range", record);
		let start = args.get_time_relative("start", Time::from_secs(600)).unwrap();
		assert_eq!(start, Some(Time::from_secs(540)));
	}
}
