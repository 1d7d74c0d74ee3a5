// SPDX-License-Identifier: MIT
// Copyright (c) 2025 ReifyDB

use std::sync::Arc;

use indexmap::IndexMap;

use crate::{
	Result,
	error::diagnostic::value::{kind_mismatch, null_operand},
	return_error,
	value::{Nature, Type, Value},
};

/// Immutable record; properties keep their insertion order.
#[derive(Debug, Clone, Default)]
pub struct Record(Arc<IndexMap<String, Value>>);

impl Record {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn len(&self) -> usize {
		self.0.len()
	}

	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}

	pub fn get(&self, name: &str) -> Option<&Value> {
		self.0.get(name)
	}

	pub fn contains(&self, name: &str) -> bool {
		self.0.contains_key(name)
	}

	pub fn keys(&self) -> impl Iterator<Item = &str> {
		self.0.keys().map(String::as_str)
	}

	pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
		self.0.iter().map(|(k, v)| (k.as_str(), v))
	}

	pub fn ty(&self) -> Type {
		Type::Record(self.iter().map(|(k, v)| (k.to_string(), v.ty())).collect())
	}

	/// New record with the properties of `overrides` set on top of this one.
	/// Existing properties keep their position.
	pub fn with(&self, overrides: &Record) -> Record {
		let mut fields = (*self.0).clone();
		for (name, value) in overrides.iter() {
			fields.insert(name.to_string(), value.clone());
		}
		Record(Arc::new(fields))
	}

	/// New record with a single property set.
	pub fn set(&self, name: impl Into<String>, value: Value) -> Record {
		let mut fields = (*self.0).clone();
		fields.insert(name.into(), value);
		Record(Arc::new(fields))
	}

	/// User-visible equality, independent of property order.
	pub fn equal(&self, other: &Record) -> Option<bool> {
		if self.len() != other.len() {
			return Some(false);
		}
		let mut result = Some(true);
		for (name, value) in self.iter() {
			let Some(other_value) = other.get(name) else {
				return Some(false);
			};
			match value.equal(other_value) {
				Some(true) => {}
				Some(false) => return Some(false),
				None => result = None,
			}
		}
		result
	}
}

impl PartialEq for Record {
	fn eq(&self, other: &Self) -> bool {
		self.len() == other.len() && self.iter().all(|(name, value)| other.get(name) == Some(value))
	}
}

impl<K: Into<String>> FromIterator<(K, Value)> for Record {
	fn from_iter<T: IntoIterator<Item = (K, Value)>>(iter: T) -> Self {
		Record(Arc::new(iter.into_iter().map(|(k, v)| (k.into(), v)).collect()))
	}
}

/// `{base with overrides}`. The base must be a non-null record.
pub fn record_with(base: &Value, overrides: &Record) -> Result<Value> {
	match base {
		Value::Record(record) => Ok(Value::Record(record.with(overrides))),
		Value::Null(_) => return_error!(null_operand("record with")),
		other => return_error!(kind_mismatch(Nature::Record, other.nature())),
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn record(fields: &[(&str, i64)]) -> Record {
		fields.iter().map(|(k, v)| (*k, Value::int(*v))).collect()
	}

	#[test]
	fn test_with_overrides_win() {
		let base = record(&[("a", 1), ("b", 2)]);
		let result = record_with(&Value::record(base.clone()), &record(&[("b", 20), ("c", 30)])).unwrap();
		let result = result.as_record().unwrap();
		assert_eq!(result.keys().collect::<Vec<_>>(), vec!["a", "b", "c"]);
		assert_eq!(result.get("b"), Some(&Value::int(20)));
		// the base is untouched
		assert_eq!(base.get("b"), Some(&Value::int(2)));
	}

	#[test]
	fn test_with_is_associative_over_disjoint_overrides() {
		let r = Value::record(record(&[("x", 0)]));
		let once = record_with(&r, &record(&[("a", 1), ("b", 2)])).unwrap();
		let twice = record_with(&record_with(&r, &record(&[("a", 1)])).unwrap(), &record(&[("b", 2)])).unwrap();
		assert_eq!(once, twice);
	}

	#[test]
	fn test_with_null_base() {
		let err = record_with(&Value::null(Nature::Record), &Record::new()).unwrap_err();
		assert_eq!(err.code(), "VALUE_002");
	}

	#[test]
	fn test_with_non_record_base() {
		let err = record_with(&Value::int(1), &Record::new()).unwrap_err();
		assert_eq!(err.code(), "VALUE_001");
	}

	#[test]
	fn test_equality_ignores_order() {
		let a = record(&[("a", 1), ("b", 2)]);
		let b = record(&[("b", 2), ("a", 1)]);
		assert_eq!(a.equal(&b), Some(true));
		assert_eq!(a, b);

		let with_null: Record = [("a", Value::null(Nature::Int))].into_iter().collect();
		assert_eq!(with_null.equal(&with_null.clone()), None);
	}
}
