// SPDX-License-Identifier: MIT
// Copyright (c) 2025 ReifyDB

use std::{cmp::Ordering, sync::Arc};

use crate::{
	Result,
	error::diagnostic::value::{dict_key_mismatch, null_operand},
	return_error,
	value::{Type, Value},
};

/// Immutable dictionary ordered by key. All keys share one nature.
#[derive(Debug, Clone)]
pub struct Dict {
	key: Type,
	value: Type,
	entries: Arc<Vec<(Value, Value)>>,
}

impl Dict {
	pub fn new(key: Type, value: Type) -> Self {
		Self {
			key,
			value,
			entries: Arc::new(Vec::new()),
		}
	}

	pub fn from_entries(key: Type, value: Type, entries: impl IntoIterator<Item = (Value, Value)>) -> Result<Self> {
		let mut dict = Self::new(key, value);
		for (k, v) in entries {
			dict = dict.insert(k, v)?;
		}
		Ok(dict)
	}

	pub fn key_type(&self) -> &Type {
		&self.key
	}

	pub fn value_type(&self) -> &Type {
		&self.value
	}

	pub fn len(&self) -> usize {
		self.entries.len()
	}

	pub fn is_empty(&self) -> bool {
		self.entries.is_empty()
	}

	pub fn iter(&self) -> impl Iterator<Item = (&Value, &Value)> {
		self.entries.iter().map(|(k, v)| (k, v))
	}

	fn position(&self, key: &Value) -> Result<std::result::Result<usize, usize>> {
		if key.is_null() {
			return_error!(null_operand("dictionary key"));
		}
		if let Some((first, _)) = self.entries.first() {
			if first.nature() != key.nature() {
				return_error!(dict_key_mismatch(first.nature(), key.nature()));
			}
		} else if self.key.nature() != crate::Nature::Invalid && self.key.nature() != key.nature() {
			return_error!(dict_key_mismatch(self.key.nature(), key.nature()));
		}
		// validates that the key nature is ordered
		key.compare(key)?;
		Ok(self.entries.binary_search_by(|(k, _)| k.compare(key).ok().flatten().unwrap_or(Ordering::Equal)))
	}

	/// The value stored under `key`, or `default` when absent.
	pub fn get(&self, key: &Value, default: Value) -> Result<Value> {
		Ok(match self.position(key)? {
			Ok(idx) => self.entries[idx].1.clone(),
			Err(_) => default,
		})
	}

	pub fn insert(&self, key: Value, value: Value) -> Result<Dict> {
		let position = self.position(&key)?;
		let mut entries = (*self.entries).clone();
		match position {
			Ok(idx) => entries[idx].1 = value,
			Err(idx) => entries.insert(idx, (key, value)),
		}
		Ok(Dict {
			key: self.key.clone(),
			value: self.value.clone(),
			entries: Arc::new(entries),
		})
	}

	pub fn remove(&self, key: &Value) -> Result<Dict> {
		let mut entries = (*self.entries).clone();
		if let Ok(idx) = self.position(key)? {
			entries.remove(idx);
		}
		Ok(Dict {
			key: self.key.clone(),
			value: self.value.clone(),
			entries: Arc::new(entries),
		})
	}

	pub fn equal(&self, other: &Dict) -> Option<bool> {
		if self.len() != other.len() {
			return Some(false);
		}
		let mut result = Some(true);
		for ((lk, lv), (rk, rv)) in self.iter().zip(other.iter()) {
			for eq in [lk.equal(rk), lv.equal(rv)] {
				match eq {
					Some(true) => {}
					Some(false) => return Some(false),
					None => result = None,
				}
			}
		}
		result
	}
}

impl PartialEq for Dict {
	fn eq(&self, other: &Self) -> bool {
		self.entries == other.entries
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn dict() -> Dict {
		Dict::from_entries(
			Type::STRING,
			Type::INT,
			[
				(Value::string("b"), Value::int(2)),
				(Value::string("a"), Value::int(1)),
				(Value::string("c"), Value::int(3)),
			],
		)
		.unwrap()
	}

	#[test]
	fn test_entries_are_sorted() {
		let keys: Vec<_> = dict().iter().map(|(k, _)| k.to_string()).collect();
		assert_eq!(keys, vec!["a", "b", "c"]);
	}

	#[test]
	fn test_get_with_default() {
		let d = dict();
		assert_eq!(d.get(&Value::string("b"), Value::int(0)).unwrap(), Value::int(2));
		assert_eq!(d.get(&Value::string("z"), Value::int(0)).unwrap(), Value::int(0));
	}

	#[test]
	fn test_insert_and_remove_are_persistent() {
		let d = dict();
		let inserted = d.insert(Value::string("b"), Value::int(20)).unwrap();
		let removed = inserted.remove(&Value::string("a")).unwrap();
		assert_eq!(d.get(&Value::string("b"), Value::int(0)).unwrap(), Value::int(2));
		assert_eq!(inserted.get(&Value::string("b"), Value::int(0)).unwrap(), Value::int(20));
		assert_eq!(removed.len(), 2);
	}

	#[test]
	fn test_key_nature_mismatch() {
		let err = dict().insert(Value::int(1), Value::int(1)).unwrap_err();
		assert_eq!(err.code(), "VALUE_010");
	}
}
