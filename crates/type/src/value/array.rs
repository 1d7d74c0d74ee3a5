// SPDX-License-Identifier: MIT
// Copyright (c) 2025 ReifyDB

use std::sync::Arc;

use crate::{
	Result,
	error::diagnostic::value::{kind_mismatch, null_operand, out_of_bounds},
	return_error,
	value::{Nature, Type, Value},
};

/// Immutable homogeneous array.
#[derive(Debug, Clone)]
pub struct Array {
	elem: Type,
	values: Arc<Vec<Value>>,
}

impl Array {
	pub fn new(elem: Type, values: Vec<Value>) -> Self {
		Self {
			elem,
			values: Arc::new(values),
		}
	}

	/// Element type taken from the first element.
	pub fn from_values(values: Vec<Value>) -> Self {
		let elem = values.first().map(Value::ty).unwrap_or(Type::Var(0));
		Self::new(elem, values)
	}

	pub fn elem_type(&self) -> &Type {
		&self.elem
	}

	pub fn len(&self) -> usize {
		self.values.len()
	}

	pub fn is_empty(&self) -> bool {
		self.values.is_empty()
	}

	pub fn get(&self, idx: usize) -> Option<&Value> {
		self.values.get(idx)
	}

	pub fn iter(&self) -> std::slice::Iter<'_, Value> {
		self.values.iter()
	}

	pub fn values(&self) -> &[Value] {
		&self.values
	}

	/// Positional element-wise equality; any null element makes it null.
	pub fn equal(&self, other: &Array) -> Option<bool> {
		if self.len() != other.len() {
			return Some(false);
		}
		let mut result = Some(true);
		for (l, r) in self.iter().zip(other.iter()) {
			match l.equal(r) {
				Some(true) => {}
				Some(false) => return Some(false),
				None => result = None,
			}
		}
		result
	}
}

impl PartialEq for Array {
	fn eq(&self, other: &Self) -> bool {
		self.values == other.values
	}
}

/// Bounds-checked `a[i]`.
pub fn array_get(array: &Value, idx: i64) -> Result<Value> {
	let array = match array {
		Value::Array(array) => array,
		Value::Null(_) => return_error!(null_operand("index")),
		other => return_error!(kind_mismatch(Nature::Array, other.nature())),
	};
	if idx < 0 || idx as usize >= array.len() {
		return_error!(out_of_bounds(idx, array.len()));
	}
	Ok(array.values[idx as usize].clone())
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_get_in_bounds() {
		let array = Value::array(Array::from_values(vec![Value::int(10), Value::int(20)]));
		assert_eq!(array_get(&array, 1).unwrap(), Value::int(20));
	}

	#[test]
	fn test_get_out_of_bounds() {
		let array = Value::array(Array::from_values(vec![Value::int(10)]));
		assert_eq!(array_get(&array, 1).unwrap_err().code(), "VALUE_003");
		assert_eq!(array_get(&array, -1).unwrap_err().code(), "VALUE_003");
	}

	#[test]
	fn test_get_on_null_and_non_array() {
		assert_eq!(array_get(&Value::null(Nature::Array), 0).unwrap_err().code(), "VALUE_002");
		assert_eq!(array_get(&Value::int(1), 0).unwrap_err().code(), "VALUE_001");
	}

	#[test]
	fn test_equality_with_null_element() {
		let a = Array::from_values(vec![Value::int(1), Value::null(Nature::Int)]);
		let b = Array::from_values(vec![Value::int(1), Value::null(Nature::Int)]);
		assert_eq!(a.equal(&b), None);
		let c = Array::from_values(vec![Value::int(2), Value::null(Nature::Int)]);
		assert_eq!(a.equal(&c), Some(false));
	}
}
