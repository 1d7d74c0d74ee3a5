// SPDX-License-Identifier: MIT
// Copyright (c) 2025 ReifyDB

use std::{
	cmp::Ordering,
	fmt::{Display, Formatter},
	sync::Arc,
};

pub mod array;
pub mod dict;
pub mod function;
pub mod operator;
pub mod record;
pub mod regexp;
pub mod stream;
pub mod table_object;
pub mod time;
mod r#type;

pub use array::Array;
pub use dict::Dict;
pub use function::{Arguments, Function};
pub use r#type::{Nature, Param, Type};
pub use record::Record;
pub use regexp::Regexp;
pub use stream::Stream;
pub use table_object::TableObject;
pub use time::{Duration, Time};

use crate::{
	Error, Result,
	error::diagnostic::value::{kind_mismatch, null_operand, operator_not_applicable},
	return_error,
};

/// A runtime value. Boxed payloads are reference counted and never mutated.
#[derive(Debug, Clone)]
pub enum Value {
	/// Absent value standing in for a value of the given nature.
	Null(Nature),
	Bool(bool),
	Int(i64),
	UInt(u64),
	Float(f64),
	String(Arc<str>),
	Bytes(Arc<[u8]>),
	Time(Time),
	Duration(Duration),
	Regexp(Regexp),
	Array(Array),
	Record(Record),
	Dict(Dict),
	Function(Arc<dyn Function>),
	Stream(Arc<dyn Stream>),
	TableObject(Arc<TableObject>),
}

impl Value {
	pub fn null(nature: Nature) -> Self {
		Value::Null(nature)
	}

	pub fn bool(v: bool) -> Self {
		Value::Bool(v)
	}

	pub fn int(v: i64) -> Self {
		Value::Int(v)
	}

	pub fn uint(v: u64) -> Self {
		Value::UInt(v)
	}

	pub fn float(v: f64) -> Self {
		Value::Float(v)
	}

	pub fn string(v: impl AsRef<str>) -> Self {
		Value::String(Arc::from(v.as_ref()))
	}

	pub fn bytes(v: impl AsRef<[u8]>) -> Self {
		Value::Bytes(Arc::from(v.as_ref()))
	}

	pub fn time(v: Time) -> Self {
		Value::Time(v)
	}

	pub fn duration(v: Duration) -> Self {
		Value::Duration(v)
	}

	pub fn regexp(v: Regexp) -> Self {
		Value::Regexp(v)
	}

	pub fn array(v: Array) -> Self {
		Value::Array(v)
	}

	pub fn record(v: Record) -> Self {
		Value::Record(v)
	}

	pub fn dict(v: Dict) -> Self {
		Value::Dict(v)
	}

	pub fn function(v: Arc<dyn Function>) -> Self {
		Value::Function(v)
	}

	pub fn stream(v: Arc<dyn Stream>) -> Self {
		Value::Stream(v)
	}

	pub fn table_object(v: TableObject) -> Self {
		Value::TableObject(Arc::new(v))
	}

	pub fn is_null(&self) -> bool {
		matches!(self, Value::Null(_))
	}

	pub fn nature(&self) -> Nature {
		match self {
			Value::Null(nature) => *nature,
			Value::Bool(_) => Nature::Bool,
			Value::Int(_) => Nature::Int,
			Value::UInt(_) => Nature::UInt,
			Value::Float(_) => Nature::Float,
			Value::String(_) => Nature::String,
			Value::Bytes(_) => Nature::Bytes,
			Value::Time(_) => Nature::Time,
			Value::Duration(_) => Nature::Duration,
			Value::Regexp(_) => Nature::Regexp,
			Value::Array(_) => Nature::Array,
			Value::Record(_) => Nature::Record,
			Value::Dict(_) => Nature::Dict,
			Value::Function(_) => Nature::Function,
			Value::Stream(_) => Nature::Stream,
			Value::TableObject(_) => Nature::TableObject,
		}
	}

	pub fn ty(&self) -> Type {
		match self {
			Value::Array(array) => Type::array(array.elem_type().clone()),
			Value::Record(record) => record.ty(),
			Value::Dict(dict) => Type::dict(dict.key_type().clone(), dict.value_type().clone()),
			Value::Function(function) => function.ty(),
			Value::Stream(_) | Value::TableObject(_) => Type::Stream,
			other => Type::Basic(other.nature()),
		}
	}

	fn mismatch(&self, expected: Nature) -> Error {
		if self.nature() == expected && self.is_null() {
			return Error::new(null_operand(&format!("{} accessor", expected)));
		}
		Error::new(kind_mismatch(expected, self.nature()))
	}

	pub fn as_bool(&self) -> Result<bool> {
		match self {
			Value::Bool(v) => Ok(*v),
			other => Err(other.mismatch(Nature::Bool)),
		}
	}

	pub fn as_int(&self) -> Result<i64> {
		match self {
			Value::Int(v) => Ok(*v),
			other => Err(other.mismatch(Nature::Int)),
		}
	}

	pub fn as_uint(&self) -> Result<u64> {
		match self {
			Value::UInt(v) => Ok(*v),
			other => Err(other.mismatch(Nature::UInt)),
		}
	}

	pub fn as_float(&self) -> Result<f64> {
		match self {
			Value::Float(v) => Ok(*v),
			other => Err(other.mismatch(Nature::Float)),
		}
	}

	pub fn as_str(&self) -> Result<&str> {
		match self {
			Value::String(v) => Ok(v),
			other => Err(other.mismatch(Nature::String)),
		}
	}

	pub fn as_bytes(&self) -> Result<&[u8]> {
		match self {
			Value::Bytes(v) => Ok(v),
			other => Err(other.mismatch(Nature::Bytes)),
		}
	}

	pub fn as_time(&self) -> Result<Time> {
		match self {
			Value::Time(v) => Ok(*v),
			other => Err(other.mismatch(Nature::Time)),
		}
	}

	pub fn as_duration(&self) -> Result<Duration> {
		match self {
			Value::Duration(v) => Ok(*v),
			other => Err(other.mismatch(Nature::Duration)),
		}
	}

	pub fn as_regexp(&self) -> Result<&Regexp> {
		match self {
			Value::Regexp(v) => Ok(v),
			other => Err(other.mismatch(Nature::Regexp)),
		}
	}

	pub fn as_array(&self) -> Result<&Array> {
		match self {
			Value::Array(v) => Ok(v),
			other => Err(other.mismatch(Nature::Array)),
		}
	}

	pub fn as_record(&self) -> Result<&Record> {
		match self {
			Value::Record(v) => Ok(v),
			other => Err(other.mismatch(Nature::Record)),
		}
	}

	pub fn as_dict(&self) -> Result<&Dict> {
		match self {
			Value::Dict(v) => Ok(v),
			other => Err(other.mismatch(Nature::Dict)),
		}
	}

	pub fn as_function(&self) -> Result<&Arc<dyn Function>> {
		match self {
			Value::Function(v) => Ok(v),
			other => Err(other.mismatch(Nature::Function)),
		}
	}

	pub fn as_stream(&self) -> Result<&Arc<dyn Stream>> {
		match self {
			Value::Stream(v) => Ok(v),
			other => Err(other.mismatch(Nature::Stream)),
		}
	}

	pub fn as_table_object(&self) -> Result<&Arc<TableObject>> {
		match self {
			Value::TableObject(v) => Ok(v),
			other => Err(other.mismatch(Nature::TableObject)),
		}
	}

	/// Truthiness used by conditionals: null and false are false.
	pub fn is_true(&self) -> bool {
		matches!(self, Value::Bool(true))
	}

	/// User-visible equality. `None` means the result is null: either side
	/// is null, or a nested element is.
	pub fn equal(&self, other: &Value) -> Option<bool> {
		match (self, other) {
			(Value::Null(_), _) | (_, Value::Null(_)) => None,
			(Value::Bool(l), Value::Bool(r)) => Some(l == r),
			(Value::String(l), Value::String(r)) => Some(l == r),
			(Value::Bytes(l), Value::Bytes(r)) => Some(l == r),
			(Value::Time(l), Value::Time(r)) => Some(l == r),
			(Value::Duration(l), Value::Duration(r)) => Some(l == r),
			(Value::Regexp(l), Value::Regexp(r)) => Some(l == r),
			(Value::Array(l), Value::Array(r)) => l.equal(r),
			(Value::Record(l), Value::Record(r)) => l.equal(r),
			(Value::Dict(l), Value::Dict(r)) => l.equal(r),
			(Value::Function(l), Value::Function(r)) => Some(Arc::ptr_eq(l, r)),
			(Value::Stream(l), Value::Stream(r)) => Some(Arc::ptr_eq(l, r)),
			(Value::TableObject(l), Value::TableObject(r)) => Some(Arc::ptr_eq(l, r)),
			(l, r) if l.nature().is_numeric() && r.nature().is_numeric() => {
				compare_numeric(l, r).map(|ordering| ordering == Ordering::Equal)
			}
			_ => Some(false),
		}
	}

	/// User-visible ordering. `Ok(None)` means the result is null.
	pub fn compare(&self, other: &Value) -> Result<Option<Ordering>> {
		let ordering = match (self, other) {
			(l, r) if l.nature().is_numeric() && r.nature().is_numeric() => {
				if l.is_null() || r.is_null() {
					return Ok(None);
				}
				compare_numeric(l, r)
			}
			(l, r) if l.nature() != r.nature() => {
				return_error!(operator_not_applicable("<", l.nature(), Some(r.nature())))
			}
			(Value::Null(_), _) | (_, Value::Null(_)) => None,
			(Value::Bool(l), Value::Bool(r)) => Some(l.cmp(r)),
			(Value::String(l), Value::String(r)) => Some(l.cmp(r)),
			(Value::Bytes(l), Value::Bytes(r)) => Some(l.cmp(r)),
			(Value::Time(l), Value::Time(r)) => Some(l.cmp(r)),
			(Value::Duration(l), Value::Duration(r)) => {
				Some(l.months.cmp(&r.months).then(l.nanos.cmp(&r.nanos)))
			}
			(l, _) => return_error!(operator_not_applicable("<", l.nature(), None)),
		};
		Ok(ordering)
	}
}

fn compare_numeric(l: &Value, r: &Value) -> Option<Ordering> {
	match (l, r) {
		(Value::Int(l), Value::Int(r)) => Some(l.cmp(r)),
		(Value::UInt(l), Value::UInt(r)) => Some(l.cmp(r)),
		(Value::Int(l), Value::UInt(r)) => Some((*l as i128).cmp(&(*r as i128))),
		(Value::UInt(l), Value::Int(r)) => Some((*l as i128).cmp(&(*r as i128))),
		(l, r) => {
			let l = as_f64(l)?;
			let r = as_f64(r)?;
			l.partial_cmp(&r)
		}
	}
}

fn as_f64(value: &Value) -> Option<f64> {
	match value {
		Value::Int(v) => Some(*v as f64),
		Value::UInt(v) => Some(*v as f64),
		Value::Float(v) => Some(*v),
		_ => None,
	}
}

/// Structural equality: nulls of the same nature are equal. Used by tests
/// and partitioning, never by user-visible `==`.
impl PartialEq for Value {
	fn eq(&self, other: &Self) -> bool {
		match (self, other) {
			(Value::Null(l), Value::Null(r)) => l == r,
			(Value::Bool(l), Value::Bool(r)) => l == r,
			(Value::Int(l), Value::Int(r)) => l == r,
			(Value::UInt(l), Value::UInt(r)) => l == r,
			(Value::Float(l), Value::Float(r)) => l.to_bits() == r.to_bits() || l == r,
			(Value::String(l), Value::String(r)) => l == r,
			(Value::Bytes(l), Value::Bytes(r)) => l == r,
			(Value::Time(l), Value::Time(r)) => l == r,
			(Value::Duration(l), Value::Duration(r)) => l == r,
			(Value::Regexp(l), Value::Regexp(r)) => l == r,
			(Value::Array(l), Value::Array(r)) => l == r,
			(Value::Record(l), Value::Record(r)) => l == r,
			(Value::Dict(l), Value::Dict(r)) => l == r,
			(Value::Function(l), Value::Function(r)) => Arc::ptr_eq(l, r),
			(Value::Stream(l), Value::Stream(r)) => Arc::ptr_eq(l, r),
			(Value::TableObject(l), Value::TableObject(r)) => l == r,
			_ => false,
		}
	}
}

impl Value {
	fn fmt_nested(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		match self {
			Value::String(v) => write!(f, "{:?}", v),
			other => Display::fmt(other, f),
		}
	}
}

impl Display for Value {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		match self {
			Value::Null(_) => f.write_str("null"),
			Value::Bool(v) => write!(f, "{}", v),
			Value::Int(v) => write!(f, "{}", v),
			Value::UInt(v) => write!(f, "{}", v),
			Value::Float(v) => write!(f, "{}", v),
			Value::String(v) => f.write_str(v),
			Value::Bytes(v) => {
				f.write_str("0x")?;
				for byte in v.iter() {
					write!(f, "{:02x}", byte)?;
				}
				Ok(())
			}
			Value::Time(v) => write!(f, "{}", v),
			Value::Duration(v) => write!(f, "{}", v),
			Value::Regexp(v) => write!(f, "{}", v),
			Value::Array(v) => {
				f.write_str("[")?;
				for (i, elem) in v.iter().enumerate() {
					if i > 0 {
						f.write_str(", ")?;
					}
					elem.fmt_nested(f)?;
				}
				f.write_str("]")
			}
			Value::Record(v) => {
				f.write_str("{")?;
				for (i, (name, value)) in v.iter().enumerate() {
					if i > 0 {
						f.write_str(", ")?;
					}
					write!(f, "{}: ", name)?;
					value.fmt_nested(f)?;
				}
				f.write_str("}")
			}
			Value::Dict(v) => {
				f.write_str("[")?;
				if v.is_empty() {
					f.write_str(":")?;
				}
				for (i, (key, value)) in v.iter().enumerate() {
					if i > 0 {
						f.write_str(", ")?;
					}
					key.fmt_nested(f)?;
					f.write_str(": ")?;
					value.fmt_nested(f)?;
				}
				f.write_str("]")
			}
			Value::Function(v) => write!(f, "{}()", v.name()),
			Value::Stream(_) => f.write_str("<stream>"),
			Value::TableObject(v) => write!(f, "<table {}>", v.kind),
		}
	}
}

impl From<bool> for Value {
	fn from(v: bool) -> Self {
		Value::Bool(v)
	}
}

impl From<i64> for Value {
	fn from(v: i64) -> Self {
		Value::Int(v)
	}
}

impl From<u64> for Value {
	fn from(v: u64) -> Self {
		Value::UInt(v)
	}
}

impl From<f64> for Value {
	fn from(v: f64) -> Self {
		Value::Float(v)
	}
}

impl From<&str> for Value {
	fn from(v: &str) -> Self {
		Value::string(v)
	}
}

impl From<String> for Value {
	fn from(v: String) -> Self {
		Value::String(Arc::from(v))
	}
}

impl From<Time> for Value {
	fn from(v: Time) -> Self {
		Value::Time(v)
	}
}

impl From<Duration> for Value {
	fn from(v: Duration) -> Self {
		Value::Duration(v)
	}
}

impl From<Record> for Value {
	fn from(v: Record) -> Self {
		Value::Record(v)
	}
}

impl From<Array> for Value {
	fn from(v: Array) -> Self {
		Value::Array(v)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::ErrorKind;

	#[test]
	fn test_accessor_kind_mismatch() {
		let err = Value::int(1).as_str().unwrap_err();
		assert_eq!(err.code(), "VALUE_001");
		assert_eq!(err.kind(), ErrorKind::Invalid);
		assert!(err.message.contains("string"));
		assert!(err.message.contains("int"));
	}

	#[test]
	fn test_accessor_null_operand() {
		let err = Value::null(Nature::Int).as_int().unwrap_err();
		assert_eq!(err.code(), "VALUE_002");
	}

	#[test]
	fn test_null_not_equal_to_null() {
		let a = Value::null(Nature::Int);
		let b = Value::null(Nature::Int);
		assert_eq!(a.equal(&b), None);
		assert_eq!(a, b);
		assert_ne!(a, Value::null(Nature::String));
	}

	#[test]
	fn test_numeric_equality_across_natures() {
		assert_eq!(Value::int(3).equal(&Value::float(3.0)), Some(true));
		assert_eq!(Value::uint(3).equal(&Value::int(-3)), Some(false));
		assert_eq!(Value::int(-1).compare(&Value::uint(0)).unwrap(), Some(Ordering::Less));
	}

	#[test]
	fn test_compare_mismatched_natures_fails() {
		let err = Value::string("a").compare(&Value::int(1)).unwrap_err();
		assert_eq!(err.code(), "VALUE_004");
	}

	#[test]
	fn test_display() {
		let record = Record::from_iter([("a", Value::int(1)), ("b", Value::string("x"))]);
		assert_eq!(Value::record(record).to_string(), "{a: 1, b: \"x\"}");
		assert_eq!(Value::null(Nature::Float).to_string(), "null");
		assert_eq!(Value::bytes([0xde, 0xad]).to_string(), "0xdead");
	}
}
