// SPDX-License-Identifier: MIT
// Copyright (c) 2025 ReifyDB

use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

/// The kind of a runtime value, independent of its element or field types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Nature {
	Invalid,
	Bool,
	Int,
	UInt,
	Float,
	String,
	Bytes,
	Time,
	Duration,
	Regexp,
	Array,
	Record,
	Dict,
	Function,
	Stream,
	TableObject,
}

impl Nature {
	pub fn is_numeric(&self) -> bool {
		matches!(self, Nature::Int | Nature::UInt | Nature::Float)
	}

	pub fn as_str(&self) -> &'static str {
		match self {
			Nature::Invalid => "invalid",
			Nature::Bool => "bool",
			Nature::Int => "int",
			Nature::UInt => "uint",
			Nature::Float => "float",
			Nature::String => "string",
			Nature::Bytes => "bytes",
			Nature::Time => "time",
			Nature::Duration => "duration",
			Nature::Regexp => "regexp",
			Nature::Array => "array",
			Nature::Record => "record",
			Nature::Dict => "dict",
			Nature::Function => "function",
			Nature::Stream => "stream",
			Nature::TableObject => "table",
		}
	}
}

impl Display for Nature {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		f.write_str(self.as_str())
	}
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Param {
	pub name: String,
	pub ty: Type,
	pub required: bool,
	/// The pipe parameter receives the left side of `|>`.
	pub pipe: bool,
}

impl Param {
	pub fn required(name: impl Into<String>, ty: Type) -> Self {
		Self {
			name: name.into(),
			ty,
			required: true,
			pipe: false,
		}
	}

	pub fn optional(name: impl Into<String>, ty: Type) -> Self {
		Self {
			name: name.into(),
			ty,
			required: false,
			pipe: false,
		}
	}

	pub fn pipe(name: impl Into<String>) -> Self {
		Self {
			name: name.into(),
			ty: Type::Stream,
			required: true,
			pipe: true,
		}
	}
}

/// Semantic type assigned by the type checker.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Type {
	Basic(Nature),
	Array(Box<Type>),
	Record(Vec<(String, Type)>),
	Dict {
		key: Box<Type>,
		value: Box<Type>,
	},
	Function {
		params: Vec<Param>,
		ret: Box<Type>,
	},
	Stream,
	/// Unresolved type variable.
	Var(u64),
}

impl Type {
	pub const BOOL: Type = Type::Basic(Nature::Bool);
	pub const INT: Type = Type::Basic(Nature::Int);
	pub const UINT: Type = Type::Basic(Nature::UInt);
	pub const FLOAT: Type = Type::Basic(Nature::Float);
	pub const STRING: Type = Type::Basic(Nature::String);
	pub const BYTES: Type = Type::Basic(Nature::Bytes);
	pub const TIME: Type = Type::Basic(Nature::Time);
	pub const DURATION: Type = Type::Basic(Nature::Duration);
	pub const REGEXP: Type = Type::Basic(Nature::Regexp);

	pub fn array(elem: Type) -> Self {
		Type::Array(Box::new(elem))
	}

	pub fn dict(key: Type, value: Type) -> Self {
		Type::Dict {
			key: Box::new(key),
			value: Box::new(value),
		}
	}

	pub fn function(params: Vec<Param>, ret: Type) -> Self {
		Type::Function {
			params,
			ret: Box::new(ret),
		}
	}

	pub fn nature(&self) -> Nature {
		match self {
			Type::Basic(nature) => *nature,
			Type::Array(_) => Nature::Array,
			Type::Record(_) => Nature::Record,
			Type::Dict {
				..
			} => Nature::Dict,
			Type::Function {
				..
			} => Nature::Function,
			Type::Stream => Nature::Stream,
			Type::Var(_) => Nature::Invalid,
		}
	}
}

impl Display for Type {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		match self {
			Type::Basic(nature) => write!(f, "{}", nature),
			Type::Array(elem) => write!(f, "[{}]", elem),
			Type::Record(fields) => {
				f.write_str("{")?;
				for (i, (name, ty)) in fields.iter().enumerate() {
					if i > 0 {
						f.write_str(", ")?;
					}
					write!(f, "{}: {}", name, ty)?;
				}
				f.write_str("}")
			}
			Type::Dict {
				key,
				value,
			} => write!(f, "[{}: {}]", key, value),
			Type::Function {
				params,
				ret,
			} => {
				f.write_str("(")?;
				for (i, param) in params.iter().enumerate() {
					if i > 0 {
						f.write_str(", ")?;
					}
					if param.pipe {
						f.write_str("<-")?;
					} else if !param.required {
						f.write_str("?")?;
					}
					write!(f, "{}: {}", param.name, param.ty)?;
				}
				write!(f, ") => {}", ret)
			}
			Type::Stream => f.write_str("stream[A]"),
			Type::Var(id) => write!(f, "t{}", id),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_function_type_display() {
		let ty = Type::function(
			vec![Param::pipe("tables"), Param::required("fn", Type::Var(1)), Param::optional("n", Type::INT)],
			Type::Stream,
		);
		assert_eq!(ty.to_string(), "(<-tables: stream[A], fn: t1, ?n: int) => stream[A]");
		assert_eq!(ty.nature(), Nature::Function);
	}
}
