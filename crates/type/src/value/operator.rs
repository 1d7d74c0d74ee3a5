// SPDX-License-Identifier: MIT
// Copyright (c) 2025 ReifyDB

use std::{
	cmp::Ordering,
	fmt::{Display, Formatter},
};

use serde::{Deserialize, Serialize};

use crate::{
	Result,
	error::diagnostic::value::{division_by_zero, operator_not_applicable},
	return_error,
	value::{Nature, Value},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BinaryOp {
	Add,
	Sub,
	Mul,
	Div,
	Mod,
	Eq,
	Neq,
	Lt,
	Lte,
	Gt,
	Gte,
	RegexMatch,
	RegexNotMatch,
}

impl BinaryOp {
	pub fn symbol(&self) -> &'static str {
		match self {
			BinaryOp::Add => "+",
			BinaryOp::Sub => "-",
			BinaryOp::Mul => "*",
			BinaryOp::Div => "/",
			BinaryOp::Mod => "%",
			BinaryOp::Eq => "==",
			BinaryOp::Neq => "!=",
			BinaryOp::Lt => "<",
			BinaryOp::Lte => "<=",
			BinaryOp::Gt => ">",
			BinaryOp::Gte => ">=",
			BinaryOp::RegexMatch => "=~",
			BinaryOp::RegexNotMatch => "!~",
		}
	}

	fn is_arithmetic(&self) -> bool {
		matches!(self, BinaryOp::Add | BinaryOp::Sub | BinaryOp::Mul | BinaryOp::Div | BinaryOp::Mod)
	}
}

impl Display for BinaryOp {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		f.write_str(self.symbol())
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UnaryOp {
	Neg,
	Not,
	Exists,
}

impl Display for UnaryOp {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		f.write_str(match self {
			UnaryOp::Neg => "-",
			UnaryOp::Not => "not",
			UnaryOp::Exists => "exists",
		})
	}
}

/// Applies a binary operator. Arithmetic with a null operand yields a null
/// of the result nature; comparisons involving null yield a null bool.
pub fn binary(op: BinaryOp, left: &Value, right: &Value) -> Result<Value> {
	if left.is_null() || right.is_null() {
		return null_result(op, left, right);
	}
	match op {
		BinaryOp::Eq => Ok(bool_or_null(left.equal(right))),
		BinaryOp::Neq => Ok(bool_or_null(left.equal(right).map(|eq| !eq))),
		BinaryOp::Lt => compare(op, left, right, |o| o == Ordering::Less),
		BinaryOp::Lte => compare(op, left, right, |o| o != Ordering::Greater),
		BinaryOp::Gt => compare(op, left, right, |o| o == Ordering::Greater),
		BinaryOp::Gte => compare(op, left, right, |o| o != Ordering::Less),
		BinaryOp::RegexMatch | BinaryOp::RegexNotMatch => {
			let (Value::String(text), Value::Regexp(re)) = (left, right) else {
				return_error!(operator_not_applicable(op.symbol(), left.nature(), Some(right.nature())));
			};
			let matched = re.is_match(text);
			Ok(Value::Bool(if op == BinaryOp::RegexMatch {
				matched
			} else {
				!matched
			}))
		}
		_ => arithmetic(op, left, right),
	}
}

fn null_result(op: BinaryOp, left: &Value, right: &Value) -> Result<Value> {
	if !op.is_arithmetic() {
		return Ok(Value::Null(Nature::Bool));
	}
	if left.nature() == Nature::Time || right.nature() == Nature::Time {
		return Ok(Value::Null(Nature::Time));
	}
	let nature = match (left, right) {
		(Value::Null(Nature::Invalid), other) => other.nature(),
		(Value::Null(nature), _) => *nature,
		(other, _) => other.nature(),
	};
	Ok(Value::Null(nature))
}

fn bool_or_null(result: Option<bool>) -> Value {
	match result {
		Some(v) => Value::Bool(v),
		None => Value::Null(Nature::Bool),
	}
}

fn compare(op: BinaryOp, left: &Value, right: &Value, test: impl Fn(Ordering) -> bool) -> Result<Value> {
	match left.compare(right) {
		Ok(ordering) => Ok(bool_or_null(ordering.map(test))),
		Err(_) => return_error!(operator_not_applicable(op.symbol(), left.nature(), Some(right.nature()))),
	}
}

fn arithmetic(op: BinaryOp, left: &Value, right: &Value) -> Result<Value> {
	let not_applicable = || operator_not_applicable(op.symbol(), left.nature(), Some(right.nature()));
	let result = match (left, right) {
		(Value::Int(l), Value::Int(r)) => Value::Int(match op {
			BinaryOp::Add => l.wrapping_add(*r),
			BinaryOp::Sub => l.wrapping_sub(*r),
			BinaryOp::Mul => l.wrapping_mul(*r),
			BinaryOp::Div if *r == 0 => return_error!(division_by_zero()),
			BinaryOp::Div => l.wrapping_div(*r),
			BinaryOp::Mod if *r == 0 => return_error!(division_by_zero()),
			BinaryOp::Mod => l.wrapping_rem(*r),
			_ => return_error!(not_applicable()),
		}),
		(Value::UInt(l), Value::UInt(r)) => Value::UInt(match op {
			BinaryOp::Add => l.wrapping_add(*r),
			BinaryOp::Sub => l.wrapping_sub(*r),
			BinaryOp::Mul => l.wrapping_mul(*r),
			BinaryOp::Div if *r == 0 => return_error!(division_by_zero()),
			BinaryOp::Div => l / r,
			BinaryOp::Mod if *r == 0 => return_error!(division_by_zero()),
			BinaryOp::Mod => l % r,
			_ => return_error!(not_applicable()),
		}),
		(Value::Float(l), Value::Float(r)) => Value::Float(match op {
			BinaryOp::Add => l + r,
			BinaryOp::Sub => l - r,
			BinaryOp::Mul => l * r,
			BinaryOp::Div => l / r,
			BinaryOp::Mod => l % r,
			_ => return_error!(not_applicable()),
		}),
		(Value::String(l), Value::String(r)) if op == BinaryOp::Add => Value::string(format!("{}{}", l, r)),
		(Value::Duration(l), Value::Duration(r)) => match op {
			BinaryOp::Add => Value::Duration(l.add(*r)),
			BinaryOp::Sub => Value::Duration(l.add(r.negate())),
			_ => return_error!(not_applicable()),
		},
		(Value::Time(t), Value::Duration(d)) => match op {
			BinaryOp::Add => Value::Time(t.add(*d)),
			BinaryOp::Sub => Value::Time(t.sub(*d)),
			_ => return_error!(not_applicable()),
		},
		(Value::Duration(d), Value::Time(t)) if op == BinaryOp::Add => Value::Time(t.add(*d)),
		_ => return_error!(not_applicable()),
	};
	Ok(result)
}

pub fn unary(op: UnaryOp, value: &Value) -> Result<Value> {
	match (op, value) {
		(UnaryOp::Exists, v) => Ok(Value::Bool(!v.is_null())),
		(UnaryOp::Not, Value::Null(_)) => Ok(Value::Null(Nature::Bool)),
		(UnaryOp::Not, Value::Bool(v)) => Ok(Value::Bool(!v)),
		(UnaryOp::Neg, Value::Null(nature)) => Ok(Value::Null(*nature)),
		(UnaryOp::Neg, Value::Int(v)) => Ok(Value::Int(v.wrapping_neg())),
		(UnaryOp::Neg, Value::Float(v)) => Ok(Value::Float(-v)),
		(UnaryOp::Neg, Value::Duration(v)) => Ok(Value::Duration(v.negate())),
		(op, v) => return_error!(operator_not_applicable(&op.to_string(), v.nature(), None)),
	}
}
