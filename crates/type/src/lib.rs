// SPDX-License-Identifier: MIT
// Copyright (c) 2025 ReifyDB

#![cfg_attr(not(debug_assertions), deny(warnings))]

pub mod error;
pub mod util;
pub mod value;

pub use error::{Error, ErrorKind, Result, diagnostic::Diagnostic};
pub use value::{
	Arguments, Array, Dict, Duration, Function, Nature, Param, Record, Regexp, Stream, TableObject, Time, Type,
	Value,
	operator::{BinaryOp, UnaryOp, binary, unary},
	record::record_with,
	array::array_get,
};
