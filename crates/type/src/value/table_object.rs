// SPDX-License-Identifier: MIT
// Copyright (c) 2025 ReifyDB

use std::sync::Arc;

use crate::value::Record;

/// The value produced by calling a table-producing function. It records the
/// operation kind, its arguments and the table objects it was piped from.
#[derive(Debug, Clone, PartialEq)]
pub struct TableObject {
	pub kind: String,
	pub args: Record,
	pub parents: Vec<Arc<TableObject>>,
}

impl TableObject {
	pub fn new(kind: impl Into<String>, args: Record, parents: Vec<Arc<TableObject>>) -> Self {
		Self {
			kind: kind.into(),
			args,
			parents,
		}
	}
}
