// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use flux_column::{ColMeta, ColType, ColumnTableBuilder, GroupKeyBuilder, SharedAllocator, Table};
use flux_type::{Result, Value, error::diagnostic::table::schema_mismatch, return_error};

/// A literal table: key values, declared columns and rows of cells.
///
/// ```ignore
/// let table = TableFixture::new()
///     .key("host", Value::string("a"))
///     .col("_time", ColType::Time)
///     .col("_value", ColType::Int)
///     .row(vec![Value::time(Time::from_secs(1)), Value::int(10)])
///     .build(&alloc)?;
/// ```
///
/// Key columns not declared with [`TableFixture::col`] are added in front of
/// the declared columns and hold the key value on every row.
#[derive(Debug, Clone, Default)]
pub struct TableFixture {
	key: Vec<(String, Value)>,
	cols: Vec<ColMeta>,
	rows: Vec<Vec<Value>>,
}

impl TableFixture {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn key(mut self, label: impl Into<String>, value: Value) -> Self {
		self.key.push((label.into(), value));
		self
	}

	pub fn col(mut self, label: impl Into<String>, ty: ColType) -> Self {
		self.cols.push(ColMeta::new(label, ty));
		self
	}

	/// One cell per declared column, in declaration order.
	pub fn row(mut self, cells: Vec<Value>) -> Self {
		self.rows.push(cells);
		self
	}

	pub fn build(&self, alloc: &SharedAllocator) -> Result<Table> {
		let mut key = GroupKeyBuilder::new();
		for (label, value) in &self.key {
			key.add_key_value(label.clone(), value.clone());
		}
		let key = key.build()?;

		let mut builder = ColumnTableBuilder::new(key.clone(), alloc.clone());
		let mut constant = Vec::new();
		for (i, meta) in key.cols().iter().enumerate() {
			if !self.cols.iter().any(|c| c.label == meta.label) {
				let col = builder.add_col(meta.clone())?;
				constant.push((col, key.value(i).clone()));
			}
		}
		let mut declared = Vec::with_capacity(self.cols.len());
		for meta in &self.cols {
			declared.push(builder.add_col(meta.clone())?);
		}

		for (n, cells) in self.rows.iter().enumerate() {
			if cells.len() != declared.len() {
				return_error!(schema_mismatch(&format!(
					"row {} has {} cells for {} columns",
					n,
					cells.len(),
					declared.len()
				)));
			}
			for (col, value) in &constant {
				builder.append_value(*col, value)?;
			}
			for (col, cell) in declared.iter().zip(cells) {
				builder.append_value(*col, cell)?;
			}
		}
		builder.table()
	}
}

#[cfg(test)]
mod tests {
	use flux_column::Allocator;
	use flux_type::{Nature, Time};

	use super::*;

	#[test]
	fn test_key_columns_prepended() {
		let alloc = Allocator::shared(None);
		let table = TableFixture::new()
			.key("host", Value::string("a"))
			.col("_time", ColType::Time)
			.col("_value", ColType::Int)
			.row(vec![Value::time(Time::from_secs(1)), Value::int(10)])
			.row(vec![Value::time(Time::from_secs(2)), Value::null(Nature::Int)])
			.build(&alloc)
			.unwrap();

		let labels: Vec<_> = table.cols().iter().map(|c| c.label.as_str()).collect();
		assert_eq!(labels, vec!["host", "_time", "_value"]);
		assert_eq!(table.nrows(), 2);
		let hosts: Vec<_> = table.rows().map(|row| row[0].clone()).collect();
		assert_eq!(hosts, vec![Value::string("a"), Value::string("a")]);
		assert!(table.rows().nth(1).unwrap()[2].is_null());
	}

	#[test]
	fn test_declared_key_column_not_duplicated() {
		let alloc = Allocator::shared(None);
		let table = TableFixture::new()
			.key("host", Value::string("a"))
			.col("host", ColType::String)
			.row(vec![Value::string("a")])
			.build(&alloc)
			.unwrap();
		assert_eq!(table.ncols(), 1);
	}

	#[test]
	fn test_short_row_rejected() {
		let alloc = Allocator::shared(None);
		let err = TableFixture::new()
			.col("a", ColType::Int)
			.col("b", ColType::Int)
			.row(vec![Value::int(1)])
			.build(&alloc)
			.unwrap_err();
		assert_eq!(err.code(), "TABLE_007");
	}
}
