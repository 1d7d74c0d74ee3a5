// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::sync::Arc;

use flux_type::{
	Result, Time, Value,
	error::diagnostic::table::{column_index_out_of_range, duplicate_column, type_mismatch},
	return_error,
};
use tracing::trace;

use crate::{
	alloc::SharedAllocator,
	column::{ColumnBuilder, nature_name},
	group_key::GroupKey,
	meta::{ColMeta, ColType},
	table::{Chunk, Table},
};

/// Builds one table column by column.
///
/// Columns advance in lockstep: the table has as many rows as its longest
/// column and shorter columns read as null in the missing rows. Appends are
/// type checked against the column and charged to the allocator.
#[derive(Debug)]
pub struct ColumnTableBuilder {
	key: GroupKey,
	cols: Vec<ColMeta>,
	columns: Vec<ColumnBuilder>,
	alloc: SharedAllocator,
}

impl ColumnTableBuilder {
	pub fn new(key: GroupKey, alloc: SharedAllocator) -> Self {
		Self {
			key,
			cols: Vec::new(),
			columns: Vec::new(),
			alloc,
		}
	}

	/// A builder holding a copy of every row of `table`.
	pub fn from_table(table: &Table, alloc: SharedAllocator) -> Result<Self> {
		let mut builder = Self::new(table.key().clone(), alloc);
		for meta in table.cols() {
			builder.add_col(meta.clone())?;
		}
		builder.append_table(table)?;
		Ok(builder)
	}

	pub fn key(&self) -> &GroupKey {
		&self.key
	}

	pub fn cols(&self) -> &[ColMeta] {
		&self.cols
	}

	pub fn ncols(&self) -> usize {
		self.cols.len()
	}

	pub fn nrows(&self) -> usize {
		self.columns.iter().map(ColumnBuilder::len).max().unwrap_or(0)
	}

	pub fn index(&self, label: &str) -> Option<usize> {
		self.cols.iter().position(|c| c.label == label)
	}

	/// Adds a column and returns its index. Existing rows read as null in it.
	pub fn add_col(&mut self, meta: ColMeta) -> Result<usize> {
		if self.index(&meta.label).is_some() {
			return_error!(duplicate_column(&meta.label));
		}
		let nrows = self.nrows();
		let mut column = ColumnBuilder::new(meta.ty, self.alloc.clone());
		column.pad_to(nrows)?;
		self.cols.push(meta);
		self.columns.push(column);
		Ok(self.columns.len() - 1)
	}

	/// Index of `meta.label`, adding the column when absent.
	pub fn ensure_col(&mut self, meta: &ColMeta) -> Result<usize> {
		match self.index(&meta.label) {
			Some(idx) if self.cols[idx].ty == meta.ty => Ok(idx),
			Some(idx) => {
				return_error!(type_mismatch(&meta.label, self.cols[idx].ty.as_str(), meta.ty.as_str()))
			}
			None => self.add_col(meta.clone()),
		}
	}

	fn column(&mut self, col: usize, ty: ColType) -> Result<&mut ColumnBuilder> {
		let ncols = self.columns.len();
		let Some(column) = self.columns.get_mut(col) else {
			return_error!(column_index_out_of_range(col, ncols));
		};
		if column.ty() != ty {
			return_error!(type_mismatch(&self.cols[col].label, column.ty().as_str(), ty.as_str()));
		}
		Ok(column)
	}

	pub fn append_bool(&mut self, col: usize, v: bool) -> Result<()> {
		self.column(col, ColType::Bool)?.push_bool(v)
	}

	pub fn append_int(&mut self, col: usize, v: i64) -> Result<()> {
		self.column(col, ColType::Int)?.push_int(v)
	}

	pub fn append_uint(&mut self, col: usize, v: u64) -> Result<()> {
		self.column(col, ColType::UInt)?.push_uint(v)
	}

	pub fn append_float(&mut self, col: usize, v: f64) -> Result<()> {
		self.column(col, ColType::Float)?.push_float(v)
	}

	pub fn append_string(&mut self, col: usize, v: impl Into<Arc<str>>) -> Result<()> {
		self.column(col, ColType::String)?.push_string(v.into())
	}

	pub fn append_time(&mut self, col: usize, v: Time) -> Result<()> {
		self.column(col, ColType::Time)?.push_time(v)
	}

	pub fn append_nil(&mut self, col: usize) -> Result<()> {
		let ncols = self.columns.len();
		match self.columns.get_mut(col) {
			Some(column) => column.push_null(),
			None => return_error!(column_index_out_of_range(col, ncols)),
		}
	}

	/// Appends a runtime value; nulls of any nature append a null cell.
	pub fn append_value(&mut self, col: usize, value: &Value) -> Result<()> {
		match value {
			Value::Null(_) => self.append_nil(col),
			Value::Bool(v) => self.append_bool(col, *v),
			Value::Int(v) => self.append_int(col, *v),
			Value::UInt(v) => self.append_uint(col, *v),
			Value::Float(v) => self.append_float(col, *v),
			Value::String(v) => self.append_string(col, v.clone()),
			Value::Time(v) => self.append_time(col, *v),
			other => {
				let ncols = self.cols.len();
				match self.cols.get(col) {
					Some(meta) => return_error!(type_mismatch(&meta.label, meta.ty.as_str(), nature_name(other))),
					None => return_error!(column_index_out_of_range(col, ncols)),
				}
			}
		}
	}

	/// Appends one row of `chunk`, matching columns by label. Columns the
	/// chunk lacks receive a null; chunk columns the builder lacks are added.
	pub fn append_row(&mut self, chunk: &Chunk, row: usize) -> Result<()> {
		let base = self.nrows();
		let mut targets = Vec::with_capacity(chunk.ncols());
		for meta in chunk.cols() {
			let idx = self.ensure_col(meta)?;
			self.columns[idx].pad_to(base)?;
			targets.push(idx);
		}
		for (i, idx) in targets.into_iter().enumerate() {
			let value = chunk.value(i, row);
			self.append_value(idx, &value)?;
		}
		self.pad_all(base + 1)
	}

	/// Appends every row of `table` with the same column matching as `append_row`.
	pub fn append_table(&mut self, table: &Table) -> Result<()> {
		table.visit(|chunk| {
			let base = self.nrows();
			let mut targets = Vec::with_capacity(chunk.ncols());
			for meta in chunk.cols() {
				let idx = self.ensure_col(meta)?;
				self.columns[idx].pad_to(base)?;
				targets.push(idx);
			}
			for (i, idx) in targets.into_iter().enumerate() {
				for row in 0..chunk.nrows() {
					let value = chunk.value(i, row);
					self.append_value(idx, &value)?;
				}
			}
			self.pad_all(base + chunk.nrows())
		})
	}

	fn pad_all(&mut self, nrows: usize) -> Result<()> {
		for column in &mut self.columns {
			column.pad_to(nrows)?;
		}
		Ok(())
	}

	/// Drops every row but keeps the columns.
	pub fn clear_data(&mut self) {
		for column in &mut self.columns {
			column.clear();
		}
	}

	/// Freezes the buffers into an immutable table, padding short columns.
	pub fn table(mut self) -> Result<Table> {
		let nrows = self.nrows();
		self.pad_all(nrows)?;
		let columns = std::mem::take(&mut self.columns).into_iter().map(ColumnBuilder::freeze).collect();
		trace!(key = %self.key, nrows, "table built");
		Table::new(self.key, self.cols, columns)
	}
}

#[cfg(test)]
mod tests {
	use flux_type::{ErrorKind, Nature};

	use super::*;
	use crate::alloc::Allocator;

	fn builder(alloc: &SharedAllocator) -> ColumnTableBuilder {
		ColumnTableBuilder::new(GroupKey::empty(), alloc.clone())
	}

	#[test]
	fn test_duplicate_column() {
		let alloc = Allocator::shared(None);
		let mut b = builder(&alloc);
		b.add_col(ColMeta::new("v", ColType::Int)).unwrap();
		let err = b.add_col(ColMeta::new("v", ColType::Float)).unwrap_err();
		assert_eq!(err.code(), "TABLE_001");
	}

	#[test]
	fn test_type_mismatch() {
		let alloc = Allocator::shared(None);
		let mut b = builder(&alloc);
		let v = b.add_col(ColMeta::new("v", ColType::Int)).unwrap();
		let err = b.append_string(v, "x").unwrap_err();
		assert_eq!(err.code(), "TABLE_002");
		assert_eq!(err.kind(), ErrorKind::Invalid);
		let err = b.append_value(v, &Value::float(1.0)).unwrap_err();
		assert_eq!(err.code(), "TABLE_002");
	}

	#[test]
	fn test_lockstep_pads_short_columns() {
		let alloc = Allocator::shared(None);
		let mut b = builder(&alloc);
		let t = b.add_col(ColMeta::new("_time", ColType::Time)).unwrap();
		let v = b.add_col(ColMeta::new("v", ColType::Int)).unwrap();
		b.append_time(t, Time::from_secs(1)).unwrap();
		b.append_time(t, Time::from_secs(2)).unwrap();
		b.append_int(v, 10).unwrap();
		assert_eq!(b.nrows(), 2);

		let table = b.table().unwrap();
		assert_eq!(table.nrows(), 2);
		assert_eq!(table.value(1, 0), Some(Value::int(10)));
		assert_eq!(table.value(1, 1), Some(Value::null(Nature::Int)));
	}

	#[test]
	fn test_cells_equal_rows_times_cols() {
		let alloc = Allocator::shared(None);
		let mut b = builder(&alloc);
		let a = b.add_col(ColMeta::new("a", ColType::String)).unwrap();
		let c = b.add_col(ColMeta::new("c", ColType::Float)).unwrap();
		for i in 0..5 {
			b.append_string(a, format!("r{}", i)).unwrap();
			if i % 2 == 0 {
				b.append_float(c, i as f64).unwrap();
			} else {
				b.append_nil(c).unwrap();
			}
		}
		let table = b.table().unwrap();
		let mut cells = 0;
		table
			.visit(|chunk| {
				for column in chunk.columns() {
					cells += column.len();
				}
				Ok(())
			})
			.unwrap();
		assert_eq!(cells, table.nrows() * table.ncols());
	}

	#[test]
	fn test_from_table_round_trip() {
		let alloc = Allocator::shared(None);
		let mut b = builder(&alloc);
		let t = b.add_col(ColMeta::new("_time", ColType::Time)).unwrap();
		let v = b.add_col(ColMeta::new("v", ColType::UInt)).unwrap();
		b.append_time(t, Time::from_secs(1)).unwrap();
		b.append_uint(v, 7).unwrap();
		b.append_time(t, Time::from_secs(2)).unwrap();
		b.append_nil(v).unwrap();
		let table = b.table().unwrap();

		let copy = ColumnTableBuilder::from_table(&table, alloc.clone()).unwrap().table().unwrap();
		assert_eq!(copy, table);
	}

	#[test]
	fn test_append_table_adds_missing_columns() {
		let alloc = Allocator::shared(None);
		let mut first = builder(&alloc);
		let a = first.add_col(ColMeta::new("a", ColType::Int)).unwrap();
		first.append_int(a, 1).unwrap();
		let first = first.table().unwrap();

		let mut second = builder(&alloc);
		let b = second.add_col(ColMeta::new("b", ColType::Int)).unwrap();
		second.append_int(b, 2).unwrap();
		let second = second.table().unwrap();

		let mut merged = builder(&alloc);
		merged.append_table(&first).unwrap();
		merged.append_table(&second).unwrap();
		let merged = merged.table().unwrap();
		assert_eq!(merged.nrows(), 2);
		let rows: Vec<_> = merged.rows().collect();
		assert_eq!(rows[0], vec![Value::int(1), Value::null(Nature::Int)]);
		assert_eq!(rows[1], vec![Value::null(Nature::Int), Value::int(2)]);
	}

	#[test]
	fn test_append_row_into_empty_builder_keeps_row_aligned() {
		let alloc = Allocator::shared(None);
		let mut source = builder(&alloc);
		for (label, value) in [("a", 1), ("b", 2), ("c", 3)] {
			let idx = source.add_col(ColMeta::new(label, ColType::Int)).unwrap();
			source.append_int(idx, value).unwrap();
			source.append_int(idx, value * 10).unwrap();
		}
		let source = source.table().unwrap();

		let mut target = builder(&alloc);
		let existing = target.add_col(ColMeta::new("c", ColType::Int)).unwrap();
		target.append_int(existing, 0).unwrap();
		source
			.visit(|chunk| {
				for row in 0..chunk.nrows() {
					target.append_row(chunk, row)?;
				}
				Ok(())
			})
			.unwrap();
		assert_eq!(target.nrows(), 3);

		let table = target.table().unwrap();
		let rows: Vec<_> = table.rows().collect();
		let null = Value::null(Nature::Int);
		assert_eq!(rows[0], vec![Value::int(0), null.clone(), null.clone()]);
		assert_eq!(rows[1], vec![Value::int(3), Value::int(1), Value::int(2)]);
		assert_eq!(rows[2], vec![Value::int(30), Value::int(10), Value::int(20)]);
	}

	#[test]
	fn test_memory_released_when_tables_drop() {
		let alloc = Allocator::shared(None);
		let mut b = builder(&alloc);
		let v = b.add_col(ColMeta::new("v", ColType::Int)).unwrap();
		for i in 0..100 {
			b.append_int(v, i).unwrap();
		}
		let table = b.table().unwrap();
		assert!(alloc.allocated() > 0);
		let retained = table.clone();
		drop(table);
		assert!(alloc.allocated() > 0);
		drop(retained);
		assert_eq!(alloc.allocated(), 0);
		assert!(alloc.max_allocated() >= 800);
	}

	#[test]
	fn test_limit_exceeded_while_building() {
		let alloc = Allocator::shared(Some(64));
		let mut b = builder(&alloc);
		let v = b.add_col(ColMeta::new("v", ColType::Int)).unwrap();
		let mut result = Ok(());
		for i in 0..100 {
			result = b.append_int(v, i);
			if result.is_err() {
				break;
			}
		}
		assert_eq!(result.unwrap_err().kind(), ErrorKind::ResourceExhausted);
		drop(b);
		assert_eq!(alloc.allocated(), 0);
	}
}
