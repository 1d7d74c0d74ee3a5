// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::{
	fmt::{Display, Formatter},
	sync::Arc,
};

use flux_type::{
	Record, Result, Value,
	error::diagnostic::table::{column_index_out_of_range, schema_mismatch},
	return_error,
};

use crate::{column::Column, group_key::GroupKey, meta::ColMeta};

/// A contiguous run of rows. Every column holds exactly `nrows` cells.
#[derive(Debug, Clone)]
pub struct Chunk {
	key: GroupKey,
	cols: Arc<[ColMeta]>,
	columns: Vec<Column>,
	nrows: usize,
}

impl Chunk {
	pub(crate) fn new(key: GroupKey, cols: Arc<[ColMeta]>, columns: Vec<Column>) -> Result<Chunk> {
		if cols.len() != columns.len() {
			return_error!(schema_mismatch(&format!(
				"{} column descriptors for {} columns",
				cols.len(),
				columns.len()
			)));
		}
		let nrows = columns.first().map(Column::len).unwrap_or(0);
		for (meta, column) in cols.iter().zip(columns.iter()) {
			if column.len() != nrows {
				return_error!(schema_mismatch(&format!(
					"column {} has {} rows, expected {}",
					meta.label,
					column.len(),
					nrows
				)));
			}
			if column.ty() != meta.ty {
				return_error!(schema_mismatch(&format!(
					"column {} holds {} values, declared {}",
					meta.label,
					column.ty(),
					meta.ty
				)));
			}
		}
		Ok(Chunk {
			key,
			cols,
			columns,
			nrows,
		})
	}

	pub fn key(&self) -> &GroupKey {
		&self.key
	}

	pub fn nrows(&self) -> usize {
		self.nrows
	}

	pub fn ncols(&self) -> usize {
		self.cols.len()
	}

	pub fn cols(&self) -> &[ColMeta] {
		&self.cols
	}

	pub fn index(&self, label: &str) -> Option<usize> {
		self.cols.iter().position(|c| c.label == label)
	}

	pub fn column(&self, i: usize) -> Result<&Column> {
		match self.columns.get(i) {
			Some(column) => Ok(column),
			None => return_error!(column_index_out_of_range(i, self.columns.len())),
		}
	}

	pub fn columns(&self) -> &[Column] {
		&self.columns
	}

	pub fn value(&self, col: usize, row: usize) -> Value {
		self.columns[col].value(row)
	}

	/// The row as a record with one property per column.
	pub fn row_record(&self, row: usize) -> Record {
		self.cols.iter().zip(self.columns.iter()).map(|(meta, column)| (meta.label.clone(), column.value(row))).collect()
	}
}

#[derive(Debug)]
struct TableInner {
	key: GroupKey,
	cols: Arc<[ColMeta]>,
	chunks: Vec<Chunk>,
}

/// Immutable table of rows sharing a group key, stored as a sequence of
/// chunks. Cloning retains the column buffers; dropping the last clone
/// releases them to the allocator.
#[derive(Debug, Clone)]
pub struct Table(Arc<TableInner>);

impl Table {
	pub fn new(key: GroupKey, cols: Vec<ColMeta>, columns: Vec<Column>) -> Result<Table> {
		let cols: Arc<[ColMeta]> = Arc::from(cols);
		let chunk = Chunk::new(key.clone(), cols.clone(), columns)?;
		let chunks = if chunk.nrows() == 0 {
			Vec::new()
		} else {
			vec![chunk]
		};
		Ok(Table(Arc::new(TableInner {
			key,
			cols,
			chunks,
		})))
	}

	/// A table with no columns and no rows.
	pub fn empty(key: GroupKey) -> Table {
		Table(Arc::new(TableInner {
			key,
			cols: Arc::from(Vec::new()),
			chunks: Vec::new(),
		}))
	}

	/// Concatenates tables with identical key and columns into one table
	/// without copying their buffers.
	pub fn concat(tables: &[Table]) -> Result<Option<Table>> {
		let Some(first) = tables.first() else {
			return Ok(None);
		};
		let mut chunks = Vec::new();
		for table in tables {
			if !table.key().equal(first.key()) || table.cols() != first.cols() {
				return_error!(schema_mismatch("concatenated tables must share key and columns"));
			}
			chunks.extend(table.0.chunks.iter().cloned());
		}
		Ok(Some(Table(Arc::new(TableInner {
			key: first.key().clone(),
			cols: first.0.cols.clone(),
			chunks,
		}))))
	}

	pub fn key(&self) -> &GroupKey {
		&self.0.key
	}

	pub fn cols(&self) -> &[ColMeta] {
		&self.0.cols
	}

	pub fn ncols(&self) -> usize {
		self.0.cols.len()
	}

	pub fn index(&self, label: &str) -> Option<usize> {
		self.0.cols.iter().position(|c| c.label == label)
	}

	pub fn nrows(&self) -> usize {
		self.0.chunks.iter().map(Chunk::nrows).sum()
	}

	pub fn is_empty(&self) -> bool {
		self.0.chunks.is_empty()
	}

	pub fn chunks(&self) -> &[Chunk] {
		&self.0.chunks
	}

	/// Drives `visitor` over every chunk in order, stopping at the first error.
	pub fn visit(&self, mut visitor: impl FnMut(&Chunk) -> Result<()>) -> Result<()> {
		for chunk in &self.0.chunks {
			visitor(chunk)?;
		}
		Ok(())
	}

	/// The cell at a table-wide row index.
	pub fn value(&self, col: usize, mut row: usize) -> Option<Value> {
		for chunk in &self.0.chunks {
			if row < chunk.nrows() {
				return Some(chunk.value(col, row));
			}
			row -= chunk.nrows();
		}
		None
	}

	/// Bytes held by this table's columns.
	pub fn accounted(&self) -> usize {
		self.0.chunks.iter().flat_map(|c| c.columns.iter()).map(Column::accounted).sum()
	}

	pub fn rows(&self) -> impl Iterator<Item = Vec<Value>> + '_ {
		self.0.chunks.iter().flat_map(|chunk| {
			(0..chunk.nrows()).map(move |row| (0..chunk.ncols()).map(|col| chunk.value(col, row)).collect())
		})
	}
}

impl PartialEq for Table {
	fn eq(&self, other: &Self) -> bool {
		self.key().equal(other.key())
			&& self.cols() == other.cols()
			&& self.nrows() == other.nrows()
			&& self.rows().zip(other.rows()).all(|(l, r)| l == r)
	}
}

impl Display for Table {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		writeln!(f, "table {}", self.key())?;
		let header: Vec<String> = self.cols().iter().map(ToString::to_string).collect();
		writeln!(f, "{}", header.join(" | "))?;
		for row in self.rows() {
			let cells: Vec<String> = row.iter().map(ToString::to_string).collect();
			writeln!(f, "{}", cells.join(" | "))?;
		}
		Ok(())
	}
}
