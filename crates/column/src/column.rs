// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::{mem::size_of, sync::Arc};

use flux_type::{Nature, Result, Time, Value, util::BitVec};

use crate::{alloc::SharedAllocator, meta::ColType};

/// Typed column storage, one variant per column type.
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnData {
	Bool(Vec<bool>),
	Int(Vec<i64>),
	UInt(Vec<u64>),
	Float(Vec<f64>),
	String(Vec<Arc<str>>),
	Time(Vec<Time>),
}

impl ColumnData {
	pub fn new(ty: ColType) -> Self {
		match ty {
			ColType::Bool => ColumnData::Bool(Vec::new()),
			ColType::Int => ColumnData::Int(Vec::new()),
			ColType::UInt => ColumnData::UInt(Vec::new()),
			ColType::Float => ColumnData::Float(Vec::new()),
			ColType::String => ColumnData::String(Vec::new()),
			ColType::Time => ColumnData::Time(Vec::new()),
		}
	}

	pub fn ty(&self) -> ColType {
		match self {
			ColumnData::Bool(_) => ColType::Bool,
			ColumnData::Int(_) => ColType::Int,
			ColumnData::UInt(_) => ColType::UInt,
			ColumnData::Float(_) => ColType::Float,
			ColumnData::String(_) => ColType::String,
			ColumnData::Time(_) => ColType::Time,
		}
	}

	pub fn len(&self) -> usize {
		match self {
			ColumnData::Bool(v) => v.len(),
			ColumnData::Int(v) => v.len(),
			ColumnData::UInt(v) => v.len(),
			ColumnData::Float(v) => v.len(),
			ColumnData::String(v) => v.len(),
			ColumnData::Time(v) => v.len(),
		}
	}

	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}

	/// Appends the zero value used as the placeholder behind a null.
	fn push_default(&mut self) -> usize {
		match self {
			ColumnData::Bool(v) => v.push(false),
			ColumnData::Int(v) => v.push(0),
			ColumnData::UInt(v) => v.push(0),
			ColumnData::Float(v) => v.push(0.0),
			ColumnData::String(v) => v.push(Arc::from("")),
			ColumnData::Time(v) => v.push(Time(0)),
		}
		self.elem_size()
	}

	fn elem_size(&self) -> usize {
		match self {
			ColumnData::Bool(_) => size_of::<bool>(),
			ColumnData::Int(_) => size_of::<i64>(),
			ColumnData::UInt(_) => size_of::<u64>(),
			ColumnData::Float(_) => size_of::<f64>(),
			ColumnData::String(_) => size_of::<Arc<str>>(),
			ColumnData::Time(_) => size_of::<Time>(),
		}
	}

	fn clear(&mut self) {
		match self {
			ColumnData::Bool(v) => v.clear(),
			ColumnData::Int(v) => v.clear(),
			ColumnData::UInt(v) => v.clear(),
			ColumnData::Float(v) => v.clear(),
			ColumnData::String(v) => v.clear(),
			ColumnData::Time(v) => v.clear(),
		}
	}

	fn get(&self, row: usize) -> Value {
		match self {
			ColumnData::Bool(v) => Value::Bool(v[row]),
			ColumnData::Int(v) => Value::Int(v[row]),
			ColumnData::UInt(v) => Value::UInt(v[row]),
			ColumnData::Float(v) => Value::Float(v[row]),
			ColumnData::String(v) => Value::String(v[row].clone()),
			ColumnData::Time(v) => Value::Time(v[row]),
		}
	}
}

/// Append buffer for one column. Every byte it holds is charged to the
/// allocator and released when the buffer is dropped or cleared.
#[derive(Debug)]
pub(crate) struct ColumnBuilder {
	data: ColumnData,
	valid: BitVec,
	accounted: usize,
	alloc: SharedAllocator,
}

impl ColumnBuilder {
	pub(crate) fn new(ty: ColType, alloc: SharedAllocator) -> Self {
		Self {
			data: ColumnData::new(ty),
			valid: BitVec::new(),
			accounted: 0,
			alloc,
		}
	}

	pub(crate) fn ty(&self) -> ColType {
		self.data.ty()
	}

	pub(crate) fn len(&self) -> usize {
		self.data.len()
	}

	fn charge(&mut self, value_bytes: usize) -> Result<()> {
		// one validity byte per eight rows
		let bitmap = if self.valid.len() % 8 == 0 {
			1
		} else {
			0
		};
		let n = self.data.elem_size() + value_bytes + bitmap;
		self.alloc.allocate(n)?;
		self.accounted += n;
		Ok(())
	}

	pub(crate) fn push_null(&mut self) -> Result<()> {
		self.charge(0)?;
		self.data.push_default();
		self.valid.push(false);
		Ok(())
	}

	pub(crate) fn push_bool(&mut self, v: bool) -> Result<()> {
		self.charge(0)?;
		if let ColumnData::Bool(data) = &mut self.data {
			data.push(v);
		}
		self.valid.push(true);
		Ok(())
	}

	pub(crate) fn push_int(&mut self, v: i64) -> Result<()> {
		self.charge(0)?;
		if let ColumnData::Int(data) = &mut self.data {
			data.push(v);
		}
		self.valid.push(true);
		Ok(())
	}

	pub(crate) fn push_uint(&mut self, v: u64) -> Result<()> {
		self.charge(0)?;
		if let ColumnData::UInt(data) = &mut self.data {
			data.push(v);
		}
		self.valid.push(true);
		Ok(())
	}

	pub(crate) fn push_float(&mut self, v: f64) -> Result<()> {
		self.charge(0)?;
		if let ColumnData::Float(data) = &mut self.data {
			data.push(v);
		}
		self.valid.push(true);
		Ok(())
	}

	pub(crate) fn push_string(&mut self, v: Arc<str>) -> Result<()> {
		self.charge(v.len())?;
		if let ColumnData::String(data) = &mut self.data {
			data.push(v);
		}
		self.valid.push(true);
		Ok(())
	}

	pub(crate) fn push_time(&mut self, v: Time) -> Result<()> {
		self.charge(0)?;
		if let ColumnData::Time(data) = &mut self.data {
			data.push(v);
		}
		self.valid.push(true);
		Ok(())
	}

	pub(crate) fn pad_to(&mut self, len: usize) -> Result<()> {
		while self.len() < len {
			self.push_null()?;
		}
		Ok(())
	}

	pub(crate) fn clear(&mut self) {
		self.data.clear();
		self.valid.clear();
		self.alloc.free(self.accounted);
		self.accounted = 0;
	}

	/// Moves the buffers and their accounting into an immutable column.
	pub(crate) fn freeze(mut self) -> Column {
		let ty = self.data.ty();
		let data = std::mem::replace(&mut self.data, ColumnData::new(ty));
		let valid = std::mem::take(&mut self.valid);
		let accounted = std::mem::take(&mut self.accounted);
		Column(Arc::new(ColumnInner {
			data,
			valid,
			accounted,
			alloc: self.alloc.clone(),
		}))
	}
}

impl Drop for ColumnBuilder {
	fn drop(&mut self) {
		self.alloc.free(self.accounted);
	}
}

#[derive(Debug)]
struct ColumnInner {
	data: ColumnData,
	valid: BitVec,
	accounted: usize,
	alloc: SharedAllocator,
}

impl Drop for ColumnInner {
	fn drop(&mut self) {
		self.alloc.free(self.accounted);
	}
}

/// Immutable, reference counted column. Cloning retains it; the accounted
/// bytes return to the allocator when the last clone is dropped.
#[derive(Debug, Clone)]
pub struct Column(Arc<ColumnInner>);

impl Column {
	pub fn ty(&self) -> ColType {
		self.0.data.ty()
	}

	pub fn len(&self) -> usize {
		self.0.data.len()
	}

	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}

	pub fn data(&self) -> &ColumnData {
		&self.0.data
	}

	pub fn is_valid(&self, row: usize) -> bool {
		self.0.valid.get(row)
	}

	pub fn validity(&self) -> &BitVec {
		&self.0.valid
	}

	/// The cell at `row`; invalid cells read as null of the column nature.
	pub fn value(&self, row: usize) -> Value {
		if !self.is_valid(row) {
			return Value::Null(self.ty().nature());
		}
		self.0.data.get(row)
	}

	pub fn bools(&self) -> Option<&[bool]> {
		match &self.0.data {
			ColumnData::Bool(v) => Some(v),
			_ => None,
		}
	}

	pub fn ints(&self) -> Option<&[i64]> {
		match &self.0.data {
			ColumnData::Int(v) => Some(v),
			_ => None,
		}
	}

	pub fn uints(&self) -> Option<&[u64]> {
		match &self.0.data {
			ColumnData::UInt(v) => Some(v),
			_ => None,
		}
	}

	pub fn floats(&self) -> Option<&[f64]> {
		match &self.0.data {
			ColumnData::Float(v) => Some(v),
			_ => None,
		}
	}

	pub fn strings(&self) -> Option<&[Arc<str>]> {
		match &self.0.data {
			ColumnData::String(v) => Some(v),
			_ => None,
		}
	}

	pub fn times(&self) -> Option<&[Time]> {
		match &self.0.data {
			ColumnData::Time(v) => Some(v),
			_ => None,
		}
	}

	pub fn accounted(&self) -> usize {
		self.0.accounted
	}
}

pub(crate) fn nature_name(value: &Value) -> &'static str {
	match value.nature() {
		Nature::Invalid => "null",
		nature => nature.as_str(),
	}
}
