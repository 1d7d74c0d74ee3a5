// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::{
	cmp::Ordering,
	fmt::{Display, Formatter},
	hash::{Hash, Hasher},
	sync::{Arc, OnceLock},
};

use flux_type::{
	Nature, Result, Time, Value,
	error::diagnostic::{
		table::{column_not_found, schema_mismatch, unsupported_column_value},
		value::kind_mismatch,
	},
	return_error,
};
use smallvec::SmallVec;

use crate::{
	meta::{ColMeta, ColType},
	table::Chunk,
};

mod builder;

pub use builder::GroupKeyBuilder;

#[derive(Debug)]
struct GroupKeyInner {
	cols: Vec<ColMeta>,
	values: Vec<Value>,
	// permutation of column indices ordered by label
	sorted: SmallVec<[usize; 8]>,
}

/// The set of column values shared by every row of a table.
///
/// Equality, hashing and ordering use the label-sorted view, so two keys
/// built with the same columns in different declaration orders are equal.
/// Nulls in the same position are equal for partitioning; `user_equal`
/// gives the user-visible semantics where null never equals null.
#[derive(Debug, Clone)]
pub struct GroupKey(Arc<GroupKeyInner>);

static EMPTY: OnceLock<GroupKey> = OnceLock::new();

impl GroupKey {
	pub fn new(cols: Vec<ColMeta>, values: Vec<Value>) -> Result<GroupKey> {
		if cols.len() != values.len() {
			return_error!(schema_mismatch(&format!(
				"group key has {} columns but {} values",
				cols.len(),
				values.len()
			)));
		}
		for (i, col) in cols.iter().enumerate() {
			if cols[..i].iter().any(|c| c.label == col.label) {
				return_error!(flux_type::error::diagnostic::table::duplicate_column(&col.label));
			}
		}
		for (col, value) in cols.iter().zip(values.iter()) {
			let nature = value.nature();
			if ColType::from_nature(nature).is_none() && !(value.is_null() && nature == Nature::Invalid) {
				return_error!(unsupported_column_value(&col.label, nature.as_str()));
			}
			if nature != Nature::Invalid && nature != col.ty.nature() {
				return_error!(kind_mismatch(col.ty.nature(), nature));
			}
		}
		let values = cols
			.iter()
			.zip(values)
			.map(|(col, value)| match value {
				Value::Null(_) => Value::Null(col.ty.nature()),
				other => other,
			})
			.collect();
		let mut sorted: SmallVec<[usize; 8]> = (0..cols.len()).collect();
		sorted.sort_by(|a, b| cols[*a].label.cmp(&cols[*b].label));
		Ok(GroupKey(Arc::new(GroupKeyInner {
			cols,
			values,
			sorted,
		})))
	}

	pub fn empty() -> GroupKey {
		EMPTY.get_or_init(|| {
			GroupKey(Arc::new(GroupKeyInner {
				cols: Vec::new(),
				values: Vec::new(),
				sorted: SmallVec::new(),
			}))
		})
		.clone()
	}

	/// The key of one row, built from the given columns of a chunk.
	pub fn from_row(chunk: &Chunk, row: usize, labels: &[String]) -> Result<GroupKey> {
		let mut cols = Vec::with_capacity(labels.len());
		let mut values = Vec::with_capacity(labels.len());
		for label in labels {
			let Some(idx) = chunk.index(label) else {
				return_error!(column_not_found(label));
			};
			cols.push(chunk.cols()[idx].clone());
			values.push(chunk.value(idx, row));
		}
		GroupKey::new(cols, values)
	}

	pub fn ncols(&self) -> usize {
		self.0.cols.len()
	}

	pub fn is_empty(&self) -> bool {
		self.0.cols.is_empty()
	}

	pub fn col(&self, i: usize) -> &ColMeta {
		&self.0.cols[i]
	}

	pub fn cols(&self) -> &[ColMeta] {
		&self.0.cols
	}

	pub fn index(&self, label: &str) -> Option<usize> {
		self.0.cols.iter().position(|c| c.label == label)
	}

	pub fn has_col(&self, label: &str) -> bool {
		self.index(label).is_some()
	}

	pub fn is_null(&self, i: usize) -> bool {
		self.0.values[i].is_null()
	}

	pub fn value(&self, i: usize) -> &Value {
		&self.0.values[i]
	}

	pub fn values(&self) -> &[Value] {
		&self.0.values
	}

	pub fn label_value(&self, label: &str) -> Option<&Value> {
		self.index(label).map(|i| self.value(i))
	}

	pub fn value_bool(&self, i: usize) -> Result<bool> {
		self.value(i).as_bool()
	}

	pub fn value_int(&self, i: usize) -> Result<i64> {
		self.value(i).as_int()
	}

	pub fn value_uint(&self, i: usize) -> Result<u64> {
		self.value(i).as_uint()
	}

	pub fn value_float(&self, i: usize) -> Result<f64> {
		self.value(i).as_float()
	}

	pub fn value_string(&self, i: usize) -> Result<&str> {
		self.value(i).as_str()
	}

	pub fn value_time(&self, i: usize) -> Result<Time> {
		self.value(i).as_time()
	}

	/// Columns and values in label order.
	pub fn sorted(&self) -> impl Iterator<Item = (&ColMeta, &Value)> {
		self.0.sorted.iter().map(|i| (&self.0.cols[*i], &self.0.values[*i]))
	}

	/// Partition equality.
	pub fn equal(&self, other: &GroupKey) -> bool {
		self.cmp(other) == Ordering::Equal
	}

	pub fn less(&self, other: &GroupKey) -> bool {
		self.cmp(other) == Ordering::Less
	}

	/// User-visible equality: `Bool`, or a null bool when equal columns are
	/// compared and a null is involved.
	pub fn user_equal(&self, other: &GroupKey) -> Value {
		if self.ncols() != other.ncols() {
			return Value::Bool(false);
		}
		let mut saw_null = false;
		for ((lc, lv), (rc, rv)) in self.sorted().zip(other.sorted()) {
			if lc != rc {
				return Value::Bool(false);
			}
			match lv.equal(rv) {
				Some(true) => {}
				Some(false) => return Value::Bool(false),
				None => saw_null = true,
			}
		}
		if saw_null {
			Value::Null(Nature::Bool)
		} else {
			Value::Bool(true)
		}
	}

	/// Copy of this key with `label` set to `value`, added when absent.
	pub fn with_value(&self, meta: ColMeta, value: Value) -> Result<GroupKey> {
		let mut cols = self.0.cols.clone();
		let mut values = self.0.values.clone();
		match cols.iter().position(|c| c.label == meta.label) {
			Some(i) => {
				cols[i] = meta;
				values[i] = value;
			}
			None => {
				cols.push(meta);
				values.push(value);
			}
		}
		GroupKey::new(cols, values)
	}

	/// Copy of this key restricted to the columns `keep` accepts.
	pub fn filter(&self, keep: impl Fn(&ColMeta) -> bool) -> Result<GroupKey> {
		let mut cols = Vec::new();
		let mut values = Vec::new();
		for (col, value) in self.0.cols.iter().zip(self.0.values.iter()) {
			if keep(col) {
				cols.push(col.clone());
				values.push(value.clone());
			}
		}
		GroupKey::new(cols, values)
	}
}

/// Overlays `_start` and `_stop` on a key.
pub fn range_key(base: &GroupKey, start: Time, stop: Time) -> Result<GroupKey> {
	base.with_value(ColMeta::new("_start", ColType::Time), Value::Time(start))?
		.with_value(ColMeta::new("_stop", ColType::Time), Value::Time(stop))
}

fn compare_cells(l: &Value, r: &Value) -> Ordering {
	match (l, r) {
		(Value::Null(_), Value::Null(_)) => Ordering::Equal,
		(Value::Null(_), _) => Ordering::Less,
		(_, Value::Null(_)) => Ordering::Greater,
		(Value::Bool(l), Value::Bool(r)) => l.cmp(r),
		(Value::Int(l), Value::Int(r)) => l.cmp(r),
		(Value::UInt(l), Value::UInt(r)) => l.cmp(r),
		(Value::Float(l), Value::Float(r)) => l.total_cmp(r),
		(Value::String(l), Value::String(r)) => l.cmp(r),
		(Value::Time(l), Value::Time(r)) => l.cmp(r),
		// column types agree after the type comparison, so this is unreachable
		// for well formed keys; fall back to the nature order
		(l, r) => l.nature().cmp(&r.nature()),
	}
}

impl Ord for GroupKey {
	fn cmp(&self, other: &Self) -> Ordering {
		if Arc::ptr_eq(&self.0, &other.0) {
			return Ordering::Equal;
		}
		for ((lc, lv), (rc, rv)) in self.sorted().zip(other.sorted()) {
			let ordering = lc.label.cmp(&rc.label).then(lc.ty.cmp(&rc.ty)).then_with(|| compare_cells(lv, rv));
			if ordering != Ordering::Equal {
				return ordering;
			}
		}
		// the key with a label the other lacks sorts first
		other.ncols().cmp(&self.ncols())
	}
}

impl PartialOrd for GroupKey {
	fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
		Some(self.cmp(other))
	}
}

impl PartialEq for GroupKey {
	fn eq(&self, other: &Self) -> bool {
		self.equal(other)
	}
}

impl Eq for GroupKey {}

impl Hash for GroupKey {
	fn hash<H: Hasher>(&self, state: &mut H) {
		self.ncols().hash(state);
		for (col, value) in self.sorted() {
			col.hash(state);
			match value {
				Value::Null(_) => 0u8.hash(state),
				Value::Bool(v) => v.hash(state),
				Value::Int(v) => v.hash(state),
				Value::UInt(v) => v.hash(state),
				Value::Float(v) => v.to_bits().hash(state),
				Value::String(v) => v.hash(state),
				Value::Time(v) => v.hash(state),
				other => other.nature().hash(state),
			}
		}
	}
}

impl Display for GroupKey {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		f.write_str("{")?;
		for (i, (col, value)) in self.0.cols.iter().zip(self.0.values.iter()).enumerate() {
			if i > 0 {
				f.write_str(",")?;
			}
			write!(f, "{}={}", col.label, value)?;
		}
		f.write_str("}")
	}
}

#[cfg(test)]
mod tests {
	use std::collections::HashSet;

	use super::*;

	fn key(pairs: &[(&str, Value)]) -> GroupKey {
		let mut builder = GroupKeyBuilder::new();
		for (label, value) in pairs {
			builder.add_key_value(*label, value.clone());
		}
		builder.build().unwrap()
	}

	#[test]
	fn test_sorted_view_and_display() {
		let key = GroupKey::new(
			vec![ColMeta::new("b", ColType::Int), ColMeta::new("a", ColType::String)],
			vec![Value::int(7), Value::string("x")],
		)
		.unwrap();
		let labels: Vec<_> = key.sorted().map(|(c, _)| c.label.as_str()).collect();
		assert_eq!(labels, vec!["a", "b"]);
		assert_eq!(key.to_string(), "{b=7,a=x}");
	}

	#[test]
	fn test_equal_ignores_declaration_order() {
		let a = key(&[("a", Value::string("x")), ("b", Value::int(7))]);
		let b = key(&[("b", Value::int(7)), ("a", Value::string("x"))]);
		assert!(a.equal(&b));
		assert!(!a.less(&b) && !b.less(&a));

		let mut set = HashSet::new();
		set.insert(a);
		assert!(set.contains(&b));
	}

	#[test]
	fn test_nulls_partition_equal_but_not_user_equal() {
		let a = key(&[("host", Value::null(Nature::String))]);
		let b = key(&[("host", Value::null(Nature::String))]);
		assert!(a.equal(&b));
		assert_eq!(a.user_equal(&b), Value::null(Nature::Bool));
		let c = key(&[("host", Value::string("h1"))]);
		assert_eq!(a.user_equal(&c), Value::null(Nature::Bool));
		assert_eq!(c.user_equal(&c.clone()), Value::bool(true));
	}

	#[test]
	fn test_order_nulls_first_and_absent_labels_last() {
		let null = key(&[("a", Value::null(Nature::Int))]);
		let one = key(&[("a", Value::int(1))]);
		assert!(null.less(&one));

		let both = key(&[("a", Value::int(1)), ("b", Value::int(1))]);
		assert!(both.less(&one));

		let only_b = key(&[("b", Value::int(0))]);
		assert!(one.less(&only_b));
	}

	#[test]
	fn test_strict_total_order() {
		let keys = vec![
			key(&[]),
			key(&[("a", Value::int(1))]),
			key(&[("a", Value::int(2))]),
			key(&[("a", Value::null(Nature::Int))]),
			key(&[("a", Value::int(1)), ("b", Value::string("x"))]),
			key(&[("b", Value::string("x"))]),
			key(&[("a", Value::string("s"))]),
		];
		for a in &keys {
			assert!(!a.less(a));
			for b in &keys {
				if a.equal(b) {
					assert!(!a.less(b) && !b.less(a));
				} else {
					assert!(a.less(b) ^ b.less(a));
				}
				for c in &keys {
					if a.less(b) && b.less(c) {
						assert!(a.less(c));
					}
				}
			}
		}
	}

	#[test]
	fn test_range_key_adds_then_replaces() {
		let base = key(&[("host", Value::string("h1"))]);
		let ranged = range_key(&base, Time::from_secs(0), Time::from_secs(10)).unwrap();
		assert_eq!(ranged.ncols(), 3);
		assert_eq!(ranged.label_value("_stop"), Some(&Value::time(Time::from_secs(10))));

		let again = range_key(&ranged, Time::from_secs(5), Time::from_secs(6)).unwrap();
		assert_eq!(again.ncols(), 3);
		assert_eq!(again.label_value("_start"), Some(&Value::time(Time::from_secs(5))));
	}

	#[test]
	fn test_typed_getters() {
		let key = key(&[("n", Value::int(3)), ("s", Value::string("v"))]);
		assert_eq!(key.value_int(0).unwrap(), 3);
		assert_eq!(key.value_string(1).unwrap(), "v");
		assert!(key.value_float(0).is_err());
	}
}
