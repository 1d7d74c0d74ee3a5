// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use flux_type::{Result, Value, error::diagnostic::table::unsupported_column_value, return_error};

use crate::{
	group_key::GroupKey,
	meta::{ColMeta, ColType},
};

/// Accumulates label/value pairs; column types come from the values.
#[derive(Debug, Default)]
pub struct GroupKeyBuilder {
	pairs: Vec<(String, Value)>,
}

impl GroupKeyBuilder {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn from_key(key: &GroupKey) -> Self {
		Self {
			pairs: key.cols().iter().zip(key.values()).map(|(c, v)| (c.label.clone(), v.clone())).collect(),
		}
	}

	pub fn add_key_value(&mut self, label: impl Into<String>, value: Value) -> &mut Self {
		self.pairs.push((label.into(), value));
		self
	}

	pub fn len(&self) -> usize {
		self.pairs.len()
	}

	pub fn is_empty(&self) -> bool {
		self.pairs.is_empty()
	}

	pub fn build(self) -> Result<GroupKey> {
		let mut cols = Vec::with_capacity(self.pairs.len());
		let mut values = Vec::with_capacity(self.pairs.len());
		for (label, value) in self.pairs {
			let Some(ty) = ColType::from_nature(value.nature()) else {
				return_error!(unsupported_column_value(&label, value.nature().as_str()));
			};
			cols.push(ColMeta::new(label, ty));
			values.push(value);
		}
		GroupKey::new(cols, values)
	}
}
