// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::collections::BTreeMap;

use flux_type::Result;

use crate::{alloc::SharedAllocator, builder::ColumnTableBuilder, group_key::GroupKey, table::Table};

/// One table builder per group key, iterated in key order.
#[derive(Debug)]
pub struct TableBuilderCache {
	alloc: SharedAllocator,
	builders: BTreeMap<GroupKey, ColumnTableBuilder>,
}

impl TableBuilderCache {
	pub fn new(alloc: SharedAllocator) -> Self {
		Self {
			alloc,
			builders: BTreeMap::new(),
		}
	}

	pub fn alloc(&self) -> &SharedAllocator {
		&self.alloc
	}

	/// The builder for `key`, and whether it was created by this call.
	pub fn table_builder(&mut self, key: &GroupKey) -> (&mut ColumnTableBuilder, bool) {
		let created = !self.builders.contains_key(key);
		let alloc = self.alloc.clone();
		let builder = self.builders.entry(key.clone()).or_insert_with(|| ColumnTableBuilder::new(key.clone(), alloc));
		(builder, created)
	}

	pub fn get(&mut self, key: &GroupKey) -> Option<&mut ColumnTableBuilder> {
		self.builders.get_mut(key)
	}

	pub fn contains(&self, key: &GroupKey) -> bool {
		self.builders.contains_key(key)
	}

	/// Removes the builder for `key`, releasing its buffers.
	pub fn expire(&mut self, key: &GroupKey) -> bool {
		self.builders.remove(key).is_some()
	}

	/// Removes the builder for `key` and freezes it into a table.
	pub fn take(&mut self, key: &GroupKey) -> Result<Option<Table>> {
		match self.builders.remove(key) {
			Some(builder) => builder.table().map(Some),
			None => Ok(None),
		}
	}

	pub fn for_each(&mut self, mut f: impl FnMut(&GroupKey, &mut ColumnTableBuilder) -> Result<()>) -> Result<()> {
		for (key, builder) in self.builders.iter_mut() {
			f(key, builder)?;
		}
		Ok(())
	}

	pub fn keys(&self) -> Vec<GroupKey> {
		self.builders.keys().cloned().collect()
	}

	/// Freezes and removes every builder, in key order.
	pub fn drain(&mut self) -> Result<Vec<(GroupKey, Table)>> {
		let builders = std::mem::take(&mut self.builders);
		let mut tables = Vec::with_capacity(builders.len());
		for (key, builder) in builders {
			tables.push((key, builder.table()?));
		}
		Ok(tables)
	}

	pub fn len(&self) -> usize {
		self.builders.len()
	}

	pub fn is_empty(&self) -> bool {
		self.builders.is_empty()
	}
}

#[cfg(test)]
mod tests {
	use flux_type::Value;

	use super::*;
	use crate::{
		alloc::Allocator,
		group_key::GroupKeyBuilder,
		meta::{ColMeta, ColType},
	};

	fn key(host: &str) -> GroupKey {
		let mut builder = GroupKeyBuilder::new();
		builder.add_key_value("host", Value::string(host));
		builder.build().unwrap()
	}

	#[test]
	fn test_builder_created_once_per_key() {
		let mut cache = TableBuilderCache::new(Allocator::shared(None));
		let (_, created) = cache.table_builder(&key("h1"));
		assert!(created);
		let (_, created) = cache.table_builder(&key("h1"));
		assert!(!created);
		cache.table_builder(&key("h0"));
		assert_eq!(cache.len(), 2);
	}

	#[test]
	fn test_drain_in_key_order() {
		let alloc = Allocator::shared(None);
		let mut cache = TableBuilderCache::new(alloc.clone());
		for host in ["h2", "h0", "h1"] {
			let (builder, _) = cache.table_builder(&key(host));
			let v = builder.add_col(ColMeta::new("v", ColType::Int)).unwrap();
			builder.append_int(v, 1).unwrap();
		}
		let drained = cache.drain().unwrap();
		let hosts: Vec<_> = drained.iter().map(|(k, _)| k.value_string(0).unwrap().to_string()).collect();
		assert_eq!(hosts, vec!["h0", "h1", "h2"]);
		assert!(cache.is_empty());
		drop(drained);
		assert_eq!(alloc.allocated(), 0);
	}

	#[test]
	fn test_expire_releases_memory() {
		let alloc = Allocator::shared(None);
		let mut cache = TableBuilderCache::new(alloc.clone());
		let (builder, _) = cache.table_builder(&key("h1"));
		let v = builder.add_col(ColMeta::new("v", ColType::Int)).unwrap();
		builder.append_int(v, 1).unwrap();
		assert!(alloc.allocated() > 0);
		assert!(cache.expire(&key("h1")));
		assert_eq!(alloc.allocated(), 0);
		assert!(!cache.expire(&key("h1")));
	}
}
