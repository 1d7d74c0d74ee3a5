// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::{collections::HashMap, sync::Arc};

use flux_column::{ColumnTableBuilder, GroupKey, SharedAllocator, Table, TableBuilderCache};
use flux_plan::TriggerSpec;
use flux_type::{Error, Result, Time};
use parking_lot::Mutex;
use tracing::{debug, warn};

use super::{Dataset, DatasetId, Subscribers};
use crate::{
	transformation::Transformation,
	trigger::{Trigger, TriggerContext, new_trigger},
};

struct CacheState {
	cache: TableBuilderCache,
	triggers: HashMap<GroupKey, Box<dyn Trigger>>,
	watermark: Time,
	processing_time: Time,
}

impl CacheState {
	/// Freezes the builders whose trigger fired, in key order.
	fn fired(&mut self, spec: &TriggerSpec, only: Option<&GroupKey>) -> Result<Vec<Table>> {
		let keys = match only {
			Some(key) => vec![key.clone()],
			None => self.cache.keys(),
		};
		let mut tables = Vec::new();
		for key in keys {
			let Some(rows) = self.cache.get(&key).map(|b| b.nrows()) else {
				continue;
			};
			let trigger = self.triggers.entry(key.clone()).or_insert_with(|| new_trigger(spec));
			let context = TriggerContext {
				key: &key,
				rows,
				watermark: self.watermark,
				processing_time: self.processing_time,
			};
			if !trigger.triggered(&context) {
				continue;
			}
			if trigger.finished() {
				self.triggers.remove(&key);
			} else {
				trigger.reset();
			}
			if let Some(table) = self.cache.take(&key)? {
				tables.push(table);
			}
		}
		Ok(tables)
	}
}

/// Dataset of wide transformations. Rows are buffered per group key and a
/// table is emitted when its trigger fires; everything left is flushed when
/// the dataset finishes.
pub struct CachedDataset {
	subscribers: Subscribers,
	trigger: TriggerSpec,
	state: Mutex<CacheState>,
}

impl CachedDataset {
	pub fn new(id: DatasetId, trigger: TriggerSpec, alloc: SharedAllocator) -> Self {
		Self {
			subscribers: Subscribers::new(id),
			trigger,
			state: Mutex::new(CacheState {
				cache: TableBuilderCache::new(alloc),
				triggers: HashMap::new(),
				watermark: Time::MIN,
				processing_time: Time::MIN,
			}),
		}
	}

	/// Runs `f` on the builder of `key`, then emits the table if its
	/// trigger fired.
	pub fn with_builder<R>(&self, key: &GroupKey, f: impl FnOnce(&mut ColumnTableBuilder) -> Result<R>) -> Result<R> {
		let (result, fired) = {
			let mut state = self.state.lock();
			let (builder, _) = state.cache.table_builder(key);
			let result = f(builder)?;
			(result, state.fired(&self.trigger, Some(key))?)
		};
		self.emit(fired)?;
		Ok(result)
	}

	/// Runs `f` on the whole cache, then emits every table whose trigger fired.
	pub fn with_cache<R>(&self, f: impl FnOnce(&mut TableBuilderCache) -> Result<R>) -> Result<R> {
		let (result, fired) = {
			let mut state = self.state.lock();
			let result = f(&mut state.cache)?;
			(result, state.fired(&self.trigger, None)?)
		};
		self.emit(fired)?;
		Ok(result)
	}

	pub fn buffered(&self) -> usize {
		self.state.lock().cache.len()
	}

	fn emit(&self, tables: Vec<Table>) -> Result<()> {
		for table in tables {
			self.subscribers.process(table)?;
		}
		Ok(())
	}

	fn flush(&self) -> Result<()> {
		let tables = {
			let mut state = self.state.lock();
			state.triggers.clear();
			state.cache.drain()?
		};
		debug!(dataset = %self.subscribers.id(), tables = tables.len(), "flushing cached tables");
		self.emit(tables.into_iter().map(|(_, table)| table).collect())
	}
}

impl Dataset for CachedDataset {
	fn id(&self) -> &DatasetId {
		self.subscribers.id()
	}

	fn add_subscriber(&self, subscriber: Arc<dyn Transformation>) {
		self.subscribers.add(subscriber);
	}

	fn retract_table(&self, key: &GroupKey) -> Result<()> {
		{
			let mut state = self.state.lock();
			state.cache.expire(key);
			state.triggers.remove(key);
		}
		self.subscribers.retract_table(key)
	}

	fn update_watermark(&self, mark: Time) -> Result<()> {
		let fired = {
			let mut state = self.state.lock();
			state.watermark = mark;
			state.fired(&self.trigger, None)?
		};
		self.emit(fired)?;
		self.subscribers.update_watermark(mark)
	}

	fn update_processing_time(&self, time: Time) -> Result<()> {
		let fired = {
			let mut state = self.state.lock();
			state.processing_time = time;
			state.fired(&self.trigger, None)?
		};
		self.emit(fired)?;
		self.subscribers.update_processing_time(time)
	}

	fn finish(&self, err: Option<Error>) {
		let err = match err {
			None => self.flush().err(),
			Some(err) => {
				let mut state = self.state.lock();
				let discarded = state.cache.len();
				state.triggers.clear();
				for key in state.cache.keys() {
					state.cache.expire(&key);
				}
				if discarded > 0 {
					warn!(dataset = %self.subscribers.id(), discarded, "discarding buffered tables after failure");
				}
				Some(err)
			}
		};
		self.subscribers.finish(err);
	}
}
