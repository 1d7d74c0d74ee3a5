// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::sync::Arc;

use flux_column::{GroupKey, Table, TableBuilderCache};
use flux_plan::TriggerSpec;
use flux_type::{Error, Result, Time, Value};
use parking_lot::Mutex;

use super::{ParentTracker, Transformation};
use crate::{
	context::ExecutionContext,
	dataset::{CachedDataset, Dataset, DatasetId},
};

/// Body of a wide transformation: writes the rows of each input table into
/// the builders of a [`CachedDataset`].
pub trait WideProcess: Send + Sync {
	fn process(&self, table: &Table, cache: &mut TableBuilderCache) -> Result<()>;
}

pub struct WideTransformation<P> {
	body: P,
	dataset: Arc<CachedDataset>,
	parents: Mutex<ParentTracker>,
	exec: ExecutionContext,
}

impl<P: WideProcess> WideTransformation<P> {
	pub fn new(id: DatasetId, parents: Vec<DatasetId>, trigger: TriggerSpec, body: P, exec: ExecutionContext) -> Self {
		Self {
			body,
			dataset: Arc::new(CachedDataset::new(id, trigger, exec.alloc.clone())),
			parents: Mutex::new(ParentTracker::new(parents)),
			exec,
		}
	}

	pub fn dataset(&self) -> Arc<CachedDataset> {
		Arc::clone(&self.dataset)
	}
}

impl<P: WideProcess> Transformation for WideTransformation<P> {
	fn process(&self, parent: &DatasetId, table: Table) -> Result<()> {
		self.exec.ctx.check()?;
		self.parents.lock().process(parent)?;
		self.dataset.with_cache(|cache| self.body.process(&table, cache))
	}

	fn retract_table(&self, _parent: &DatasetId, key: &GroupKey) -> Result<()> {
		self.dataset.retract_table(key)
	}

	fn update_watermark(&self, parent: &DatasetId, mark: Time) -> Result<()> {
		let advanced = self.parents.lock().update_watermark(parent, mark)?;
		match advanced {
			Some(mark) => self.dataset.update_watermark(mark),
			None => Ok(()),
		}
	}

	fn update_processing_time(&self, parent: &DatasetId, time: Time) -> Result<()> {
		let advanced = self.parents.lock().update_processing_time(parent, time)?;
		match advanced {
			Some(time) => self.dataset.update_processing_time(time),
			None => Ok(()),
		}
	}

	fn finish(&self, parent: &DatasetId, err: Option<Error>) {
		let (done, dropped) = {
			let mut parents = self.parents.lock();
			let done = parents.finish(parent, err);
			(done, parents.dropped_errors())
		};
		if let Some(err) = done {
			if dropped > 0 {
				self.exec.metadata.record("dropped_errors", Value::int(dropped as i64));
			}
			self.dataset.finish(err);
		}
	}
}
