// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::sync::Arc;

use flux_column::{GroupKey, SharedAllocator, Table};
use flux_type::{Error, Result, Time, Value};
use parking_lot::Mutex;

use super::{ParentTracker, Transformation};
use crate::{
	context::ExecutionContext,
	dataset::{Dataset, DatasetId, PassthroughDataset},
};

/// Table-at-a-time body of a narrow transformation.
pub trait NarrowProcess: Send + Sync {
	/// Maps one input table to at most one output table.
	fn process(&self, table: &Table, alloc: &SharedAllocator) -> Result<Option<Table>>;
}

/// Drives a [`NarrowProcess`]: tables are handled as they arrive and the
/// marks and `finish` of every parent are coordinated.
pub struct NarrowTransformation<P> {
	body: P,
	dataset: Arc<PassthroughDataset>,
	parents: Mutex<ParentTracker>,
	exec: ExecutionContext,
}

impl<P: NarrowProcess> NarrowTransformation<P> {
	pub fn new(id: DatasetId, parents: Vec<DatasetId>, body: P, exec: ExecutionContext) -> Self {
		Self {
			body,
			dataset: Arc::new(PassthroughDataset::new(id)),
			parents: Mutex::new(ParentTracker::new(parents)),
			exec,
		}
	}

	pub fn dataset(&self) -> Arc<PassthroughDataset> {
		Arc::clone(&self.dataset)
	}

	pub fn body(&self) -> &P {
		&self.body
	}
}

impl<P: NarrowProcess> Transformation for NarrowTransformation<P> {
	fn process(&self, parent: &DatasetId, table: Table) -> Result<()> {
		self.exec.ctx.check()?;
		self.parents.lock().process(parent)?;
		match self.body.process(&table, &self.exec.alloc)? {
			Some(out) => self.dataset.process(out),
			None => Ok(()),
		}
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
