// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::sync::Arc;

use crossbeam_channel::{Receiver, Sender};
use flux_column::{GroupKey, Table};
use flux_type::{Error, Result, Time};
use parking_lot::Mutex;
use tracing::debug;

use crate::{
	context::ExecutionContext,
	dataset::{Dataset, DatasetId, PassthroughDataset},
	transformation::{ParentTracker, Transformation},
};

/// Holds the first error reported to it.
#[derive(Debug, Clone, Default)]
pub struct ErrorSlot(Arc<Mutex<Option<Error>>>);

impl ErrorSlot {
	pub fn new() -> Self {
		Self::default()
	}

	/// Stores `err` unless an error is already present.
	pub fn set(&self, err: Error) -> bool {
		let mut slot = self.0.lock();
		if slot.is_some() {
			return false;
		}
		*slot = Some(err);
		true
	}

	pub fn get(&self) -> Option<Error> {
		self.0.lock().clone()
	}
}

/// One named output of a query.
#[derive(Debug)]
pub struct QueryResult {
	name: String,
	tables: Receiver<Table>,
	err: ErrorSlot,
}

impl QueryResult {
	pub(crate) fn new(name: String, tables: Receiver<Table>, err: ErrorSlot) -> Self {
		Self {
			name,
			tables,
			err,
		}
	}

	pub fn name(&self) -> &str {
		&self.name
	}

	/// Blocks for each table until the result is finished.
	pub fn tables(&self) -> impl Iterator<Item = Table> + '_ {
		self.tables.iter()
	}

	pub fn receiver(&self) -> &Receiver<Table> {
		&self.tables
	}

	/// The error that ended this result, once every table was read.
	pub fn err(&self) -> Option<Error> {
		self.err.get()
	}
}

/// Terminal transformation of a `yield`: hands tables to the consumer.
pub struct ResultTransformation {
	name: String,
	tx: Mutex<Option<Sender<Table>>>,
	parents: Mutex<ParentTracker>,
	dataset: Arc<PassthroughDataset>,
	exec: ExecutionContext,
	result_err: ErrorSlot,
	query_err: ErrorSlot,
}

impl ResultTransformation {
	pub fn new(
		id: DatasetId,
		name: impl Into<String>,
		parents: Vec<DatasetId>,
		tx: Sender<Table>,
		exec: ExecutionContext,
		result_err: ErrorSlot,
		query_err: ErrorSlot,
	) -> Self {
		Self {
			name: name.into(),
			tx: Mutex::new(Some(tx)),
			parents: Mutex::new(ParentTracker::new(parents)),
			dataset: Arc::new(PassthroughDataset::new(id)),
			exec,
			result_err,
			query_err,
		}
	}

	pub fn dataset(&self) -> Arc<PassthroughDataset> {
		Arc::clone(&self.dataset)
	}
}

impl Transformation for ResultTransformation {
	fn process(&self, parent: &DatasetId, table: Table) -> Result<()> {
		self.exec.ctx.check()?;
		self.parents.lock().process(parent)?;
		// The lock is released before the blocking send.
		let tx = self.tx.lock().clone();
		let Some(tx) = tx else {
			return Ok(());
		};
		if self.dataset.has_subscribers() {
			self.exec.ctx.send(&tx, table.clone())?;
			self.dataset.process(table)
		} else {
			self.exec.ctx.send(&tx, table)
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
		let Some(err) = self.parents.lock().finish(parent, err) else {
			return;
		};
		debug!(result = %self.name, failed = err.is_some(), "result finished");
		if let Some(err) = &err {
			self.result_err.set(err.clone());
			self.query_err.set(err.clone());
		}
		// Dropping the sender ends the consumer's iteration.
		self.tx.lock().take();
		self.dataset.finish(err);
	}
}
