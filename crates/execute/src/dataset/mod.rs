// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! Datasets: the output side of a transformation.
//!
//! A dataset owns the subscriber list of its node and forwards tables,
//! retractions, marks and the final `finish` to every subscriber.

mod cached;
mod passthrough;

use std::{
	fmt::{Display, Formatter},
	sync::Arc,
};

pub use cached::CachedDataset;
use flux_column::{GroupKey, Table};
use flux_type::{Error, Result, Time};
use parking_lot::RwLock;
pub use passthrough::PassthroughDataset;
use tracing::trace;

use crate::transformation::Transformation;

/// Identifier of a dataset, the id of the plan node producing it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DatasetId(Arc<str>);

impl DatasetId {
	pub fn new(id: impl AsRef<str>) -> Self {
		DatasetId(Arc::from(id.as_ref()))
	}

	pub fn as_str(&self) -> &str {
		&self.0
	}
}

impl From<&str> for DatasetId {
	fn from(value: &str) -> Self {
		DatasetId::new(value)
	}
}

impl Display for DatasetId {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		f.write_str(&self.0)
	}
}

pub trait Dataset: Send + Sync {
	fn id(&self) -> &DatasetId;

	fn add_subscriber(&self, subscriber: Arc<dyn Transformation>);

	fn retract_table(&self, key: &GroupKey) -> Result<()>;

	fn update_watermark(&self, mark: Time) -> Result<()>;

	fn update_processing_time(&self, time: Time) -> Result<()>;

	/// Called once, after the owning transformation saw every parent finish.
	fn finish(&self, err: Option<Error>);
}

/// Subscriber list shared by the dataset kinds.
pub(crate) struct Subscribers {
	id: DatasetId,
	list: RwLock<Vec<Arc<dyn Transformation>>>,
}

impl Subscribers {
	pub fn new(id: DatasetId) -> Self {
		Self {
			id,
			list: RwLock::new(Vec::new()),
		}
	}

	pub fn id(&self) -> &DatasetId {
		&self.id
	}

	pub fn add(&self, subscriber: Arc<dyn Transformation>) {
		self.list.write().push(subscriber);
	}

	pub fn len(&self) -> usize {
		self.list.read().len()
	}

	// Forwarding never holds the lock, subscribers may recurse downstream.
	fn snapshot(&self) -> Vec<Arc<dyn Transformation>> {
		self.list.read().clone()
	}

	pub fn process(&self, table: Table) -> Result<()> {
		trace!(dataset = %self.id, key = %table.key(), rows = table.nrows(), "table routed");
		let subscribers = self.snapshot();
		let Some((last, rest)) = subscribers.split_last() else {
			return Ok(());
		};
		for subscriber in rest {
			subscriber.process(&self.id, table.clone())?;
		}
		last.process(&self.id, table)
	}

	pub fn retract_table(&self, key: &GroupKey) -> Result<()> {
		for subscriber in self.snapshot() {
			subscriber.retract_table(&self.id, key)?;
		}
		Ok(())
	}

	pub fn update_watermark(&self, mark: Time) -> Result<()> {
		trace!(dataset = %self.id, %mark, "watermark advanced");
		for subscriber in self.snapshot() {
			subscriber.update_watermark(&self.id, mark)?;
		}
		Ok(())
	}

	pub fn update_processing_time(&self, time: Time) -> Result<()> {
		for subscriber in self.snapshot() {
			subscriber.update_processing_time(&self.id, time)?;
		}
		Ok(())
	}

	pub fn finish(&self, err: Option<Error>) {
		trace!(dataset = %self.id, failed = err.is_some(), "dataset finished");
		for subscriber in self.snapshot() {
			subscriber.finish(&self.id, err.clone());
		}
	}
}
