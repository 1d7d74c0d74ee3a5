// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::sync::Arc;

use flux_column::{GroupKey, Table};
use flux_type::{Error, Result, Time};

use super::{Dataset, DatasetId, Subscribers};
use crate::transformation::Transformation;

/// Dataset of narrow transformations and sources: every table is forwarded
/// as soon as it is produced.
pub struct PassthroughDataset {
	subscribers: Subscribers,
}

impl PassthroughDataset {
	pub fn new(id: DatasetId) -> Self {
		Self {
			subscribers: Subscribers::new(id),
		}
	}

	pub fn process(&self, table: Table) -> Result<()> {
		self.subscribers.process(table)
	}

	pub fn has_subscribers(&self) -> bool {
		self.subscribers.len() > 0
	}
}

impl Dataset for PassthroughDataset {
	fn id(&self) -> &DatasetId {
		self.subscribers.id()
	}

	fn add_subscriber(&self, subscriber: Arc<dyn Transformation>) {
		self.subscribers.add(subscriber);
	}

	fn retract_table(&self, key: &GroupKey) -> Result<()> {
		self.subscribers.retract_table(key)
	}

	fn update_watermark(&self, mark: Time) -> Result<()> {
		self.subscribers.update_watermark(mark)
	}

	fn update_processing_time(&self, time: Time) -> Result<()> {
		self.subscribers.update_processing_time(time)
	}

	fn finish(&self, err: Option<Error>) {
		self.subscribers.finish(err);
	}
}
