// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! Streaming execution of physical plans.
//!
//! Every plan node becomes a source or a transformation plus the dataset it
//! writes to. Sources run on their own worker threads and push tables
//! downstream; marks and `finish` follow the same edges. Yields hand their
//! tables to the consumer through [`QueryResult`]s of a [`Query`].

#![cfg_attr(not(debug_assertions), deny(warnings))]

pub mod context;
pub mod dataset;
pub mod executor;
pub mod metadata;
pub mod query;
pub mod registry;
pub mod result;
pub mod source;
pub mod transformation;
pub mod trigger;

pub use context::ExecutionContext;
pub use dataset::{CachedDataset, Dataset, DatasetId, PassthroughDataset};
pub use executor::{Executor, ExecutorConfig};
pub use metadata::{Metadata, MetadataSink};
pub use query::{Query, Statistics};
pub use registry::{CreateContext, CreateSource, CreateTransformation, TransformationRegistry};
pub use result::{ErrorSlot, QueryResult, ResultTransformation};
pub use source::{DecoderSource, Source, SourceDecoder};
pub use transformation::{
	Lifecycle, NarrowProcess, NarrowTransformation, ParentState, ParentTracker, Transformation, WideProcess,
	WideTransformation,
};
pub use trigger::{Trigger, TriggerContext, new_trigger};

#[cfg(test)]
pub(crate) mod testing {
	use std::sync::Arc;

	use flux_column::{GroupKey, Table};
	use flux_type::{Error, Result, Time};
	use parking_lot::Mutex;

	use crate::{dataset::DatasetId, transformation::Transformation};

	#[derive(Default)]
	struct Recorded {
		tables: Vec<Table>,
		watermarks: Vec<Time>,
		finished: usize,
		retracted: usize,
		error: Option<Error>,
	}

	/// Subscriber that remembers every call it receives.
	#[derive(Default)]
	pub struct Recorder(Mutex<Recorded>);

	impl Recorder {
		pub fn new() -> Arc<Self> {
			Arc::new(Self::default())
		}

		pub fn tables(&self) -> Vec<Table> {
			self.0.lock().tables.clone()
		}

		pub fn watermarks(&self) -> Vec<Time> {
			self.0.lock().watermarks.clone()
		}

		pub fn finished(&self) -> usize {
			self.0.lock().finished
		}

		pub fn retracted(&self) -> usize {
			self.0.lock().retracted
		}

		pub fn error(&self) -> Option<Error> {
			self.0.lock().error.clone()
		}
	}

	impl Transformation for Recorder {
		fn process(&self, _parent: &DatasetId, table: Table) -> Result<()> {
			self.0.lock().tables.push(table);
			Ok(())
		}

		fn retract_table(&self, _parent: &DatasetId, _key: &GroupKey) -> Result<()> {
			self.0.lock().retracted += 1;
			Ok(())
		}

		fn update_watermark(&self, _parent: &DatasetId, mark: Time) -> Result<()> {
			self.0.lock().watermarks.push(mark);
			Ok(())
		}

		fn update_processing_time(&self, _parent: &DatasetId, _time: Time) -> Result<()> {
			Ok(())
		}

		fn finish(&self, _parent: &DatasetId, err: Option<Error>) {
			let mut recorded = self.0.lock();
			recorded.finished += 1;
			recorded.error = err;
		}
	}
}
