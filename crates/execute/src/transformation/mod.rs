// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

mod narrow;
mod parents;
mod wide;

use flux_column::{GroupKey, Table};
use flux_type::{Error, Result, Time};
pub use narrow::{NarrowProcess, NarrowTransformation};
pub use parents::{Lifecycle, ParentState, ParentTracker};
pub use wide::{WideProcess, WideTransformation};

use crate::dataset::DatasetId;

/// The sink side of a plan node. A transformation receives the output of
/// one or more parent datasets and writes into its own dataset.
///
/// Calls may arrive concurrently from the workers of different sources,
/// so implementations guard their state themselves.
pub trait Transformation: Send + Sync {
	/// Consumes one table of `parent`.
	fn process(&self, parent: &DatasetId, table: Table) -> Result<()>;

	/// Purges the state buffered for `key` and forwards the retraction.
	fn retract_table(&self, parent: &DatasetId, key: &GroupKey) -> Result<()>;

	fn update_watermark(&self, parent: &DatasetId, mark: Time) -> Result<()>;

	fn update_processing_time(&self, parent: &DatasetId, time: Time) -> Result<()>;

	/// Called exactly once per parent.
	fn finish(&self, parent: &DatasetId, err: Option<Error>);
}
