// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::sync::Arc;

use flux_type::{Error, Function, Result, TableObject, Time, Value, error::diagnostic::runtime::unimplemented};

/// Runs queries on behalf of the machine.
pub trait Host: Send + Sync {
	/// Plans and starts the query rooted at `side_effects`; the returned
	/// value is a stream of results.
	fn execute(&self, side_effects: Vec<Arc<TableObject>>, now: Time) -> Result<Value>;

	/// Runs the query for `table` and returns the `index`-th record of the
	/// first table whose group key satisfies `predicate`.
	fn find_record(
		&self,
		table: Arc<TableObject>,
		predicate: Option<Arc<dyn Function>>,
		index: i64,
		now: Time,
	) -> Result<Value> {
		let _ = (table, predicate, index, now);
		Err(Error::new(unimplemented("finding records")))
	}
}
