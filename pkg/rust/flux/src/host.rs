// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::sync::Arc;

use flux_column::{GroupKey, SharedAllocator};
use flux_execute::Query;
use flux_plan::{Spec, explain};
use flux_runtime::Context;
use flux_type::{
	Arguments, Function, Record, Result, TableObject, Time, Value,
	error::diagnostic::{query::no_side_effects, runtime::find_record_not_found},
	return_error,
};
use flux_vm::Host;
use tracing::debug;

use crate::compiler::Runtime;

/// Plans and starts the queries of one running program.
pub(crate) struct QueryHost {
	pub runtime: Arc<Runtime>,
	pub ctx: Context,
	pub alloc: SharedAllocator,
}

impl QueryHost {
	fn start(&self, roots: &[Arc<TableObject>], now: Time) -> Result<Query> {
		let operations = &self.runtime.library.operations;
		let spec = Spec::from_table_objects(roots, now, operations)?;
		let plan = self.runtime.planner.plan(&spec, operations)?;
		debug!(nodes = plan.len(), plan = %explain(&plan), "query planned");
		self.runtime.executor.execute(&self.ctx, &plan, self.alloc.clone())
	}
}

fn key_record(key: &GroupKey) -> Record {
	key.cols().iter().zip(key.values()).map(|(col, value)| (col.label.clone(), value.clone())).collect()
}

fn matches(predicate: Option<&Arc<dyn Function>>, key: &GroupKey) -> Result<bool> {
	let Some(predicate) = predicate else {
		return Ok(true);
	};
	let args: Record = [("key", Value::record(key_record(key)))].into_iter().collect();
	Ok(predicate.call(&Arguments::new(predicate.name(), args))?.is_true())
}

impl Host for QueryHost {
	fn execute(&self, side_effects: Vec<Arc<TableObject>>, now: Time) -> Result<Value> {
		if side_effects.is_empty() {
			return_error!(no_side_effects());
		}
		let query = self.start(&side_effects, now)?;
		Ok(Value::stream(Arc::new(query)))
	}

	fn find_record(
		&self,
		table: Arc<TableObject>,
		predicate: Option<Arc<dyn Function>>,
		index: i64,
		now: Time,
	) -> Result<Value> {
		let query = self.start(&[table], now)?;
		let mut found = None;
		'results: for result in query.results().iter() {
			for table in result.tables() {
				if !matches(predicate.as_ref(), table.key())? {
					continue;
				}
				if index >= 0 && (index as usize) < table.nrows() {
					let mut record = None;
					let mut offset = index as usize;
					table.visit(|chunk| {
						if record.is_none() && offset < chunk.nrows() {
							record = Some(chunk.row_record(offset));
						} else if record.is_none() {
							offset -= chunk.nrows();
						}
						Ok(())
					})?;
					found = record;
				}
				break 'results;
			}
		}
		query.done();
		match (found, query.err()) {
			(Some(record), _) => Ok(Value::record(record)),
			(None, Some(err)) => Err(err),
			(None, None) => return_error!(find_record_not_found()),
		}
	}
}
