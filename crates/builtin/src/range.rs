// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::{any::Any, sync::Arc};

use flux_column::{ColMeta, ColType, ColumnTableBuilder, SharedAllocator, Table, range_key};
use flux_execute::NarrowProcess;
use flux_plan::{Bounds, OperationSpec, ProcedureKind, ProcedureSpec};
use flux_type::{
	Arguments, Param, Result, Time, Type, Value,
	error::diagnostic::{
		table::{column_not_found, type_mismatch},
		value::{invalid_argument, missing_argument},
	},
	return_error,
};

use crate::{
	Library,
	function::TableFunction,
	transform::{lower, narrow, operation_spec},
};

pub const KIND: &str = "range";

pub(crate) const TIME_COL: &str = "_time";
pub(crate) const START_COL: &str = "_start";
pub(crate) const STOP_COL: &str = "_stop";

/// Keeps the rows whose `_time` lies in `[start, stop)` and stamps every
/// table with `_start` and `_stop`, in the columns and in the group key.
#[derive(Debug, Clone, PartialEq)]
pub struct RangeSpec {
	pub bounds: Bounds,
}

operation_spec!(RangeSpec, KIND);

impl RangeSpec {
	fn create(args: &Arguments, now: Time) -> Result<Arc<dyn OperationSpec>> {
		let Some(start) = args.get_time_relative("start", now)? else {
			return_error!(missing_argument(args.function(), "start"));
		};
		let stop = args.get_time_relative("stop", now)?.unwrap_or(now);
		if start > stop {
			return_error!(invalid_argument(args.function(), "start", "must not be after stop"));
		}
		Ok(Arc::new(RangeSpec {
			bounds: Bounds::new(start, stop),
		}))
	}
}

impl ProcedureSpec for RangeSpec {
	fn kind(&self) -> ProcedureKind {
		ProcedureKind::new(KIND)
	}

	fn copy(&self) -> Box<dyn ProcedureSpec> {
		Box::new(self.clone())
	}

	fn as_any(&self) -> &dyn Any {
		self
	}

	fn bounds(&self) -> Option<Bounds> {
		Some(self.bounds)
	}
}

impl NarrowProcess for RangeSpec {
	fn process(&self, table: &Table, alloc: &SharedAllocator) -> Result<Option<Table>> {
		let Some(time) = table.index(TIME_COL) else {
			return_error!(column_not_found(TIME_COL));
		};
		let ty = table.cols()[time].ty;
		if ty != ColType::Time {
			return_error!(type_mismatch(TIME_COL, ColType::Time.as_str(), ty.as_str()));
		}

		let Bounds {
			start,
			stop,
		} = self.bounds;
		let mut builder = ColumnTableBuilder::new(range_key(table.key(), start, stop)?, alloc.clone());
		let start_col = builder.add_col(ColMeta::new(START_COL, ColType::Time))?;
		let stop_col = builder.add_col(ColMeta::new(STOP_COL, ColType::Time))?;
		let mut targets = Vec::with_capacity(table.ncols());
		for (i, meta) in table.cols().iter().enumerate() {
			if meta.label == START_COL || meta.label == STOP_COL {
				continue;
			}
			targets.push((i, builder.add_col(meta.clone())?));
		}

		table.visit(|chunk| {
			for row in 0..chunk.nrows() {
				// null times fall outside every range
				let Value::Time(t) = chunk.value(time, row) else {
					continue;
				};
				if !self.bounds.contains(t) {
					continue;
				}
				builder.append_time(start_col, start)?;
				builder.append_time(stop_col, stop)?;
				for (src, dst) in &targets {
					builder.append_value(*dst, &chunk.value(*src, row))?;
				}
			}
			Ok(())
		})?;
		Ok(Some(builder.table()?))
	}
}

pub(crate) fn register(library: &mut Library) {
	library.register_function(
		flux_vm::UNIVERSE,
		TableFunction::new(
			"range",
			KIND,
			vec![Param::pipe("tables"), Param::required("start", Type::TIME), Param::optional("stop", Type::TIME)],
		),
	);
	library.operations.register(KIND, RangeSpec::create, lower::<RangeSpec>);
	library.transformations.register_transformation(KIND, |create| narrow(create, create.spec::<RangeSpec>()?.clone()));
}

#[cfg(test)]
mod tests {
	use flux_column::{Allocator, GroupKey};
	use flux_type::{Duration, Record};

	use super::*;
	use crate::testing::{table, times};

	fn spec(start: i64, stop: i64) -> RangeSpec {
		RangeSpec {
			bounds: Bounds::new(Time::from_secs(start), Time::from_secs(stop)),
		}
	}

	#[test]
	fn test_rows_outside_bounds_removed() {
		let alloc = Allocator::shared(None);
		let input = table(&alloc, GroupKey::empty(), &[0, 10, 20, 30]);
		let out = spec(10, 30).process(&input, &alloc).unwrap().unwrap();
		assert_eq!(times(&out), vec![Time::from_secs(10), Time::from_secs(20)]);
	}

	#[test]
	fn test_bounds_stamped_on_key_and_columns() {
		let alloc = Allocator::shared(None);
		let input = table(&alloc, GroupKey::empty(), &[5]);
		let out = spec(0, 60).process(&input, &alloc).unwrap().unwrap();

		assert_eq!(out.key().label_value(START_COL), Some(&Value::time(Time::from_secs(0))));
		assert_eq!(out.key().label_value(STOP_COL), Some(&Value::time(Time::from_secs(60))));
		let labels: Vec<_> = out.cols().iter().map(|c| c.label.as_str()).collect();
		assert_eq!(labels, vec!["_start", "_stop", "_time", "_value"]);
	}

	#[test]
	fn test_missing_time_column() {
		let alloc = Allocator::shared(None);
		let mut builder = ColumnTableBuilder::new(GroupKey::empty(), alloc.clone());
		builder.add_col(ColMeta::new("v", ColType::Int)).unwrap();
		let input = builder.table().unwrap();
		let err = spec(0, 1).process(&input, &alloc).unwrap_err();
		assert_eq!(err.code(), "TABLE_003");
	}

	#[test]
	fn test_relative_start_resolved_against_now() {
		let record: Record = [("start", Value::duration(Duration::from_secs(-60)))].into_iter().collect();
		let args = Arguments::new("range", record);
		let op = RangeSpec::create(&args, Time::from_secs(600)).unwrap();
		let spec = op.as_any().downcast_ref::<RangeSpec>().unwrap();
		assert_eq!(spec.bounds, Bounds::new(Time::from_secs(540), Time::from_secs(600)));
	}

	#[test]
	fn test_inverted_bounds_rejected() {
		let record: Record = [("start", Value::time(Time::from_secs(10))), ("stop", Value::time(Time::from_secs(5)))]
			.into_iter()
			.collect();
		let err = RangeSpec::create(&Arguments::new("range", record), Time::from_secs(0)).unwrap_err();
		assert_eq!(err.code(), "VALUE_013");
	}
}
