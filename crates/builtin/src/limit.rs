// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::{any::Any, sync::Arc};

use flux_column::{ColumnTableBuilder, SharedAllocator, Table};
use flux_execute::NarrowProcess;
use flux_plan::{OperationSpec, ProcedureKind, ProcedureSpec};
use flux_type::{Arguments, Param, Result, Time, Type, error::diagnostic::value::invalid_argument, return_error};

use crate::{
	Library,
	function::TableFunction,
	transform::{lower, narrow, operation_spec},
};

pub const KIND: &str = "limit";

/// Keeps at most `n` rows of every table, after skipping `offset` rows.
#[derive(Debug, Clone, PartialEq)]
pub struct LimitSpec {
	pub n: usize,
	pub offset: usize,
}

operation_spec!(LimitSpec, KIND);

impl LimitSpec {
	fn create(args: &Arguments, _now: Time) -> Result<Arc<dyn OperationSpec>> {
		let n = args.get_required_int("n")?;
		let offset = args.get_int("offset")?.unwrap_or(0);
		if n < 0 {
			return_error!(invalid_argument(args.function(), "n", "must not be negative"));
		}
		if offset < 0 {
			return_error!(invalid_argument(args.function(), "offset", "must not be negative"));
		}
		Ok(Arc::new(LimitSpec {
			n: n as usize,
			offset: offset as usize,
		}))
	}
}

impl ProcedureSpec for LimitSpec {
	fn kind(&self) -> ProcedureKind {
		ProcedureKind::new(KIND)
	}

	fn copy(&self) -> Box<dyn ProcedureSpec> {
		Box::new(self.clone())
	}

	fn as_any(&self) -> &dyn Any {
		self
	}
}

impl NarrowProcess for LimitSpec {
	fn process(&self, table: &Table, alloc: &SharedAllocator) -> Result<Option<Table>> {
		let mut builder = ColumnTableBuilder::new(table.key().clone(), alloc.clone());
		for meta in table.cols() {
			builder.add_col(meta.clone())?;
		}
		let end = self.offset.saturating_add(self.n);
		let mut seen = 0;
		table.visit(|chunk| {
			for row in 0..chunk.nrows() {
				if seen >= self.offset && seen < end {
					builder.append_row(chunk, row)?;
				}
				seen += 1;
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
			"limit",
			KIND,
			vec![Param::pipe("tables"), Param::required("n", Type::INT), Param::optional("offset", Type::INT)],
		),
	);
	library.operations.register(KIND, LimitSpec::create, lower::<LimitSpec>);
	library.transformations.register_transformation(KIND, |create| narrow(create, create.spec::<LimitSpec>()?.clone()));
}

#[cfg(test)]
mod tests {
	use flux_column::{Allocator, GroupKey};
	use flux_type::{Record, Value};

	use super::*;
	use crate::testing::{table, times};

	#[test]
	fn test_offset_then_n() {
		let alloc = Allocator::shared(None);
		let input = table(&alloc, GroupKey::empty(), &[1, 2, 3, 4, 5]);
		let spec = LimitSpec {
			n: 2,
			offset: 1,
		};
		let out = spec.process(&input, &alloc).unwrap().unwrap();
		assert_eq!(times(&out), vec![Time::from_secs(2), Time::from_secs(3)]);
	}

	#[test]
	fn test_spans_chunks() {
		let alloc = Allocator::shared(None);
		let joined = Table::concat(&[
			table(&alloc, GroupKey::empty(), &[1, 2]),
			table(&alloc, GroupKey::empty(), &[3, 4]),
		])
		.unwrap()
		.unwrap();
		let spec = LimitSpec {
			n: 2,
			offset: 1,
		};
		let out = spec.process(&joined, &alloc).unwrap().unwrap();
		assert_eq!(times(&out), vec![Time::from_secs(2), Time::from_secs(3)]);
	}

	#[test]
	fn test_negative_n_rejected() {
		let record: Record = [("n", Value::int(-1))].into_iter().collect();
		let err = LimitSpec::create(&Arguments::new("limit", record), Time(0)).unwrap_err();
		assert_eq!(err.code(), "VALUE_013");
	}
}
