// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::{any::Any, sync::Arc};

use flux_column::{ColumnTableBuilder, SharedAllocator, Table};
use flux_execute::NarrowProcess;
use flux_plan::{OperationSpec, ProcedureKind, ProcedureSpec};
use flux_type::{
	Arguments, Function, Param, Record, Result, Time, Type, Value, error::diagnostic::value::invalid_argument,
	return_error,
};

use crate::{
	Library,
	function::TableFunction,
	transform::{lower, narrow, operation_spec},
};

pub const KIND: &str = "filter";

/// Keeps the rows for which every predicate returns `true`. Predicates
/// receive the row as the record `r`; a null result rejects the row.
#[derive(Debug, Clone)]
pub struct FilterSpec {
	pub fns: Vec<Arc<dyn Function>>,
	/// Emit tables whose rows were all rejected.
	pub keep_empty: bool,
}

operation_spec!(FilterSpec, KIND);

impl FilterSpec {
	pub fn new(function: Arc<dyn Function>) -> Self {
		Self {
			fns: vec![function],
			keep_empty: false,
		}
	}

	fn create(args: &Arguments, _now: Time) -> Result<Arc<dyn OperationSpec>> {
		let function = args.get_required_function("fn")?;
		let keep_empty = match args.get_string("onEmpty")?.as_deref() {
			None | Some("drop") => false,
			Some("keep") => true,
			Some(_) => return_error!(invalid_argument(args.function(), "onEmpty", "must be \"keep\" or \"drop\"")),
		};
		Ok(Arc::new(FilterSpec {
			fns: vec![function],
			keep_empty,
		}))
	}

	/// This filter followed by `next`, as one filter.
	pub fn merge(&self, next: &FilterSpec) -> FilterSpec {
		FilterSpec {
			fns: self.fns.iter().chain(next.fns.iter()).cloned().collect(),
			keep_empty: next.keep_empty,
		}
	}

	fn accepts(&self, row: Record) -> Result<bool> {
		let r = Value::record(row);
		for function in &self.fns {
			let args = Arguments::new(function.name(), Record::new().set("r", r.clone()));
			if !function.call(&args)?.is_true() {
				return Ok(false);
			}
		}
		Ok(true)
	}
}

impl ProcedureSpec for FilterSpec {
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

impl NarrowProcess for FilterSpec {
	fn process(&self, table: &Table, alloc: &SharedAllocator) -> Result<Option<Table>> {
		let mut builder = ColumnTableBuilder::new(table.key().clone(), alloc.clone());
		for meta in table.cols() {
			builder.add_col(meta.clone())?;
		}
		table.visit(|chunk| {
			for row in 0..chunk.nrows() {
				if self.accepts(chunk.row_record(row))? {
					builder.append_row(chunk, row)?;
				}
			}
			Ok(())
		})?;
		if builder.nrows() == 0 && !self.keep_empty {
			return Ok(None);
		}
		Ok(Some(builder.table()?))
	}
}

pub(crate) fn register(library: &mut Library) {
	library.register_function(
		flux_vm::UNIVERSE,
		TableFunction::new(
			"filter",
			KIND,
			vec![
				Param::pipe("tables"),
				Param::required("fn", Type::function(vec![Param::required("r", Type::Var(0))], Type::BOOL)),
				Param::optional("onEmpty", Type::STRING),
			],
		),
	);
	library.operations.register(KIND, FilterSpec::create, lower::<FilterSpec>);
	library.transformations.register_transformation(KIND, |create| narrow(create, create.spec::<FilterSpec>()?.clone()));
}

#[cfg(test)]
mod tests {
	use flux_column::{Allocator, GroupKey};

	use super::*;
	use crate::testing::{Predicate, table, times};

	fn above(secs: i64) -> Arc<dyn Function> {
		Predicate::new(move |r| {
			let time = r.get("_time").and_then(|t| t.as_time().ok());
			Ok(Value::bool(time.is_some_and(|t| t > Time::from_secs(secs))))
		})
	}

	#[test]
	fn test_keeps_matching_rows() {
		let alloc = Allocator::shared(None);
		let input = table(&alloc, GroupKey::empty(), &[1, 2, 3, 4]);
		let out = FilterSpec::new(above(2)).process(&input, &alloc).unwrap().unwrap();
		assert_eq!(times(&out), vec![Time::from_secs(3), Time::from_secs(4)]);
		assert_eq!(out.cols(), input.cols());
	}

	#[test]
	fn test_empty_result_dropped_unless_kept() {
		let alloc = Allocator::shared(None);
		let input = table(&alloc, GroupKey::empty(), &[1, 2]);
		let mut spec = FilterSpec::new(above(10));
		assert!(spec.process(&input, &alloc).unwrap().is_none());

		spec.keep_empty = true;
		let out = spec.process(&input, &alloc).unwrap().unwrap();
		assert_eq!(out.nrows(), 0);
		assert_eq!(out.ncols(), 2);
	}

	#[test]
	fn test_null_predicate_rejects_row() {
		let alloc = Allocator::shared(None);
		let input = table(&alloc, GroupKey::empty(), &[1]);
		let spec = FilterSpec::new(Predicate::new(|_| Ok(Value::null(flux_type::Nature::Bool))));
		assert!(spec.process(&input, &alloc).unwrap().is_none());
	}

	#[test]
	fn test_merged_filter_applies_both() {
		let alloc = Allocator::shared(None);
		let input = table(&alloc, GroupKey::empty(), &[1, 2, 3, 4]);
		let below = Predicate::new(|r| {
			let value = r.get("_value").and_then(|v| v.as_int().ok());
			Ok(Value::bool(value.is_some_and(|v| v < 4)))
		});
		let merged = FilterSpec::new(above(1)).merge(&FilterSpec::new(below));
		let out = merged.process(&input, &alloc).unwrap().unwrap();
		assert_eq!(times(&out), vec![Time::from_secs(2), Time::from_secs(3)]);
	}

	#[test]
	fn test_on_empty_validated() {
		let record: Record =
			[("fn", Value::function(above(0))), ("onEmpty", Value::string("sometimes"))].into_iter().collect();
		let err = FilterSpec::create(&Arguments::new("filter", record), Time(0)).unwrap_err();
		assert_eq!(err.code(), "VALUE_013");
	}
}
