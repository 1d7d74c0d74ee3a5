// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::{any::Any, sync::Arc};

use flux_column::{ColumnTableBuilder, GroupKey, SharedAllocator, Table};
use flux_execute::{DecoderSource, NarrowProcess, Source, SourceDecoder};
use flux_plan::{Bounds, OperationSpec, ProcedureKind, ProcedureSpec};
use flux_runtime::Context;
use flux_type::{Arguments, Param, Record, Result, Time, Type};
use tracing::trace;

use crate::{
	Library,
	filter::FilterSpec,
	function::TableFunction,
	project::ProjectSpec,
	range::RangeSpec,
	rows::append_record,
	transform::{lower, operation_spec},
};

pub const KIND: &str = "array.from";

/// A downstream operation the planner moved into the source.
#[derive(Debug, Clone)]
pub enum Pushdown {
	Range(RangeSpec),
	Filter(FilterSpec),
	Project(ProjectSpec),
}

impl Pushdown {
	fn apply(&self, table: &Table, alloc: &SharedAllocator) -> Result<Option<Table>> {
		match self {
			Pushdown::Range(spec) => spec.process(table, alloc),
			Pushdown::Filter(spec) => spec.process(table, alloc),
			Pushdown::Project(spec) => spec.process(table, alloc),
		}
	}
}

/// `array.from(rows)`: one table, with an empty group key, built from an
/// array of records.
#[derive(Debug, Clone)]
pub struct FromSpec {
	pub rows: Vec<Record>,
	/// Applied in order to the decoded table.
	pub pushdowns: Vec<Pushdown>,
}

operation_spec!(FromSpec, KIND);

impl FromSpec {
	fn create(args: &Arguments, _now: Time) -> Result<Arc<dyn OperationSpec>> {
		let mut rows = Vec::new();
		for value in args.get_required_array("rows")?.iter() {
			rows.push(value.as_record()?.clone());
		}
		Ok(Arc::new(FromSpec {
			rows,
			pushdowns: Vec::new(),
		}))
	}

	pub fn with_pushdown(&self, pushdown: Pushdown) -> FromSpec {
		let mut spec = self.clone();
		spec.pushdowns.push(pushdown);
		spec
	}
}

impl ProcedureSpec for FromSpec {
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
		self.pushdowns.iter().fold(None, |bounds, pushdown| match (bounds, pushdown) {
			(None, Pushdown::Range(range)) => Some(range.bounds),
			(Some(bounds), Pushdown::Range(range)) => Some(bounds.intersect(&range.bounds)),
			(bounds, _) => bounds,
		})
	}
}

struct RowsDecoder {
	spec: FromSpec,
	alloc: SharedAllocator,
	table: Option<Table>,
}

impl SourceDecoder for RowsDecoder {
	fn connect(&mut self, _ctx: &Context) -> Result<()> {
		Ok(())
	}

	fn fetch(&mut self, _ctx: &Context) -> Result<bool> {
		if self.spec.rows.is_empty() {
			return Ok(false);
		}
		let mut builder = ColumnTableBuilder::new(GroupKey::empty(), self.alloc.clone());
		for row in &self.spec.rows {
			append_record(&mut builder, row)?;
		}
		let mut table = Some(builder.table()?);
		for pushdown in &self.spec.pushdowns {
			let Some(current) = table.take() else {
				break;
			};
			table = pushdown.apply(&current, &self.alloc)?;
		}
		trace!(rows = self.spec.rows.len(), pushdowns = self.spec.pushdowns.len(), "array decoded");
		self.table = table;
		Ok(false)
	}

	fn decode(&mut self, _ctx: &Context) -> Result<Option<Table>> {
		Ok(self.table.take())
	}

	fn close(&mut self) -> Result<()> {
		self.table = None;
		Ok(())
	}
}

pub(crate) fn register(library: &mut Library) {
	library.register_function(
		"array",
		TableFunction::new("from", KIND, vec![Param::required("rows", Type::array(Type::Var(0)))]),
	);
	library.operations.register(KIND, FromSpec::create, lower::<FromSpec>);
	library.transformations.register_source(KIND, |create| {
		let decoder = RowsDecoder {
			spec: create.spec::<FromSpec>()?.clone(),
			alloc: create.exec.alloc.clone(),
			table: None,
		};
		Ok(Box::new(DecoderSource::new(create.id.clone(), decoder, create.exec)) as Box<dyn Source>)
	});
}

#[cfg(test)]
mod tests {
	use flux_column::Allocator;
	use flux_type::{Array, Value};

	use super::*;
	use crate::{project::ProjectMode, testing::Predicate};

	fn rows() -> Vec<Record> {
		(1..=4)
			.map(|i| {
				[("_time", Value::time(Time::from_secs(i))), ("v", Value::int(i))].into_iter().collect::<Record>()
			})
			.collect()
	}

	fn decode(spec: FromSpec) -> Option<Table> {
		let ctx = Context::new();
		let mut decoder = RowsDecoder {
			spec,
			alloc: Allocator::shared(None),
			table: None,
		};
		decoder.connect(&ctx).unwrap();
		assert!(!decoder.fetch(&ctx).unwrap());
		decoder.decode(&ctx).unwrap()
	}

	#[test]
	fn test_rows_become_one_table() {
		let table = decode(FromSpec {
			rows: rows(),
			pushdowns: vec![],
		})
		.unwrap();
		assert!(table.key().is_empty());
		assert_eq!(table.nrows(), 4);
		assert_eq!(table.ncols(), 2);
	}

	#[test]
	fn test_pushdowns_applied_in_order() {
		let spec = FromSpec {
			rows: rows(),
			pushdowns: vec![],
		}
		.with_pushdown(Pushdown::Range(RangeSpec {
			bounds: Bounds::new(Time::from_secs(2), Time::from_secs(10)),
		}))
		.with_pushdown(Pushdown::Project(ProjectSpec {
			mode: ProjectMode::Keep,
			columns: vec!["v".to_string()],
		}));
		assert_eq!(spec.bounds(), Some(Bounds::new(Time::from_secs(2), Time::from_secs(10))));

		let table = decode(spec).unwrap();
		let values: Vec<_> = table.rows().map(|row| row[0].clone()).collect();
		assert_eq!(values, vec![Value::int(2), Value::int(3), Value::int(4)]);
	}

	#[test]
	fn test_filtered_out_table_not_emitted() {
		let spec = FromSpec {
			rows: rows(),
			pushdowns: vec![],
		}
		.with_pushdown(Pushdown::Filter(FilterSpec::new(Predicate::new(|_| Ok(Value::bool(false))))));
		assert!(decode(spec).is_none());
	}

	#[test]
	fn test_rows_must_be_records() {
		let record: Record = [("rows", Value::array(Array::from_values(vec![Value::int(1)])))].into_iter().collect();
		let err = FromSpec::create(&Arguments::new("from", record), Time(0)).unwrap_err();
		assert_eq!(err.code(), "VALUE_001");
	}
}
