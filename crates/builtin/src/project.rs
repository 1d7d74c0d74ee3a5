// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::{any::Any, sync::Arc};

use flux_column::{ColumnTableBuilder, SharedAllocator, Table};
use flux_execute::NarrowProcess;
use flux_plan::{OperationSpec, ProcedureKind, ProcedureSpec};
use flux_type::{Arguments, Param, Result, Time, Type};

use crate::{
	Library,
	function::TableFunction,
	transform::{lower, narrow},
};

pub const KEEP_KIND: &str = "keep";
pub const DROP_KIND: &str = "drop";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProjectMode {
	Keep,
	Drop,
}

/// `keep(columns)` and `drop(columns)`: restricts the columns, and the group
/// key, to the named ones or to all but the named ones. Unknown names are
/// ignored.
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectSpec {
	pub mode: ProjectMode,
	pub columns: Vec<String>,
}

impl ProjectSpec {
	fn create(mode: ProjectMode, args: &Arguments) -> Result<Arc<dyn OperationSpec>> {
		let mut columns = Vec::new();
		for value in args.get_required_array("columns")?.iter() {
			columns.push(value.as_str()?.to_string());
		}
		Ok(Arc::new(ProjectSpec {
			mode,
			columns,
		}))
	}

	fn create_keep(args: &Arguments, _now: Time) -> Result<Arc<dyn OperationSpec>> {
		Self::create(ProjectMode::Keep, args)
	}

	fn create_drop(args: &Arguments, _now: Time) -> Result<Arc<dyn OperationSpec>> {
		Self::create(ProjectMode::Drop, args)
	}

	pub fn keeps(&self, label: &str) -> bool {
		let named = self.columns.iter().any(|c| c == label);
		match self.mode {
			ProjectMode::Keep => named,
			ProjectMode::Drop => !named,
		}
	}

	fn kind_str(&self) -> &'static str {
		match self.mode {
			ProjectMode::Keep => KEEP_KIND,
			ProjectMode::Drop => DROP_KIND,
		}
	}
}

impl OperationSpec for ProjectSpec {
	fn kind(&self) -> &str {
		self.kind_str()
	}

	fn as_any(&self) -> &dyn Any {
		self
	}
}

impl ProcedureSpec for ProjectSpec {
	fn kind(&self) -> ProcedureKind {
		ProcedureKind::new(self.kind_str())
	}

	fn copy(&self) -> Box<dyn ProcedureSpec> {
		Box::new(self.clone())
	}

	fn as_any(&self) -> &dyn Any {
		self
	}
}

impl NarrowProcess for ProjectSpec {
	fn process(&self, table: &Table, alloc: &SharedAllocator) -> Result<Option<Table>> {
		let key = table.key().filter(|meta| self.keeps(&meta.label))?;
		let mut builder = ColumnTableBuilder::new(key, alloc.clone());
		let mut targets = Vec::new();
		for (i, meta) in table.cols().iter().enumerate() {
			if self.keeps(&meta.label) {
				targets.push((i, builder.add_col(meta.clone())?));
			}
		}
		table.visit(|chunk| {
			for row in 0..chunk.nrows() {
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
	for (name, kind) in [("keep", KEEP_KIND), ("drop", DROP_KIND)] {
		library.register_function(
			flux_vm::UNIVERSE,
			TableFunction::new(
				name,
				kind,
				vec![Param::pipe("tables"), Param::required("columns", Type::array(Type::STRING))],
			),
		);
		library.transformations.register_transformation(kind, |create| {
			narrow(create, create.spec::<ProjectSpec>()?.clone())
		});
	}
	library.operations.register(KEEP_KIND, ProjectSpec::create_keep, lower::<ProjectSpec>);
	library.operations.register(DROP_KIND, ProjectSpec::create_drop, lower::<ProjectSpec>);
}

#[cfg(test)]
mod tests {
	use flux_column::{Allocator, ColMeta, ColType, GroupKey};
	use flux_type::{Array, Record, Value};

	use super::*;
	use crate::testing::table;

	fn host_key() -> GroupKey {
		GroupKey::new(vec![ColMeta::new("host", ColType::String)], vec![Value::string("h1")]).unwrap()
	}

	fn spec(mode: ProjectMode, columns: &[&str]) -> ProjectSpec {
		ProjectSpec {
			mode,
			columns: columns.iter().map(|c| c.to_string()).collect(),
		}
	}

	#[test]
	fn test_keep_restricts_columns_and_key() {
		let alloc = Allocator::shared(None);
		let input = table(&alloc, host_key(), &[1, 2]);
		let out = spec(ProjectMode::Keep, &["_value", "missing"]).process(&input, &alloc).unwrap().unwrap();
		let labels: Vec<_> = out.cols().iter().map(|c| c.label.as_str()).collect();
		assert_eq!(labels, vec!["_value"]);
		assert!(out.key().is_empty());
		assert_eq!(out.nrows(), 2);
	}

	#[test]
	fn test_drop_removes_named() {
		let alloc = Allocator::shared(None);
		let input = table(&alloc, host_key(), &[1]);
		let out = spec(ProjectMode::Drop, &["_time"]).process(&input, &alloc).unwrap().unwrap();
		let labels: Vec<_> = out.cols().iter().map(|c| c.label.as_str()).collect();
		assert_eq!(labels, vec!["_value"]);
		assert_eq!(out.key(), &host_key());
	}

	#[test]
	fn test_columns_must_be_strings() {
		let columns = Value::array(Array::from_values(vec![Value::int(1)]));
		let record: Record = [("columns", columns)].into_iter().collect();
		let err = ProjectSpec::create_keep(&Arguments::new("keep", record), Time(0)).unwrap_err();
		assert_eq!(err.code(), "VALUE_001");
	}
}
