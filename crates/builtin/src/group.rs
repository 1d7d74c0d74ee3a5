// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::{any::Any, sync::Arc};

use flux_column::{GroupKey, Table, TableBuilderCache};
use flux_execute::WideProcess;
use flux_plan::{OperationSpec, ProcedureKind, ProcedureSpec};
use flux_type::{Arguments, Param, Result, Time, Type, error::diagnostic::value::invalid_argument, return_error};
use tracing::trace;

use crate::{
	Library,
	function::TableFunction,
	transform::{lower, operation_spec, wide},
};

pub const KIND: &str = "group";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupMode {
	/// Group by the named columns.
	By,
	/// Group by every column except the named ones.
	Except,
}

/// Regroups rows under a new group key. Named columns a table lacks are
/// left out of its rows' keys.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupSpec {
	pub columns: Vec<String>,
	pub mode: GroupMode,
}

operation_spec!(GroupSpec, KIND);

impl GroupSpec {
	fn create(args: &Arguments, _now: Time) -> Result<Arc<dyn OperationSpec>> {
		let mut columns = Vec::new();
		if let Some(array) = args.get_array("columns")? {
			for value in array.iter() {
				columns.push(value.as_str()?.to_string());
			}
		}
		let mode = match args.get_string("mode")?.as_deref() {
			None | Some("by") => GroupMode::By,
			Some("except") => GroupMode::Except,
			Some(_) => return_error!(invalid_argument(args.function(), "mode", "must be \"by\" or \"except\"")),
		};
		Ok(Arc::new(GroupSpec {
			columns,
			mode,
		}))
	}

	fn labels(&self, cols: impl Iterator<Item = String>) -> Vec<String> {
		match self.mode {
			GroupMode::By => {
				let present: Vec<String> = cols.collect();
				self.columns.iter().filter(|c| present.contains(c)).cloned().collect()
			}
			GroupMode::Except => cols.filter(|c| !self.columns.contains(c)).collect(),
		}
	}
}

impl ProcedureSpec for GroupSpec {
	fn kind(&self) -> ProcedureKind {
		ProcedureKind::new(KIND)
	}

	fn copy(&self) -> Box<dyn ProcedureSpec> {
		Box::new(self.clone())
	}

	fn as_any(&self) -> &dyn Any {
		self
	}

	fn is_narrow(&self) -> bool {
		false
	}
}

impl WideProcess for GroupSpec {
	fn process(&self, table: &Table, cache: &mut TableBuilderCache) -> Result<()> {
		let labels = self.labels(table.cols().iter().map(|c| c.label.clone()));
		trace!(key = %table.key(), ?labels, "regrouping table");
		table.visit(|chunk| {
			for row in 0..chunk.nrows() {
				let key = GroupKey::from_row(chunk, row, &labels)?;
				let (builder, _) = cache.table_builder(&key);
				builder.append_row(chunk, row)?;
			}
			Ok(())
		})
	}
}

pub(crate) fn register(library: &mut Library) {
	library.register_function(
		flux_vm::UNIVERSE,
		TableFunction::new(
			"group",
			KIND,
			vec![
				Param::pipe("tables"),
				Param::optional("columns", Type::array(Type::STRING)),
				Param::optional("mode", Type::STRING),
			],
		),
	);
	library.operations.register(KIND, GroupSpec::create, lower::<GroupSpec>);
	library.transformations.register_transformation(KIND, |create| wide(create, create.spec::<GroupSpec>()?.clone()));
}

#[cfg(test)]
mod tests {
	use flux_column::{Allocator, ColMeta, ColType, ColumnTableBuilder};
	use flux_type::Value;

	use super::*;

	fn readings() -> Table {
		let mut builder = ColumnTableBuilder::new(GroupKey::empty(), Allocator::shared(None));
		let host = builder.add_col(ColMeta::new("host", ColType::String)).unwrap();
		let v = builder.add_col(ColMeta::new("v", ColType::Int)).unwrap();
		for (h, n) in [("a", 1), ("b", 2), ("a", 3)] {
			builder.append_string(host, h).unwrap();
			builder.append_int(v, n).unwrap();
		}
		builder.table().unwrap()
	}

	fn spec(mode: GroupMode, columns: &[&str]) -> GroupSpec {
		GroupSpec {
			columns: columns.iter().map(|c| c.to_string()).collect(),
			mode,
		}
	}

	#[test]
	fn test_group_by_splits_rows() {
		let mut cache = TableBuilderCache::new(Allocator::shared(None));
		spec(GroupMode::By, &["host"]).process(&readings(), &mut cache).unwrap();
		let mut tables = cache.drain().unwrap();
		tables.sort_by(|l, r| l.0.cmp(&r.0));
		assert_eq!(tables.len(), 2);
		assert_eq!(tables[0].0.label_value("host"), Some(&Value::string("a")));
		assert_eq!(tables[0].1.nrows(), 2);
		assert_eq!(tables[1].1.nrows(), 1);
	}

	#[test]
	fn test_except_groups_by_the_rest() {
		let mut cache = TableBuilderCache::new(Allocator::shared(None));
		spec(GroupMode::Except, &["v"]).process(&readings(), &mut cache).unwrap();
		assert_eq!(cache.len(), 2);
	}

	#[test]
	fn test_no_columns_ungroups() {
		let mut cache = TableBuilderCache::new(Allocator::shared(None));
		spec(GroupMode::By, &[]).process(&readings(), &mut cache).unwrap();
		let tables = cache.drain().unwrap();
		assert_eq!(tables.len(), 1);
		assert!(tables[0].0.is_empty());
		assert_eq!(tables[0].1.nrows(), 3);
	}
}
