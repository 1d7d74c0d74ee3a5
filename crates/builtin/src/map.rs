// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::{any::Any, sync::Arc};

use flux_column::{ColumnTableBuilder, SharedAllocator, Table};
use flux_execute::NarrowProcess;
use flux_plan::{OperationSpec, ProcedureKind, ProcedureSpec};
use flux_type::{Arguments, Function, Param, Record, Result, Time, Type, Value};

use crate::{
	Library,
	function::TableFunction,
	rows::append_record,
	transform::{lower, narrow, operation_spec},
};

pub const KIND: &str = "map";

/// Replaces every row by the record `fn(r: row)` returns. Output columns
/// appear in the order their fields are first produced; the group key is
/// kept.
#[derive(Debug, Clone)]
pub struct MapSpec {
	pub function: Arc<dyn Function>,
}

operation_spec!(MapSpec, KIND);

impl MapSpec {
	fn create(args: &Arguments, _now: Time) -> Result<Arc<dyn OperationSpec>> {
		Ok(Arc::new(MapSpec {
			function: args.get_required_function("fn")?,
		}))
	}
}

impl ProcedureSpec for MapSpec {
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

impl NarrowProcess for MapSpec {
	fn process(&self, table: &Table, alloc: &SharedAllocator) -> Result<Option<Table>> {
		let mut builder = ColumnTableBuilder::new(table.key().clone(), alloc.clone());
		table.visit(|chunk| {
			for row in 0..chunk.nrows() {
				let args =
					Arguments::new(self.function.name(), Record::new().set("r", Value::record(chunk.row_record(row))));
				let mapped = self.function.call(&args)?;
				append_record(&mut builder, mapped.as_record()?)?;
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
			"map",
			KIND,
			vec![
				Param::pipe("tables"),
				Param::required("fn", Type::function(vec![Param::required("r", Type::Var(0))], Type::Var(1))),
			],
		),
	);
	library.operations.register(KIND, MapSpec::create, lower::<MapSpec>);
	library.transformations.register_transformation(KIND, |create| narrow(create, create.spec::<MapSpec>()?.clone()));
}
