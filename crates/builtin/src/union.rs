// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::{any::Any, sync::Arc};

use flux_column::{SharedAllocator, Table};
use flux_execute::NarrowProcess;
use flux_plan::{OperationSpec, ProcedureKind, ProcedureSpec};
use flux_type::{Arguments, Param, Result, Time, Type};

use crate::{
	Library,
	function::TableFunction,
	transform::{lower, narrow, operation_spec},
};

pub const KIND: &str = "union";

/// Merges the tables of every parent into one stream, unchanged.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UnionSpec;

operation_spec!(UnionSpec, KIND);

impl UnionSpec {
	fn create(_args: &Arguments, _now: Time) -> Result<Arc<dyn OperationSpec>> {
		Ok(Arc::new(UnionSpec))
	}
}

impl ProcedureSpec for UnionSpec {
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

impl NarrowProcess for UnionSpec {
	fn process(&self, table: &Table, _alloc: &SharedAllocator) -> Result<Option<Table>> {
		Ok(Some(table.clone()))
	}
}

pub(crate) fn register(library: &mut Library) {
	library.register_function(
		flux_vm::UNIVERSE,
		TableFunction::new("union", KIND, vec![Param::required("tables", Type::array(Type::Stream))]),
	);
	library.operations.register(KIND, UnionSpec::create, lower::<UnionSpec>);
	library.transformations.register_transformation(KIND, |create| narrow(create, UnionSpec));
}
