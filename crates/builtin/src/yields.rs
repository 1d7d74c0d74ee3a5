// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::sync::Arc;

use flux_plan::{OperationSpec, ProcedureSpec, YIELD_KIND, YieldProcedureSpec};
use flux_type::{Arguments, Param, Result, Time, Type, internal_err};

use crate::{Library, function::TableFunction, transform::operation_spec};

/// `yield(name)`: publishes its input as a named result of the query.
#[derive(Debug, Clone, PartialEq)]
pub struct YieldSpec {
	pub name: String,
}

operation_spec!(YieldSpec, YIELD_KIND);

impl YieldSpec {
	fn create(args: &Arguments, _now: Time) -> Result<Arc<dyn OperationSpec>> {
		let name = args.get_string("name")?.unwrap_or_else(|| YieldProcedureSpec::DEFAULT_NAME.to_string());
		Ok(Arc::new(YieldSpec {
			name,
		}))
	}

	fn lower(spec: &dyn OperationSpec) -> Result<Box<dyn ProcedureSpec>> {
		match spec.as_any().downcast_ref::<YieldSpec>() {
			Some(spec) => Ok(Box::new(YieldProcedureSpec::new(spec.name.clone()))),
			None => internal_err!("operation {} is not a yield", spec.kind()),
		}
	}
}

pub(crate) fn register(library: &mut Library) {
	library.register_function(
		flux_vm::UNIVERSE,
		TableFunction::new("yield", YIELD_KIND, vec![Param::pipe("tables"), Param::optional("name", Type::STRING)]),
	);
	library.operations.register(YIELD_KIND, YieldSpec::create, YieldSpec::lower);
}

#[cfg(test)]
mod tests {
	use flux_type::{Record, Value};

	use super::*;

	#[test]
	fn test_default_name() {
		let op = YieldSpec::create(&Arguments::new("yield", Record::new()), Time(0)).unwrap();
		let procedure = YieldSpec::lower(op.as_ref()).unwrap();
		assert_eq!(procedure.yield_name(), Some("_result"));
	}

	#[test]
	fn test_named() {
		let record: Record = [("name", Value::string("errors"))].into_iter().collect();
		let op = YieldSpec::create(&Arguments::new("yield", record), Time(0)).unwrap();
		assert_eq!(YieldSpec::lower(op.as_ref()).unwrap().yield_name(), Some("errors"));
	}
}
