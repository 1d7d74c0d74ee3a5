// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! The builtin library: table functions exposed to programs, the
//! operation and procedure specs they lower to, the transformations that
//! execute them, and the planner rules that rewrite them.

#![cfg_attr(not(debug_assertions), deny(warnings))]

use std::sync::Arc;

use flux_execute::TransformationRegistry;
use flux_plan::{OperationRegistry, PlannerBuilder, ProcedureKind, Rule, YIELD_KIND};
use flux_runtime::SharedClock;
use flux_type::{Function, Value};
use flux_vm::{BuiltinRegistry, UNIVERSE};

pub mod chain;
pub mod filter;
pub mod from;
pub mod function;
pub mod group;
pub mod limit;
pub mod map;
pub mod project;
pub mod range;
pub mod rules;
mod rows;
mod transform;
pub mod union;
pub mod yields;

pub use function::{Now, TableFunction};
pub use rules::{MergeFilterRule, PushDownRule};

/// Everything a host needs to compile, plan and execute programs: the
/// functions programs may call and the registries that turn their table
/// objects into running transformations.
pub struct Library {
	pub functions: BuiltinRegistry,
	pub operations: OperationRegistry,
	pub transformations: TransformationRegistry,
	pub logical_rules: Vec<Arc<dyn Rule>>,
	pub physical_rules: Vec<Arc<dyn Rule>>,
}

impl Default for Library {
	fn default() -> Self {
		Self::new()
	}
}

impl Library {
	/// An empty library.
	pub fn new() -> Self {
		Self {
			functions: BuiltinRegistry::new(),
			operations: OperationRegistry::new(),
			transformations: TransformationRegistry::new(),
			logical_rules: Vec::new(),
			physical_rules: Vec::new(),
		}
	}

	/// The standard library, with `now()` reading `clock`.
	pub fn standard(clock: SharedClock) -> Self {
		let mut library = Self::new();
		from::register(&mut library);
		range::register(&mut library);
		filter::register(&mut library);
		map::register(&mut library);
		limit::register(&mut library);
		group::register(&mut library);
		project::register(&mut library);
		union::register(&mut library);
		chain::register(&mut library);
		yields::register(&mut library);
		library.register_function(UNIVERSE, Now::new(clock));

		library.logical_rules.push(Arc::new(MergeFilterRule));
		for rule in rules::push_down_rules() {
			library.physical_rules.push(Arc::new(rule));
		}
		library
	}

	pub fn register_function(&mut self, package: &str, function: impl Function + 'static) -> &mut Self {
		self.functions.register_function(package, Arc::new(function));
		self
	}

	pub fn register_value(&mut self, package: &str, name: &str, value: Value) -> &mut Self {
		self.functions.register(package, name, value);
		self
	}

	/// Every kind the executor can run, plus the yield kind.
	pub fn physical_kinds(&self) -> Vec<ProcedureKind> {
		let mut kinds = self.transformations.kinds();
		kinds.push(ProcedureKind::new(YIELD_KIND));
		kinds
	}

	/// A planner builder carrying this library's rules and physical kinds.
	pub fn planner(&self) -> PlannerBuilder {
		PlannerBuilder::new()
			.logical_rules(self.logical_rules.iter().cloned())
			.physical_rules(self.physical_rules.iter().cloned())
			.physical_kinds(self.physical_kinds())
	}
}

#[cfg(test)]
pub(crate) mod testing {
	use std::{
		fmt::{Debug, Formatter},
		sync::Arc,
	};

	use flux_column::{ColMeta, ColType, ColumnTableBuilder, GroupKey, SharedAllocator, Table};
	use flux_execute::{DatasetId, Transformation};
	use flux_type::{Arguments, Error, Function, Param, Record, Result, Time, Type, Value};
	use parking_lot::Mutex;

	/// Table with `_time` and `_value` columns, one row per second given.
	pub fn table(alloc: &SharedAllocator, key: GroupKey, secs: &[i64]) -> Table {
		let mut builder = ColumnTableBuilder::new(key, alloc.clone());
		let time = builder.add_col(ColMeta::new("_time", ColType::Time)).unwrap();
		let value = builder.add_col(ColMeta::new("_value", ColType::Int)).unwrap();
		for s in secs {
			builder.append_time(time, Time::from_secs(*s)).unwrap();
			builder.append_int(value, *s).unwrap();
		}
		builder.table().unwrap()
	}

	pub fn times(table: &Table) -> Vec<Time> {
		let col = table.index("_time").unwrap();
		table.rows().map(|row| row[col].as_time().unwrap()).collect()
	}

	type Body = dyn Fn(&Record) -> Result<Value> + Send + Sync;

	/// Function of one record argument `r`, backed by a closure.
	pub struct Predicate(Box<Body>);

	impl Predicate {
		pub fn new(body: impl Fn(&Record) -> Result<Value> + Send + Sync + 'static) -> Arc<dyn Function> {
			Arc::new(Predicate(Box::new(body)))
		}
	}

	impl Debug for Predicate {
		fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
			f.write_str("Predicate")
		}
	}

	impl Function for Predicate {
		fn name(&self) -> &str {
			"predicate"
		}

		fn ty(&self) -> Type {
			Type::function(vec![Param::required("r", Type::Var(0))], Type::Var(1))
		}

		fn call(&self, args: &Arguments) -> Result<Value> {
			let r = args.get_required_record("r")?;
			(self.0)(&r)
		}
	}

	#[derive(Default)]
	struct Recorded {
		tables: Vec<Table>,
		watermarks: Vec<Time>,
		finished: usize,
		error: Option<Error>,
	}

	#[derive(Default)]
	pub struct Recorder(Mutex<Recorded>);

	impl Recorder {
		pub fn new() -> Arc<Self> {
			Arc::new(Self::default())
		}

		pub fn tables(&self) -> Vec<Table> {
			self.0.lock().tables.clone()
		}

		pub fn watermarks(&self) -> Vec<Time> {
			self.0.lock().watermarks.clone()
		}

		pub fn finished(&self) -> usize {
			self.0.lock().finished
		}

		pub fn error(&self) -> Option<Error> {
			self.0.lock().error.clone()
		}
	}

	impl Transformation for Recorder {
		fn process(&self, _parent: &DatasetId, table: Table) -> Result<()> {
			self.0.lock().tables.push(table);
			Ok(())
		}

		fn retract_table(&self, _parent: &DatasetId, _key: &GroupKey) -> Result<()> {
			Ok(())
		}

		fn update_watermark(&self, _parent: &DatasetId, mark: Time) -> Result<()> {
			self.0.lock().watermarks.push(mark);
			Ok(())
		}

		fn update_processing_time(&self, _parent: &DatasetId, _time: Time) -> Result<()> {
			Ok(())
		}

		fn finish(&self, _parent: &DatasetId, err: Option<Error>) {
			let mut recorded = self.0.lock();
			recorded.finished += 1;
			recorded.error = err;
		}
	}
}
