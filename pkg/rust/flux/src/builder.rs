// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::sync::Arc;

use flux_builtin::Library;
use flux_execute::{CreateContext, Dataset, Executor, ExecutorConfig, Source, Transformation};
use flux_plan::{OperationSpec, ProcedureKind, ProcedureSpec, Rule};
use flux_runtime::{SharedClock, SystemClock};
use flux_type::{Arguments, Function, Result, Time, Value};
use flux_vm::ast::Parser;
use tracing::debug;

use crate::{
	compiler::{Compiler, Runtime},
	config::FluxConfig,
	logging::{self, LoggingConfig},
};

type Configurator = Box<dyn FnOnce(&mut Library)>;

/// Configures and builds a [`Compiler`] on top of the standard library.
pub struct FluxBuilder {
	parser: Arc<dyn Parser>,
	config: FluxConfig,
	clock: SharedClock,
	configurators: Vec<Configurator>,
}

impl FluxBuilder {
	pub fn new(parser: impl Parser + 'static) -> Self {
		Self {
			parser: Arc::new(parser),
			config: FluxConfig::default(),
			clock: Arc::new(SystemClock),
			configurators: Vec::new(),
		}
	}

	pub fn memory_limit(mut self, bytes: usize) -> Self {
		self.config.memory_limit = Some(bytes);
		self
	}

	pub fn result_buffer(mut self, tables: usize) -> Self {
		self.config.result_buffer = tables.max(1);
		self
	}

	pub fn now(mut self, now: Time) -> Self {
		self.config.now = Some(now);
		self
	}

	/// The clock behind `now()` when no fixed `now` is configured.
	pub fn clock(mut self, clock: SharedClock) -> Self {
		self.clock = clock;
		self
	}

	pub fn logging(mut self, config: LoggingConfig) -> Self {
		self.config.logging = Some(config);
		self
	}

	pub fn register_builtin(self, package: impl Into<String>, function: impl Function + 'static) -> Self {
		let package = package.into();
		self.configure(move |library| {
			library.register_function(&package, function);
		})
	}

	pub fn register_value(self, package: impl Into<String>, name: impl Into<String>, value: Value) -> Self {
		let (package, name) = (package.into(), name.into());
		self.configure(move |library| {
			library.register_value(&package, &name, value);
		})
	}

	/// Teaches the planner how to turn table objects of `kind` into
	/// procedure specs.
	pub fn register_operation<C, L>(self, kind: impl Into<String>, create: C, lower: L) -> Self
	where
		C: Fn(&Arguments, Time) -> Result<Arc<dyn OperationSpec>> + Send + Sync + 'static,
		L: Fn(&dyn OperationSpec) -> Result<Box<dyn ProcedureSpec>> + Send + Sync + 'static,
	{
		let kind = kind.into();
		self.configure(move |library| {
			library.operations.register(kind, create, lower);
		})
	}

	pub fn register_source<F>(self, kind: impl Into<ProcedureKind>, create: F) -> Self
	where
		F: Fn(&CreateContext<'_>) -> Result<Box<dyn Source>> + Send + Sync + 'static,
	{
		let kind = kind.into();
		self.configure(move |library| {
			library.transformations.register_source(kind, create);
		})
	}

	pub fn register_transformation<F>(self, kind: impl Into<ProcedureKind>, create: F) -> Self
	where
		F: Fn(&CreateContext<'_>) -> Result<(Arc<dyn Transformation>, Arc<dyn Dataset>)> + Send + Sync + 'static,
	{
		let kind = kind.into();
		self.configure(move |library| {
			library.transformations.register_transformation(kind, create);
		})
	}

	/// Adds a logical rule, applied after the builtin ones.
	pub fn register_rule(self, rule: impl Rule + 'static) -> Self {
		self.configure(move |library| {
			library.logical_rules.push(Arc::new(rule));
		})
	}

	pub fn register_physical_rule(self, rule: impl Rule + 'static) -> Self {
		self.configure(move |library| {
			library.physical_rules.push(Arc::new(rule));
		})
	}

	/// Arbitrary changes to the library, applied in registration order.
	pub fn configure(mut self, configurator: impl FnOnce(&mut Library) + 'static) -> Self {
		self.configurators.push(Box::new(configurator));
		self
	}

	pub fn build(self) -> Result<Compiler> {
		if let Some(logging) = &self.config.logging {
			logging::init(logging);
		}

		let mut library = Library::standard(Arc::clone(&self.clock));
		for configurator in self.configurators {
			configurator(&mut library);
		}
		let planner = library.planner().build()?;
		let executor = Executor::with_config(
			Arc::new(library.transformations.clone()),
			ExecutorConfig {
				result_buffer: self.config.result_buffer,
				clock: self.clock,
				..ExecutorConfig::default()
			},
		);
		debug!(
			logical_rules = library.logical_rules.len(),
			physical_rules = library.physical_rules.len(),
			"compiler built"
		);

		Ok(Compiler::new(
			self.parser,
			Runtime {
				library,
				planner,
				executor,
				config: self.config,
			},
		))
	}
}
