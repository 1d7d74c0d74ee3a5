// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::sync::Arc;

use flux_builtin::Library;
use flux_column::{Allocator, SharedAllocator};
use flux_execute::{Executor, Query};
use flux_plan::Planner;
use flux_runtime::Context;
use flux_type::{Result, Value, error::diagnostic::query::results_consumed, internal_err, return_error};
use flux_vm::{CompileOptions, CompiledProgram, Machine, Synthesizer, ast::Parser, disassemble};
use tracing::{debug, instrument};

use crate::{config::FluxConfig, host::QueryHost};

/// Everything a started program needs, shared by all programs of a compiler.
pub(crate) struct Runtime {
	pub library: Library,
	pub planner: Planner,
	pub executor: Executor,
	pub config: FluxConfig,
}

/// Compiles source text into runnable programs. Built by
/// [`FluxBuilder`](crate::FluxBuilder).
#[derive(Clone)]
pub struct Compiler {
	parser: Arc<dyn Parser>,
	runtime: Arc<Runtime>,
}

impl Compiler {
	pub(crate) fn new(parser: Arc<dyn Parser>, runtime: Runtime) -> Self {
		Self {
			parser,
			runtime: Arc::new(runtime),
		}
	}

	pub fn config(&self) -> &FluxConfig {
		&self.runtime.config
	}

	/// An allocator honoring the configured memory limit.
	pub fn allocator(&self) -> SharedAllocator {
		Allocator::shared(self.runtime.config.memory_limit)
	}

	#[instrument(name = "flux::compile", level = "debug", skip_all)]
	pub fn compile(&self, source: &str) -> Result<Program> {
		let package = self.parser.parse(source)?;
		let options = CompileOptions {
			now: self.runtime.config.now,
		};
		let program = Synthesizer::synthesize(&package, &options)?;
		debug!(chunks = program.chunks.len(), "program compiled");
		Ok(Program {
			program: Arc::new(program),
			runtime: Arc::clone(&self.runtime),
		})
	}
}

/// A compiled program; each [`Program::start`] runs it as a new query.
#[derive(Clone)]
pub struct Program {
	program: Arc<CompiledProgram>,
	runtime: Arc<Runtime>,
}

impl Program {
	/// Human readable bytecode.
	pub fn disassemble(&self) -> String {
		disassemble(&self.program)
	}

	/// Evaluates the program and starts the query its side effects
	/// describe. Compilation, planning and setup errors are returned here and
	/// no query is started.
	#[instrument(name = "flux::start", level = "debug", skip_all)]
	pub fn start(&self, ctx: &Context, alloc: SharedAllocator) -> Result<Query> {
		let host = QueryHost {
			runtime: Arc::clone(&self.runtime),
			ctx: ctx.clone(),
			alloc,
		};
		let mut machine = Machine::new(Arc::clone(&self.program), &self.runtime.library.functions)?
			.with_host(Arc::new(host))
			.with_context(ctx.clone());
		let stream = match machine.run()? {
			Value::Stream(stream) => stream,
			other => return internal_err!("program returned {} instead of a result stream", other.nature()),
		};
		let query = match stream.into_any().downcast::<Query>() {
			Ok(query) => query,
			Err(_) => return internal_err!("program returned a foreign result stream"),
		};
		match Arc::try_unwrap(query) {
			Ok(query) => Ok(query),
			Err(_) => return_error!(results_consumed()),
		}
	}
}
