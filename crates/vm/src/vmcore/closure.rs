// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::{
	fmt::{Debug, Formatter},
	sync::Arc,
};

use flux_type::{
	Arguments, Function, Result, Type, Value, error::diagnostic::value::missing_argument, return_error,
};

use crate::{
	bytecode::program::CompiledProgram,
	vmcore::{
		machine::{Environment, Machine},
		scope::Scope,
	},
};

/// A function literal bound to the scope it was created in.
///
/// Calling a closure runs its chunk on a fresh [`Machine`], so closures
/// can be handed to the executor and called from its worker threads.
pub struct Closure {
	name: String,
	program: Arc<CompiledProgram>,
	chunk: u16,
	scope: Arc<Scope>,
	defaults: Vec<(String, Value)>,
	env: Environment,
}

impl Closure {
	pub(crate) fn new(
		program: Arc<CompiledProgram>,
		chunk: u16,
		scope: Arc<Scope>,
		defaults: Vec<(String, Value)>,
		env: Environment,
	) -> Self {
		let name = program.chunk(chunk).map(|c| c.name.clone()).unwrap_or_default();
		Self {
			name,
			program,
			chunk,
			scope,
			defaults,
			env,
		}
	}

	fn default_for(&self, name: &str) -> Option<&Value> {
		self.defaults.iter().find(|(n, _)| n == name).map(|(_, v)| v)
	}
}

impl Debug for Closure {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("Closure").field("name", &self.name).field("chunk", &self.chunk).finish()
	}
}

impl Function for Closure {
	fn name(&self) -> &str {
		&self.name
	}

	fn ty(&self) -> Type {
		self.program.chunk(self.chunk).map(|c| c.ty()).unwrap_or(Type::Var(0))
	}

	fn call(&self, args: &Arguments) -> Result<Value> {
		let chunk = self.program.chunk(self.chunk)?;
		let scope = Scope::child(&self.scope);
		for param in &chunk.params {
			let value = match args.get(&param.name) {
				Some(value) => value,
				None => match self.default_for(&param.name) {
					Some(value) => value.clone(),
					None => return_error!(missing_argument(&self.name, &param.name)),
				},
			};
			scope.set(param.name.clone(), value);
		}

		let mut machine = Machine::with_env(Arc::clone(&self.program), self.env.clone(), Arc::clone(&self.scope));
		Ok(machine.execute(self.chunk, scope)?)
	}
}
