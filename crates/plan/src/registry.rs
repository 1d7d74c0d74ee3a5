// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::{collections::HashMap, sync::Arc};

use flux_type::{
	Arguments, Result, Time,
	error::diagnostic::plan::{unknown_operation, unknown_procedure},
	return_error,
};

use crate::{operation::OperationSpec, procedure::ProcedureSpec};

/// Validates call arguments and builds the operation spec. `now` resolves
/// relative times.
pub type CreateOperationSpec = Arc<dyn Fn(&Arguments, Time) -> Result<Arc<dyn OperationSpec>> + Send + Sync>;

/// Lowers an operation spec into the planner's procedure spec.
pub type CreateProcedureSpec = Arc<dyn Fn(&dyn OperationSpec) -> Result<Box<dyn ProcedureSpec>> + Send + Sync>;

#[derive(Clone, Default)]
pub struct OperationRegistry {
	operations: HashMap<String, CreateOperationSpec>,
	procedures: HashMap<String, CreateProcedureSpec>,
}

impl OperationRegistry {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn register<C, L>(&mut self, kind: impl Into<String>, create: C, lower: L)
	where
		C: Fn(&Arguments, Time) -> Result<Arc<dyn OperationSpec>> + Send + Sync + 'static,
		L: Fn(&dyn OperationSpec) -> Result<Box<dyn ProcedureSpec>> + Send + Sync + 'static,
	{
		let kind = kind.into();
		self.operations.insert(kind.clone(), Arc::new(create));
		self.procedures.insert(kind, Arc::new(lower));
	}

	pub fn contains(&self, kind: &str) -> bool {
		self.operations.contains_key(kind)
	}

	pub fn create_operation(&self, kind: &str, args: &Arguments, now: Time) -> Result<Arc<dyn OperationSpec>> {
		let Some(create) = self.operations.get(kind) else {
			return_error!(unknown_operation(kind));
		};
		create(args, now)
	}

	pub fn create_procedure(&self, spec: &dyn OperationSpec) -> Result<Box<dyn ProcedureSpec>> {
		let Some(lower) = self.procedures.get(spec.kind()) else {
			return_error!(unknown_procedure(spec.kind()));
		};
		lower(spec)
	}

	pub fn kinds(&self) -> Vec<&str> {
		let mut kinds: Vec<&str> = self.operations.keys().map(String::as_str).collect();
		kinds.sort();
		kinds
	}
}

impl std::fmt::Debug for OperationRegistry {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("OperationRegistry").field("kinds", &self.kinds()).finish()
	}
}
