// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::{collections::BTreeMap, sync::Arc};

use flux_type::{Function, Record, Value};
use indexmap::IndexMap;

use crate::vmcore::scope::Scope;

/// Package whose members are in scope without an import.
pub const UNIVERSE: &str = "universe";

/// Builtin values keyed by `(package, name)`.
#[derive(Debug, Default, Clone)]
pub struct BuiltinRegistry {
	packages: BTreeMap<String, IndexMap<String, Value>>,
}

impl BuiltinRegistry {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn register(&mut self, package: impl Into<String>, name: impl Into<String>, value: Value) -> &mut Self {
		self.packages.entry(package.into()).or_default().insert(name.into(), value);
		self
	}

	/// Registers `function` under its own name.
	pub fn register_function(&mut self, package: impl Into<String>, function: Arc<dyn Function>) -> &mut Self {
		let name = function.name().to_string();
		self.register(package, name, Value::function(function))
	}

	pub fn get(&self, package: &str, name: &str) -> Option<&Value> {
		self.packages.get(package).and_then(|members| members.get(name))
	}

	pub fn contains_package(&self, path: &str) -> bool {
		self.packages.contains_key(path)
	}

	/// The members of `path` as a record, the value an import binds.
	pub fn package(&self, path: &str) -> Option<Record> {
		let members = self.packages.get(path)?;
		Some(members.iter().map(|(name, value)| (name.clone(), value.clone())).collect())
	}

	pub fn packages(&self) -> impl Iterator<Item = &str> {
		self.packages.keys().map(String::as_str)
	}

	/// A root scope holding the universe package.
	pub fn prelude(&self) -> Arc<Scope> {
		let scope = Scope::root();
		if let Some(members) = self.packages.get(UNIVERSE) {
			for (name, value) in members {
				scope.set(name.clone(), value.clone());
			}
		}
		scope
	}
}
