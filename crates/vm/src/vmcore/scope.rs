// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::sync::Arc;

use flux_type::Value;
use indexmap::IndexMap;
use parking_lot::RwLock;

/// A lexical scope. Scopes are shared with the closures defined in them,
/// so they are reference counted and internally locked.
#[derive(Debug, Default)]
pub struct Scope {
	values: RwLock<IndexMap<String, Value>>,
	parent: Option<Arc<Scope>>,
}

impl Scope {
	pub fn root() -> Arc<Scope> {
		Arc::new(Scope::default())
	}

	pub fn child(parent: &Arc<Scope>) -> Arc<Scope> {
		Arc::new(Scope {
			values: RwLock::new(IndexMap::new()),
			parent: Some(Arc::clone(parent)),
		})
	}

	pub fn parent(&self) -> Option<&Arc<Scope>> {
		self.parent.as_ref()
	}

	/// Resolves `name` in this scope or the nearest enclosing one.
	pub fn lookup(&self, name: &str) -> Option<Value> {
		if let Some(value) = self.values.read().get(name) {
			return Some(value.clone());
		}
		self.parent.as_ref().and_then(|parent| parent.lookup(name))
	}

	/// Binds `name` in this scope, shadowing enclosing bindings.
	pub fn set(&self, name: impl Into<String>, value: Value) {
		self.values.write().insert(name.into(), value);
	}

	/// Rebinds `name` where it is defined; defines it here otherwise.
	/// Options set this way are visible to every scope below the definition.
	pub fn set_option(&self, name: &str, value: Value) {
		let mut current = Some(self);
		while let Some(scope) = current {
			let mut values = scope.values.write();
			if let Some(slot) = values.get_mut(name) {
				*slot = value;
				return;
			}
			drop(values);
			current = scope.parent.as_deref();
		}
		self.set(name, value);
	}

	pub fn contains_local(&self, name: &str) -> bool {
		self.values.read().contains_key(name)
	}

	pub fn local_names(&self) -> Vec<String> {
		self.values.read().keys().cloned().collect()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_child_shadows_parent() {
		let root = Scope::root();
		root.set("x", Value::int(1));
		let child = Scope::child(&root);
		assert_eq!(child.lookup("x"), Some(Value::int(1)));
		child.set("x", Value::int(2));
		assert_eq!(child.lookup("x"), Some(Value::int(2)));
		assert_eq!(root.lookup("x"), Some(Value::int(1)));
	}

	#[test]
	fn test_option_rebinds_where_defined() {
		let root = Scope::root();
		root.set("now", Value::int(1));
		let child = Scope::child(&root);
		child.set_option("now", Value::int(2));
		assert!(!child.contains_local("now"));
		assert_eq!(root.lookup("now"), Some(Value::int(2)));

		child.set_option("fresh", Value::int(3));
		assert!(child.contains_local("fresh"));
	}
}
