// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::{
	collections::{HashMap, VecDeque},
	sync::Arc,
};

use flux_type::{
	Arguments, Result, TableObject, Time,
	error::diagnostic::plan::{cycle, invalid_edge},
	return_error,
};
use indexmap::IndexMap;
use tracing::debug;

use crate::{
	operation::{Edge, Operation, OperationId, OperationSpec},
	registry::OperationRegistry,
};

/// The operation DAG of one query: operations keyed by id, parent to
/// child edges, and the instant the query started.
#[derive(Debug, Clone)]
pub struct Spec {
	operations: IndexMap<OperationId, Operation>,
	edges: Vec<Edge>,
	now: Time,
}

impl Spec {
	pub fn new(now: Time) -> Self {
		Self {
			operations: IndexMap::new(),
			edges: Vec::new(),
			now,
		}
	}

	/// Builds the DAG reachable from the given table objects. Parents shared
	/// by several children become one operation.
	pub fn from_table_objects(roots: &[Arc<TableObject>], now: Time, registry: &OperationRegistry) -> Result<Spec> {
		let mut spec = Spec::new(now);
		let mut visited: HashMap<*const TableObject, OperationId> = HashMap::new();
		for root in roots {
			spec.walk(root, registry, &mut visited)?;
		}
		spec.validate()?;
		debug!(operations = spec.operations.len(), edges = spec.edges.len(), "operation spec built");
		Ok(spec)
	}

	fn walk(
		&mut self,
		object: &Arc<TableObject>,
		registry: &OperationRegistry,
		visited: &mut HashMap<*const TableObject, OperationId>,
	) -> Result<OperationId> {
		if let Some(id) = visited.get(&Arc::as_ptr(object)) {
			return Ok(id.clone());
		}
		let mut parents = Vec::with_capacity(object.parents.len());
		for parent in &object.parents {
			parents.push(self.walk(parent, registry, visited)?);
		}

		let args = Arguments::new(object.kind.clone(), object.args.clone());
		let op_spec = registry.create_operation(&object.kind, &args, self.now)?;
		args.check_unused()?;

		let id = OperationId(format!("{}{}", object.kind, self.operations.len()));
		self.add_operation(id.clone(), op_spec);
		for parent in parents {
			self.add_edge(parent, id.clone());
		}
		visited.insert(Arc::as_ptr(object), id.clone());
		Ok(id)
	}

	pub fn add_operation(&mut self, id: OperationId, spec: Arc<dyn OperationSpec>) {
		self.operations.insert(
			id.clone(),
			Operation {
				id,
				spec,
			},
		);
	}

	pub fn add_edge(&mut self, parent: OperationId, child: OperationId) {
		self.edges.push(Edge {
			parent,
			child,
		});
	}

	pub fn now(&self) -> Time {
		self.now
	}

	pub fn operations(&self) -> impl Iterator<Item = &Operation> {
		self.operations.values()
	}

	pub fn operation(&self, id: &OperationId) -> Option<&Operation> {
		self.operations.get(id)
	}

	pub fn edges(&self) -> &[Edge] {
		&self.edges
	}

	pub fn parents(&self, id: &OperationId) -> Vec<&OperationId> {
		self.edges.iter().filter(|e| &e.child == id).map(|e| &e.parent).collect()
	}

	pub fn children(&self, id: &OperationId) -> Vec<&OperationId> {
		self.edges.iter().filter(|e| &e.parent == id).map(|e| &e.child).collect()
	}

	/// Operations without children.
	pub fn roots(&self) -> Vec<&OperationId> {
		self.operations.keys().filter(|id| !self.edges.iter().any(|e| &e.parent == *id)).collect()
	}

	/// Rejects dangling edges and cycles.
	pub fn validate(&self) -> Result<()> {
		for edge in &self.edges {
			if !self.operations.contains_key(&edge.parent) || !self.operations.contains_key(&edge.child) {
				return_error!(invalid_edge(edge.parent.as_str(), edge.child.as_str()));
			}
		}
		self.topological_order().map(|_| ())
	}

	/// Operations ordered parents first.
	pub fn topological_order(&self) -> Result<Vec<&Operation>> {
		let mut in_degree: IndexMap<&OperationId, usize> = self.operations.keys().map(|id| (id, 0)).collect();
		for edge in &self.edges {
			if let Some(degree) = in_degree.get_mut(&edge.child) {
				*degree += 1;
			}
		}
		let mut queue: VecDeque<&OperationId> =
			in_degree.iter().filter(|(_, degree)| **degree == 0).map(|(id, _)| *id).collect();
		let mut order = Vec::with_capacity(self.operations.len());
		while let Some(id) = queue.pop_front() {
			order.push(&self.operations[id]);
			for edge in self.edges.iter().filter(|e| &e.parent == id) {
				if let Some(degree) = in_degree.get_mut(&edge.child) {
					*degree -= 1;
					if *degree == 0 {
						queue.push_back(&edge.child);
					}
				}
			}
		}
		if order.len() != self.operations.len() {
			let stuck = in_degree.iter().find(|(_, degree)| **degree > 0).map(|(id, _)| id.to_string());
			return_error!(cycle(&stuck.unwrap_or_default()));
		}
		Ok(order)
	}
}

#[cfg(test)]
mod tests {
	use std::any::Any;

	use flux_type::Record;

	use super::*;
	use crate::procedure::{ProcedureKind, ProcedureSpec};

	#[derive(Debug)]
	struct TestOp(String);

	impl OperationSpec for TestOp {
		fn kind(&self) -> &str {
			&self.0
		}

		fn as_any(&self) -> &dyn Any {
			self
		}
	}

	#[derive(Debug, Clone)]
	struct TestProc(String);

	impl ProcedureSpec for TestProc {
		fn kind(&self) -> ProcedureKind {
			ProcedureKind::new(&self.0)
		}

		fn copy(&self) -> Box<dyn ProcedureSpec> {
			Box::new(self.clone())
		}

		fn as_any(&self) -> &dyn Any {
			self
		}
	}

	fn registry() -> OperationRegistry {
		let mut registry = OperationRegistry::new();
		for kind in ["source", "pass", "merge"] {
			registry.register(
				kind,
				move |_, _| Ok(Arc::new(TestOp(kind.to_string())) as Arc<dyn OperationSpec>),
				|spec| Ok(Box::new(TestProc(spec.kind().to_string())) as Box<dyn ProcedureSpec>),
			);
		}
		registry
	}

	fn object(kind: &str, parents: Vec<Arc<TableObject>>) -> Arc<TableObject> {
		Arc::new(TableObject::new(kind, Record::new(), parents))
	}

	#[test]
	fn test_shared_parent_deduplicated() {
		let source = object("source", vec![]);
		let left = object("pass", vec![source.clone()]);
		let right = object("pass", vec![source.clone()]);
		let merged = object("merge", vec![left, right]);

		let spec = Spec::from_table_objects(&[merged], Time(0), &registry()).unwrap();
		let ids: Vec<_> = spec.operations().map(|op| op.id.to_string()).collect();
		assert_eq!(ids, vec!["source0", "pass1", "pass2", "merge3"]);
		assert_eq!(spec.edges().len(), 4);
		assert_eq!(spec.roots(), vec![&OperationId::from("merge3")]);
		assert_eq!(spec.children(&OperationId::from("source0")).len(), 2);
	}

	#[test]
	fn test_unused_arguments_rejected() {
		let args: Record = [("bogus", flux_type::Value::int(1))].into_iter().collect();
		let source = Arc::new(TableObject::new("source", args, vec![]));
		let err = Spec::from_table_objects(&[source], Time(0), &registry()).unwrap_err();
		assert_eq!(err.code(), "VALUE_005");
	}

	#[test]
	fn test_unknown_kind() {
		let err = Spec::from_table_objects(&[object("nope", vec![])], Time(0), &registry()).unwrap_err();
		assert_eq!(err.code(), "PLAN_001");
	}

	#[test]
	fn test_cycle_and_dangling_edge_rejected() {
		let mut spec = Spec::new(Time(0));
		spec.add_operation("a".into(), Arc::new(TestOp("pass".into())));
		spec.add_operation("b".into(), Arc::new(TestOp("pass".into())));
		spec.add_edge("a".into(), "b".into());
		spec.add_edge("b".into(), "a".into());
		assert_eq!(spec.validate().unwrap_err().code(), "PLAN_003");

		let mut spec = Spec::new(Time(0));
		spec.add_operation("a".into(), Arc::new(TestOp("pass".into())));
		spec.add_edge("a".into(), "missing".into());
		assert_eq!(spec.validate().unwrap_err().code(), "PLAN_007");
	}
}
