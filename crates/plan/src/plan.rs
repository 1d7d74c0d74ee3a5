// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::{
	collections::{HashSet, VecDeque},
	fmt::{Display, Formatter},
};

use flux_type::{
	Result, Time, error::diagnostic::plan::cycle, internal_err, return_error, return_internal_error,
};

use crate::{
	procedure::{Bounds, ProcedureKind, ProcedureSpec},
	trigger::TriggerSpec,
};

/// Stable index of a node in its plan. Indices survive node removal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeIdx(pub usize);

impl Display for NodeIdx {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		write!(f, "#{}", self.0)
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
	Logical,
	Physical,
}

#[derive(Debug)]
pub struct PlanNode {
	pub id: String,
	pub kind: NodeKind,
	pub spec: Box<dyn ProcedureSpec>,
	pub predecessors: Vec<NodeIdx>,
	pub successors: Vec<NodeIdx>,
	pub trigger: Option<TriggerSpec>,
	pub bounds: Option<Bounds>,
}

impl PlanNode {
	pub fn procedure_kind(&self) -> ProcedureKind {
		self.spec.kind()
	}
}

/// A plan DAG. Nodes live in an arena; roots are the nodes without
/// successors, in the order they were first observed.
#[derive(Debug)]
pub struct PlanSpec {
	nodes: Vec<Option<PlanNode>>,
	roots: Vec<NodeIdx>,
	now: Time,
}

impl PlanSpec {
	pub fn new(now: Time) -> Self {
		Self {
			nodes: Vec::new(),
			roots: Vec::new(),
			now,
		}
	}

	pub fn now(&self) -> Time {
		self.now
	}

	pub fn add_node(&mut self, id: impl Into<String>, spec: Box<dyn ProcedureSpec>) -> NodeIdx {
		let idx = NodeIdx(self.nodes.len());
		self.nodes.push(Some(PlanNode {
			id: id.into(),
			kind: NodeKind::Logical,
			spec,
			predecessors: Vec::new(),
			successors: Vec::new(),
			trigger: None,
			bounds: None,
		}));
		self.roots.push(idx);
		idx
	}

	/// Connects `parent -> child`; the parent stops being a root.
	pub fn add_edge(&mut self, parent: NodeIdx, child: NodeIdx) -> Result<()> {
		if self.get(parent).is_none() || self.get(child).is_none() {
			return_internal_error!("edge {} -> {} references a removed node", parent, child);
		}
		self.node_mut(parent)?.successors.push(child);
		self.node_mut(child)?.predecessors.push(parent);
		self.roots.retain(|r| *r != parent);
		Ok(())
	}

	pub fn get(&self, idx: NodeIdx) -> Option<&PlanNode> {
		self.nodes.get(idx.0).and_then(Option::as_ref)
	}

	pub fn node(&self, idx: NodeIdx) -> Result<&PlanNode> {
		match self.get(idx) {
			Some(node) => Ok(node),
			None => internal_err!("plan node {} does not exist", idx),
		}
	}

	pub fn node_mut(&mut self, idx: NodeIdx) -> Result<&mut PlanNode> {
		match self.nodes.get_mut(idx.0).and_then(Option::as_mut) {
			Some(node) => Ok(node),
			None => internal_err!("plan node {} does not exist", idx),
		}
	}

	pub fn find(&self, id: &str) -> Option<NodeIdx> {
		self.indices().find(|idx| self.get(*idx).is_some_and(|n| n.id == id))
	}

	pub fn roots(&self) -> &[NodeIdx] {
		&self.roots
	}

	pub fn len(&self) -> usize {
		self.nodes.iter().filter(|n| n.is_some()).count()
	}

	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}

	/// Live node indices in insertion order.
	pub fn indices(&self) -> impl Iterator<Item = NodeIdx> + '_ {
		self.nodes.iter().enumerate().filter(|(_, n)| n.is_some()).map(|(i, _)| NodeIdx(i))
	}

	pub fn nodes(&self) -> impl Iterator<Item = &PlanNode> {
		self.nodes.iter().flatten()
	}

	pub fn predecessors(&self, idx: NodeIdx) -> &[NodeIdx] {
		self.get(idx).map(|n| n.predecessors.as_slice()).unwrap_or(&[])
	}

	pub fn successors(&self, idx: NodeIdx) -> &[NodeIdx] {
		self.get(idx).map(|n| n.successors.as_slice()).unwrap_or(&[])
	}

	/// Replaces the procedure spec, keeping id and edges.
	pub fn replace_spec(&mut self, idx: NodeIdx, spec: Box<dyn ProcedureSpec>) -> Result<()> {
		self.node_mut(idx)?.spec = spec;
		Ok(())
	}

	/// Removes a node with at most one predecessor, splicing that
	/// predecessor into the node's place in every successor.
	pub fn remove_node(&mut self, idx: NodeIdx) -> Result<()> {
		let (predecessors, successors) = {
			let node = self.node(idx)?;
			(node.predecessors.clone(), node.successors.clone())
		};
		if predecessors.len() > 1 {
			return_internal_error!("cannot remove node {} with {} predecessors", idx, predecessors.len());
		}
		let parent = predecessors.first().copied();

		for successor in &successors {
			let node = self.node_mut(*successor)?;
			match parent {
				Some(parent) => {
					for p in node.predecessors.iter_mut().filter(|p| **p == idx) {
						*p = parent;
					}
				}
				None => node.predecessors.retain(|p| *p != idx),
			}
		}
		if let Some(parent) = parent {
			let parent_node = self.node_mut(parent)?;
			let position = parent_node.successors.iter().position(|s| *s == idx);
			parent_node.successors.retain(|s| *s != idx);
			let insert_at = position.unwrap_or(parent_node.successors.len());
			for (offset, successor) in successors.iter().enumerate() {
				parent_node.successors.insert(insert_at + offset, *successor);
			}
		}

		let root_position = self.roots.iter().position(|r| *r == idx);
		self.nodes[idx.0] = None;
		if let Some(position) = root_position {
			self.roots.remove(position);
			if let Some(parent) = parent {
				if self.successors(parent).is_empty() && !self.roots.contains(&parent) {
					self.roots.insert(position, parent);
				}
			}
		}
		Ok(())
	}

	/// Inserts a new node between `parent` and all of its successors.
	pub fn insert_after(
		&mut self,
		parent: NodeIdx,
		id: impl Into<String>,
		spec: Box<dyn ProcedureSpec>,
	) -> Result<NodeIdx> {
		let successors = self.node(parent)?.successors.clone();
		let was_root = self.roots.iter().position(|r| *r == parent);
		let idx = self.add_node(id, spec);
		self.roots.retain(|r| *r != idx);
		for successor in &successors {
			for p in self.node_mut(*successor)?.predecessors.iter_mut().filter(|p| **p == parent) {
				*p = idx;
			}
		}
		self.node_mut(idx)?.successors = successors;
		self.node_mut(parent)?.successors = vec![idx];
		self.node_mut(idx)?.predecessors = vec![parent];
		if let Some(position) = was_root {
			self.roots[position] = idx;
		}
		Ok(idx)
	}

	/// Nodes reachable from the roots, walking predecessors breadth first.
	pub fn walk_from_roots(&self) -> Vec<NodeIdx> {
		let mut seen = HashSet::new();
		let mut order = Vec::new();
		let mut queue: VecDeque<NodeIdx> = self.roots.iter().copied().collect();
		while let Some(idx) = queue.pop_front() {
			if !seen.insert(idx) || self.get(idx).is_none() {
				continue;
			}
			order.push(idx);
			queue.extend(self.predecessors(idx).iter().copied());
		}
		order
	}

	/// Live nodes ordered predecessors first.
	pub fn topological_order(&self) -> Result<Vec<NodeIdx>> {
		let mut remaining: Vec<(NodeIdx, usize)> =
			self.indices().map(|idx| (idx, self.predecessors(idx).len())).collect();
		let mut order = Vec::with_capacity(remaining.len());
		while !remaining.is_empty() {
			let Some(position) = remaining.iter().position(|(_, degree)| *degree == 0) else {
				return_error!(cycle(&self.node(remaining[0].0)?.id));
			};
			let (idx, _) = remaining.remove(position);
			for successor in self.successors(idx) {
				for entry in remaining.iter_mut().filter(|(i, _)| i == successor) {
					entry.1 -= 1;
				}
			}
			order.push(idx);
		}
		Ok(order)
	}
}

#[cfg(test)]
pub(crate) mod tests {
	use std::any::Any;

	use super::*;

	#[derive(Debug, Clone)]
	pub(crate) struct Named(pub &'static str);

	impl ProcedureSpec for Named {
		fn kind(&self) -> ProcedureKind {
			ProcedureKind::new(self.0)
		}

		fn copy(&self) -> Box<dyn ProcedureSpec> {
			Box::new(self.clone())
		}

		fn as_any(&self) -> &dyn Any {
			self
		}
	}

	fn chain(kinds: &[&'static str]) -> (PlanSpec, Vec<NodeIdx>) {
		let mut plan = PlanSpec::new(Time(0));
		let mut nodes = Vec::new();
		for (i, kind) in kinds.iter().enumerate() {
			let idx = plan.add_node(format!("{}{}", kind, i), Box::new(Named(kind)));
			if let Some(prev) = nodes.last() {
				plan.add_edge(*prev, idx).unwrap();
			}
			nodes.push(idx);
		}
		(plan, nodes)
	}

	#[test]
	fn test_roots_track_edges() {
		let (plan, nodes) = chain(&["from", "filter", "yield"]);
		assert_eq!(plan.roots(), &[nodes[2]]);
		assert_eq!(plan.walk_from_roots(), vec![nodes[2], nodes[1], nodes[0]]);
	}

	#[test]
	fn test_remove_middle_node_splices_edges() {
		let (mut plan, nodes) = chain(&["from", "filter", "yield"]);
		plan.remove_node(nodes[1]).unwrap();
		assert_eq!(plan.len(), 2);
		assert_eq!(plan.successors(nodes[0]), &[nodes[2]]);
		assert_eq!(plan.predecessors(nodes[2]), &[nodes[0]]);
	}

	#[test]
	fn test_remove_root_promotes_parent() {
		let (mut plan, nodes) = chain(&["from", "filter"]);
		plan.remove_node(nodes[1]).unwrap();
		assert_eq!(plan.roots(), &[nodes[0]]);
	}

	#[test]
	fn test_insert_after_root() {
		let (mut plan, nodes) = chain(&["from", "filter"]);
		let added = plan.insert_after(nodes[1], "yield", Box::new(Named("yield"))).unwrap();
		assert_eq!(plan.roots(), &[added]);
		assert_eq!(plan.predecessors(added), &[nodes[1]]);
		assert_eq!(plan.topological_order().unwrap(), vec![nodes[0], nodes[1], added]);
	}
}
