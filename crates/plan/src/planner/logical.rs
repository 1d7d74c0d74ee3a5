// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::collections::HashMap;

use flux_type::{Result, error::diagnostic::plan::empty_plan, return_error};
use tracing::debug;

use crate::{
	plan::{NodeIdx, PlanSpec},
	registry::OperationRegistry,
	spec::Spec,
};

/// Mirrors the operation DAG as a logical plan.
pub(super) fn lower(spec: &Spec, registry: &OperationRegistry) -> Result<PlanSpec> {
	spec.validate()?;
	let order = spec.topological_order()?;
	if order.is_empty() {
		return_error!(empty_plan());
	}

	let mut plan = PlanSpec::new(spec.now());
	let mut nodes: HashMap<&str, NodeIdx> = HashMap::with_capacity(order.len());
	for operation in order {
		let procedure = registry.create_procedure(operation.spec.as_ref())?;
		let idx = plan.add_node(operation.id.as_str(), procedure);
		nodes.insert(operation.id.as_str(), idx);
	}

	for edge in spec.edges() {
		let (Some(parent), Some(child)) = (nodes.get(edge.parent.as_str()), nodes.get(edge.child.as_str())) else {
			continue;
		};
		plan.add_edge(*parent, *child)?;
	}

	debug!(nodes = plan.len(), roots = plan.roots().len(), "logical plan lowered");
	Ok(plan)
}
