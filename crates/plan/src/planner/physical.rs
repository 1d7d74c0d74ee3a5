// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::collections::{HashMap, HashSet};

use flux_type::{
	Result,
	error::diagnostic::plan::{duplicate_yield, not_physical, unknown_procedure},
	return_error,
};
use tracing::{debug, trace};

use super::PhysicalConverter;
use crate::{
	plan::{NodeKind, PlanSpec},
	procedure::{Bounds, ProcedureKind, YieldProcedureSpec},
	trigger::TriggerSpec,
};

const GENERATED_YIELD_ID: &str = "generated_yield";

/// Marks every node physical, swapping in converted specs where a
/// converter is registered for the node's kind.
pub(super) fn convert(plan: &mut PlanSpec, converters: &HashMap<ProcedureKind, PhysicalConverter>) -> Result<()> {
	let indices: Vec<_> = plan.indices().collect();
	for idx in indices {
		let node = plan.node_mut(idx)?;
		if let Some(converter) = converters.get(&node.spec.kind()) {
			let converted = converter(node.spec.as_ref())?;
			trace!(node = %node.id, from = %node.spec.kind(), to = %converted.kind(), "converted to physical");
			node.spec = converted;
		}
		node.kind = NodeKind::Physical;
	}
	Ok(())
}

/// Adds implicit yields, checks yield names, then assigns bounds and
/// triggers.
pub(super) fn finalize(plan: &mut PlanSpec, default_trigger: &TriggerSpec) -> Result<()> {
	add_implicit_yields(plan)?;
	check_yield_names(plan)?;

	for idx in plan.topological_order()? {
		let inherited = {
			let predecessors = plan.predecessors(idx);
			let mut bounds: Option<Bounds> = None;
			let mut bounded = !predecessors.is_empty();
			for predecessor in predecessors {
				match plan.node(*predecessor)?.bounds {
					Some(b) => bounds = Some(bounds.map_or(b, |acc| acc.union(&b))),
					None => bounded = false,
				}
			}
			if bounded { bounds } else { None }
		};

		let node = plan.node_mut(idx)?;
		node.bounds = match (node.spec.bounds(), inherited) {
			(Some(own), Some(inherited)) => Some(own.intersect(&inherited)),
			(Some(own), None) => Some(own),
			(None, inherited) => inherited,
		};
		node.trigger = Some(if node.spec.is_narrow() {
			TriggerSpec::Narrow
		} else {
			node.spec.trigger_spec().unwrap_or_else(|| default_trigger.clone())
		});
	}
	Ok(())
}

pub(super) fn validate(plan: &PlanSpec, kinds: Option<&HashSet<ProcedureKind>>) -> Result<()> {
	for node in plan.nodes() {
		if node.kind != NodeKind::Physical {
			return_error!(not_physical(node.spec.kind().as_str()));
		}
		if let Some(kinds) = kinds {
			if !kinds.contains(&node.spec.kind()) {
				return_error!(unknown_procedure(node.spec.kind().as_str()));
			}
		}
	}
	Ok(())
}

fn add_implicit_yields(plan: &mut PlanSpec) -> Result<()> {
	let roots = plan.roots().to_vec();
	let mut generated = 0;
	for root in roots {
		if plan.node(root)?.spec.yield_name().is_some() {
			continue;
		}
		let id = match generated {
			0 => GENERATED_YIELD_ID.to_string(),
			n => format!("{GENERATED_YIELD_ID}{n}"),
		};
		let idx = plan.insert_after(root, id, Box::new(YieldProcedureSpec::new(YieldProcedureSpec::DEFAULT_NAME)))?;
		plan.node_mut(idx)?.kind = NodeKind::Physical;
		generated += 1;
	}
	if generated > 0 {
		debug!(generated, "added implicit yields");
	}
	Ok(())
}

fn check_yield_names(plan: &PlanSpec) -> Result<()> {
	let mut names = HashSet::new();
	for node in plan.nodes() {
		if let Some(name) = node.spec.yield_name() {
			if !names.insert(name) {
				return_error!(duplicate_yield(name));
			}
		}
	}
	Ok(())
}
