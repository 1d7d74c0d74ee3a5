// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! Planner rules shipped with the builtins.

use flux_plan::{Measure, NodeIdx, Pattern, PlanSpec, ProcedureSpec, Rule};
use flux_type::Result;

use crate::{
	filter::{self, FilterSpec},
	from::{self, FromSpec, Pushdown},
	project::ProjectSpec,
	range::{self, RangeSpec},
};

fn spec_of<T: 'static>(plan: &PlanSpec, idx: NodeIdx) -> Result<Option<&T>> {
	Ok(plan.node(idx)?.spec.as_any().downcast_ref::<T>())
}

/// The single predecessor of `node`, when `node` is its only successor.
fn exclusive_parent(plan: &PlanSpec, node: NodeIdx) -> Option<NodeIdx> {
	match plan.predecessors(node) {
		[parent] if plan.successors(*parent).len() == 1 => Some(*parent),
		_ => None,
	}
}

/// Folds `filter |> filter` into one filter evaluating both predicates.
pub struct MergeFilterRule;

impl Rule for MergeFilterRule {
	fn name(&self) -> &str {
		"merge_filter"
	}

	fn pattern(&self) -> Pattern {
		Pattern::kind_with(filter::KIND, vec![Pattern::kind(filter::KIND)])
	}

	fn measure(&self) -> Measure {
		Measure::NodeCount
	}

	fn rewrite(&self, plan: &mut PlanSpec, node: NodeIdx) -> Result<bool> {
		let Some(parent) = exclusive_parent(plan, node) else {
			return Ok(false);
		};
		let (Some(upper), Some(lower)) = (spec_of::<FilterSpec>(plan, parent)?, spec_of::<FilterSpec>(plan, node)?)
		else {
			return Ok(false);
		};
		// an upper filter dropping empty tables hides them from a lower one keeping them
		if !upper.keep_empty && lower.keep_empty {
			return Ok(false);
		}
		let merged = upper.merge(lower);
		plan.replace_spec(parent, Box::new(merged))?;
		plan.remove_node(node)?;
		Ok(true)
	}
}

/// Moves a `range`, `filter`, `keep` or `drop` directly below `array.from`
/// into the source.
pub struct PushDownRule {
	kind: &'static str,
	name: String,
}

impl PushDownRule {
	pub fn new(kind: &'static str) -> Self {
		Self {
			kind,
			name: format!("push_down_{}", kind),
		}
	}
}

fn as_pushdown(spec: &dyn ProcedureSpec) -> Option<Pushdown> {
	let any = spec.as_any();
	if let Some(spec) = any.downcast_ref::<RangeSpec>() {
		return Some(Pushdown::Range(spec.clone()));
	}
	if let Some(spec) = any.downcast_ref::<FilterSpec>() {
		return Some(Pushdown::Filter(spec.clone()));
	}
	any.downcast_ref::<ProjectSpec>().map(|spec| Pushdown::Project(spec.clone()))
}

impl Rule for PushDownRule {
	fn name(&self) -> &str {
		&self.name
	}

	fn pattern(&self) -> Pattern {
		Pattern::kind_with(self.kind, vec![Pattern::kind(from::KIND)])
	}

	fn measure(&self) -> Measure {
		Measure::NodeCount
	}

	fn rewrite(&self, plan: &mut PlanSpec, node: NodeIdx) -> Result<bool> {
		let Some(source) = exclusive_parent(plan, node) else {
			return Ok(false);
		};
		let Some(pushdown) = as_pushdown(plan.node(node)?.spec.as_ref()) else {
			return Ok(false);
		};
		let Some(from) = spec_of::<FromSpec>(plan, source)? else {
			return Ok(false);
		};
		let pushed = from.with_pushdown(pushdown);
		plan.replace_spec(source, Box::new(pushed))?;
		plan.remove_node(node)?;
		Ok(true)
	}
}

pub(crate) fn push_down_rules() -> Vec<PushDownRule> {
	[range::KIND, filter::KIND, crate::project::KEEP_KIND, crate::project::DROP_KIND]
		.into_iter()
		.map(PushDownRule::new)
		.collect()
}
