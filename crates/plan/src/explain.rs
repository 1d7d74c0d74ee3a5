// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::fmt::Write;

use crate::plan::{NodeKind, PlanNode, PlanSpec};

/// Renders one line per node, predecessors first:
///
/// ```text
/// from0 [array.from] physical bounds=[..) trigger=narrow
/// filter1 [filter] physical <- from0 trigger=narrow
/// ```
pub fn explain(plan: &PlanSpec) -> String {
	let order = match plan.topological_order() {
		Ok(order) => order,
		Err(_) => plan.indices().collect(),
	};

	let mut output = String::new();
	for idx in order {
		let Some(node) = plan.get(idx) else {
			continue;
		};
		write_node(&mut output, plan, node);
	}
	output
}

fn write_node(output: &mut String, plan: &PlanSpec, node: &PlanNode) {
	let kind = match node.kind {
		NodeKind::Logical => "logical",
		NodeKind::Physical => "physical",
	};
	let _ = write!(output, "{} [{}] {}", node.id, node.spec.kind(), kind);

	if !node.predecessors.is_empty() {
		let predecessors: Vec<&str> =
			node.predecessors.iter().filter_map(|p| plan.get(*p)).map(|p| p.id.as_str()).collect();
		let _ = write!(output, " <- {}", predecessors.join(", "));
	}
	if let Some(bounds) = &node.bounds {
		let _ = write!(output, " bounds={}", bounds);
	}
	if let Some(trigger) = &node.trigger {
		let _ = write!(output, " trigger={}", trigger);
	}
	output.push('\n');
}

#[cfg(test)]
mod tests {
	use flux_type::Time;

	use super::*;
	use crate::plan::tests::Named;

	#[test]
	fn test_lists_predecessors() {
		let mut plan = PlanSpec::new(Time(0));
		let a = plan.add_node("a0", Box::new(Named("from")));
		let b = plan.add_node("b1", Box::new(Named("from")));
		let u = plan.add_node("union2", Box::new(Named("union")));
		plan.add_edge(a, u).unwrap();
		plan.add_edge(b, u).unwrap();

		let rendered = explain(&plan);
		let lines: Vec<&str> = rendered.lines().collect();
		assert_eq!(lines.len(), 3);
		assert_eq!(lines[2], "union2 [union] logical <- a0, b1");
	}
}
