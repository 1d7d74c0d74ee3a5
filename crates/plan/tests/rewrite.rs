// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::{any::Any, sync::Arc};

use flux_plan::{
	Measure, NodeKind, OperationId, OperationRegistry, OperationSpec, Pattern, PlanSpec, Planner, ProcedureKind,
	ProcedureSpec, Rule, Spec, TriggerSpec, YIELD_KIND,
};
use flux_type::{ErrorKind, Result, Time};

#[derive(Debug)]
struct KindOp(&'static str);

impl OperationSpec for KindOp {
	fn kind(&self) -> &str {
		self.0
	}

	fn as_any(&self) -> &dyn Any {
		self
	}
}

#[derive(Debug, Clone)]
struct KindProc {
	kind: &'static str,
	narrow: bool,
}

impl ProcedureSpec for KindProc {
	fn kind(&self) -> ProcedureKind {
		ProcedureKind::new(self.kind)
	}

	fn copy(&self) -> Box<dyn ProcedureSpec> {
		Box::new(self.clone())
	}

	fn as_any(&self) -> &dyn Any {
		self
	}

	fn is_narrow(&self) -> bool {
		self.narrow
	}
}

struct Rename {
	name: &'static str,
	from: &'static str,
	to: &'static str,
}

impl Rule for Rename {
	fn name(&self) -> &str {
		self.name
	}

	fn pattern(&self) -> Pattern {
		Pattern::kind(self.from)
	}

	fn measure(&self) -> Measure {
		Measure::KindRank
	}

	fn rewrite(&self, plan: &mut PlanSpec, node: flux_plan::NodeIdx) -> Result<bool> {
		let narrow = plan.node(node)?.spec.is_narrow();
		plan.replace_spec(
			node,
			Box::new(KindProc {
				kind: self.to,
				narrow,
			}),
		)?;
		Ok(true)
	}
}

fn registry() -> OperationRegistry {
	let mut registry = OperationRegistry::new();
	for kind in ["K1", "K2", "source"] {
		registry.register(
			kind,
			move |_, _| Ok(Arc::new(KindOp(kind)) as Arc<dyn OperationSpec>),
			move |_| {
				Ok(Box::new(KindProc {
					kind,
					narrow: true,
				}) as Box<dyn ProcedureSpec>)
			},
		);
	}
	registry
}

/// source0 -> K1 -> K1 -> K1
fn chain_spec() -> Spec {
	let mut spec = Spec::new(Time(0));
	spec.add_operation(OperationId::from("source0"), Arc::new(KindOp("source")));
	let mut previous = OperationId::from("source0");
	for i in 1..=3 {
		let id = OperationId(format!("K1{}", i));
		spec.add_operation(id.clone(), Arc::new(KindOp("K1")));
		spec.add_edge(previous, id.clone());
		previous = id;
	}
	spec
}

#[test]
fn test_rename_reaches_fixed_point() -> Result<()> {
	let planner = Planner::builder()
		.kind_rank("K1", 2)
		.kind_rank("K2", 1)
		.logical_rule(Arc::new(Rename {
			name: "rename_k1",
			from: "K1",
			to: "K2",
		}))
		.build()?;

	let plan = planner.plan(&chain_spec(), &registry())?;

	for i in 1..=3 {
		let idx = plan.find(&format!("K1{}", i)).expect("node id preserved");
		let node = plan.node(idx)?;
		assert_eq!(node.spec.kind(), "K2");
		assert_eq!(node.kind, NodeKind::Physical);
		let expected_parent = if i == 1 {
			"source0".to_string()
		} else {
			format!("K1{}", i - 1)
		};
		let parents: Vec<&str> = node.predecessors.iter().map(|p| plan.node(*p).unwrap().id.as_str()).collect();
		assert_eq!(parents, vec![expected_parent.as_str()]);
	}
	assert!(plan.nodes().all(|n| n.spec.kind() != "K1"));
	Ok(())
}

#[test]
fn test_implicit_yield_is_added() -> Result<()> {
	let planner = Planner::builder().build()?;
	let plan = planner.plan(&chain_spec(), &registry())?;

	assert_eq!(plan.roots().len(), 1);
	let root = plan.node(plan.roots()[0])?;
	assert_eq!(root.spec.kind(), YIELD_KIND);
	assert_eq!(root.spec.yield_name(), Some("_result"));
	assert_eq!(plan.node(root.predecessors[0])?.id, "K13");
	assert_eq!(root.trigger, Some(TriggerSpec::Narrow));
	Ok(())
}

#[test]
fn test_two_unnamed_roots_collide() -> Result<()> {
	let mut spec = Spec::new(Time(0));
	spec.add_operation(OperationId::from("source0"), Arc::new(KindOp("source")));
	spec.add_operation(OperationId::from("source1"), Arc::new(KindOp("source")));

	let err = Planner::builder().build()?.plan(&spec, &registry()).unwrap_err();
	assert_eq!(err.code(), "PLAN_004");
	Ok(())
}

#[test]
fn test_rule_that_does_not_decrease_is_rejected() -> Result<()> {
	let planner = Planner::builder()
		.kind_rank("K1", 1)
		.kind_rank("K2", 1)
		.logical_rule(Arc::new(Rename {
			name: "sideways",
			from: "K1",
			to: "K2",
		}))
		.build()?;

	let err = planner.plan(&chain_spec(), &registry()).unwrap_err();
	assert_eq!(err.code(), "PLAN_005");
	assert_eq!(err.kind(), ErrorKind::Internal);
	Ok(())
}

#[test]
fn test_kind_rank_rule_needs_rank() {
	let result = Planner::builder()
		.logical_rule(Arc::new(Rename {
			name: "unranked",
			from: "K1",
			to: "K2",
		}))
		.build();
	assert_eq!(result.err().map(|e| e.code().to_string()), Some("PLAN_006".to_string()));
}

#[test]
fn test_duplicate_rule_names() {
	let rule = || -> Arc<dyn Rule> {
		Arc::new(Rename {
			name: "same",
			from: "K1",
			to: "K2",
		})
	};
	let result = Planner::builder().kind_rank("K1", 2).logical_rule(rule()).physical_rule(rule()).build();
	assert_eq!(result.err().map(|e| e.code().to_string()), Some("PLAN_009".to_string()));
}

#[test]
fn test_physical_validation_rejects_unknown_kinds() -> Result<()> {
	let planner = Planner::builder().physical_kinds([ProcedureKind::new("source"), ProcedureKind::new(YIELD_KIND)]).build()?;
	let err = planner.plan(&chain_spec(), &registry()).unwrap_err();
	assert_eq!(err.code(), "PLAN_002");

	let planner = Planner::builder()
		.physical_kinds([ProcedureKind::new("source")])
		.disable_physical_validation()
		.build()?;
	assert!(planner.plan(&chain_spec(), &registry()).is_ok());
	Ok(())
}
