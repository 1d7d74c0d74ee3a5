// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::{
	collections::HashMap,
	fmt::{Display, Formatter},
};

use flux_type::Result;

use crate::{
	pattern::Pattern,
	plan::{NodeIdx, PlanSpec},
	procedure::ProcedureKind,
};

/// Quantity a rule strictly decreases whenever it changes the plan, which
/// bounds the number of rewrites.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Measure {
	NodeCount,
	Cost,
	/// Sum of the registered ranks of every node's kind.
	KindRank,
}

impl Measure {
	pub fn evaluate(&self, plan: &PlanSpec, ranks: &HashMap<ProcedureKind, u64>) -> u64 {
		match self {
			Measure::NodeCount => plan.len() as u64,
			Measure::Cost => plan.nodes().map(|n| n.spec.cost().total()).fold(0, u64::saturating_add),
			Measure::KindRank => {
				plan.nodes().map(|n| ranks.get(&n.spec.kind()).copied().unwrap_or(0)).fold(0, u64::saturating_add)
			}
		}
	}
}

impl Display for Measure {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		f.write_str(match self {
			Measure::NodeCount => "node count",
			Measure::Cost => "cost",
			Measure::KindRank => "kind rank",
		})
	}
}

/// A plan rewrite applied to nodes matching its pattern.
pub trait Rule: Send + Sync {
	fn name(&self) -> &str;

	fn pattern(&self) -> Pattern;

	fn measure(&self) -> Measure;

	/// Rewrites the plan at `node`; returns whether anything changed.
	fn rewrite(&self, plan: &mut PlanSpec, node: NodeIdx) -> Result<bool>;
}
