// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use crate::{
	plan::{NodeIdx, PlanSpec},
	procedure::ProcedureKind,
};

/// Shape a rule matches against a node and, optionally, its predecessors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Pattern {
	Any,
	Kind {
		kind: ProcedureKind,
		/// When set, the node must have exactly these predecessors.
		predecessors: Option<Vec<Pattern>>,
	},
}

impl Pattern {
	pub fn any() -> Self {
		Pattern::Any
	}

	pub fn kind(kind: impl Into<ProcedureKind>) -> Self {
		Pattern::Kind {
			kind: kind.into(),
			predecessors: None,
		}
	}

	pub fn kind_with(kind: impl Into<ProcedureKind>, predecessors: Vec<Pattern>) -> Self {
		Pattern::Kind {
			kind: kind.into(),
			predecessors: Some(predecessors),
		}
	}

	/// The root kind, if the pattern has one.
	pub fn root_kind(&self) -> Option<&ProcedureKind> {
		match self {
			Pattern::Any => None,
			Pattern::Kind {
				kind,
				..
			} => Some(kind),
		}
	}

	pub fn matches(&self, plan: &PlanSpec, idx: NodeIdx) -> bool {
		let Some(node) = plan.get(idx) else {
			return false;
		};
		match self {
			Pattern::Any => true,
			Pattern::Kind {
				kind,
				predecessors,
			} => {
				if node.spec.kind() != *kind {
					return false;
				}
				let Some(patterns) = predecessors else {
					return true;
				};
				node.predecessors.len() == patterns.len()
					&& node.predecessors.iter().zip(patterns.iter()).all(|(p, pattern)| pattern.matches(plan, *p))
			}
		}
	}
}

impl From<&str> for Pattern {
	fn from(kind: &str) -> Self {
		Pattern::kind(kind)
	}
}
