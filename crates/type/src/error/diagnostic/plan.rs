// SPDX-License-Identifier: MIT
// Copyright (c) 2025 ReifyDB

use crate::error::{ErrorKind, diagnostic::Diagnostic};

pub fn unknown_operation(kind: &str) -> Diagnostic {
	Diagnostic {
		kind: ErrorKind::NotFound,
		code: "PLAN_001".to_string(),
		message: format!("no procedure registered for operation kind {:?}", kind),
		label: None,
		help: None,
		notes: vec![],
		cause: None,
	}
}

pub fn unknown_procedure(kind: &str) -> Diagnostic {
	Diagnostic {
		kind: ErrorKind::NotFound,
		code: "PLAN_002".to_string(),
		message: format!("procedure kind {:?} has no physical counterpart", kind),
		label: None,
		help: None,
		notes: vec![],
		cause: None,
	}
}

pub fn cycle(node: &str) -> Diagnostic {
	Diagnostic {
		kind: ErrorKind::Invalid,
		code: "PLAN_003".to_string(),
		message: format!("operation graph contains a cycle through {}", node),
		label: None,
		help: None,
		notes: vec![],
		cause: None,
	}
}

pub fn duplicate_yield(name: &str) -> Diagnostic {
	Diagnostic {
		kind: ErrorKind::Invalid,
		code: "PLAN_004".to_string(),
		message: format!("duplicate yield name {:?}", name),
		label: None,
		help: Some("give every yield a unique name".to_string()),
		notes: vec![],
		cause: None,
	}
}

/// A rule changed the plan without decreasing its declared measure.
pub fn rule_not_terminating(rule: &str, measure: &str, before: u64, after: u64) -> Diagnostic {
	Diagnostic {
		kind: ErrorKind::Internal,
		code: "PLAN_005".to_string(),
		message: format!(
			"rule {} changed the plan without decreasing {} ({} -> {})",
			rule, measure, before, after
		),
		label: None,
		help: None,
		notes: vec![],
		cause: None,
	}
}

pub fn missing_kind_rank(rule: &str, kind: &str) -> Diagnostic {
	Diagnostic {
		kind: ErrorKind::Invalid,
		code: "PLAN_006".to_string(),
		message: format!("rule {} measures kind rank but kind {:?} has no rank", rule, kind),
		label: None,
		help: Some("register a rank for every kind the rule rewrites".to_string()),
		notes: vec![],
		cause: None,
	}
}

pub fn invalid_edge(from: &str, to: &str) -> Diagnostic {
	Diagnostic {
		kind: ErrorKind::Invalid,
		code: "PLAN_007".to_string(),
		message: format!("edge {} -> {} references an unknown operation", from, to),
		label: None,
		help: None,
		notes: vec![],
		cause: None,
	}
}

pub fn not_physical(kind: &str) -> Diagnostic {
	Diagnostic {
		kind: ErrorKind::Internal,
		code: "PLAN_008".to_string(),
		message: format!("node {:?} is not physical after physical planning", kind),
		label: None,
		help: None,
		notes: vec![],
		cause: None,
	}
}

pub fn duplicate_rule(name: &str) -> Diagnostic {
	Diagnostic {
		kind: ErrorKind::Invalid,
		code: "PLAN_009".to_string(),
		message: format!("rule {} is registered twice", name),
		label: None,
		help: None,
		notes: vec![],
		cause: None,
	}
}

pub fn iteration_limit(limit: usize) -> Diagnostic {
	Diagnostic {
		kind: ErrorKind::Internal,
		code: "PLAN_010".to_string(),
		message: format!("planner did not reach a fixed point within {} rewrites", limit),
		label: None,
		help: None,
		notes: vec![],
		cause: None,
	}
}

pub fn empty_plan() -> Diagnostic {
	Diagnostic {
		kind: ErrorKind::Invalid,
		code: "PLAN_011".to_string(),
		message: "plan has no roots".to_string(),
		label: None,
		help: None,
		notes: vec![],
		cause: None,
	}
}
