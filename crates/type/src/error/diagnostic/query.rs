// SPDX-License-Identifier: MIT
// Copyright (c) 2025 ReifyDB

use crate::error::{ErrorKind, diagnostic::Diagnostic};

pub fn canceled() -> Diagnostic {
	Diagnostic {
		kind: ErrorKind::Canceled,
		code: "QUERY_001".to_string(),
		message: "query canceled".to_string(),
		label: None,
		help: None,
		notes: vec![],
		cause: None,
	}
}

pub fn deadline_exceeded() -> Diagnostic {
	Diagnostic {
		kind: ErrorKind::DeadlineExceeded,
		code: "QUERY_002".to_string(),
		message: "query deadline exceeded".to_string(),
		label: None,
		help: None,
		notes: vec![],
		cause: None,
	}
}

pub fn no_side_effects() -> Diagnostic {
	Diagnostic {
		kind: ErrorKind::Invalid,
		code: "QUERY_003".to_string(),
		message: "program has no side effects".to_string(),
		label: None,
		help: Some("end the program with an expression producing a table stream".to_string()),
		notes: vec![],
		cause: None,
	}
}

pub fn transformation_not_found(kind: &str) -> Diagnostic {
	Diagnostic {
		kind: ErrorKind::NotFound,
		code: "QUERY_004".to_string(),
		message: format!("no source or transformation registered for procedure kind {:?}", kind),
		label: None,
		help: None,
		notes: vec![],
		cause: None,
	}
}

/// A result stream was read after the query was already consumed.
pub fn results_consumed() -> Diagnostic {
	Diagnostic {
		kind: ErrorKind::Invalid,
		code: "QUERY_005".to_string(),
		message: "query results were already consumed".to_string(),
		label: None,
		help: None,
		notes: vec![],
		cause: None,
	}
}

pub fn source_failed(kind: &str) -> Diagnostic {
	Diagnostic {
		kind: ErrorKind::Inherit,
		code: "QUERY_006".to_string(),
		message: format!("source {} failed", kind),
		label: None,
		help: None,
		notes: vec![],
		cause: None,
	}
}

pub fn parse_failed(reason: &str) -> Diagnostic {
	Diagnostic {
		kind: ErrorKind::Invalid,
		code: "QUERY_007".to_string(),
		message: format!("failed to parse program: {}", reason),
		label: None,
		help: None,
		notes: vec![],
		cause: None,
	}
}
