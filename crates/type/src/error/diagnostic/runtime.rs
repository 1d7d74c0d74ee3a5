// SPDX-License-Identifier: MIT
// Copyright (c) 2025 ReifyDB

use crate::error::{ErrorKind, diagnostic::Diagnostic};

/// Identifier is not defined in any enclosing scope
pub fn undefined_identifier(name: &str) -> Diagnostic {
	Diagnostic {
		kind: ErrorKind::Invalid,
		code: "RUNTIME_001".to_string(),
		message: format!("undefined identifier {}", name),
		label: None,
		help: Some(format!("define {} before using it", name)),
		notes: vec![],
		cause: None,
	}
}

pub fn stack_underflow(opcode: &str) -> Diagnostic {
	Diagnostic {
		kind: ErrorKind::Internal,
		code: "RUNTIME_002".to_string(),
		message: format!("stack underflow executing {}", opcode),
		label: None,
		help: None,
		notes: vec![],
		cause: None,
	}
}

pub fn not_callable(nature: &str) -> Diagnostic {
	Diagnostic {
		kind: ErrorKind::Invalid,
		code: "RUNTIME_003".to_string(),
		message: format!("cannot call a value of type {}", nature),
		label: None,
		help: None,
		notes: vec![],
		cause: None,
	}
}

pub fn invalid_jump(target: usize, len: usize) -> Diagnostic {
	Diagnostic {
		kind: ErrorKind::Internal,
		code: "RUNTIME_004".to_string(),
		message: format!("jump target {} outside of chunk of length {}", target, len),
		label: None,
		help: None,
		notes: vec![],
		cause: None,
	}
}

pub fn unimplemented(feature: &str) -> Diagnostic {
	Diagnostic {
		kind: ErrorKind::Unimplemented,
		code: "RUNTIME_005".to_string(),
		message: format!("{} is not implemented", feature),
		label: None,
		help: None,
		notes: vec![],
		cause: None,
	}
}

pub fn find_record_not_found() -> Diagnostic {
	Diagnostic {
		kind: ErrorKind::NotFound,
		code: "RUNTIME_006".to_string(),
		message: "no record matches the group key predicate and row index".to_string(),
		label: None,
		help: None,
		notes: vec![],
		cause: None,
	}
}

pub fn no_now() -> Diagnostic {
	Diagnostic {
		kind: ErrorKind::Internal,
		code: "RUNTIME_007".to_string(),
		message: "now was read before the program started".to_string(),
		label: None,
		help: None,
		notes: vec![],
		cause: None,
	}
}

pub fn no_host() -> Diagnostic {
	Diagnostic {
		kind: ErrorKind::Internal,
		code: "RUNTIME_008".to_string(),
		message: "program requires a query host but none was configured".to_string(),
		label: None,
		help: None,
		notes: vec![],
		cause: None,
	}
}
