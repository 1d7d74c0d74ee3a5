// SPDX-License-Identifier: MIT
// Copyright (c) 2025 ReifyDB

use crate::error::{ErrorKind, diagnostic::Diagnostic};

pub fn duplicate_column(label: &str) -> Diagnostic {
	Diagnostic {
		kind: ErrorKind::Invalid,
		code: "TABLE_001".to_string(),
		message: format!("table builder already has column {:?}", label),
		label: None,
		help: Some("each column label must be unique within a table".to_string()),
		notes: vec![],
		cause: None,
	}
}

/// An append whose type disagrees with the column.
pub fn type_mismatch(label: &str, expected: &str, actual: &str) -> Diagnostic {
	Diagnostic {
		kind: ErrorKind::Invalid,
		code: "TABLE_002".to_string(),
		message: format!("column {:?} has type {} but a value of type {} was appended", label, expected, actual),
		label: None,
		help: None,
		notes: vec![],
		cause: None,
	}
}

pub fn column_not_found(label: &str) -> Diagnostic {
	Diagnostic {
		kind: ErrorKind::Invalid,
		code: "TABLE_003".to_string(),
		message: format!("column {:?} not found", label),
		label: Some("this column does not exist in the table".to_string()),
		help: None,
		notes: vec![],
		cause: None,
	}
}

pub fn memory_limit_exceeded(requested: usize, allocated: usize, limit: usize) -> Diagnostic {
	Diagnostic {
		kind: ErrorKind::ResourceExhausted,
		code: "TABLE_004".to_string(),
		message: format!(
			"memory limit exceeded: requested {} bytes with {} allocated of {} allowed",
			requested, allocated, limit
		),
		label: None,
		help: Some("narrow the query time range or raise the memory limit".to_string()),
		notes: vec![],
		cause: None,
	}
}

pub fn column_index_out_of_range(index: usize, ncols: usize) -> Diagnostic {
	Diagnostic {
		kind: ErrorKind::Internal,
		code: "TABLE_005".to_string(),
		message: format!("column index {} out of range for {} columns", index, ncols),
		label: None,
		help: None,
		notes: vec![],
		cause: None,
	}
}

/// The value cannot be stored in a group key or a column.
pub fn unsupported_column_value(label: &str, nature: &str) -> Diagnostic {
	Diagnostic {
		kind: ErrorKind::Invalid,
		code: "TABLE_006".to_string(),
		message: format!("column {:?} cannot hold values of type {}", label, nature),
		label: None,
		help: Some("columns hold bool, int, uint, float, string or time values".to_string()),
		notes: vec![],
		cause: None,
	}
}

pub fn schema_mismatch(reason: &str) -> Diagnostic {
	Diagnostic {
		kind: ErrorKind::Invalid,
		code: "TABLE_007".to_string(),
		message: format!("table schema mismatch: {}", reason),
		label: None,
		help: None,
		notes: vec![],
		cause: None,
	}
}
