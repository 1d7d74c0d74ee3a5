// SPDX-License-Identifier: MIT
// Copyright (c) 2025 ReifyDB

use std::time::{SystemTime, UNIX_EPOCH};

use crate::error::{ErrorKind, diagnostic::Diagnostic};

pub fn internal(reason: impl Into<String>) -> Diagnostic {
	Diagnostic {
		kind: ErrorKind::Internal,
		code: "INTERNAL_ERROR".to_string(),
		message: format!("internal error: {}", reason.into()),
		label: None,
		help: Some("this is a bug in the query runtime, please report it".to_string()),
		notes: vec![],
		cause: None,
	}
}

/// Internal error carrying the source location it was raised at.
pub fn internal_with_context(
	reason: impl Into<String>,
	file: &str,
	line: u32,
	column: u32,
	module: &str,
) -> Diagnostic {
	let timestamp = SystemTime::now().duration_since(UNIX_EPOCH).map(|d| d.as_millis()).unwrap_or(0);
	let id = format!("ERR-{}-{}:{}", timestamp, file.rsplit('/').next().unwrap_or(file), line);

	Diagnostic {
		kind: ErrorKind::Internal,
		code: "INTERNAL_ERROR".to_string(),
		message: format!("internal error [{}]: {}", id, reason.into()),
		label: Some(format!("raised at {}:{}:{}", file, line, column)),
		help: Some("this is a bug in the query runtime, please report it".to_string()),
		notes: vec![format!("module: {}", module), format!("error id: {}", id)],
		cause: None,
	}
}

#[cfg(test)]
mod tests {
	use crate::{ErrorKind, internal_err};

	fn fails() -> crate::Result<()> {
		internal_err!("broken invariant {}", 42)
	}

	#[test]
	fn test_internal_error_captures_location() {
		let err = fails().unwrap_err();
		assert_eq!(err.kind(), ErrorKind::Internal);
		assert!(err.message.contains("broken invariant 42"));
		assert!(err.label.as_deref().unwrap_or_default().contains("internal.rs"));
	}
}
