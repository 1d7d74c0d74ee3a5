// SPDX-License-Identifier: MIT
// Copyright (c) 2025 ReifyDB

use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

use crate::error::ErrorKind;

pub mod internal;
pub mod plan;
pub mod query;
pub mod runtime;
pub mod table;
pub mod value;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Diagnostic {
	pub kind: ErrorKind,
	pub code: String,
	pub message: String,
	pub label: Option<String>,
	pub help: Option<String>,
	pub notes: Vec<String>,
	pub cause: Option<Box<Diagnostic>>,
}

impl Diagnostic {
	pub fn new(kind: ErrorKind, code: impl Into<String>, message: impl Into<String>) -> Self {
		Self {
			kind,
			code: code.into(),
			message: message.into(),
			label: None,
			help: None,
			notes: vec![],
			cause: None,
		}
	}

	pub fn with_label(mut self, label: impl Into<String>) -> Self {
		self.label = Some(label.into());
		self
	}

	pub fn with_help(mut self, help: impl Into<String>) -> Self {
		self.help = Some(help.into());
		self
	}

	pub fn with_note(mut self, note: impl Into<String>) -> Self {
		self.notes.push(note.into());
		self
	}

	pub fn with_cause(mut self, cause: Diagnostic) -> Self {
		self.cause = Some(Box::new(cause));
		self
	}

	pub fn effective_kind(&self) -> ErrorKind {
		let mut current = Some(self);
		while let Some(diagnostic) = current {
			if diagnostic.kind != ErrorKind::Inherit {
				return diagnostic.kind;
			}
			current = diagnostic.cause.as_deref();
		}
		ErrorKind::Internal
	}

	/// Multi-line rendering with label, help and notes of the whole chain.
	pub fn render(&self) -> String {
		let mut out = String::new();
		let mut current = Some(self);
		let mut depth = 0;
		while let Some(diagnostic) = current {
			let indent = "  ".repeat(depth);
			if depth > 0 {
				out.push_str(&format!("{indent}caused by:\n"));
			}
			out.push_str(&format!(
				"{indent}[{}] {} ({})\n",
				diagnostic.code,
				diagnostic.message,
				diagnostic.kind
			));
			if let Some(label) = &diagnostic.label {
				out.push_str(&format!("{indent}  --> {label}\n"));
			}
			if let Some(help) = &diagnostic.help {
				out.push_str(&format!("{indent}  help: {help}\n"));
			}
			for note in &diagnostic.notes {
				out.push_str(&format!("{indent}  note: {note}\n"));
			}
			current = diagnostic.cause.as_deref();
			depth += 1;
		}
		out
	}
}

impl Display for Diagnostic {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		f.write_str(&self.message)?;
		if let Some(cause) = &self.cause {
			write!(f, ": {}", cause)?;
		}
		Ok(())
	}
}

impl std::error::Error for Diagnostic {
	fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
		self.cause.as_deref().map(|cause| cause as &(dyn std::error::Error + 'static))
	}
}

/// Conversion of local error enums into a diagnostic.
pub trait IntoDiagnostic {
	fn into_diagnostic(self) -> Diagnostic;
}
