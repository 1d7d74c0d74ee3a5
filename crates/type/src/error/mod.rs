// SPDX-License-Identifier: MIT
// Copyright (c) 2025 ReifyDB

use std::{
	fmt::{Display, Formatter},
	ops::{Deref, DerefMut},
};

use serde::{Deserialize, Serialize};

pub mod diagnostic;
mod r#macro;

use diagnostic::Diagnostic;

/// Abstract classification of an error, independent of where it was raised.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
	Invalid,
	NotFound,
	Internal,
	Canceled,
	DeadlineExceeded,
	ResourceExhausted,
	PermissionDenied,
	Unimplemented,
	/// Takes the kind of the first cause that is not `Inherit`.
	Inherit,
}

impl Display for ErrorKind {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		let name = match self {
			ErrorKind::Invalid => "invalid",
			ErrorKind::NotFound => "not found",
			ErrorKind::Internal => "internal error",
			ErrorKind::Canceled => "canceled",
			ErrorKind::DeadlineExceeded => "deadline exceeded",
			ErrorKind::ResourceExhausted => "resource exhausted",
			ErrorKind::PermissionDenied => "permission denied",
			ErrorKind::Unimplemented => "unimplemented",
			ErrorKind::Inherit => "inherit",
		};
		f.write_str(name)
	}
}

#[derive(Debug, Clone, PartialEq)]
pub struct Error(pub Box<Diagnostic>);

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
	pub fn new(diagnostic: Diagnostic) -> Self {
		Self(Box::new(diagnostic))
	}

	/// The effective kind, resolving `Inherit` through the cause chain.
	pub fn kind(&self) -> ErrorKind {
		self.0.effective_kind()
	}

	pub fn code(&self) -> &str {
		&self.0.code
	}

	pub fn is_canceled(&self) -> bool {
		matches!(self.kind(), ErrorKind::Canceled | ErrorKind::DeadlineExceeded)
	}

	pub fn diagnostic(self) -> Diagnostic {
		*self.0
	}

	/// Wraps this error as the cause of a new error.
	pub fn wrap(self, kind: ErrorKind, message: impl Into<String>) -> Self {
		let mut outer = Diagnostic::new(kind, "WRAPPED", message);
		outer.cause = Some(self.0);
		Self(Box::new(outer))
	}
}

impl Deref for Error {
	type Target = Diagnostic;

	fn deref(&self) -> &Self::Target {
		&self.0
	}
}

impl DerefMut for Error {
	fn deref_mut(&mut self) -> &mut Self::Target {
		&mut self.0
	}
}

impl Display for Error {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		Display::fmt(&self.0, f)
	}
}

impl std::error::Error for Error {
	fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
		self.0.cause.as_deref().map(|cause| cause as &(dyn std::error::Error + 'static))
	}
}

impl From<Diagnostic> for Error {
	fn from(diagnostic: Diagnostic) -> Self {
		Self::new(diagnostic)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::error::diagnostic::{query, value};

	#[test]
	fn test_inherit_resolves_through_cause() {
		let err = Error::new(query::canceled()).wrap(ErrorKind::Inherit, "source failed");
		assert_eq!(err.kind(), ErrorKind::Canceled);
		assert!(err.is_canceled());
	}

	#[test]
	fn test_inherit_without_cause_is_internal() {
		let err = Error::new(Diagnostic::new(ErrorKind::Inherit, "X", "lonely"));
		assert_eq!(err.kind(), ErrorKind::Internal);
	}

	#[test]
	fn test_display_includes_cause_chain() {
		let err = Error::new(value::null_operand("record_with")).wrap(ErrorKind::Invalid, "map failed");
		let rendered = err.to_string();
		assert!(rendered.starts_with("map failed"));
		assert!(rendered.contains("null"));
	}

	#[test]
	fn test_source_follows_cause() {
		use std::error::Error as _;
		let err = Error::new(query::canceled()).wrap(ErrorKind::Inherit, "outer");
		let source = err.source().expect("cause");
		assert!(source.to_string().contains("canceled"));
	}
}
