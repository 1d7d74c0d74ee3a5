// SPDX-License-Identifier: MIT
// Copyright (c) 2025 ReifyDB

/// Builds an [`Error`](crate::Error) from a diagnostic.
#[macro_export]
macro_rules! error {
	($diagnostic:expr) => {
		$crate::Error::new($diagnostic)
	};
}

/// Returns early with an [`Error`](crate::Error) built from a diagnostic.
#[macro_export]
macro_rules! return_error {
	($diagnostic:expr) => {
		return Err($crate::error!($diagnostic))
	};
}

/// Creates an internal error diagnostic with automatic source location capture
#[macro_export]
macro_rules! internal_error {
	($reason:expr) => {
		$crate::error::diagnostic::internal::internal_with_context(
			$reason,
			file!(),
			line!(),
			column!(),
			module_path!(),
		)
	};
	($fmt:expr, $($arg:tt)*) => {
		$crate::error::diagnostic::internal::internal_with_context(
			format!($fmt, $($arg)*),
			file!(),
			line!(),
			column!(),
			module_path!(),
		)
	};
}

#[macro_export]
macro_rules! internal_err {
	($reason:expr) => {
		Err($crate::Error::new($crate::internal_error!($reason)))
	};
	($fmt:expr, $($arg:tt)*) => {
		Err($crate::Error::new($crate::internal_error!($fmt, $($arg)*)))
	};
}

#[macro_export]
macro_rules! return_internal_error {
	($reason:expr) => {
		return Err($crate::Error::new($crate::internal_error!($reason)))
	};
	($fmt:expr, $($arg:tt)*) => {
		return Err($crate::Error::new($crate::internal_error!($fmt, $($arg)*)))
	};
}
