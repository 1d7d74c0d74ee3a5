// SPDX-License-Identifier: MIT
// Copyright (c) 2025 ReifyDB

use std::{
	fmt::{Display, Formatter},
	sync::Arc,
};

use regex::Regex;

use crate::{Result, error::diagnostic::value::invalid_regexp, return_error};

#[derive(Debug, Clone)]
pub struct Regexp(Arc<Regex>);

impl Regexp {
	pub fn new(pattern: &str) -> Result<Self> {
		match Regex::new(pattern) {
			Ok(regex) => Ok(Self(Arc::new(regex))),
			Err(err) => return_error!(invalid_regexp(pattern, &err.to_string())),
		}
	}

	pub fn as_str(&self) -> &str {
		self.0.as_str()
	}

	pub fn is_match(&self, text: &str) -> bool {
		self.0.is_match(text)
	}
}

impl PartialEq for Regexp {
	fn eq(&self, other: &Self) -> bool {
		self.as_str() == other.as_str()
	}
}

impl Display for Regexp {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		write!(f, "/{}/", self.as_str())
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_invalid_pattern() {
		assert_eq!(Regexp::new("(").unwrap_err().code(), "VALUE_009");
	}

	#[test]
	fn test_match() {
		let re = Regexp::new("^cpu[0-9]+$").unwrap();
		assert!(re.is_match("cpu12"));
		assert!(!re.is_match("mem"));
		assert_eq!(re.to_string(), "/^cpu[0-9]+$/");
	}
}
