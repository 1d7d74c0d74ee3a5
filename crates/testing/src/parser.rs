// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::collections::HashMap;

use flux_type::{Result, error::diagnostic::query::parse_failed, return_error};
use flux_vm::ast::{Package, Parser};

/// A parser answering from a fixed table of programs, for tests that
/// exercise compilation without a real front end.
#[derive(Debug, Default, Clone)]
pub struct StaticParser {
	programs: HashMap<String, Package>,
}

impl StaticParser {
	pub fn new() -> Self {
		Self::default()
	}

	/// Parsing `source` yields `package`.
	pub fn with(mut self, source: impl Into<String>, package: Package) -> Self {
		self.programs.insert(source.into(), package);
		self
	}
}

impl Parser for StaticParser {
	fn parse(&self, source: &str) -> Result<Package> {
		match self.programs.get(source) {
			Some(package) => Ok(package.clone()),
			None => return_error!(parse_failed(&format!("no program registered for {:?}", source))),
		}
	}
}

#[cfg(test)]
mod tests {
	use flux_vm::ast::{Expression, Statement};

	use super::*;

	#[test]
	fn test_known_source() {
		let package = Package::new(vec![Statement::expr(Expression::ident("x"))]);
		let parser = StaticParser::new().with("x", package.clone());
		assert_eq!(parser.parse("x").unwrap(), package);
	}

	#[test]
	fn test_unknown_source() {
		let err = StaticParser::new().parse("from(bucket: \"b\")").unwrap_err();
		assert_eq!(err.code(), "QUERY_007");
	}
}
