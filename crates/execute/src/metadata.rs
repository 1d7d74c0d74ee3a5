// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use crossbeam_channel::Sender;
use flux_type::Value;
use indexmap::IndexMap;
use tracing::trace;

/// Query metadata reported by sources and transformations.
///
/// Integer entries recorded under the same key are summed; any other value
/// replaces the previous one.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Metadata(IndexMap<String, Value>);

impl Metadata {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn record(&mut self, key: impl Into<String>, value: Value) {
		let key = key.into();
		match (self.0.get_mut(&key), value) {
			(Some(Value::Int(existing)), Value::Int(v)) => *existing = existing.saturating_add(v),
			(_, value) => {
				self.0.insert(key, value);
			}
		}
	}

	pub fn get(&self, key: &str) -> Option<&Value> {
		self.0.get(key)
	}

	pub fn len(&self) -> usize {
		self.0.len()
	}

	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}

	pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
		self.0.iter().map(|(k, v)| (k.as_str(), v))
	}
}

/// Sending half of the metadata channel drained by the forwarder.
#[derive(Debug, Clone, Default)]
pub struct MetadataSink {
	tx: Option<Sender<(String, Value)>>,
}

impl MetadataSink {
	pub fn new(tx: Sender<(String, Value)>) -> Self {
		Self {
			tx: Some(tx),
		}
	}

	/// A sink that drops everything.
	pub fn discard() -> Self {
		Self::default()
	}

	pub fn record(&self, key: impl Into<String>, value: Value) {
		let Some(tx) = &self.tx else {
			return;
		};
		let key = key.into();
		trace!(%key, "metadata recorded");
		// the forwarder outlives every sender, a closed channel means the query is gone
		let _ = tx.send((key, value));
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_integers_accumulate() {
		let mut metadata = Metadata::new();
		metadata.record("dropped_errors", Value::int(1));
		metadata.record("dropped_errors", Value::int(2));
		metadata.record("source", Value::string("a"));
		metadata.record("source", Value::string("b"));
		assert_eq!(metadata.get("dropped_errors"), Some(&Value::int(3)));
		assert_eq!(metadata.get("source"), Some(&Value::string("b")));
		assert_eq!(metadata.len(), 2);
	}
}
