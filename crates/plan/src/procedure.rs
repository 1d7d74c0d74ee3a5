// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::{
	any::Any,
	fmt::{Debug, Display, Formatter},
	ops::Add,
	sync::Arc,
};

use flux_type::Time;
use serde::{Deserialize, Serialize};

use crate::trigger::TriggerSpec;

pub const YIELD_KIND: &str = "yield";

/// Name of a procedure; plan rules and the executor registry are keyed by it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ProcedureKind(Arc<str>);

impl ProcedureKind {
	pub fn new(kind: impl AsRef<str>) -> Self {
		ProcedureKind(Arc::from(kind.as_ref()))
	}

	pub fn as_str(&self) -> &str {
		&self.0
	}
}

impl From<&str> for ProcedureKind {
	fn from(value: &str) -> Self {
		ProcedureKind::new(value)
	}
}

impl PartialEq<str> for ProcedureKind {
	fn eq(&self, other: &str) -> bool {
		&*self.0 == other
	}
}

impl PartialEq<&str> for ProcedureKind {
	fn eq(&self, other: &&str) -> bool {
		&*self.0 == *other
	}
}

impl Display for ProcedureKind {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		f.write_str(&self.0)
	}
}

/// Estimated cost of a procedure. Only used as a rule measure.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Cost {
	pub rows: u64,
	pub cpu: u64,
}

impl Cost {
	pub fn total(&self) -> u64 {
		self.rows.saturating_add(self.cpu)
	}
}

impl Add for Cost {
	type Output = Cost;

	fn add(self, rhs: Self) -> Self::Output {
		Cost {
			rows: self.rows.saturating_add(rhs.rows),
			cpu: self.cpu.saturating_add(rhs.cpu),
		}
	}
}

/// Half-open time interval `[start, stop)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Bounds {
	pub start: Time,
	pub stop: Time,
}

impl Bounds {
	pub fn new(start: Time, stop: Time) -> Self {
		Self {
			start,
			stop,
		}
	}

	pub fn unbounded() -> Self {
		Self::new(Time::MIN, Time::MAX)
	}

	pub fn is_empty(&self) -> bool {
		self.start >= self.stop
	}

	pub fn contains(&self, t: Time) -> bool {
		self.start <= t && t < self.stop
	}

	pub fn intersect(&self, other: &Bounds) -> Bounds {
		Bounds::new(self.start.max(other.start), self.stop.min(other.stop))
	}

	pub fn union(&self, other: &Bounds) -> Bounds {
		Bounds::new(self.start.min(other.start), self.stop.max(other.stop))
	}
}

impl Display for Bounds {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		write!(f, "[{}, {})", self.start, self.stop)
	}
}

/// Planner-side parameters of a plan node.
pub trait ProcedureSpec: Debug + Send + Sync {
	fn kind(&self) -> ProcedureKind;

	fn copy(&self) -> Box<dyn ProcedureSpec>;

	fn as_any(&self) -> &dyn Any;

	fn cost(&self) -> Cost {
		Cost::default()
	}

	/// Narrow procedures map each input table to output tables independently.
	fn is_narrow(&self) -> bool {
		false
	}

	/// The trigger a wide procedure requires; `None` uses the default.
	fn trigger_spec(&self) -> Option<TriggerSpec> {
		None
	}

	/// Time bounds imposed by range-like procedures.
	fn bounds(&self) -> Option<Bounds> {
		None
	}

	fn yield_name(&self) -> Option<&str> {
		None
	}
}

/// Marks the output of a branch as a named query result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct YieldProcedureSpec {
	pub name: String,
}

impl YieldProcedureSpec {
	pub const DEFAULT_NAME: &'static str = "_result";

	pub fn new(name: impl Into<String>) -> Self {
		Self {
			name: name.into(),
		}
	}
}

impl ProcedureSpec for YieldProcedureSpec {
	fn kind(&self) -> ProcedureKind {
		ProcedureKind::new(YIELD_KIND)
	}

	fn copy(&self) -> Box<dyn ProcedureSpec> {
		Box::new(self.clone())
	}

	fn as_any(&self) -> &dyn Any {
		self
	}

	fn is_narrow(&self) -> bool {
		true
	}

	fn yield_name(&self) -> Option<&str> {
		Some(&self.name)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_bounds_intersection() {
		let a = Bounds::new(Time(0), Time(10));
		let b = Bounds::new(Time(5), Time(20));
		assert_eq!(a.intersect(&b), Bounds::new(Time(5), Time(10)));
		assert_eq!(a.union(&b), Bounds::new(Time(0), Time(20)));
		assert!(a.intersect(&Bounds::new(Time(10), Time(11))).is_empty());
		assert!(a.contains(Time(0)) && !a.contains(Time(10)));
	}
}
