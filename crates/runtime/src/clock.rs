// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::{fmt::Debug, sync::Arc};

use flux_type::Time;
use parking_lot::Mutex;

/// Source of the current time. Queries read it once when they start.
pub trait Clock: Debug + Send + Sync {
	fn now(&self) -> Time;
}

pub type SharedClock = Arc<dyn Clock>;

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
	fn now(&self) -> Time {
		Time::now()
	}
}

/// Clock returning a settable instant, for tests and replays.
#[derive(Debug)]
pub struct FixedClock {
	now: Mutex<Time>,
}

impl FixedClock {
	pub fn new(now: Time) -> Self {
		Self {
			now: Mutex::new(now),
		}
	}

	pub fn set(&self, now: Time) {
		*self.now.lock() = now;
	}

	pub fn advance(&self, by: flux_type::Duration) {
		let mut now = self.now.lock();
		*now = now.add(by);
	}
}

impl Clock for FixedClock {
	fn now(&self) -> Time {
		*self.now.lock()
	}
}

#[cfg(test)]
mod tests {
	use flux_type::Duration;

	use super::*;

	#[test]
	fn test_fixed_clock() {
		let clock = FixedClock::new(Time::from_secs(100));
		assert_eq!(clock.now(), Time::from_secs(100));
		clock.advance(Duration::from_secs(5));
		assert_eq!(clock.now(), Time::from_secs(105));
		clock.set(Time::from_secs(1));
		assert_eq!(clock.now(), Time::from_secs(1));
	}
}
