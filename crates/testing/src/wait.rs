// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! Polling helpers for tests that observe worker threads, so tests do not
//! depend on fixed sleeps.

use std::{
	thread,
	time::{Duration, Instant},
};

use tracing::debug;

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(1);

/// Polls `condition` every `poll_interval` until it holds.
///
/// # Panics
/// Panics with `message` when the condition does not hold within `timeout`.
pub fn wait_for_condition<F>(condition: F, timeout: Duration, poll_interval: Duration, message: &str)
where
	F: Fn() -> bool,
{
	let start = Instant::now();
	let mut polls = 0u64;
	while !condition() {
		if start.elapsed() > timeout {
			panic!("timeout after {:?}: {}", timeout, message);
		}
		polls += 1;
		thread::sleep(poll_interval);
	}
	debug!(polls, elapsed = ?start.elapsed(), message, "condition met");
}

/// [`wait_for_condition`] with the default timeout and poll interval.
pub fn wait_for<F>(condition: F, message: &str)
where
	F: Fn() -> bool,
{
	wait_for_condition(condition, DEFAULT_TIMEOUT, DEFAULT_POLL_INTERVAL, message);
}

#[cfg(test)]
mod tests {
	use std::sync::{
		Arc,
		atomic::{AtomicBool, Ordering},
	};

	use super::*;

	#[test]
	fn test_wait_for_immediate() {
		wait_for(|| true, "already true");
	}

	#[test]
	fn test_wait_for_other_thread() {
		let flag = Arc::new(AtomicBool::new(false));
		let setter = Arc::clone(&flag);
		let handle = thread::spawn(move || {
			thread::sleep(Duration::from_millis(10));
			setter.store(true, Ordering::SeqCst);
		});
		wait_for(|| flag.load(Ordering::SeqCst), "flag set by worker");
		handle.join().unwrap();
	}

	#[test]
	#[should_panic(expected = "never true")]
	fn test_wait_for_timeout() {
		wait_for_condition(|| false, Duration::from_millis(20), Duration::from_millis(1), "never true");
	}
}
