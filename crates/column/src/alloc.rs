// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::sync::{
	Arc,
	atomic::{AtomicUsize, Ordering},
};

use flux_type::{Result, error::diagnostic::table::memory_limit_exceeded, return_error};
use tracing::warn;

pub type SharedAllocator = Arc<Allocator>;

/// Memory accountant shared by every transformation of a query.
///
/// It does not allocate memory itself; column buffers report their sizes to
/// it so the query can be bounded and its peak usage reported.
#[derive(Debug, Default)]
pub struct Allocator {
	limit: Option<usize>,
	curr: AtomicUsize,
	peak: AtomicUsize,
	total: AtomicUsize,
}

impl Allocator {
	pub fn new(limit: Option<usize>) -> Self {
		Self {
			limit,
			..Default::default()
		}
	}

	pub fn unlimited() -> Self {
		Self::new(None)
	}

	pub fn shared(limit: Option<usize>) -> SharedAllocator {
		Arc::new(Self::new(limit))
	}

	pub fn limit(&self) -> Option<usize> {
		self.limit
	}

	/// Charges `n` bytes. Fails without charging when the limit would be exceeded.
	pub fn allocate(&self, n: usize) -> Result<()> {
		if n == 0 {
			return Ok(());
		}
		let mut curr = self.curr.load(Ordering::Acquire);
		loop {
			let next = curr.saturating_add(n);
			if let Some(limit) = self.limit {
				if next > limit {
					warn!(requested = n, allocated = curr, limit, "memory limit exceeded");
					return_error!(memory_limit_exceeded(n, curr, limit));
				}
			}
			match self.curr.compare_exchange_weak(curr, next, Ordering::AcqRel, Ordering::Acquire) {
				Ok(_) => {
					self.total.fetch_add(n, Ordering::Relaxed);
					self.peak.fetch_max(next, Ordering::AcqRel);
					return Ok(());
				}
				Err(actual) => curr = actual,
			}
		}
	}

	pub fn free(&self, n: usize) {
		if n == 0 {
			return;
		}
		let prev = self.curr.fetch_sub(n, Ordering::AcqRel);
		debug_assert!(prev >= n, "freed {} bytes with only {} allocated", n, prev);
	}

	pub fn allocated(&self) -> usize {
		self.curr.load(Ordering::Acquire)
	}

	pub fn max_allocated(&self) -> usize {
		self.peak.load(Ordering::Acquire)
	}

	pub fn total_allocated(&self) -> usize {
		self.total.load(Ordering::Acquire)
	}
}

#[cfg(test)]
mod tests {
	use std::thread;

	use flux_type::ErrorKind;

	use super::*;

	#[test]
	fn test_allocate_and_free() {
		let alloc = Allocator::unlimited();
		alloc.allocate(100).unwrap();
		alloc.allocate(50).unwrap();
		alloc.free(120);
		assert_eq!(alloc.allocated(), 30);
		assert_eq!(alloc.max_allocated(), 150);
		assert_eq!(alloc.total_allocated(), 150);
	}

	#[test]
	fn test_limit_rejects_without_charging() {
		let alloc = Allocator::new(Some(100));
		alloc.allocate(80).unwrap();
		let err = alloc.allocate(30).unwrap_err();
		assert_eq!(err.kind(), ErrorKind::ResourceExhausted);
		assert_eq!(err.code(), "TABLE_004");
		assert_eq!(alloc.allocated(), 80);
		assert_eq!(alloc.total_allocated(), 80);
	}

	#[test]
	fn test_concurrent_accounting() {
		let alloc = Allocator::shared(None);
		let handles: Vec<_> = (0..4)
			.map(|_| {
				let alloc = alloc.clone();
				thread::spawn(move || {
					for _ in 0..1000 {
						alloc.allocate(8).unwrap();
						alloc.free(8);
					}
				})
			})
			.collect();
		for handle in handles {
			handle.join().unwrap();
		}
		assert_eq!(alloc.allocated(), 0);
		assert_eq!(alloc.total_allocated(), 4 * 1000 * 8);
		assert!(alloc.max_allocated() >= 8);
	}
}
