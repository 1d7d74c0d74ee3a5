// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::sync::Arc;

use flux_column::{Allocator, SharedAllocator};
use flux_runtime::{Context, SharedClock, SystemClock};
use flux_type::Time;

use crate::metadata::MetadataSink;

/// Query-wide dependencies handed to every source and transformation.
#[derive(Debug, Clone)]
pub struct ExecutionContext {
	pub ctx: Context,
	pub alloc: SharedAllocator,
	pub metadata: MetadataSink,
	pub now: Time,
	/// Stamps processing-time marks.
	pub clock: SharedClock,
}

impl ExecutionContext {
	pub fn new(ctx: Context, alloc: SharedAllocator, metadata: MetadataSink, now: Time) -> Self {
		Self {
			ctx,
			alloc,
			metadata,
			now,
			clock: Arc::new(SystemClock),
		}
	}

	pub fn with_clock(mut self, clock: SharedClock) -> Self {
		self.clock = clock;
		self
	}

	/// An unlimited, uncancelled context; used by tests and nested lookups.
	pub fn standalone(now: Time) -> Self {
		Self::new(Context::new(), Allocator::shared(None), MetadataSink::discard(), now)
	}
}
