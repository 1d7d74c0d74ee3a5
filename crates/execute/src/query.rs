// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::{
	any::Any,
	fmt::{Debug, Formatter},
	sync::{
		Arc,
		atomic::{AtomicBool, Ordering},
	},
	thread::JoinHandle,
	time::{Duration, Instant},
};

use crossbeam_channel::Receiver;
use flux_column::{SharedAllocator, Table};
use flux_runtime::Context;
use flux_type::{Error, Stream, error::diagnostic::query::canceled, internal_error};
use parking_lot::Mutex;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::{
	metadata::Metadata,
	result::{ErrorSlot, QueryResult},
};

/// Resource usage of a finished query.
#[derive(Debug, Clone, PartialEq)]
pub struct Statistics {
	pub max_allocated: usize,
	pub total_allocated: usize,
	pub metadata: Metadata,
	/// Wall-clock time from start until `done`.
	pub span: Duration,
}

/// A running query.
///
/// Results are read from [`Query::results`]. `done` must be called to
/// release the workers; dropping the query calls it.
pub struct Query {
	id: Uuid,
	ctx: Context,
	results: Receiver<QueryResult>,
	result_tables: Vec<Receiver<Table>>,
	err: ErrorSlot,
	canceled: AtomicBool,
	// Set when `done` stopped a query that was still live.
	released: AtomicBool,
	workers: Mutex<Vec<JoinHandle<()>>>,
	forwarder: Mutex<Option<JoinHandle<()>>>,
	metadata: Arc<Mutex<Metadata>>,
	alloc: SharedAllocator,
	started: Instant,
	statistics: Mutex<Option<Statistics>>,
}

pub(crate) struct QueryParts {
	pub id: Uuid,
	pub ctx: Context,
	pub results: Receiver<QueryResult>,
	pub result_tables: Vec<Receiver<Table>>,
	pub err: ErrorSlot,
	pub workers: Vec<JoinHandle<()>>,
	pub forwarder: JoinHandle<()>,
	pub metadata: Arc<Mutex<Metadata>>,
	pub alloc: SharedAllocator,
	pub started: Instant,
}

impl Query {
	pub(crate) fn new(parts: QueryParts) -> Self {
		Self {
			id: parts.id,
			ctx: parts.ctx,
			results: parts.results,
			result_tables: parts.result_tables,
			err: parts.err,
			canceled: AtomicBool::new(false),
			released: AtomicBool::new(false),
			workers: Mutex::new(parts.workers),
			forwarder: Mutex::new(Some(parts.forwarder)),
			metadata: parts.metadata,
			alloc: parts.alloc,
			started: parts.started,
			statistics: Mutex::new(None),
		}
	}

	pub fn id(&self) -> Uuid {
		self.id
	}

	/// One entry per yield. The channel is closed once every entry was sent.
	pub fn results(&self) -> &Receiver<QueryResult> {
		&self.results
	}

	/// Stops the query and waits for every worker. Tables not yet read are
	/// released. Idempotent.
	pub fn done(&self) {
		let mut statistics = self.statistics.lock();
		if statistics.is_some() {
			return;
		}
		if self.ctx.err().is_none() {
			self.released.store(true, Ordering::Release);
		}
		self.ctx.cancel();

		let workers: Vec<_> = self.workers.lock().drain(..).collect();
		for worker in workers {
			self.join(worker);
		}
		for tables in &self.result_tables {
			while tables.try_recv().is_ok() {}
		}
		if let Some(forwarder) = self.forwarder.lock().take() {
			self.join(forwarder);
		}

		let stats = self.snapshot();
		debug!(
			query = %self.id,
			max_allocated = stats.max_allocated,
			span_ms = stats.span.as_millis() as u64,
			"query done"
		);
		*statistics = Some(stats);
	}

	fn join(&self, handle: JoinHandle<()>) {
		let name = handle.thread().name().unwrap_or("worker").to_string();
		if handle.join().is_err() {
			warn!(query = %self.id, worker = %name, "query worker panicked");
			self.err.set(Error::new(internal_error!("query worker {} panicked", name)));
		}
	}

	/// Requests cancellation. Idempotent; returns `false` on repeated calls.
	pub fn cancel(&self) -> bool {
		if self.canceled.swap(true, Ordering::AcqRel) {
			return false;
		}
		debug!(query = %self.id, "query canceled");
		self.ctx.cancel();
		true
	}

	/// The first error of any result, or `Canceled` after [`Query::cancel`].
	/// Cancellation caused by `done` stopping a live query is not reported.
	pub fn err(&self) -> Option<Error> {
		match self.err.get() {
			Some(err) if err.is_canceled() && self.released.load(Ordering::Acquire) => None,
			Some(err) => Some(err),
			None if self.canceled.load(Ordering::Acquire) => Some(Error::new(canceled())),
			None => None,
		}
	}

	/// Statistics of the finished query; calls [`Query::done`] first.
	pub fn statistics(&self) -> Statistics {
		self.done();
		self.statistics.lock().clone().unwrap_or_else(|| self.snapshot())
	}

	fn snapshot(&self) -> Statistics {
		Statistics {
			max_allocated: self.alloc.max_allocated(),
			total_allocated: self.alloc.total_allocated(),
			metadata: self.metadata.lock().clone(),
			span: self.started.elapsed(),
		}
	}
}

impl Debug for Query {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("Query")
			.field("id", &self.id)
			.field("results", &self.result_tables.len())
			.field("canceled", &self.canceled.load(Ordering::Relaxed))
			.finish()
	}
}

impl Stream for Query {
	fn as_any(&self) -> &dyn Any {
		self
	}

	fn into_any(self: Arc<Self>) -> Arc<dyn Any + Send + Sync> {
		self
	}
}

impl Drop for Query {
	fn drop(&mut self) {
		self.done();
	}
}
