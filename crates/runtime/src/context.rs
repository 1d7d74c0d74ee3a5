// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! Cooperative cancellation.
//!
//! A [`Context`] pairs a [`CancellationToken`] with an optional deadline. It is
//! threaded through every source fetch and every transformation call of a
//! query; long running work checks it at yield points, and blocking sends
//! select on [`Context::done`] so they abort as soon as the query is canceled.

use std::{
	sync::{
		Arc, Weak,
		atomic::{AtomicBool, Ordering},
	},
	time::{Duration, Instant},
};

use crossbeam_channel::{Receiver, Sender, after, at, never, select};
use flux_type::{
	Error,
	error::diagnostic::query::{canceled, deadline_exceeded},
};
use parking_lot::Mutex;
use tracing::trace;

struct TokenInner {
	cancelled: AtomicBool,
	// Dropped on cancel, which disconnects every `done` receiver.
	done_tx: Mutex<Option<Sender<()>>>,
	done_rx: Receiver<()>,
	// Dropped and cancelled children are pruned whenever a child is added.
	children: Mutex<Vec<Weak<TokenInner>>>,
}

/// A shareable cancellation signal.
///
/// Cancelling is idempotent and cascades to every child token.
#[derive(Clone)]
pub struct CancellationToken {
	inner: Arc<TokenInner>,
}

impl CancellationToken {
	pub fn new() -> Self {
		let (done_tx, done_rx) = crossbeam_channel::bounded(0);
		Self {
			inner: Arc::new(TokenInner {
				cancelled: AtomicBool::new(false),
				done_tx: Mutex::new(Some(done_tx)),
				done_rx,
				children: Mutex::new(Vec::new()),
			}),
		}
	}

	/// Signal cancellation. Returns `true` for the call that actually cancelled.
	pub fn cancel(&self) -> bool {
		if self.inner.cancelled.swap(true, Ordering::SeqCst) {
			return false;
		}
		self.inner.done_tx.lock().take();
		let children = std::mem::take(&mut *self.inner.children.lock());
		for inner in children.iter().filter_map(Weak::upgrade) {
			CancellationToken {
				inner,
			}
			.cancel();
		}
		true
	}

	pub fn is_cancelled(&self) -> bool {
		self.inner.cancelled.load(Ordering::SeqCst)
	}

	/// A receiver that becomes ready (disconnected) once the token is cancelled.
	pub fn done(&self) -> Receiver<()> {
		self.inner.done_rx.clone()
	}

	/// A token cancelled together with this one, but cancellable on its own.
	pub fn child(&self) -> CancellationToken {
		let child = CancellationToken::new();
		let mut children = self.inner.children.lock();
		if self.is_cancelled() {
			child.cancel();
		} else {
			children.retain(|weak| weak.upgrade().is_some_and(|inner| !inner.cancelled.load(Ordering::SeqCst)));
			children.push(Arc::downgrade(&child.inner));
		}
		child
	}

	#[cfg(test)]
	fn tracked_children(&self) -> usize {
		self.inner.children.lock().len()
	}
}

impl Default for CancellationToken {
	fn default() -> Self {
		Self::new()
	}
}

impl std::fmt::Debug for CancellationToken {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("CancellationToken").field("cancelled", &self.is_cancelled()).finish()
	}
}

/// Cancellation token plus an optional deadline.
#[derive(Clone, Debug, Default)]
pub struct Context {
	token: CancellationToken,
	deadline: Option<Instant>,
}

impl Context {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn with_token(token: CancellationToken) -> Self {
		Self {
			token,
			deadline: None,
		}
	}

	pub fn with_timeout(timeout: Duration) -> Self {
		Self::new().deadline(Instant::now() + timeout)
	}

	pub fn deadline(mut self, deadline: Instant) -> Self {
		self.deadline = Some(match self.deadline {
			Some(existing) => existing.min(deadline),
			None => deadline,
		});
		self
	}

	/// A context whose token is a child of this one; the deadline carries over.
	pub fn child(&self) -> Context {
		Context {
			token: self.token.child(),
			deadline: self.deadline,
		}
	}

	pub fn token(&self) -> &CancellationToken {
		&self.token
	}

	pub fn cancel(&self) -> bool {
		let cancelled = self.token.cancel();
		if cancelled {
			trace!("context cancelled");
		}
		cancelled
	}

	pub fn is_cancelled(&self) -> bool {
		self.token.is_cancelled() || self.deadline_passed()
	}

	fn deadline_passed(&self) -> bool {
		self.deadline.is_some_and(|deadline| Instant::now() >= deadline)
	}

	/// `Canceled` or `DeadlineExceeded` once the context is done.
	pub fn err(&self) -> Option<Error> {
		if self.token.is_cancelled() {
			Some(Error::new(canceled()))
		} else if self.deadline_passed() {
			Some(Error::new(deadline_exceeded()))
		} else {
			None
		}
	}

	/// Fails with the context error when the context is done.
	pub fn check(&self) -> flux_type::Result<()> {
		match self.err() {
			Some(err) => Err(err),
			None => Ok(()),
		}
	}

	pub fn done(&self) -> Receiver<()> {
		self.token.done()
	}

	/// A receiver firing at the deadline, or never.
	pub fn deadline_rx(&self) -> Receiver<Instant> {
		match self.deadline {
			Some(deadline) => at(deadline),
			None => never(),
		}
	}

	/// Sleeps for `duration` unless the context is done first.
	/// Returns `false` when woken by cancellation or the deadline.
	pub fn sleep(&self, duration: Duration) -> bool {
		let done = self.done();
		let deadline = self.deadline_rx();
		select! {
			recv(done) -> _ => false,
			recv(deadline) -> _ => false,
			recv(after(duration)) -> _ => true,
		}
	}

	/// Sends `item`, blocking until there is capacity or the context is done.
	pub fn send<T>(&self, tx: &Sender<T>, item: T) -> flux_type::Result<()> {
		self.check()?;
		let done = self.done();
		let deadline = self.deadline_rx();
		select! {
			send(tx, item) -> res => match res {
				Ok(()) => Ok(()),
				Err(_) => Err(Error::new(canceled())),
			},
			recv(done) -> _ => Err(Error::new(canceled())),
			recv(deadline) -> _ => Err(Error::new(deadline_exceeded())),
		}
	}
}
