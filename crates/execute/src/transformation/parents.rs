// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use flux_type::{Error, Result, Time, internal_err};
use indexmap::IndexMap;
use tracing::warn;

use crate::dataset::DatasetId;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lifecycle {
	/// Registered, nothing received yet.
	Open,
	Running,
	/// Finished while siblings are still running.
	Finishing,
	Closed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParentState {
	pub mark: Time,
	pub processing: Time,
	pub finished: bool,
	pub lifecycle: Lifecycle,
}

impl ParentState {
	fn new() -> Self {
		Self {
			mark: Time::MIN,
			processing: Time::MIN,
			finished: false,
			lifecycle: Lifecycle::Open,
		}
	}
}

/// Per-parent bookkeeping of a multi-parent transformation.
///
/// The tracker is kept behind the transformation's mutex. Its methods only
/// decide what to emit; the caller emits after releasing the lock.
#[derive(Debug)]
pub struct ParentTracker {
	parents: IndexMap<DatasetId, ParentState>,
	mark: Time,
	processing: Time,
	err: Option<Error>,
	dropped_errors: usize,
	closed: bool,
}

impl ParentTracker {
	pub fn new(parents: impl IntoIterator<Item = DatasetId>) -> Self {
		Self {
			parents: parents.into_iter().map(|id| (id, ParentState::new())).collect(),
			mark: Time::MIN,
			processing: Time::MIN,
			err: None,
			dropped_errors: 0,
			closed: false,
		}
	}

	pub fn len(&self) -> usize {
		self.parents.len()
	}

	pub fn is_empty(&self) -> bool {
		self.parents.is_empty()
	}

	pub fn parent(&self, id: &DatasetId) -> Option<&ParentState> {
		self.parents.get(id)
	}

	/// Position of `id` among the parents, in plan order.
	pub fn position(&self, id: &DatasetId) -> Option<usize> {
		self.parents.get_index_of(id)
	}

	pub fn is_finished(&self, id: &DatasetId) -> bool {
		self.parents.get(id).is_some_and(|p| p.finished)
	}

	pub fn is_closed(&self) -> bool {
		self.closed
	}

	/// The last watermark emitted downstream.
	pub fn mark(&self) -> Time {
		self.mark
	}

	/// The last processing time emitted downstream.
	pub fn processing(&self) -> Time {
		self.processing
	}

	pub fn dropped_errors(&self) -> usize {
		self.dropped_errors
	}

	fn state(&mut self, id: &DatasetId) -> Result<&mut ParentState> {
		match self.parents.get_mut(id) {
			Some(state) => Ok(state),
			None => internal_err!("unknown parent dataset {}", id),
		}
	}

	/// Records that `parent` delivered a table.
	pub fn process(&mut self, parent: &DatasetId) -> Result<()> {
		let state = self.state(parent)?;
		if state.finished {
			return internal_err!("table from finished parent {}", parent);
		}
		state.lifecycle = Lifecycle::Running;
		Ok(())
	}

	/// Updates the watermark of `parent`; returns the downstream watermark
	/// when the minimum over all parents advanced.
	pub fn update_watermark(&mut self, parent: &DatasetId, mark: Time) -> Result<Option<Time>> {
		let state = self.state(parent)?;
		if mark <= state.mark {
			return Ok(None);
		}
		state.mark = mark;
		state.lifecycle = state.lifecycle.max_running();
		let min = self.parents.values().map(|p| p.mark).min().unwrap_or(Time::MIN);
		if min > self.mark {
			self.mark = min;
			return Ok(Some(min));
		}
		Ok(None)
	}

	pub fn update_processing_time(&mut self, parent: &DatasetId, time: Time) -> Result<Option<Time>> {
		let state = self.state(parent)?;
		if time <= state.processing {
			return Ok(None);
		}
		state.processing = time;
		let min = self.parents.values().map(|p| p.processing).min().unwrap_or(Time::MIN);
		if min > self.processing {
			self.processing = min;
			return Ok(Some(min));
		}
		Ok(None)
	}

	/// Records the end of `parent`. Returns `Some(first error)` exactly once,
	/// when the last parent finished.
	pub fn finish(&mut self, parent: &DatasetId, err: Option<Error>) -> Option<Option<Error>> {
		let Some(state) = self.parents.get_mut(parent) else {
			warn!(%parent, "finish from unknown parent");
			return None;
		};
		if state.finished {
			warn!(%parent, "parent finished twice");
			return None;
		}
		state.finished = true;
		state.lifecycle = Lifecycle::Finishing;

		if let Some(err) = err {
			if self.err.is_none() {
				self.err = Some(err);
			} else {
				self.dropped_errors += 1;
				warn!(%parent, error = %err, "dropping error, an earlier parent already failed");
			}
		}

		if self.closed || !self.parents.values().all(|p| p.finished) {
			return None;
		}
		self.closed = true;
		for state in self.parents.values_mut() {
			state.lifecycle = Lifecycle::Closed;
		}
		Some(self.err.take())
	}
}

impl Lifecycle {
	fn max_running(self) -> Lifecycle {
		match self {
			Lifecycle::Open => Lifecycle::Running,
			other => other,
		}
	}
}
