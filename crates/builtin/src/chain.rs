// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::{any::Any, sync::Arc};

use flux_column::{GroupKey, Table};
use flux_execute::{
	CreateContext, Dataset, DatasetId, ExecutionContext, ParentTracker, PassthroughDataset, Transformation,
};
use flux_plan::{OperationSpec, ProcedureKind, ProcedureSpec};
use flux_type::{Arguments, Error, Param, Result, Time, Type, Value, internal_err};
use parking_lot::Mutex;
use tracing::debug;

use crate::{
	Library,
	function::TableFunction,
	transform::{Created, lower, operation_spec},
};

pub const KIND: &str = "chain";

/// `chain(first, second)`: the tables of `first`, then those of `second`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChainSpec;

operation_spec!(ChainSpec, KIND);

impl ChainSpec {
	fn create(_args: &Arguments, _now: Time) -> Result<Arc<dyn OperationSpec>> {
		Ok(Arc::new(ChainSpec))
	}
}

impl ProcedureSpec for ChainSpec {
	fn kind(&self) -> ProcedureKind {
		ProcedureKind::new(KIND)
	}

	fn copy(&self) -> Box<dyn ProcedureSpec> {
		Box::new(self.clone())
	}

	fn as_any(&self) -> &dyn Any {
		self
	}
}

struct ChainState {
	parents: ParentTracker,
	first_done: bool,
	pending: Vec<Table>,
	failed: Option<Error>,
}

/// Forwards the first parent's tables as they arrive and holds back the
/// second parent's until the first one finished.
pub struct ChainTransformation {
	first: DatasetId,
	dataset: Arc<PassthroughDataset>,
	state: Mutex<ChainState>,
	// serializes emission so released tables keep their arrival order
	emit: Mutex<()>,
	exec: ExecutionContext,
}

impl ChainTransformation {
	pub fn new(id: DatasetId, parents: Vec<DatasetId>, exec: ExecutionContext) -> Result<Self> {
		let [first, second] = parents.as_slice() else {
			return internal_err!("chain {} needs two parents, got {}", id, parents.len());
		};
		if first == second {
			return internal_err!("chain {} needs two distinct parents", id);
		}
		Ok(Self {
			first: first.clone(),
			dataset: Arc::new(PassthroughDataset::new(id)),
			state: Mutex::new(ChainState {
				parents: ParentTracker::new(parents),
				first_done: false,
				pending: Vec::new(),
				failed: None,
			}),
			emit: Mutex::new(()),
			exec,
		})
	}

	pub fn dataset(&self) -> Arc<PassthroughDataset> {
		Arc::clone(&self.dataset)
	}

	fn create(create: &CreateContext<'_>) -> Result<Created> {
		let transformation =
			Arc::new(ChainTransformation::new(create.id.clone(), create.parents.clone(), create.exec.clone())?);
		let dataset = transformation.dataset();
		Ok((transformation as Arc<dyn Transformation>, dataset as Arc<dyn Dataset>))
	}
}

impl Transformation for ChainTransformation {
	fn process(&self, parent: &DatasetId, table: Table) -> Result<()> {
		self.exec.ctx.check()?;
		{
			let mut state = self.state.lock();
			state.parents.process(parent)?;
			if *parent != self.first && !state.first_done {
				state.pending.push(table);
				return Ok(());
			}
		}
		let _emit = self.emit.lock();
		self.dataset.process(table)
	}

	fn retract_table(&self, _parent: &DatasetId, key: &GroupKey) -> Result<()> {
		self.state.lock().pending.retain(|table| !table.key().equal(key));
		self.dataset.retract_table(key)
	}

	fn update_watermark(&self, parent: &DatasetId, mark: Time) -> Result<()> {
		let advanced = self.state.lock().parents.update_watermark(parent, mark)?;
		match advanced {
			Some(mark) => self.dataset.update_watermark(mark),
			None => Ok(()),
		}
	}

	fn update_processing_time(&self, parent: &DatasetId, time: Time) -> Result<()> {
		let advanced = self.state.lock().parents.update_processing_time(parent, time)?;
		match advanced {
			Some(time) => self.dataset.update_processing_time(time),
			None => Ok(()),
		}
	}

	fn finish(&self, parent: &DatasetId, err: Option<Error>) {
		let mut state = self.state.lock();
		let released = if *parent == self.first && !state.first_done {
			state.first_done = true;
			let pending = std::mem::take(&mut state.pending);
			// a failed first parent fails the chain, nothing of second is emitted
			if err.is_some() { Vec::new() } else { pending }
		} else {
			Vec::new()
		};
		let done = state.parents.finish(parent, err);
		let dropped = state.parents.dropped_errors();
		let emit = self.emit.lock();
		drop(state);

		if !released.is_empty() {
			debug!(chain = %self.dataset.id(), tables = released.len(), "releasing buffered tables");
		}
		let mut failed = None;
		for table in released {
			if let Err(err) = self.dataset.process(table) {
				failed = Some(err);
				break;
			}
		}
		drop(emit);
		if let Some(err) = failed {
			self.state.lock().failed.get_or_insert(err);
		}

		if let Some(err) = done {
			if dropped > 0 {
				self.exec.metadata.record("dropped_errors", Value::int(dropped as i64));
			}
			let err = err.or_else(|| self.state.lock().failed.take());
			self.dataset.finish(err);
		}
	}
}

pub(crate) fn register(library: &mut Library) {
	library.register_function(
		flux_vm::UNIVERSE,
		TableFunction::new(
			"chain",
			KIND,
			vec![Param::required("first", Type::Stream), Param::required("second", Type::Stream)],
		),
	);
	library.operations.register(KIND, ChainSpec::create, lower::<ChainSpec>);
	library.transformations.register_transformation(KIND, ChainTransformation::create);
}

#[cfg(test)]
mod tests {
	use flux_column::Allocator;

	use super::*;
	use crate::testing::{Recorder, table, times};

	fn chain() -> (ChainTransformation, Arc<Recorder>) {
		let exec = ExecutionContext::standalone(Time(0));
		let chain = ChainTransformation::new(
			DatasetId::from("chain"),
			vec![DatasetId::from("first"), DatasetId::from("second")],
			exec,
		)
		.unwrap();
		let recorder = Recorder::new();
		chain.dataset().add_subscriber(recorder.clone());
		(chain, recorder)
	}

	#[test]
	fn test_second_buffered_until_first_finishes() {
		let alloc = Allocator::shared(None);
		let (chain, recorder) = chain();
		let first = DatasetId::from("first");
		let second = DatasetId::from("second");

		chain.process(&second, table(&alloc, GroupKey::empty(), &[2])).unwrap();
		chain.update_watermark(&second, Time::from_secs(20)).unwrap();
		assert!(recorder.tables().is_empty());

		chain.process(&first, table(&alloc, GroupKey::empty(), &[1])).unwrap();
		chain.update_watermark(&first, Time::from_secs(10)).unwrap();
		assert_eq!(recorder.tables().len(), 1);

		chain.finish(&first, None);
		let emitted: Vec<_> = recorder.tables().iter().flat_map(times).collect();
		assert_eq!(emitted, vec![Time::from_secs(1), Time::from_secs(2)]);
		assert_eq!(recorder.finished(), 0);

		chain.finish(&second, None);
		assert_eq!(recorder.finished(), 1);
		assert_eq!(recorder.watermarks(), vec![Time::from_secs(10)]);
		assert!(recorder.error().is_none());
	}

	#[test]
	fn test_second_passes_through_after_first_finished() {
		let alloc = Allocator::shared(None);
		let (chain, recorder) = chain();
		chain.finish(&DatasetId::from("first"), None);
		chain.process(&DatasetId::from("second"), table(&alloc, GroupKey::empty(), &[5])).unwrap();
		assert_eq!(recorder.tables().len(), 1);
	}

	#[test]
	fn test_failed_first_discards_buffer() {
		let alloc = Allocator::shared(None);
		let (chain, recorder) = chain();
		chain.process(&DatasetId::from("second"), table(&alloc, GroupKey::empty(), &[2])).unwrap();
		chain.finish(&DatasetId::from("second"), None);
		let err = Error::new(flux_type::error::diagnostic::internal::internal("boom"));
		chain.finish(&DatasetId::from("first"), Some(err.clone()));

		assert!(recorder.tables().is_empty());
		assert_eq!(recorder.finished(), 1);
		assert_eq!(recorder.error(), Some(err));
	}

	#[test]
	fn test_requires_two_parents() {
		let exec = ExecutionContext::standalone(Time(0));
		assert!(ChainTransformation::new(DatasetId::from("c"), vec![DatasetId::from("a")], exec).is_err());
	}
}
