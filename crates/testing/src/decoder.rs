// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! Source decoders with scripted output.

use std::{
	collections::VecDeque,
	sync::{
		Arc,
		atomic::{AtomicBool, AtomicUsize, Ordering},
	},
};

use flux_column::{ColMeta, ColType, ColumnTableBuilder, GroupKey, SharedAllocator, Table};
use flux_execute::SourceDecoder;
use flux_runtime::Context;
use flux_type::{Error, Result, Time};

use crate::fixture::TableFixture;

/// One step of a [`ScriptedDecoder`].
#[derive(Debug, Clone)]
pub enum Script {
	Table(TableFixture),
	/// A fetch that produces nothing.
	Empty,
	Fail(Error),
}

/// Replays a fixed script, one step per fetch.
pub struct ScriptedDecoder {
	alloc: SharedAllocator,
	script: VecDeque<Script>,
	current: Option<Table>,
	closed: Arc<AtomicBool>,
}

impl ScriptedDecoder {
	pub fn new(alloc: SharedAllocator, script: Vec<Script>) -> Self {
		Self {
			alloc,
			script: script.into(),
			current: None,
			closed: Arc::new(AtomicBool::new(false)),
		}
	}

	/// Set once the source closed the decoder.
	pub fn closed(&self) -> Arc<AtomicBool> {
		Arc::clone(&self.closed)
	}
}

impl SourceDecoder for ScriptedDecoder {
	fn connect(&mut self, _ctx: &Context) -> Result<()> {
		Ok(())
	}

	fn fetch(&mut self, _ctx: &Context) -> Result<bool> {
		self.current = match self.script.pop_front() {
			Some(Script::Table(fixture)) => Some(fixture.build(&self.alloc)?),
			Some(Script::Fail(err)) => return Err(err),
			Some(Script::Empty) | None => None,
		};
		Ok(!self.script.is_empty())
	}

	fn decode(&mut self, _ctx: &Context) -> Result<Option<Table>> {
		Ok(self.current.take())
	}

	fn close(&mut self) -> Result<()> {
		self.current = None;
		self.closed.store(true, Ordering::SeqCst);
		Ok(())
	}
}

/// Never runs out: every fetch yields a one-row table with `_time` and
/// `_value` set to the running count. Used to test cancellation.
pub struct InfiniteDecoder {
	alloc: SharedAllocator,
	produced: Arc<AtomicUsize>,
	current: Option<Table>,
}

impl InfiniteDecoder {
	pub fn new(alloc: SharedAllocator) -> Self {
		Self {
			alloc,
			produced: Arc::new(AtomicUsize::new(0)),
			current: None,
		}
	}

	/// Number of tables produced so far.
	pub fn produced(&self) -> Arc<AtomicUsize> {
		Arc::clone(&self.produced)
	}
}

impl SourceDecoder for InfiniteDecoder {
	fn connect(&mut self, _ctx: &Context) -> Result<()> {
		Ok(())
	}

	fn fetch(&mut self, ctx: &Context) -> Result<bool> {
		ctx.check()?;
		let n = self.produced.fetch_add(1, Ordering::SeqCst) as i64 + 1;
		let mut builder = ColumnTableBuilder::new(GroupKey::empty(), self.alloc.clone());
		let time = builder.add_col(ColMeta::new("_time", ColType::Time))?;
		let value = builder.add_col(ColMeta::new("_value", ColType::Int))?;
		builder.append_time(time, Time::from_secs(n))?;
		builder.append_int(value, n)?;
		self.current = Some(builder.table()?);
		Ok(true)
	}

	fn decode(&mut self, _ctx: &Context) -> Result<Option<Table>> {
		Ok(self.current.take())
	}

	fn close(&mut self) -> Result<()> {
		self.current = None;
		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use flux_column::Allocator;
	use flux_type::{Diagnostic, ErrorKind, Value};

	use super::*;

	#[test]
	fn test_script_replayed_in_order() {
		let ctx = Context::new();
		let alloc = Allocator::shared(None);
		let fixture = TableFixture::new().col("v", ColType::Int).row(vec![Value::int(1)]);
		let mut decoder = ScriptedDecoder::new(alloc, vec![Script::Table(fixture), Script::Empty]);
		let closed = decoder.closed();

		assert!(decoder.fetch(&ctx).unwrap());
		assert_eq!(decoder.decode(&ctx).unwrap().unwrap().nrows(), 1);
		assert!(!decoder.fetch(&ctx).unwrap());
		assert!(decoder.decode(&ctx).unwrap().is_none());

		decoder.close().unwrap();
		assert!(closed.load(Ordering::SeqCst));
	}

	#[test]
	fn test_scripted_failure() {
		let ctx = Context::new();
		let err = Error::new(Diagnostic::new(ErrorKind::Invalid, "TEST_001", "bad input"));
		let mut decoder = ScriptedDecoder::new(Allocator::shared(None), vec![Script::Fail(err.clone())]);
		assert_eq!(decoder.fetch(&ctx).unwrap_err(), err);
	}

	#[test]
	fn test_infinite_counts_up() {
		let ctx = Context::new();
		let mut decoder = InfiniteDecoder::new(Allocator::shared(None));
		let produced = decoder.produced();
		for _ in 0..3 {
			assert!(decoder.fetch(&ctx).unwrap());
			decoder.decode(&ctx).unwrap().unwrap();
		}
		assert_eq!(produced.load(Ordering::SeqCst), 3);
	}

	#[test]
	fn test_infinite_stops_on_cancel() {
		let ctx = Context::new();
		ctx.cancel();
		let mut decoder = InfiniteDecoder::new(Allocator::shared(None));
		assert_eq!(decoder.fetch(&ctx).unwrap_err().kind(), ErrorKind::Canceled);
	}
}
