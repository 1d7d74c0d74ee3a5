// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use flux_column::Table;
use flux_runtime::{Context, SharedClock};
use flux_type::{Result, Time, Value};
use tracing::{debug, warn};

use crate::{
	context::ExecutionContext,
	dataset::{Dataset, DatasetId, PassthroughDataset},
	metadata::MetadataSink,
};

/// Root of a pipeline. Runs on its own worker thread and pushes tables into
/// its dataset; the executor finishes the dataset once `run` returns.
pub trait Source: Send {
	fn run(self: Box<Self>, ctx: &Context, out: &PassthroughDataset) -> Result<()>;
}

/// Pull-based reader of some external format.
pub trait SourceDecoder: Send {
	fn connect(&mut self, ctx: &Context) -> Result<()>;

	/// Prepares the next table. Returns `false` when the table that `decode`
	/// returns next is the last one.
	fn fetch(&mut self, ctx: &Context) -> Result<bool>;

	/// The table prepared by the last `fetch`, or `None` when it produced
	/// nothing to emit.
	fn decode(&mut self, ctx: &Context) -> Result<Option<Table>>;

	fn close(&mut self) -> Result<()>;
}

/// Adapts a [`SourceDecoder`] into a [`Source`]. Every emitted table is
/// followed by a processing-time mark read from the query clock.
pub struct DecoderSource<D> {
	id: DatasetId,
	decoder: D,
	metadata: MetadataSink,
	clock: SharedClock,
}

impl<D: SourceDecoder> DecoderSource<D> {
	pub fn new(id: DatasetId, decoder: D, exec: &ExecutionContext) -> Self {
		Self {
			id,
			decoder,
			metadata: exec.metadata.clone(),
			clock: exec.clock.clone(),
		}
	}

	fn pump(&mut self, ctx: &Context, out: &PassthroughDataset) -> Result<usize> {
		self.decoder.connect(ctx)?;
		let mut tables = 0;
		loop {
			ctx.check()?;
			let more = self.decoder.fetch(ctx)?;
			if let Some(table) = self.decoder.decode(ctx)? {
				out.process(table)?;
				out.update_processing_time(self.clock.now())?;
				tables += 1;
			}
			if !more {
				break;
			}
		}
		out.update_watermark(Time::MAX)?;
		Ok(tables)
	}
}

impl<D: SourceDecoder> Source for DecoderSource<D> {
	fn run(mut self: Box<Self>, ctx: &Context, out: &PassthroughDataset) -> Result<()> {
		let result = self.pump(ctx, out);
		let closed = self.decoder.close();
		let tables = match result {
			Ok(tables) => {
				closed?;
				tables
			}
			Err(err) => {
				if let Err(close_err) = closed {
					warn!(source = %self.id, error = %close_err, "closing failed source");
				}
				return Err(err);
			}
		};
		debug!(source = %self.id, tables, "source drained");
		self.metadata.record(format!("{}.tables", self.id), Value::int(tables as i64));
		Ok(())
	}
}
