// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::{collections::HashMap, sync::Arc, thread, time::Instant};

use crossbeam_channel::{bounded, unbounded};
use flux_column::SharedAllocator;
use flux_plan::{NodeIdx, PlanSpec};
use flux_runtime::{Context, SharedClock, SystemClock};
use flux_type::{
	Error, Result,
	error::diagnostic::query::source_failed,
	internal_error, return_internal_error,
};
use parking_lot::Mutex;
use tracing::{Span, debug, info, info_span, instrument, warn};
use uuid::Uuid;

use crate::{
	context::ExecutionContext,
	dataset::{Dataset, DatasetId, PassthroughDataset},
	metadata::{Metadata, MetadataSink},
	query::{Query, QueryParts},
	registry::{CreateContext, TransformationRegistry},
	result::{ErrorSlot, QueryResult, ResultTransformation},
	source::Source,
	transformation::Transformation,
};

#[derive(Debug, Clone)]
pub struct ExecutorConfig {
	/// Tables buffered per result before producers block.
	pub result_buffer: usize,
	pub metadata_buffer: usize,
	/// Clock behind the processing-time marks sources emit.
	pub clock: SharedClock,
}

impl Default for ExecutorConfig {
	fn default() -> Self {
		Self {
			result_buffer: 16,
			metadata_buffer: 64,
			clock: Arc::new(SystemClock),
		}
	}
}

/// Instantiates physical plans and runs them.
#[derive(Clone)]
pub struct Executor {
	registry: Arc<TransformationRegistry>,
	config: ExecutorConfig,
}

struct PendingSource {
	id: DatasetId,
	kind: String,
	source: Box<dyn Source>,
	dataset: Arc<PassthroughDataset>,
}

impl Executor {
	pub fn new(registry: Arc<TransformationRegistry>) -> Self {
		Self::with_config(registry, ExecutorConfig::default())
	}

	pub fn with_config(registry: Arc<TransformationRegistry>, config: ExecutorConfig) -> Self {
		Self {
			registry,
			config,
		}
	}

	pub fn registry(&self) -> &TransformationRegistry {
		&self.registry
	}

	/// Builds the transformation graph of `plan` and starts one worker per
	/// source. Errors raised while building are returned before any worker
	/// runs.
	#[instrument(name = "executor::execute", level = "debug", skip_all, fields(nodes = plan.len()))]
	pub fn execute(&self, ctx: &Context, plan: &PlanSpec, alloc: SharedAllocator) -> Result<Query> {
		let id = Uuid::now_v7();
		let started = Instant::now();
		let span = info_span!("query", id = %id);
		let ctx = ctx.child();

		let (metadata_tx, metadata_rx) = bounded(self.config.metadata_buffer);
		let exec = ExecutionContext::new(ctx.clone(), alloc.clone(), MetadataSink::new(metadata_tx), plan.now())
			.with_clock(Arc::clone(&self.config.clock));
		let err = ErrorSlot::new();

		let mut datasets: HashMap<NodeIdx, Arc<dyn Dataset>> = HashMap::new();
		let mut sources = Vec::new();
		let mut results = Vec::new();
		let mut result_tables = Vec::new();

		for idx in plan.topological_order()? {
			let node = plan.node(idx)?;
			let predecessors = plan.predecessors(idx);
			let mut parents = Vec::with_capacity(predecessors.len());
			for pred in predecessors {
				parents.push(DatasetId::new(&plan.node(*pred)?.id));
			}
			let create = CreateContext {
				id: DatasetId::new(&node.id),
				spec: node.spec.as_ref(),
				parents,
				trigger: node.trigger.clone().unwrap_or_default(),
				bounds: node.bounds,
				exec: &exec,
			};

			let (transformation, dataset): (Arc<dyn Transformation>, Arc<dyn Dataset>) =
				if let Some(name) = node.spec.yield_name() {
					if predecessors.is_empty() {
						return_internal_error!("yield {} has no input", name);
					}
					let (tx, rx) = bounded(self.config.result_buffer);
					let result_err = ErrorSlot::new();
					let result = Arc::new(ResultTransformation::new(
						create.id.clone(),
						name,
						create.parents.clone(),
						tx,
						exec.clone(),
						result_err.clone(),
						err.clone(),
					));
					result_tables.push(rx.clone());
					results.push(QueryResult::new(name.to_string(), rx, result_err));
					let dataset = result.dataset();
					(result, dataset)
				} else if predecessors.is_empty() {
					let source = self.registry.create_source(&create)?;
					let dataset = Arc::new(PassthroughDataset::new(create.id.clone()));
					sources.push(PendingSource {
						id: create.id.clone(),
						kind: node.procedure_kind().to_string(),
						source,
						dataset: Arc::clone(&dataset),
					});
					datasets.insert(idx, dataset);
					continue;
				} else {
					self.registry.create_transformation(&create)?
				};

			for pred in predecessors {
				match datasets.get(pred) {
					Some(parent) => parent.add_subscriber(Arc::clone(&transformation)),
					None => return_internal_error!("node {} visited before its parent {}", node.id, pred),
				}
			}
			datasets.insert(idx, dataset);
		}
		drop(datasets);
		drop(exec);

		let (results_tx, results_rx) = unbounded();
		let yields = results.len();
		for result in results {
			// The receiver is still held, the send cannot fail.
			let _ = results_tx.send(result);
		}
		drop(results_tx);

		let metadata = Arc::new(Mutex::new(Metadata::new()));
		let forwarder = {
			let metadata = Arc::clone(&metadata);
			thread::Builder::new()
				.name(format!("flux-metadata-{}", id))
				.spawn(move || {
					for (key, value) in metadata_rx {
						metadata.lock().record(key, value);
					}
				})
				.map_err(|e| Error::new(internal_error!("failed to spawn metadata worker: {}", e)))?
		};

		let mut workers = Vec::with_capacity(sources.len());
		let source_count = sources.len();
		for pending in sources {
			match spawn_source(pending, ctx.clone(), &span) {
				Ok(handle) => workers.push(handle),
				Err(err) => {
					ctx.cancel();
					return Err(err);
				}
			}
		}

		span.in_scope(|| info!(sources = source_count, yields, "query started"));

		Ok(Query::new(QueryParts {
			id,
			ctx,
			results: results_rx,
			result_tables,
			err,
			workers,
			forwarder,
			metadata,
			alloc,
			started,
		}))
	}
}

fn spawn_source(pending: PendingSource, ctx: Context, query: &Span) -> Result<thread::JoinHandle<()>> {
	let span = info_span!(parent: query, "source", id = %pending.id);
	thread::Builder::new()
		.name(format!("flux-source-{}", pending.id))
		.spawn(move || {
			let _enter = span.enter();
			let PendingSource {
				id,
				kind,
				source,
				dataset,
			} = pending;
			let result = source.run(&ctx, &dataset);
			let err = match result {
				Ok(()) => {
					debug!(source = %id, "source finished");
					None
				}
				Err(err) if err.is_canceled() => {
					debug!(source = %id, "source canceled");
					Some(err)
				}
				Err(err) => {
					warn!(source = %id, error = %err, "source failed");
					Some(Error::new(source_failed(&kind).with_cause(err.diagnostic())))
				}
			};
			dataset.finish(err);
		})
		.map_err(|e| Error::new(internal_error!("failed to spawn source worker: {}", e)))
}
