// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! The deferred-fetch operator.
//!
//! Rows arrive carrying fetch ids in place of deferred columns. They are
//! buffered until a batch is full, then the upstream is paused while the
//! referenced documents are fetched from the owning nodes. Completed rows
//! go downstream in arrival order before the upstream is resumed.

mod materialize;
mod plan;
mod state;
mod stats;

use std::sync::Arc;

use once_cell::sync::OnceCell;
use parking_lot::{Mutex, ReentrantMutex};
use reifydb_routing::{FetchRouting, NodeId, Projection};
use reifydb_type::{Error, ErrorKind, Result, Row};
pub use state::OperatorState;
pub use stats::FetchStats;
use tokio::runtime::Handle;
use tracing::{debug, error, instrument, trace, warn};

use self::{
	materialize::materialize,
	plan::FetchPlan,
	state::{Batch, Phase},
	stats::Counters,
};
use crate::{
	FetchConfig,
	flow::{Demand, RowReceiver, Upstream},
	service::{BatchRequest, FetchService},
};

/// Handle to a deferred-fetch operator. Clones share the same operator.
#[derive(Clone)]
pub struct FetchOperator {
	inner: Arc<Inner>,
}

struct Inner {
	config: FetchConfig,
	routing: Arc<FetchRouting>,
	projection: Projection,
	service: Arc<dyn FetchService>,
	runtime: Handle,
	upstream: OnceCell<Arc<dyn Upstream>>,
	downstream: OnceCell<Arc<dyn RowReceiver>>,
	plan: OnceCell<FetchPlan>,
	phase: Mutex<Phase>,
	/// Serializes calls into the downstream.
	gate: ReentrantMutex<()>,
	counters: Counters,
}

impl FetchOperator {
	/// Fetch tasks run on `runtime`.
	pub fn new(
		config: FetchConfig,
		routing: Arc<FetchRouting>,
		projection: Projection,
		service: Arc<dyn FetchService>,
		runtime: Handle,
	) -> Self {
		let capacity = config.batch_size;
		Self {
			inner: Arc::new(Inner {
				config,
				routing,
				projection,
				service,
				runtime,
				upstream: OnceCell::new(),
				downstream: OnceCell::new(),
				plan: OnceCell::new(),
				phase: Mutex::new(Phase::new(capacity)),
				gate: ReentrantMutex::new(()),
				counters: Counters::default(),
			}),
		}
	}

	pub fn config(&self) -> &FetchConfig {
		&self.inner.config
	}

	pub fn state(&self) -> OperatorState {
		self.inner.phase.lock().state
	}

	pub fn stats(&self) -> FetchStats {
		self.inner.counters.snapshot()
	}

	pub fn set_upstream(&self, upstream: Arc<dyn Upstream>) -> Result<()> {
		self.ensure_unprepared()?;
		self.inner.upstream.set(upstream).map_err(|_| Error::AlreadyWired {
			endpoint: "upstream",
		})
	}

	pub fn downstream(&self, downstream: Arc<dyn RowReceiver>) -> Result<()> {
		self.ensure_unprepared()?;
		self.inner.downstream.set(downstream).map_err(|_| Error::AlreadyWired {
			endpoint: "downstream",
		})
	}

	fn ensure_unprepared(&self) -> Result<()> {
		if self.inner.phase.lock().prepared {
			return Err(Error::AlreadyPrepared);
		}
		Ok(())
	}

	/// Validates configuration and routing and compiles the projection.
	/// Must succeed before the first row is pushed.
	#[instrument(name = "fetch::operator::prepare", level = "debug", skip(self), fields(batch_size = self.inner.config.batch_size))]
	pub fn prepare(&self) -> Result<()> {
		let inner = &self.inner;
		let mut phase = inner.phase.lock();
		if phase.prepared {
			return Err(Error::AlreadyPrepared);
		}

		if inner.config.batch_size == 0 {
			return Err(Error::InvalidBatchSize {
				batch_size: 0,
			});
		}
		if inner.upstream.get().is_none() {
			return Err(Error::NotWired {
				endpoint: "upstream",
			});
		}
		if inner.downstream.get().is_none() {
			return Err(Error::NotWired {
				endpoint: "downstream",
			});
		}

		inner.routing.validate(&inner.projection)?;
		let plan = FetchPlan::compile(&inner.routing, &inner.projection)?;
		if inner.plan.set(plan).is_err() {
			return Err(Error::AlreadyPrepared);
		}

		phase.prepared = true;
		debug!("operator prepared");
		Ok(())
	}

	/// Pushes one row. Returns [`Demand::Stop`] once the downstream no
	/// longer wants rows; the upstream should then stop producing.
	pub fn set_next_row(&self, row: Row) -> Result<Demand> {
		let inner = &self.inner;
		let batch = {
			let mut phase = inner.phase.lock();
			if !phase.prepared {
				return Err(Error::NotPrepared {
					operation: "set_next_row",
				});
			}
			match phase.state {
				OperatorState::Collecting => {}
				OperatorState::Finished if phase.stopped => return Ok(Demand::Stop),
				state => {
					warn!(%state, "row pushed outside of collecting");
					return Err(Error::protocol("set_next_row", state));
				}
			}

			inner.counters.row_received();
			phase.buffer.push(row);
			if phase.buffer.len() < inner.config.batch_size {
				return Ok(Demand::Continue);
			}
			phase.begin_batch(false, false)
		};

		inner.dispatch(batch);
		Ok(Demand::Continue)
	}

	/// Signals the end of input, closing remote contexts according to
	/// [`FetchConfig::close_context_on_finish`].
	pub fn finish(&self) -> Result<()> {
		self.finish_with(self.inner.config.close_context_on_finish)
	}

	/// Signals the end of input. Buffered rows are fetched as a final batch
	/// before the downstream is finished.
	#[instrument(name = "fetch::operator::finish", level = "debug", skip(self))]
	pub fn finish_with(&self, close_context: bool) -> Result<()> {
		let inner = &self.inner;
		let batch = {
			let mut phase = inner.phase.lock();
			if !phase.prepared {
				return Err(Error::NotPrepared {
					operation: "finish",
				});
			}
			match phase.state {
				OperatorState::Collecting => {}
				OperatorState::Finished if phase.stopped => return Ok(()),
				state => {
					warn!(%state, "finish outside of collecting");
					return Err(Error::protocol("finish", state));
				}
			}

			if phase.buffer.is_empty() {
				phase.state = OperatorState::Finished;
				None
			} else {
				Some(phase.begin_batch(true, close_context))
			}
		};

		match batch {
			Some(batch) => inner.dispatch(batch),
			None => {
				debug!("finished without pending rows");
				if close_context {
					inner.release(inner.routing.nodes().cloned().collect());
				}
				inner.finish_downstream();
			}
		}
		Ok(())
	}

	/// Signals an upstream failure, releasing remote contexts according to
	/// [`FetchConfig::close_context_on_finish`].
	pub fn fail(&self, error: Error) {
		self.fail_with(error, self.inner.config.close_context_on_finish)
	}

	/// Signals an upstream failure. Any batch in flight is abandoned and
	/// none of its rows reach the downstream; the nodes it was sent to are
	/// always asked to release their contexts. Ignored once the operator
	/// has terminated.
	#[instrument(name = "fetch::operator::fail", level = "debug", skip(self))]
	pub fn fail_with(&self, error: Error, close_context: bool) {
		let inner = &self.inner;
		let (fetching, in_flight) = {
			let mut phase = inner.phase.lock();
			if phase.state.is_terminal() {
				warn!(state = %phase.state, %error, "failure after termination ignored");
				return;
			}
			let fetching = phase.state == OperatorState::Fetching;
			(fetching, phase.terminate(OperatorState::Failed))
		};

		if let Some(task) = in_flight {
			debug!("aborting in-flight fetch");
			task.abort();
		}
		if fetching || close_context {
			inner.release(inner.routing.nodes().cloned().collect());
		}

		let error = match error.kind() {
			ErrorKind::UpstreamFailure => error,
			_ => Error::upstream(error),
		};
		let diagnostic = error.diagnostic();
		error!(code = %diagnostic.code, fetching, "{}", diagnostic.message);
		inner.fail_downstream(error);
	}
}

impl Inner {
	/// Pauses the upstream and starts fetching `batch`. The phase must be
	/// `Fetching`.
	fn dispatch(self: &Arc<Self>, batch: Batch) {
		debug!(sequence = batch.sequence, rows = batch.rows.len(), last = batch.last, "dispatching batch");
		if let Some(upstream) = self.upstream.get() {
			upstream.pause();
		}

		let mut phase = self.phase.lock();
		if phase.state != OperatorState::Fetching {
			debug!(sequence = batch.sequence, state = %phase.state, "batch abandoned before dispatch");
			return;
		}
		let task = self.runtime.spawn(Arc::clone(self).run(batch));
		phase.in_flight = Some(task.abort_handle());
	}

	async fn run(self: Arc<Self>, batch: Batch) {
		let Some(plan) = self.plan.get() else {
			return;
		};

		let outcome = async {
			let request = BatchRequest::collect(&self.routing, plan.fetch_id_columns(), &batch.rows)?;
			self.counters.batch(request.node_count());

			let idle: Vec<NodeId> = if batch.last && batch.close_context {
				self.routing.nodes().filter(|node| request.get(node).is_none()).cloned().collect()
			} else {
				Vec::new()
			};

			let response = request.dispatch(self.service.as_ref(), batch.close_context).await?;
			let rows = batch
				.rows
				.iter()
				.map(|row| materialize(plan, &self.routing, &response, row))
				.collect::<Result<Vec<_>>>()?;
			Ok::<_, Error>((rows, idle))
		}
		.await;

		match outcome {
			Ok((rows, idle)) => {
				self.release(idle);
				self.emit(batch.sequence, rows, batch.last);
			}
			Err(error) => self.abort_batch(batch.sequence, error),
		}
	}

	/// Hands a completed batch downstream in order, then resumes.
	fn emit(&self, sequence: u64, rows: Vec<Row>, last: bool) {
		let Some(downstream) = self.downstream.get() else {
			return;
		};
		trace!(sequence, rows = rows.len(), "emitting batch");

		for row in rows {
			let demand = {
				let _gate = self.gate.lock();
				let state = self.phase.lock().state;
				if state != OperatorState::Fetching {
					debug!(sequence, %state, "emission cut short");
					return;
				}
				downstream.set_next_row(row)
			};
			self.counters.row_emitted();

			if demand == Demand::Stop {
				self.stop(sequence);
				return;
			}
		}

		{
			let mut phase = self.phase.lock();
			if phase.state != OperatorState::Fetching {
				return;
			}
			phase.in_flight = None;
			phase.state = if last {
				OperatorState::Finished
			} else {
				OperatorState::Collecting
			};
		}

		debug!(sequence, last, "batch complete");
		self.resume_upstream();
		if last {
			self.finish_downstream();
		}
	}

	/// The downstream wants no more rows.
	fn stop(&self, sequence: u64) {
		{
			let mut phase = self.phase.lock();
			if phase.state != OperatorState::Fetching {
				return;
			}
			phase.terminate(OperatorState::Finished);
			phase.stopped = true;
		}

		debug!(sequence, "downstream requested stop");
		if self.config.close_context_on_finish {
			self.release(self.routing.nodes().cloned().collect());
		}
		self.finish_downstream();
		self.resume_upstream();
	}

	fn abort_batch(&self, sequence: u64, error: Error) {
		{
			let mut phase = self.phase.lock();
			if phase.state != OperatorState::Fetching {
				debug!(sequence, %error, "failure of abandoned batch ignored");
				return;
			}
			phase.terminate(OperatorState::Failed);
		}

		let diagnostic = error.diagnostic();
		error!(sequence, code = %diagnostic.code, "batch fetch failed: {}", diagnostic.message);
		self.release(self.routing.nodes().cloned().collect());
		self.fail_downstream(error);
	}

	/// Best-effort release of remote read contexts on `nodes`.
	fn release(&self, nodes: Vec<NodeId>) {
		for node in nodes {
			let release = self.service.release(&node);
			self.runtime.spawn(async move {
				if let Err(error) = release.await {
					warn!(%node, %error, "failed to release fetch context");
				}
			});
		}
	}

	fn resume_upstream(&self) {
		if let Some(upstream) = self.upstream.get() {
			upstream.resume(false);
		}
	}

	fn finish_downstream(&self) {
		if let Some(downstream) = self.downstream.get() {
			let _gate = self.gate.lock();
			downstream.finish();
		}
	}

	fn fail_downstream(&self, error: Error) {
		if let Some(downstream) = self.downstream.get() {
			let _gate = self.gate.lock();
			downstream.fail(error);
		}
	}
}
