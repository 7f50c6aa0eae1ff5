// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::{
	collections::HashMap,
	sync::{
		Arc,
		atomic::{AtomicUsize, Ordering},
	},
	time::Duration,
};

use futures_util::future;
use parking_lot::Mutex;
use reifydb_fetch::{FetchFuture, FetchService, NodeRequest, ReaderBuckets};
use reifydb_routing::{DocId, NodeId, ReaderId};
use reifydb_type::{Bucket, Error, Row, Value};
use tokio::{sync::Semaphore, time::sleep};

use crate::{Event, EventLog};

type RowFn = dyn Fn(ReaderId, DocId) -> Row + Send + Sync;

/// A fetch service answering every document with a row built from its ids.
///
/// By default the row is the document id as a single `Int8`.
pub struct EchoFetchService {
	log: EventLog,
	rows: Arc<RowFn>,
	delays: HashMap<NodeId, Duration>,
	failures: Mutex<HashMap<NodeId, Error>>,
	gate: Option<Arc<Semaphore>>,
	calls: AtomicUsize,
	in_flight: Arc<AtomicUsize>,
	max_in_flight: Arc<AtomicUsize>,
}

impl EchoFetchService {
	pub fn new(log: EventLog) -> Self {
		Self {
			log,
			rows: Arc::new(|_, doc| Row::new(vec![Value::Int8(doc.0 as i64)])),
			delays: HashMap::new(),
			failures: Mutex::new(HashMap::new()),
			gate: None,
			calls: AtomicUsize::new(0),
			in_flight: Arc::new(AtomicUsize::new(0)),
			max_in_flight: Arc::new(AtomicUsize::new(0)),
		}
	}

	pub fn with_rows(mut self, rows: impl Fn(ReaderId, DocId) -> Row + Send + Sync + 'static) -> Self {
		self.rows = Arc::new(rows);
		self
	}

	/// Delays every response from `node`.
	pub fn with_delay(mut self, node: impl Into<NodeId>, delay: Duration) -> Self {
		self.delays.insert(node.into(), delay);
		self
	}

	/// Holds every fetch until [`EchoFetchService::open_gate`] lets it pass.
	pub fn gated(mut self) -> Self {
		self.gate = Some(Arc::new(Semaphore::new(0)));
		self
	}

	pub fn open_gate(&self, fetches: usize) {
		if let Some(gate) = &self.gate {
			gate.add_permits(fetches);
		}
	}

	/// Makes the next fetch from `node` fail with `error`.
	pub fn fail_next(&self, node: impl Into<NodeId>, error: Error) {
		self.failures.lock().insert(node.into(), error);
	}

	pub fn calls(&self) -> usize {
		self.calls.load(Ordering::SeqCst)
	}

	pub fn in_flight(&self) -> usize {
		self.in_flight.load(Ordering::SeqCst)
	}

	pub fn max_in_flight(&self) -> usize {
		self.max_in_flight.load(Ordering::SeqCst)
	}
}

impl FetchService for EchoFetchService {
	fn fetch(&self, node: &NodeId, request: NodeRequest, close_context: bool) -> FetchFuture<ReaderBuckets> {
		self.log.record(Event::Fetch {
			node: node.clone(),
			request: request.clone(),
			close_context,
		});
		self.calls.fetch_add(1, Ordering::SeqCst);

		let failure = self.failures.lock().remove(node);
		let delay = self.delays.get(node).copied();
		let gate = self.gate.clone();
		let rows = Arc::clone(&self.rows);
		let in_flight = Arc::clone(&self.in_flight);
		let max_in_flight = Arc::clone(&self.max_in_flight);

		Box::pin(async move {
			let current = in_flight.fetch_add(1, Ordering::SeqCst) + 1;
			max_in_flight.fetch_max(current, Ordering::SeqCst);

			if let Some(gate) = gate {
				if let Ok(permit) = gate.acquire().await {
					permit.forget();
				}
			}
			if let Some(delay) = delay {
				sleep(delay).await;
			}
			in_flight.fetch_sub(1, Ordering::SeqCst);

			if let Some(error) = failure {
				return Err(error);
			}

			let mut buckets = ReaderBuckets::new();
			for (reader, docs) in request {
				let bucket: Bucket = docs.into_iter().map(|doc| rows(reader, doc)).collect();
				buckets.insert(reader, bucket);
			}
			Ok(buckets)
		})
	}

	fn release(&self, node: &NodeId) -> FetchFuture<()> {
		self.log.record(Event::Release {
			node: node.clone(),
		});
		Box::pin(future::ready(Ok(())))
	}
}
