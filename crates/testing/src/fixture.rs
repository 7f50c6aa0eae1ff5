// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::sync::Arc;

use reifydb_fetch::{Demand, FetchConfig, FetchOperator};
use reifydb_routing::{
	ColumnDescriptor, DocId, FetchId, FetchPlaceholder, FetchRouting, FetchSource, OutputColumn, Projection, ReaderId,
	TableIdent,
};
use reifydb_type::{Error, Result, Row, Type, Value};
use tokio::runtime::Handle;

use crate::{CollectingReceiver, EchoFetchService, EventLog, Outcome, RecordingUpstream, util::wait_for};

pub fn users() -> TableIdent {
	TableIdent::new("doc", "users")
}

pub fn users_id() -> ColumnDescriptor {
	ColumnDescriptor::new(users(), "id", Type::Int8)
}

/// Two nodes: `nodeOne` owns reader 0, `nodeTwo` owns reader 2. Every
/// reader scans `doc.users`, whose fetched rows hold just the `id` column.
pub fn two_node_routing() -> FetchRouting {
	FetchRouting::builder()
		.node("nodeOne", [0u32])
		.node("nodeTwo", [2u32])
		.reader_base(0u32, "t1")
		.index("t1", users())
		.source(users(), FetchSource::new(vec![0], vec![users_id()]))
		.build()
}

/// A single output column: `doc.users.id` fetched through input column 0.
pub fn id_projection() -> Projection {
	Projection::new(vec![OutputColumn::Fetch(FetchPlaceholder::new(0, users_id()))])
}

pub fn fetch_id(reader: u32, doc: u32) -> Value {
	FetchId::new(ReaderId(reader), DocId(doc)).into()
}

/// One single-column row per document of `reader`.
pub fn fetch_id_rows(reader: u32, docs: impl IntoIterator<Item = u32>) -> Vec<Row> {
	docs.into_iter().map(|doc| Row::new(vec![fetch_id(reader, doc)])).collect()
}

/// An operator wired to recording test doubles sharing one event log.
pub struct Harness {
	pub log: EventLog,
	pub upstream: Arc<RecordingUpstream>,
	pub receiver: Arc<CollectingReceiver>,
	pub service: Arc<EchoFetchService>,
	pub operator: FetchOperator,
}

impl Harness {
	/// Wires but does not prepare the operator. Must run inside a tokio
	/// runtime.
	pub fn wire(
		log: EventLog,
		config: FetchConfig,
		routing: FetchRouting,
		projection: Projection,
		service: EchoFetchService,
		receiver: CollectingReceiver,
	) -> Result<Self> {
		let upstream = Arc::new(RecordingUpstream::new(log.clone()));
		let receiver = Arc::new(receiver);
		let service = Arc::new(service);

		let operator =
			FetchOperator::new(config, Arc::new(routing), projection, service.clone(), Handle::current());
		operator.set_upstream(upstream.clone())?;
		operator.downstream(receiver.clone())?;

		Ok(Self {
			log,
			upstream,
			receiver,
			service,
			operator,
		})
	}

	/// The two-node routing and id projection, prepared.
	pub fn two_node(config: FetchConfig) -> Result<Self> {
		let log = EventLog::new();
		let harness = Self::wire(
			log.clone(),
			config,
			two_node_routing(),
			id_projection(),
			EchoFetchService::new(log.clone()),
			CollectingReceiver::new(log),
		)?;
		harness.operator.prepare()?;
		Ok(harness)
	}

	/// Pushes `rows`, waiting whenever the operator paused the upstream.
	/// Returns early with [`Demand::Stop`] once the downstream stopped or
	/// failed.
	pub async fn feed(&self, rows: impl IntoIterator<Item = Row>) -> Result<Demand> {
		for row in rows {
			if self.wait_until_resumed().await == Demand::Stop {
				return Ok(Demand::Stop);
			}
			if self.operator.set_next_row(row)? == Demand::Stop {
				return Ok(Demand::Stop);
			}
		}
		Ok(self.wait_until_resumed().await)
	}

	/// Feeds `rows`, finishes and waits for the downstream outcome.
	pub async fn run(&self, rows: impl IntoIterator<Item = Row>) -> std::result::Result<Vec<Row>, Error> {
		if self.feed(rows).await? == Demand::Continue {
			self.operator.finish()?;
		}
		self.receiver.result().await
	}

	async fn wait_until_resumed(&self) -> Demand {
		wait_for(|| !self.upstream.is_paused() || self.receiver.is_done(), "upstream should be resumed").await;
		match self.receiver.outcome() {
			Some(Outcome::Failed(_)) => Demand::Stop,
			_ => Demand::Continue,
		}
	}
}
