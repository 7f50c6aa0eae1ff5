// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use futures_util::future::try_join_all;
use indexmap::IndexMap;
use reifydb_routing::{FetchId, FetchRouting, NodeId};
use reifydb_type::{Error, ErrorKind, Result, Row};
use tracing::{instrument, trace};

use super::{BatchResponse, FetchService, NodeRequest};

/// The per-node requests needed to materialize one batch.
#[derive(Debug, Default)]
pub struct BatchRequest {
	nodes: IndexMap<NodeId, NodeRequest>,
}

impl BatchRequest {
	/// Groups the fetch ids found at `fetch_id_columns` of every row by
	/// owning node and reader. Undefined fetch ids are skipped.
	pub fn collect(routing: &FetchRouting, fetch_id_columns: &[usize], rows: &[Row]) -> Result<Self> {
		let mut nodes: IndexMap<NodeId, NodeRequest> = IndexMap::new();

		for row in rows {
			for &index in fetch_id_columns {
				let value = row.get(index).ok_or(Error::InputOutOfBounds {
					index,
					arity: row.len(),
				})?;
				let Some(fetch_id) = FetchId::from_value(index, value)? else {
					continue;
				};

				let reader = fetch_id.reader();
				let node = routing.node_for_reader(reader).ok_or(Error::ReaderNotRouted {
					reader: reader.0,
				})?;

				nodes.entry(node.clone()).or_default().entry(reader).or_default().insert(fetch_id.doc());
			}
		}

		Ok(Self {
			nodes,
		})
	}

	pub fn is_empty(&self) -> bool {
		self.nodes.is_empty()
	}

	pub fn node_count(&self) -> usize {
		self.nodes.len()
	}

	pub fn nodes(&self) -> impl Iterator<Item = &NodeId> {
		self.nodes.keys()
	}

	pub fn get(&self, node: &NodeId) -> Option<&NodeRequest> {
		self.nodes.get(node)
	}

	/// Issues one fetch per involved node and waits for all of them.
	///
	/// Any node failing fails the whole batch.
	#[instrument(name = "fetch::service::dispatch", level = "debug", skip_all, fields(nodes = self.nodes.len(), close_context = close_context))]
	pub async fn dispatch(self, service: &dyn FetchService, close_context: bool) -> Result<BatchResponse> {
		let mut requested = NodeRequest::new();

		let calls = self
			.nodes
			.into_iter()
			.map(|(node, request)| {
				for (reader, docs) in &request {
					requested.insert(*reader, docs.clone());
				}
				trace!(node = %node, readers = request.len(), "fetch");

				let call = service.fetch(&node, request, close_context);
				async move {
					call.await.map_err(|err| match err.kind() {
						ErrorKind::FetchFailure => err,
						_ => Error::fetch_failed(node.as_str(), err),
					})
				}
			})
			.collect::<Vec<_>>();

		let mut buckets = super::ReaderBuckets::new();
		for response in try_join_all(calls).await? {
			buckets.extend(response);
		}

		BatchResponse::new(requested, buckets)
	}
}
