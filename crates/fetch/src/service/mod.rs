// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! The boundary to remote storage nodes.
//!
//! A [`FetchService`] performs one round trip per node: given the document
//! ids wanted per reader it returns one [`reifydb_type::Bucket`] per
//! reader, positionally aligned with the requested ids.

mod request;
mod response;

use std::collections::HashMap;

use futures_util::future::{self, BoxFuture};
use indexmap::{IndexMap, IndexSet};
use reifydb_routing::{DocId, NodeId, ReaderId};
use reifydb_type::{Bucket, Result};

pub use request::BatchRequest;
pub use response::BatchResponse;

pub type FetchFuture<T> = BoxFuture<'static, Result<T>>;

/// Document ids wanted from one node, grouped by reader. Each id occurs
/// once per reader, in the order it is expected back.
pub type NodeRequest = IndexMap<ReaderId, IndexSet<DocId>>;

/// One bucket per requested reader.
pub type ReaderBuckets = HashMap<ReaderId, Bucket>;

pub trait FetchService: Send + Sync + 'static {
	/// Fetches the referenced columns of every requested document on `node`.
	///
	/// With `close_context` the node may drop its read contexts once the
	/// response is produced; no further fetches for them will follow.
	fn fetch(&self, node: &NodeId, request: NodeRequest, close_context: bool) -> FetchFuture<ReaderBuckets>;

	/// Releases every read context held for this query on `node`.
	fn release(&self, node: &NodeId) -> FetchFuture<()> {
		let _ = node;
		Box::pin(future::ready(Ok(())))
	}
}
