// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use reifydb_routing::FetchId;
use reifydb_type::{Error, Result, Row};

use super::{NodeRequest, ReaderBuckets};

/// Fetched rows of one batch, addressable by fetch id.
#[derive(Debug, Default)]
pub struct BatchResponse {
	requested: NodeRequest,
	buckets: ReaderBuckets,
}

impl BatchResponse {
	/// Pairs the requested document ids with the returned buckets.
	///
	/// Every requested reader needs a bucket holding exactly one row per
	/// requested document. Buckets for readers that were not requested are
	/// dropped.
	pub fn new(requested: NodeRequest, mut buckets: ReaderBuckets) -> Result<Self> {
		buckets.retain(|reader, _| requested.contains_key(reader));

		for (reader, docs) in &requested {
			let bucket = buckets.get(reader).ok_or(Error::MissingBucket {
				reader: reader.0,
			})?;
			if bucket.size() != docs.len() {
				return Err(Error::BucketSizeMismatch {
					reader: reader.0,
					expected: docs.len(),
					actual: bucket.size(),
				});
			}
		}

		Ok(Self {
			requested,
			buckets,
		})
	}

	pub fn lookup(&self, fetch_id: FetchId) -> Result<&Row> {
		let reader = fetch_id.reader();
		let missing = || Error::MissingDocument {
			reader: reader.0,
			doc: fetch_id.doc().0,
		};

		let position = self
			.requested
			.get(&reader)
			.and_then(|docs| docs.get_index_of(&fetch_id.doc()))
			.ok_or_else(missing)?;

		self.buckets.get(&reader).and_then(|bucket| bucket.get(position)).ok_or_else(missing)
	}
}
