// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::sync::atomic::{AtomicU64, Ordering};

/// Counters of one operator, taken at a point in time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FetchStats {
	pub rows_received: u64,
	pub rows_emitted: u64,
	/// Batches handed to the fetch service, including the final one.
	pub batches: u64,
	/// Per-node fetch calls. A batch touching two nodes counts twice.
	pub requests: u64,
}

#[derive(Debug, Default)]
pub(crate) struct Counters {
	rows_received: AtomicU64,
	rows_emitted: AtomicU64,
	batches: AtomicU64,
	requests: AtomicU64,
}

impl Counters {
	pub(crate) fn row_received(&self) {
		self.rows_received.fetch_add(1, Ordering::Relaxed);
	}

	pub(crate) fn row_emitted(&self) {
		self.rows_emitted.fetch_add(1, Ordering::Relaxed);
	}

	pub(crate) fn batch(&self, requests: usize) {
		self.batches.fetch_add(1, Ordering::Relaxed);
		self.requests.fetch_add(requests as u64, Ordering::Relaxed);
	}

	pub(crate) fn snapshot(&self) -> FetchStats {
		FetchStats {
			rows_received: self.rows_received.load(Ordering::Relaxed),
			rows_emitted: self.rows_emitted.load(Ordering::Relaxed),
			batches: self.batches.load(Ordering::Relaxed),
			requests: self.requests.load(Ordering::Relaxed),
		}
	}
}
