// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use serde::{Deserialize, Serialize};

pub const DEFAULT_BATCH_SIZE: usize = 500;

/// Configuration for a [`crate::FetchOperator`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
	/// Rows buffered before a fetch is issued.
	///
	/// Default: 500
	pub batch_size: usize,

	/// Whether `finish` asks the fetch service to close remote read
	/// contexts along with the final batch.
	///
	/// Default: true
	pub close_context_on_finish: bool,
}

impl Default for FetchConfig {
	fn default() -> Self {
		Self {
			batch_size: DEFAULT_BATCH_SIZE,
			close_context_on_finish: true,
		}
	}
}

impl FetchConfig {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn batch_size(mut self, batch_size: usize) -> Self {
		self.batch_size = batch_size;
		self
	}

	pub fn close_context_on_finish(mut self, close: bool) -> Self {
		self.close_context_on_finish = close;
		self
	}
}
