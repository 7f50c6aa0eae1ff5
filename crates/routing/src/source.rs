// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use serde::{Deserialize, Serialize};

use crate::ColumnDescriptor;

/// What has to be fetched for one table.
///
/// `fetch_id_columns` are the incoming-row positions carrying fetch ids of
/// this table. `references` is the layout of every row the fetch service
/// returns for a reader of this table.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FetchSource {
	pub fetch_id_columns: Vec<usize>,
	pub references: Vec<ColumnDescriptor>,
}

impl FetchSource {
	pub fn new(fetch_id_columns: Vec<usize>, references: Vec<ColumnDescriptor>) -> Self {
		Self {
			fetch_id_columns,
			references,
		}
	}

	pub fn has_fetch_id_column(&self, index: usize) -> bool {
		self.fetch_id_columns.contains(&index)
	}

	pub fn position_of(&self, column: &ColumnDescriptor) -> Option<usize> {
		self.references.iter().position(|reference| reference.names_same_column(column))
	}
}
