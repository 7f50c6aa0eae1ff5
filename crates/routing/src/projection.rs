// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::slice::Iter;

use serde::{Deserialize, Serialize};

use crate::ColumnDescriptor;

/// A deferred column reference: the value of `column` for the record whose
/// fetch id sits at `fetch_id_index` of the incoming row.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FetchPlaceholder {
	pub fetch_id_index: usize,
	pub column: ColumnDescriptor,
}

impl FetchPlaceholder {
	pub fn new(fetch_id_index: usize, column: ColumnDescriptor) -> Self {
		Self {
			fetch_id_index,
			column,
		}
	}
}

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OutputColumn {
	/// Copies the incoming value at this index
	Input(usize),
	/// Materialized from a fetch
	Fetch(FetchPlaceholder),
}

/// The output row layout of the operator.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Projection(Vec<OutputColumn>);

impl Projection {
	pub fn new(columns: Vec<OutputColumn>) -> Self {
		Self(columns)
	}

	pub fn len(&self) -> usize {
		self.0.len()
	}

	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}

	pub fn iter(&self) -> Iter<'_, OutputColumn> {
		self.0.iter()
	}

	pub fn placeholders(&self) -> impl Iterator<Item = &FetchPlaceholder> {
		self.0.iter().filter_map(|column| match column {
			OutputColumn::Fetch(placeholder) => Some(placeholder),
			OutputColumn::Input(_) => None,
		})
	}
}

impl From<Vec<OutputColumn>> for Projection {
	fn from(columns: Vec<OutputColumn>) -> Self {
		Self::new(columns)
	}
}

impl FromIterator<OutputColumn> for Projection {
	fn from_iter<T: IntoIterator<Item = OutputColumn>>(iter: T) -> Self {
		Self(iter.into_iter().collect())
	}
}
