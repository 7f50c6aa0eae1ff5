// SPDX-License-Identifier: MIT
// Copyright (c) 2025 ReifyDB

use std::{slice::Iter, sync::Arc};

use serde::{Deserialize, Serialize};

use crate::Row;

/// An ordered collection of materialized rows.
///
/// Buckets are addressed positionally. Whoever produced the bucket decides
/// what each position means; for fetch responses position `n` holds the row
/// for the `n`-th requested document.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bucket(Arc<[Row]>);

impl Bucket {
	pub fn new(rows: Vec<Row>) -> Self {
		Self(Arc::from(rows))
	}

	pub fn empty() -> Self {
		Self::new(Vec::new())
	}

	pub fn size(&self) -> usize {
		self.0.len()
	}

	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}

	pub fn get(&self, index: usize) -> Option<&Row> {
		self.0.get(index)
	}

	pub fn rows(&self) -> &[Row] {
		&self.0
	}

	/// Every call starts again from the first row.
	pub fn iter(&self) -> Iter<'_, Row> {
		self.0.iter()
	}
}

impl Default for Bucket {
	fn default() -> Self {
		Self::empty()
	}
}

impl From<Vec<Row>> for Bucket {
	fn from(rows: Vec<Row>) -> Self {
		Self::new(rows)
	}
}

impl FromIterator<Row> for Bucket {
	fn from_iter<T: IntoIterator<Item = Row>>(iter: T) -> Self {
		Self(iter.into_iter().collect())
	}
}

impl<'a> IntoIterator for &'a Bucket {
	type Item = &'a Row;
	type IntoIter = Iter<'a, Row>;

	fn into_iter(self) -> Self::IntoIter {
		self.iter()
	}
}
