// SPDX-License-Identifier: MIT
// Copyright (c) 2025 ReifyDB

use std::{
	fmt::{Display, Formatter},
	ops::Index,
	slice::Iter,
	sync::Arc,
};

use serde::{Deserialize, Serialize};

use crate::Value;

/// A fixed-arity, immutable sequence of values.
///
/// Cloning a row only bumps a reference count, so rows can be handed to
/// several consumers without copying the values.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Row(Arc<[Value]>);

impl Row {
	pub fn new(values: Vec<Value>) -> Self {
		Self(Arc::from(values))
	}

	pub fn empty() -> Self {
		Self::new(Vec::new())
	}

	pub fn len(&self) -> usize {
		self.0.len()
	}

	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}

	pub fn get(&self, index: usize) -> Option<&Value> {
		self.0.get(index)
	}

	pub fn values(&self) -> &[Value] {
		&self.0
	}

	pub fn iter(&self) -> Iter<'_, Value> {
		self.0.iter()
	}
}

impl Index<usize> for Row {
	type Output = Value;

	fn index(&self, index: usize) -> &Self::Output {
		&self.0[index]
	}
}

impl From<Vec<Value>> for Row {
	fn from(values: Vec<Value>) -> Self {
		Self::new(values)
	}
}

impl FromIterator<Value> for Row {
	fn from_iter<T: IntoIterator<Item = Value>>(iter: T) -> Self {
		Self(iter.into_iter().collect())
	}
}

impl<'a> IntoIterator for &'a Row {
	type Item = &'a Value;
	type IntoIter = Iter<'a, Value>;

	fn into_iter(self) -> Self::IntoIter {
		self.iter()
	}
}

impl Display for Row {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		f.write_str("(")?;
		for (idx, value) in self.0.iter().enumerate() {
			if idx > 0 {
				f.write_str(", ")?;
			}
			Display::fmt(value, f)?;
		}
		f.write_str(")")
	}
}
