// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::fmt::{Display, Formatter};

use reifydb_type::{Error, Result, Value};
use serde::{Deserialize, Serialize};

/// Identifies a storage node.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(pub String);

impl NodeId {
	pub fn as_str(&self) -> &str {
		&self.0
	}
}

impl Display for NodeId {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		f.write_str(&self.0)
	}
}

impl From<&str> for NodeId {
	fn from(value: &str) -> Self {
		Self(value.to_string())
	}
}

impl From<String> for NodeId {
	fn from(value: String) -> Self {
		Self(value)
	}
}

/// A shard-local enumeration context. Readers of one index occupy a
/// contiguous id range starting at the index's reader base.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ReaderId(pub u32);

impl Display for ReaderId {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		Display::fmt(&self.0, f)
	}
}

impl From<u32> for ReaderId {
	fn from(value: u32) -> Self {
		Self(value)
	}
}

/// A record within one reader; meaningless across readers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DocId(pub u32);

impl Display for DocId {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		Display::fmt(&self.0, f)
	}
}

impl From<u32> for DocId {
	fn from(value: u32) -> Self {
		Self(value)
	}
}

/// The value a scan emits in place of deferred columns: the reader id in
/// the high 32 bits, the document id in the low 32 bits.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FetchId(pub u64);

impl FetchId {
	pub fn new(reader: ReaderId, doc: DocId) -> Self {
		Self(((reader.0 as u64) << 32) | doc.0 as u64)
	}

	pub fn reader(&self) -> ReaderId {
		ReaderId((self.0 >> 32) as u32)
	}

	pub fn doc(&self) -> DocId {
		DocId(self.0 as u32)
	}

	/// Reads a fetch id out of input column `index`.
	///
	/// `Undefined` means the row has no record to fetch and yields `None`.
	pub fn from_value(index: usize, value: &Value) -> Result<Option<FetchId>> {
		match value {
			Value::Int8(v) => Ok(Some(FetchId(*v as u64))),
			Value::Undefined => Ok(None),
			other => Err(Error::InvalidFetchId {
				index,
				value: other.clone(),
			}),
		}
	}
}

impl From<FetchId> for Value {
	fn from(value: FetchId) -> Self {
		Value::Int8(value.0 as i64)
	}
}

impl Display for FetchId {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		write!(f, "{}:{}", self.reader(), self.doc())
	}
}

#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TableIdent {
	pub schema: String,
	pub name: String,
}

impl TableIdent {
	pub fn new(schema: impl Into<String>, name: impl Into<String>) -> Self {
		Self {
			schema: schema.into(),
			name: name.into(),
		}
	}
}

impl Display for TableIdent {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		write!(f, "{}.{}", self.schema, self.name)
	}
}
