// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::fmt::{Display, Formatter};

use reifydb_type::Type;
use serde::{Deserialize, Serialize};

use crate::TableIdent;

/// Names a column of a table together with its declared type.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ColumnDescriptor {
	pub table: TableIdent,
	pub name: String,
	pub ty: Type,
}

impl ColumnDescriptor {
	pub fn new(table: TableIdent, name: impl Into<String>, ty: Type) -> Self {
		Self {
			table,
			name: name.into(),
			ty,
		}
	}

	/// Same table and column name, regardless of declared type.
	pub fn names_same_column(&self, other: &ColumnDescriptor) -> bool {
		self.table == other.table && self.name == other.name
	}
}

impl Display for ColumnDescriptor {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		write!(f, "{}.{}", self.table, self.name)
	}
}
