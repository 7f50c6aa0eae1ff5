// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use reifydb_routing::{ColumnDescriptor, FetchRouting, OutputColumn, Projection, TableIdent};
use reifydb_type::{Error, Result};

/// An output column resolved against the routing.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum PlannedColumn {
	Input(usize),
	Fetch(PlannedFetch),
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct PlannedFetch {
	pub(crate) fetch_id_index: usize,
	pub(crate) table: TableIdent,
	/// Position of the column within a fetched row.
	pub(crate) position: usize,
	pub(crate) column: ColumnDescriptor,
}

/// The projection compiled once at prepare time.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct FetchPlan {
	columns: Vec<PlannedColumn>,
	fetch_id_columns: Vec<usize>,
}

impl FetchPlan {
	pub(crate) fn compile(routing: &FetchRouting, projection: &Projection) -> Result<Self> {
		let mut columns = Vec::with_capacity(projection.len());
		let mut fetch_id_columns = Vec::new();

		for column in projection.iter() {
			let planned = match column {
				OutputColumn::Input(index) => PlannedColumn::Input(*index),
				OutputColumn::Fetch(placeholder) => {
					let table = &placeholder.column.table;
					let source = routing.fetch_source(table).ok_or_else(|| Error::MissingFetchSource {
						table: table.to_string(),
					})?;
					let position = source.position_of(&placeholder.column).ok_or_else(|| {
						Error::UnknownFetchColumn {
							table: table.to_string(),
							column: placeholder.column.name.clone(),
						}
					})?;

					if !fetch_id_columns.contains(&placeholder.fetch_id_index) {
						fetch_id_columns.push(placeholder.fetch_id_index);
					}

					PlannedColumn::Fetch(PlannedFetch {
						fetch_id_index: placeholder.fetch_id_index,
						table: table.clone(),
						position,
						column: placeholder.column.clone(),
					})
				}
			};
			columns.push(planned);
		}

		Ok(Self {
			columns,
			fetch_id_columns,
		})
	}

	pub(crate) fn columns(&self) -> &[PlannedColumn] {
		&self.columns
	}

	/// Distinct input positions holding fetch ids, in projection order.
	pub(crate) fn fetch_id_columns(&self) -> &[usize] {
		&self.fetch_id_columns
	}
}
