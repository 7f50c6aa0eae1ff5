// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use reifydb_routing::{FetchId, FetchRouting};
use reifydb_type::{Error, Result, Row, Value};

use super::plan::{FetchPlan, PlannedColumn, PlannedFetch};
use crate::service::BatchResponse;

/// Builds the output row for `row` from its input values and the fetched
/// rows of its batch.
pub(crate) fn materialize(plan: &FetchPlan, routing: &FetchRouting, response: &BatchResponse, row: &Row) -> Result<Row> {
	let mut values = Vec::with_capacity(plan.columns().len());

	for column in plan.columns() {
		let value = match column {
			PlannedColumn::Input(index) => input(row, *index)?.clone(),
			PlannedColumn::Fetch(fetch) => fetched(fetch, routing, response, row)?,
		};
		values.push(value);
	}

	Ok(Row::new(values))
}

fn input(row: &Row, index: usize) -> Result<&Value> {
	row.get(index).ok_or(Error::InputOutOfBounds {
		index,
		arity: row.len(),
	})
}

fn fetched(fetch: &PlannedFetch, routing: &FetchRouting, response: &BatchResponse, row: &Row) -> Result<Value> {
	let Some(fetch_id) = FetchId::from_value(fetch.fetch_id_index, input(row, fetch.fetch_id_index)?)? else {
		return Ok(Value::Undefined);
	};

	let reader = fetch_id.reader();
	match routing.table_for_reader(reader) {
		Some(table) if *table == fetch.table => {}
		other => {
			return Err(Error::ReaderTableMismatch {
				reader: reader.0,
				expected: fetch.table.to_string(),
				actual: other.map(ToString::to_string).unwrap_or_else(|| "<unbound>".to_string()),
			});
		}
	}

	let value = response.lookup(fetch_id)?.get(fetch.position).ok_or(Error::MissingFetchedValue {
		reader: reader.0,
		position: fetch.position,
	})?;

	if !value.conforms_to(fetch.column.ty) {
		return Err(Error::ValueTypeMismatch {
			column: fetch.column.to_string(),
			expected: fetch.column.ty,
			actual: value.get_type(),
		});
	}

	Ok(value.clone())
}
