// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! Push-based flow control between a row source, the fetch operator and
//! the stage that consumes its output.

use reifydb_type::{Error, Row};

/// The row source feeding an operator.
pub trait Upstream: Send + Sync {
	/// Stop pushing rows until [`Upstream::resume`] is called.
	fn pause(&self);

	/// Continue pushing rows. `immediate_retry_hint` tells the source it
	/// may push again right away instead of rescheduling itself.
	fn resume(&self, immediate_retry_hint: bool);
}

/// What a receiver wants after accepting a row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Demand {
	Continue,
	/// No more rows are wanted. This is early termination, not a failure.
	Stop,
}

/// The stage receiving fully materialized rows.
pub trait RowReceiver: Send + Sync {
	fn set_next_row(&self, row: Row) -> Demand;

	fn finish(&self);

	fn fail(&self, error: Error);
}
