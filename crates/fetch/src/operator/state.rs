// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::{
	fmt::{Display, Formatter},
	mem,
};

use reifydb_type::Row;
use tokio::task::AbortHandle;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperatorState {
	/// Buffering incoming rows
	Collecting,
	/// A batch is being fetched or emitted; the upstream is paused
	Fetching,
	Finished,
	Failed,
}

impl OperatorState {
	pub fn is_terminal(&self) -> bool {
		matches!(self, OperatorState::Finished | OperatorState::Failed)
	}
}

impl Display for OperatorState {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		match self {
			OperatorState::Collecting => f.write_str("collecting"),
			OperatorState::Fetching => f.write_str("fetching"),
			OperatorState::Finished => f.write_str("finished"),
			OperatorState::Failed => f.write_str("failed"),
		}
	}
}

/// A buffered batch handed from the caller's thread to the fetch task.
#[derive(Debug)]
pub(crate) struct Batch {
	pub(crate) sequence: u64,
	pub(crate) rows: Vec<Row>,
	pub(crate) last: bool,
	pub(crate) close_context: bool,
}

#[derive(Debug)]
pub(crate) struct Phase {
	pub(crate) state: OperatorState,
	pub(crate) prepared: bool,
	/// Set when the downstream asked for no more rows.
	pub(crate) stopped: bool,
	pub(crate) buffer: Vec<Row>,
	pub(crate) in_flight: Option<AbortHandle>,
	next_sequence: u64,
}

impl Phase {
	pub(crate) fn new(capacity: usize) -> Self {
		Self {
			state: OperatorState::Collecting,
			prepared: false,
			stopped: false,
			buffer: Vec::with_capacity(capacity),
			in_flight: None,
			next_sequence: 0,
		}
	}

	/// Moves the buffered rows into a batch and enters `Fetching`.
	pub(crate) fn begin_batch(&mut self, last: bool, close_context: bool) -> Batch {
		self.state = OperatorState::Fetching;
		let capacity = self.buffer.capacity();
		let sequence = self.next_sequence;
		self.next_sequence += 1;

		Batch {
			sequence,
			rows: mem::replace(&mut self.buffer, Vec::with_capacity(capacity)),
			last,
			close_context,
		}
	}

	/// Enters a terminal state, dropping buffered rows. Returns the handle
	/// of the fetch still in flight, if any.
	pub(crate) fn terminate(&mut self, state: OperatorState) -> Option<AbortHandle> {
		debug_assert!(state.is_terminal());
		self.state = state;
		self.buffer.clear();
		self.in_flight.take()
	}
}
