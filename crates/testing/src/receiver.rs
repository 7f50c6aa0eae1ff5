// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use parking_lot::Mutex;
use reifydb_fetch::{Demand, RowReceiver};
use reifydb_type::{Error, Row, Value};

use crate::{Event, EventLog, util::wait_for};

#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
	Finished,
	Failed(Error),
}

/// A downstream collecting every row it receives.
#[derive(Debug)]
pub struct CollectingReceiver {
	log: EventLog,
	rows: Mutex<Vec<Row>>,
	outcome: Mutex<Option<Outcome>>,
	stop_after: Option<usize>,
}

impl CollectingReceiver {
	pub fn new(log: EventLog) -> Self {
		Self {
			log,
			rows: Mutex::new(Vec::new()),
			outcome: Mutex::new(None),
			stop_after: None,
		}
	}

	/// Answers [`Demand::Stop`] once `limit` rows have been received.
	pub fn stop_after(mut self, limit: usize) -> Self {
		self.stop_after = Some(limit);
		self
	}

	pub fn rows(&self) -> Vec<Row> {
		self.rows.lock().clone()
	}

	/// Values of column `index` across all received rows.
	pub fn column(&self, index: usize) -> Vec<Value> {
		self.rows.lock().iter().map(|row| row.get(index).cloned().unwrap_or(Value::Undefined)).collect()
	}

	pub fn outcome(&self) -> Option<Outcome> {
		self.outcome.lock().clone()
	}

	pub fn is_done(&self) -> bool {
		self.outcome.lock().is_some()
	}

	/// Waits for `finish` or `fail` and returns the received rows or the
	/// failure.
	pub async fn result(&self) -> Result<Vec<Row>, Error> {
		wait_for(|| self.is_done(), "receiver should finish or fail").await;
		match self.outcome() {
			Some(Outcome::Failed(error)) => Err(error),
			_ => Ok(self.rows()),
		}
	}
}

impl RowReceiver for CollectingReceiver {
	fn set_next_row(&self, row: Row) -> Demand {
		self.log.record(Event::Row(row.clone()));
		let mut rows = self.rows.lock();
		rows.push(row);

		match self.stop_after {
			Some(limit) if rows.len() >= limit => Demand::Stop,
			_ => Demand::Continue,
		}
	}

	fn finish(&self) {
		self.log.record(Event::Finish);
		self.outcome.lock().get_or_insert(Outcome::Finished);
	}

	fn fail(&self, error: Error) {
		self.log.record(Event::Fail(error.clone()));
		self.outcome.lock().get_or_insert(Outcome::Failed(error));
	}
}
