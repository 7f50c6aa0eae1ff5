// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! A shared, ordered record of everything the test doubles observed.

use std::sync::Arc;

use parking_lot::Mutex;
use reifydb_fetch::NodeRequest;
use reifydb_routing::NodeId;
use reifydb_type::{Error, Row};

#[derive(Debug, Clone, PartialEq)]
pub enum Event {
	Pause,
	Resume {
		immediate_retry_hint: bool,
	},
	Fetch {
		node: NodeId,
		request: NodeRequest,
		close_context: bool,
	},
	Release {
		node: NodeId,
	},
	Row(Row),
	Finish,
	Fail(Error),
}

impl Event {
	pub fn is_fetch(&self) -> bool {
		matches!(self, Event::Fetch { .. })
	}

	pub fn is_terminal(&self) -> bool {
		matches!(self, Event::Finish | Event::Fail(_))
	}
}

#[derive(Debug, Clone, Default)]
pub struct EventLog(Arc<Mutex<Vec<Event>>>);

impl EventLog {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn record(&self, event: Event) {
		self.0.lock().push(event);
	}

	pub fn events(&self) -> Vec<Event> {
		self.0.lock().clone()
	}

	pub fn count(&self, predicate: impl Fn(&Event) -> bool) -> usize {
		self.0.lock().iter().filter(|event| predicate(event)).count()
	}

	/// Events with rows, fetches and releases collapsed into their kind, for
	/// asserting on the shape of an exchange.
	pub fn shape(&self) -> Vec<&'static str> {
		self.0
			.lock()
			.iter()
			.map(|event| match event {
				Event::Pause => "pause",
				Event::Resume {
					..
				} => "resume",
				Event::Fetch {
					..
				} => "fetch",
				Event::Release {
					..
				} => "release",
				Event::Row(_) => "row",
				Event::Finish => "finish",
				Event::Fail(_) => "fail",
			})
			.collect()
	}
}
