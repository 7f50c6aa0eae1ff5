// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use reifydb_fetch::Upstream;

use crate::{Event, EventLog};

/// An upstream that only records pause and resume calls.
#[derive(Debug)]
pub struct RecordingUpstream {
	log: EventLog,
	paused: AtomicBool,
	pauses: AtomicUsize,
	resumes: AtomicUsize,
}

impl RecordingUpstream {
	pub fn new(log: EventLog) -> Self {
		Self {
			log,
			paused: AtomicBool::new(false),
			pauses: AtomicUsize::new(0),
			resumes: AtomicUsize::new(0),
		}
	}

	pub fn is_paused(&self) -> bool {
		self.paused.load(Ordering::SeqCst)
	}

	pub fn pauses(&self) -> usize {
		self.pauses.load(Ordering::SeqCst)
	}

	pub fn resumes(&self) -> usize {
		self.resumes.load(Ordering::SeqCst)
	}
}

impl Upstream for RecordingUpstream {
	fn pause(&self) {
		self.log.record(Event::Pause);
		self.pauses.fetch_add(1, Ordering::SeqCst);
		self.paused.store(true, Ordering::SeqCst);
	}

	fn resume(&self, immediate_retry_hint: bool) {
		self.log.record(Event::Resume {
			immediate_retry_hint,
		});
		self.resumes.fetch_add(1, Ordering::SeqCst);
		self.paused.store(false, Ordering::SeqCst);
	}
}
