// SPDX-License-Identifier: MIT
// Copyright (c) 2025 ReifyDB

use std::fmt::{Display, Formatter, Write};

use serde::{Deserialize, Serialize};

use super::Error;

/// A coded, human readable description of an [`Error`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Diagnostic {
	pub code: String,
	pub message: String,
	pub label: Option<String>,
	pub help: Option<String>,
	pub notes: Vec<String>,
}

impl Diagnostic {
	fn new(code: &str, message: String) -> Self {
		Self {
			code: code.to_string(),
			message,
			label: None,
			help: None,
			notes: vec![],
		}
	}

	fn label(mut self, label: impl Into<String>) -> Self {
		self.label = Some(label.into());
		self
	}

	fn help(mut self, help: impl Into<String>) -> Self {
		self.help = Some(help.into());
		self
	}

	fn note(mut self, note: impl Into<String>) -> Self {
		self.notes.push(note.into());
		self
	}

	/// Renders the diagnostic over several lines, including help and notes.
	pub fn render(&self) -> String {
		let mut out = format!("Error {}: {}", self.code, self.message);
		if let Some(label) = &self.label {
			let _ = write!(out, "\n  --> {}", label);
		}
		if let Some(help) = &self.help {
			let _ = write!(out, "\n  help: {}", help);
		}
		for note in &self.notes {
			let _ = write!(out, "\n  note: {}", note);
		}
		out
	}
}

impl Display for Diagnostic {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		write!(f, "{}: {}", self.code, self.message)
	}
}

pub trait IntoDiagnostic {
	fn into_diagnostic(self) -> Diagnostic;
}

impl IntoDiagnostic for Error {
	fn into_diagnostic(self) -> Diagnostic {
		let message = self.to_string();
		match self {
			Error::InvalidBatchSize { .. } => Diagnostic::new("CONFIG_001", message)
				.label("batch size of zero")
				.help("Configure a batch size of at least one row"),

			Error::NotWired { endpoint } => Diagnostic::new("CONFIG_002", message)
				.help(format!("Wire the {} before calling prepare", endpoint)),

			Error::MissingFetchSource { .. } => Diagnostic::new("CONFIG_003", message)
				.help("Every table referenced by a fetch placeholder needs a fetch source"),

			Error::DuplicateFetchSource { .. } => Diagnostic::new("CONFIG_004", message)
				.note("A table must map to exactly one fetch source"),

			Error::FetchIdColumnNotDeclared { .. } => Diagnostic::new("CONFIG_005", message)
				.help("List the input column among the fetch id columns of the table's fetch source"),

			Error::UnknownFetchColumn { .. } => Diagnostic::new("CONFIG_006", message)
				.help("Add the column to the references of the table's fetch source"),

			Error::ColumnTypeMismatch { .. } => Diagnostic::new("CONFIG_007", message),

			Error::UnboundIndex { .. } => Diagnostic::new("CONFIG_008", message)
				.note("Every reader base must point at an index with a table binding"),

			Error::UnresolvedReader { .. } => Diagnostic::new("CONFIG_009", message)
				.note("Reader ids resolve to the reader base with the greatest id not above them"),

			Error::DuplicateReaderOwner { .. } => Diagnostic::new("CONFIG_010", message)
				.note("A reader is owned by exactly one node"),

			Error::ProtocolViolation { .. } => Diagnostic::new("PROTOCOL_001", message)
				.help("Upstreams must not push rows while paused or after finish/fail"),

			Error::NotPrepared { .. } => Diagnostic::new("PROTOCOL_002", message)
				.help("Call prepare after wiring and before the first row"),

			Error::AlreadyPrepared => Diagnostic::new("PROTOCOL_003", message),

			Error::AlreadyWired { .. } => Diagnostic::new("PROTOCOL_004", message)
				.note("Wiring happens once, before prepare"),

			Error::FetchFailed { node, .. } => Diagnostic::new("FETCH_001", message)
				.label(format!("node '{}'", node))
				.note("Failed fetches are not retried by the operator"),

			Error::InvalidFetchId { .. } => Diagnostic::new("FETCH_002", message)
				.note("Fetch ids are INT8 values packing the reader id and the document id"),

			Error::ReaderNotRouted { .. } => Diagnostic::new("FETCH_003", message),

			Error::MissingBucket { .. } => Diagnostic::new("FETCH_004", message),

			Error::BucketSizeMismatch { .. } => Diagnostic::new("FETCH_005", message)
				.note("Buckets must be aligned with the requested document ids"),

			Error::MissingDocument { .. } => Diagnostic::new("FETCH_006", message),

			Error::ValueTypeMismatch { .. } => Diagnostic::new("FETCH_007", message),

			Error::MissingFetchedValue { .. } => Diagnostic::new("FETCH_008", message),

			Error::InputOutOfBounds { .. } => Diagnostic::new("FETCH_009", message),

			Error::ReaderTableMismatch { .. } => Diagnostic::new("FETCH_010", message),

			Error::UpstreamFailed { .. } => Diagnostic::new("UPSTREAM_001", message),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_fetch_failed_diagnostic() {
		let diagnostic = Error::fetch_failed("nodeTwo", "timeout").diagnostic();
		assert_eq!(diagnostic.code, "FETCH_001");
		assert_eq!(diagnostic.label.as_deref(), Some("node 'nodeTwo'"));
		assert!(diagnostic.render().contains("note: Failed fetches are not retried"));
	}

	#[test]
	fn test_display_is_code_and_message() {
		let diagnostic = Error::AlreadyPrepared.diagnostic();
		assert_eq!(diagnostic.to_string(), "PROTOCOL_003: prepare called more than once");
	}
}
