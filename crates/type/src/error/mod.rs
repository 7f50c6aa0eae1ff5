// SPDX-License-Identifier: MIT
// Copyright (c) 2025 ReifyDB

use std::fmt::{self, Display, Formatter};

use crate::{Type, Value};

mod diagnostic;

pub use diagnostic::{Diagnostic, IntoDiagnostic};

pub type Result<T> = std::result::Result<T, Error>;

/// The four ways a deferred-fetch pipeline can go wrong.
///
/// `Configuration` and `ProtocolViolation` are programmer errors and are
/// returned to the caller immediately. `FetchFailure` and `UpstreamFailure`
/// are runtime conditions that terminate the operator and reach the
/// downstream receiver through `fail`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
	Configuration,
	ProtocolViolation,
	FetchFailure,
	UpstreamFailure,
}

impl Display for ErrorKind {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		match self {
			ErrorKind::Configuration => f.write_str("configuration error"),
			ErrorKind::ProtocolViolation => f.write_str("protocol violation"),
			ErrorKind::FetchFailure => f.write_str("fetch failure"),
			ErrorKind::UpstreamFailure => f.write_str("upstream failure"),
		}
	}
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum Error {
	#[error("batch size must be greater than zero, got {batch_size}")]
	InvalidBatchSize {
		batch_size: usize,
	},

	#[error("{endpoint} is not wired")]
	NotWired {
		endpoint: &'static str,
	},

	#[error("no fetch source for table '{table}'")]
	MissingFetchSource {
		table: String,
	},

	#[error("table '{table}' has {count} fetch sources, expected exactly one")]
	DuplicateFetchSource {
		table: String,
		count: usize,
	},

	#[error("input column {index} is not a fetch id column of table '{table}'")]
	FetchIdColumnNotDeclared {
		table: String,
		index: usize,
	},

	#[error("column '{column}' is not fetched for table '{table}'")]
	UnknownFetchColumn {
		table: String,
		column: String,
	},

	#[error("column '{table}.{column}' is declared as {declared}, but the fetch source provides {provided}")]
	ColumnTypeMismatch {
		table: String,
		column: String,
		declared: Type,
		provided: Type,
	},

	#[error("index '{index}' is not bound to a table")]
	UnboundIndex {
		index: String,
	},

	#[error("reader {reader} on node '{node}' does not resolve to a table")]
	UnresolvedReader {
		node: String,
		reader: u32,
	},

	#[error("reader {reader} is owned by both '{first}' and '{second}'")]
	DuplicateReaderOwner {
		reader: u32,
		first: String,
		second: String,
	},

	#[error("{operation} is not allowed while {state}")]
	ProtocolViolation {
		operation: &'static str,
		state: String,
	},

	#[error("{operation} called before prepare")]
	NotPrepared {
		operation: &'static str,
	},

	#[error("prepare called more than once")]
	AlreadyPrepared,

	#[error("{endpoint} is already wired")]
	AlreadyWired {
		endpoint: &'static str,
	},

	#[error("fetch from node '{node}' failed: {reason}")]
	FetchFailed {
		node: String,
		reason: String,
	},

	#[error("input column {index} holds {value}, which is not a fetch id")]
	InvalidFetchId {
		index: usize,
		value: Value,
	},

	#[error("reader {reader} is not owned by any node")]
	ReaderNotRouted {
		reader: u32,
	},

	#[error("no bucket returned for reader {reader}")]
	MissingBucket {
		reader: u32,
	},

	#[error("bucket for reader {reader} has {actual} rows, expected {expected}")]
	BucketSizeMismatch {
		reader: u32,
		expected: usize,
		actual: usize,
	},

	#[error("document {doc} of reader {reader} was not requested")]
	MissingDocument {
		reader: u32,
		doc: u32,
	},

	#[error("fetched value for '{column}' is {actual}, expected {expected}")]
	ValueTypeMismatch {
		column: String,
		expected: Type,
		actual: Type,
	},

	#[error("fetched row for reader {reader} has no value at position {position}")]
	MissingFetchedValue {
		reader: u32,
		position: usize,
	},

	#[error("input column {index} is out of bounds for a row of {arity} values")]
	InputOutOfBounds {
		index: usize,
		arity: usize,
	},

	#[error("reader {reader} belongs to '{actual}', expected '{expected}'")]
	ReaderTableMismatch {
		reader: u32,
		expected: String,
		actual: String,
	},

	#[error("upstream failed: {reason}")]
	UpstreamFailed {
		reason: String,
	},
}

impl Error {
	pub fn protocol(operation: &'static str, state: impl Display) -> Self {
		Error::ProtocolViolation {
			operation,
			state: state.to_string(),
		}
	}

	pub fn fetch_failed(node: impl Into<String>, reason: impl Display) -> Self {
		Error::FetchFailed {
			node: node.into(),
			reason: reason.to_string(),
		}
	}

	pub fn upstream(reason: impl Display) -> Self {
		Error::UpstreamFailed {
			reason: reason.to_string(),
		}
	}

	pub fn kind(&self) -> ErrorKind {
		match self {
			Error::InvalidBatchSize { .. }
			| Error::NotWired { .. }
			| Error::MissingFetchSource { .. }
			| Error::DuplicateFetchSource { .. }
			| Error::FetchIdColumnNotDeclared { .. }
			| Error::UnknownFetchColumn { .. }
			| Error::ColumnTypeMismatch { .. }
			| Error::UnboundIndex { .. }
			| Error::UnresolvedReader { .. }
			| Error::DuplicateReaderOwner { .. } => ErrorKind::Configuration,

			Error::ProtocolViolation { .. }
			| Error::NotPrepared { .. }
			| Error::AlreadyPrepared
			| Error::AlreadyWired { .. } => ErrorKind::ProtocolViolation,

			Error::FetchFailed { .. }
			| Error::InvalidFetchId { .. }
			| Error::ReaderNotRouted { .. }
			| Error::MissingBucket { .. }
			| Error::BucketSizeMismatch { .. }
			| Error::MissingDocument { .. }
			| Error::ValueTypeMismatch { .. }
			| Error::MissingFetchedValue { .. }
			| Error::InputOutOfBounds { .. }
			| Error::ReaderTableMismatch { .. } => ErrorKind::FetchFailure,

			Error::UpstreamFailed { .. } => ErrorKind::UpstreamFailure,
		}
	}

	pub fn diagnostic(&self) -> Diagnostic {
		self.clone().into_diagnostic()
	}
}
