// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

mod config;
pub mod flow;
pub mod operator;
pub mod service;

pub use config::{DEFAULT_BATCH_SIZE, FetchConfig};
pub use flow::{Demand, RowReceiver, Upstream};
pub use operator::{FetchOperator, FetchStats, OperatorState};
pub use reifydb_type::Result;
pub use service::{FetchFuture, FetchService, NodeRequest, ReaderBuckets};
