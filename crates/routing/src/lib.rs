// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! Routing metadata consumed by the deferred-fetch operator.
//!
//! Everything in this crate is built once per query execution, before the
//! operator is prepared, and is read-only afterwards.

mod column;
mod ident;
mod projection;
mod routing;
mod source;

pub use column::ColumnDescriptor;
pub use ident::{DocId, FetchId, NodeId, ReaderId, TableIdent};
pub use projection::{FetchPlaceholder, OutputColumn, Projection};
pub use routing::{FetchRouting, FetchRoutingBuilder};
pub use source::FetchSource;
