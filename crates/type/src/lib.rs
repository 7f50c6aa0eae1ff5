// SPDX-License-Identifier: MIT
// Copyright (c) 2025 ReifyDB

pub mod bucket;
pub mod error;
pub mod row;
pub mod value;

pub use bucket::Bucket;
pub use error::{Diagnostic, Error, ErrorKind, IntoDiagnostic, Result};
pub use row::Row;
pub use value::{OrderedF32, OrderedF64, Type, Value};
