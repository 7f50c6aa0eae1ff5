// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

pub mod event;
pub mod fixture;
pub mod receiver;
pub mod service;
pub mod upstream;
pub mod util;

pub use event::{Event, EventLog};
pub use fixture::Harness;
pub use receiver::{CollectingReceiver, Outcome};
pub use service::EchoFetchService;
pub use upstream::RecordingUpstream;
