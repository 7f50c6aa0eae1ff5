// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use reifydb_fetch::{Demand, FetchConfig, OperatorState};
use reifydb_testing::{
	CollectingReceiver, EchoFetchService, Event, EventLog, Harness, Outcome,
	fixture::{fetch_id, fetch_id_rows, id_projection, two_node_routing},
};
use reifydb_type::Row;

fn stopping_after(limit: usize, batch_size: usize) -> Harness {
	let log = EventLog::new();
	let harness = Harness::wire(
		log.clone(),
		FetchConfig::new().batch_size(batch_size),
		two_node_routing(),
		id_projection(),
		EchoFetchService::new(log.clone()),
		CollectingReceiver::new(log).stop_after(limit),
	)
	.unwrap();
	harness.operator.prepare().unwrap();
	harness
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_stop_mid_batch() {
	let harness = stopping_after(2, 3);

	assert_eq!(harness.feed(fetch_id_rows(0, 1..=10)).await.unwrap(), Demand::Stop);

	assert_eq!(harness.receiver.rows().len(), 2);
	assert_eq!(harness.receiver.outcome(), Some(Outcome::Finished));
	assert_eq!(harness.operator.state(), OperatorState::Finished);
	// the upstream is resumed so it can observe the stop
	assert_eq!(harness.upstream.resumes(), 1);
	assert_eq!(harness.service.calls(), 1);
	assert_eq!(harness.operator.stats().rows_emitted, 2);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_rows_after_stop_are_refused() {
	let harness = stopping_after(1, 2);
	harness.feed(fetch_id_rows(0, 1..=2)).await.unwrap();

	assert_eq!(harness.operator.set_next_row(Row::new(vec![fetch_id(0, 9)])).unwrap(), Demand::Stop);
	assert_eq!(harness.operator.set_next_row(Row::new(vec![fetch_id(0, 10)])).unwrap(), Demand::Stop);
	harness.operator.finish().unwrap();

	assert_eq!(harness.receiver.rows().len(), 1);
	assert_eq!(harness.log.count(|event| matches!(event, Event::Finish)), 1);
	assert_eq!(harness.operator.stats().rows_received, 2);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_stop_on_last_row_of_final_batch() {
	let harness = stopping_after(3, 10);

	let rows = harness.run(fetch_id_rows(0, 1..=3)).await.unwrap();

	assert_eq!(rows.len(), 3);
	assert_eq!(harness.log.count(|event| matches!(event, Event::Finish)), 1);
	assert_eq!(harness.operator.state(), OperatorState::Finished);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_stop_releases_contexts() {
	let harness = stopping_after(1, 2);
	harness.feed(fetch_id_rows(0, 1..=2)).await.unwrap();

	assert_eq!(harness.log.count(|event| matches!(event, Event::Release { .. })), 2);
}
