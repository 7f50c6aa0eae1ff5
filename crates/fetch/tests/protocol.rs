// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::sync::Arc;

use reifydb_fetch::{Demand, FetchConfig, FetchOperator, OperatorState};
use reifydb_routing::{FetchRouting, Projection};
use reifydb_testing::{
	CollectingReceiver, EchoFetchService, EventLog, Harness, RecordingUpstream,
	fixture::{fetch_id, fetch_id_rows, id_projection, two_node_routing, users},
	util::wait_for,
};
use reifydb_type::{Error, ErrorKind, Row};
use tokio::runtime::Handle;

fn operator(config: FetchConfig, routing: FetchRouting, projection: Projection) -> (FetchOperator, EventLog) {
	let log = EventLog::new();
	let operator = FetchOperator::new(
		config,
		Arc::new(routing),
		projection,
		Arc::new(EchoFetchService::new(log.clone())),
		Handle::current(),
	);
	(operator, log)
}

fn wire(operator: &FetchOperator, log: &EventLog) {
	operator.set_upstream(Arc::new(RecordingUpstream::new(log.clone()))).unwrap();
	operator.downstream(Arc::new(CollectingReceiver::new(log.clone()))).unwrap();
}

#[tokio::test]
async fn test_push_before_prepare() {
	let (operator, log) = operator(FetchConfig::new(), two_node_routing(), id_projection());
	wire(&operator, &log);

	let err = operator.set_next_row(Row::new(vec![fetch_id(0, 1)])).unwrap_err();
	assert_eq!(
		err,
		Error::NotPrepared {
			operation: "set_next_row"
		}
	);
	assert_eq!(err.kind(), ErrorKind::ProtocolViolation);
	assert!(matches!(operator.finish(), Err(Error::NotPrepared { .. })));
}

#[tokio::test]
async fn test_prepare_requires_wiring() {
	let (operator, log) = operator(FetchConfig::new(), two_node_routing(), id_projection());
	assert_eq!(
		operator.prepare().unwrap_err(),
		Error::NotWired {
			endpoint: "upstream"
		}
	);

	operator.set_upstream(Arc::new(RecordingUpstream::new(log.clone()))).unwrap();
	assert_eq!(
		operator.prepare().unwrap_err(),
		Error::NotWired {
			endpoint: "downstream"
		}
	);
}

#[tokio::test]
async fn test_prepare_twice() {
	let (operator, log) = operator(FetchConfig::new(), two_node_routing(), id_projection());
	wire(&operator, &log);

	operator.prepare().unwrap();
	assert_eq!(operator.prepare().unwrap_err(), Error::AlreadyPrepared);
}

#[tokio::test]
async fn test_wiring_is_fixed() {
	let (operator, log) = operator(FetchConfig::new(), two_node_routing(), id_projection());
	wire(&operator, &log);

	let err = operator.set_upstream(Arc::new(RecordingUpstream::new(log.clone()))).unwrap_err();
	assert_eq!(
		err,
		Error::AlreadyWired {
			endpoint: "upstream"
		}
	);

	operator.prepare().unwrap();
	let err = operator.downstream(Arc::new(CollectingReceiver::new(log.clone()))).unwrap_err();
	assert_eq!(err, Error::AlreadyPrepared);
}

#[tokio::test]
async fn test_zero_batch_size() {
	let (operator, log) = operator(FetchConfig::new().batch_size(0), two_node_routing(), id_projection());
	wire(&operator, &log);

	let err = operator.prepare().unwrap_err();
	assert_eq!(
		err,
		Error::InvalidBatchSize {
			batch_size: 0
		}
	);
	assert_eq!(err.kind(), ErrorKind::Configuration);
}

#[tokio::test]
async fn test_prepare_rejects_bad_routing() {
	let routing = FetchRouting::builder().node("nodeOne", [0u32]).reader_table(0u32, users()).build();
	let (operator, log) = operator(FetchConfig::new(), routing, id_projection());
	wire(&operator, &log);

	let err = operator.prepare().unwrap_err();
	assert_eq!(err.kind(), ErrorKind::Configuration);
	assert!(matches!(err, Error::MissingFetchSource { .. }));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_push_while_fetching() {
	let log = EventLog::new();
	let harness = Harness::wire(
		log.clone(),
		FetchConfig::new().batch_size(2),
		two_node_routing(),
		id_projection(),
		EchoFetchService::new(log.clone()).gated(),
		CollectingReceiver::new(log),
	)
	.unwrap();
	harness.operator.prepare().unwrap();

	for row in fetch_id_rows(0, 1..=2) {
		assert_eq!(harness.operator.set_next_row(row).unwrap(), Demand::Continue);
	}
	assert!(harness.upstream.is_paused());
	assert_eq!(harness.operator.state(), OperatorState::Fetching);

	let err = harness.operator.set_next_row(Row::new(vec![fetch_id(0, 3)])).unwrap_err();
	assert_eq!(err, Error::protocol("set_next_row", "fetching"));
	assert!(matches!(harness.operator.finish(), Err(Error::ProtocolViolation { .. })));

	harness.service.open_gate(1);
	wait_for(|| !harness.upstream.is_paused(), "batch should complete").await;
	assert_eq!(harness.operator.state(), OperatorState::Collecting);
	assert_eq!(harness.receiver.rows().len(), 2);

	harness.operator.finish().unwrap();
	assert_eq!(harness.receiver.result().await.unwrap().len(), 2);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_push_after_finish() {
	let harness = Harness::two_node(FetchConfig::new()).unwrap();
	harness.run(fetch_id_rows(0, 1..=2)).await.unwrap();

	let err = harness.operator.set_next_row(Row::new(vec![fetch_id(0, 3)])).unwrap_err();
	assert_eq!(err, Error::protocol("set_next_row", "finished"));
	assert!(matches!(harness.operator.finish(), Err(Error::ProtocolViolation { .. })));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_final_batch_waits_for_fetch() {
	let log = EventLog::new();
	let harness = Harness::wire(
		log.clone(),
		FetchConfig::new().batch_size(5),
		two_node_routing(),
		id_projection(),
		EchoFetchService::new(log.clone()).gated(),
		CollectingReceiver::new(log),
	)
	.unwrap();
	harness.operator.prepare().unwrap();

	for row in fetch_id_rows(0, 1..=3) {
		harness.operator.set_next_row(row).unwrap();
	}
	harness.operator.finish().unwrap();

	assert_eq!(harness.operator.state(), OperatorState::Fetching);
	assert!(!harness.receiver.is_done());

	harness.service.open_gate(1);
	assert_eq!(harness.receiver.result().await.unwrap().len(), 3);
	assert_eq!(harness.operator.state(), OperatorState::Finished);
}
