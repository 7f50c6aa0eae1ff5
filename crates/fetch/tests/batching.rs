// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use std::time::Duration;

use reifydb_fetch::{FetchConfig, FetchStats, OperatorState};
use reifydb_routing::{
	ColumnDescriptor, DocId, FetchPlaceholder, FetchRouting, FetchSource, NodeId, OutputColumn, Projection,
	ReaderId, TableIdent,
};
use reifydb_testing::{
	CollectingReceiver, EchoFetchService, Event, EventLog, Harness,
	fixture::{fetch_id, fetch_id_rows, id_projection, two_node_routing, users, users_id},
	util::init_tracing,
};
use reifydb_type::{Row, Type, Value};

fn ints(values: impl IntoIterator<Item = i64>) -> Vec<Value> {
	values.into_iter().map(Value::Int8).collect()
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_ten_rows_in_batches_of_three() {
	init_tracing();
	let harness = Harness::two_node(FetchConfig::new().batch_size(3)).unwrap();

	let rows = harness.run(fetch_id_rows(0, 1..=10)).await.unwrap();

	assert_eq!(rows.len(), 10);
	assert_eq!(harness.receiver.column(0), ints(1..=10));
	assert_eq!(harness.upstream.pauses(), 4);
	assert_eq!(harness.upstream.resumes(), 4);
	assert_eq!(harness.operator.state(), OperatorState::Finished);

	let shape: Vec<_> = harness.log.shape().into_iter().filter(|kind| *kind != "release").collect();
	assert_eq!(
		shape,
		vec![
			"pause", "fetch", "row", "row", "row", "resume", //
			"pause", "fetch", "row", "row", "row", "resume", //
			"pause", "fetch", "row", "row", "row", "resume", //
			"pause", "fetch", "row", "resume", "finish",
		]
	);

	assert_eq!(
		harness.operator.stats(),
		FetchStats {
			rows_received: 10,
			rows_emitted: 10,
			batches: 4,
			requests: 4,
		}
	);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_only_the_final_batch_closes_contexts() {
	let harness = Harness::two_node(FetchConfig::new().batch_size(3)).unwrap();
	harness.run(fetch_id_rows(0, 1..=7)).await.unwrap();

	let flags: Vec<bool> = harness
		.log
		.events()
		.into_iter()
		.filter_map(|event| match event {
			Event::Fetch {
				close_context,
				..
			} => Some(close_context),
			_ => None,
		})
		.collect();
	assert_eq!(flags, vec![false, false, true]);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_exact_multiple_of_batch_size() {
	let harness = Harness::two_node(FetchConfig::new().batch_size(3)).unwrap();

	let rows = harness.run(fetch_id_rows(0, 1..=6)).await.unwrap();

	assert_eq!(rows.len(), 6);
	assert_eq!(harness.service.calls(), 2);
	assert_eq!(harness.upstream.pauses(), 2);
	assert_eq!(harness.upstream.resumes(), 2);
	assert_eq!(harness.log.shape().last(), Some(&"finish"));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_no_rows() {
	let harness = Harness::two_node(FetchConfig::new().batch_size(3)).unwrap();

	let rows = harness.run(Vec::new()).await.unwrap();

	assert!(rows.is_empty());
	assert_eq!(harness.service.calls(), 0);
	assert_eq!(harness.upstream.pauses(), 0);
	assert_eq!(harness.operator.state(), OperatorState::Finished);
	assert_eq!(harness.log.count(|event| matches!(event, Event::Finish)), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_empty_finish_releases_contexts() {
	let harness = Harness::two_node(FetchConfig::new()).unwrap();
	harness.operator.finish().unwrap();
	harness.receiver.result().await.unwrap();

	reifydb_testing::util::wait_for(
		|| harness.log.count(|event| matches!(event, Event::Release { .. })) == 2,
		"both nodes should be released",
	)
	.await;
	assert_eq!(harness.service.calls(), 0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_finish_without_closing_contexts() {
	let harness = Harness::two_node(FetchConfig::new().close_context_on_finish(false)).unwrap();
	harness.run(fetch_id_rows(0, 1..=2)).await.unwrap();

	assert_eq!(harness.log.count(|event| matches!(event, Event::Release { .. })), 0);
	assert!(harness.log.events().iter().all(|event| !matches!(
		event,
		Event::Fetch {
			close_context: true,
			..
		}
	)));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_rows_spanning_nodes_keep_arrival_order() {
	let log = EventLog::new();
	let service = EchoFetchService::new(log.clone())
		.with_delay("nodeOne", Duration::from_millis(30))
		.with_rows(|reader, doc| Row::new(vec![Value::Int8(reader.0 as i64 * 100 + doc.0 as i64)]));
	let harness = Harness::wire(
		log.clone(),
		FetchConfig::new().batch_size(4),
		two_node_routing(),
		id_projection(),
		service,
		CollectingReceiver::new(log),
	)
	.unwrap();
	harness.operator.prepare().unwrap();

	let input = vec![
		Row::new(vec![fetch_id(0, 1)]),
		Row::new(vec![fetch_id(2, 1)]),
		Row::new(vec![fetch_id(2, 9)]),
		Row::new(vec![fetch_id(0, 4)]),
		Row::new(vec![fetch_id(2, 3)]),
	];
	harness.run(input).await.unwrap();

	assert_eq!(harness.receiver.column(0), ints([1, 201, 209, 4, 203]));
	// one call per node for the first batch, one for the second
	assert_eq!(harness.service.calls(), 3);
	assert_eq!(harness.upstream.pauses(), 2);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_each_node_gets_only_its_readers() {
	let harness = Harness::two_node(FetchConfig::new().batch_size(10)).unwrap();
	let input = vec![
		Row::new(vec![fetch_id(2, 5)]),
		Row::new(vec![fetch_id(0, 7)]),
		Row::new(vec![fetch_id(2, 5)]),
		Row::new(vec![fetch_id(0, 3)]),
	];
	harness.run(input).await.unwrap();

	for event in harness.log.events() {
		if let Event::Fetch {
			node,
			request,
			..
		} = event
		{
			let readers: Vec<ReaderId> = request.keys().copied().collect();
			if node == NodeId::from("nodeOne") {
				assert_eq!(readers, vec![ReaderId(0)]);
				assert_eq!(request[&ReaderId(0)].iter().copied().collect::<Vec<_>>(), vec![DocId(7), DocId(3)]);
			} else {
				assert_eq!(node, NodeId::from("nodeTwo"));
				assert_eq!(readers, vec![ReaderId(2)]);
				// the repeated document is requested once
				assert_eq!(request[&ReaderId(2)].len(), 1);
			}
		}
	}
	assert_eq!(harness.receiver.column(0), ints([5, 7, 5, 3]));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_at_most_one_batch_in_flight() {
	let log = EventLog::new();
	let service = EchoFetchService::new(log.clone()).with_delay("nodeOne", Duration::from_millis(5));
	let harness = Harness::wire(
		log.clone(),
		FetchConfig::new().batch_size(2),
		two_node_routing(),
		id_projection(),
		service,
		CollectingReceiver::new(log),
	)
	.unwrap();
	harness.operator.prepare().unwrap();

	harness.run(fetch_id_rows(0, 0..20)).await.unwrap();

	assert_eq!(harness.service.max_in_flight(), 1);
	assert_eq!(harness.service.calls(), 10);

	// a fetch is never issued before the previous batch resumed the upstream
	let shape = harness.log.shape();
	let mut outstanding = false;
	for kind in shape {
		match kind {
			"fetch" => {
				assert!(!outstanding);
				outstanding = true;
			}
			"resume" => outstanding = false,
			_ => {}
		}
	}
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_input_columns_pass_through() {
	let log = EventLog::new();
	let name = ColumnDescriptor::new(users(), "name", Type::Utf8);
	let routing = FetchRouting::builder()
		.node("nodeOne", [0u32])
		.reader_table(0u32, users())
		.source(users(), FetchSource::new(vec![1], vec![users_id(), name.clone()]))
		.build();
	let projection = Projection::new(vec![
		OutputColumn::Fetch(FetchPlaceholder::new(1, name)),
		OutputColumn::Input(0),
		OutputColumn::Fetch(FetchPlaceholder::new(1, users_id())),
	]);
	let service = EchoFetchService::new(log.clone())
		.with_rows(|_, doc| Row::new(vec![Value::Int8(doc.0 as i64), Value::utf8(format!("user-{}", doc.0))]));

	let harness = Harness::wire(
		log.clone(),
		FetchConfig::new().batch_size(2),
		routing,
		projection,
		service,
		CollectingReceiver::new(log),
	)
	.unwrap();
	harness.operator.prepare().unwrap();

	let rows = harness
		.run(vec![
			Row::new(vec![Value::Boolean(true), fetch_id(0, 3)]),
			Row::new(vec![Value::Boolean(false), Value::Undefined]),
			Row::new(vec![Value::Boolean(true), fetch_id(0, 8)]),
		])
		.await
		.unwrap();

	assert_eq!(
		rows,
		vec![
			Row::new(vec![Value::utf8("user-3"), Value::Boolean(true), Value::Int8(3)]),
			Row::new(vec![Value::Undefined, Value::Boolean(false), Value::Undefined]),
			Row::new(vec![Value::utf8("user-8"), Value::Boolean(true), Value::Int8(8)]),
		]
	);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_batch_without_fetch_ids_skips_the_service() {
	let harness = Harness::two_node(FetchConfig::new().batch_size(2)).unwrap();

	let rows = harness.run(vec![Row::new(vec![Value::Undefined]), Row::new(vec![Value::Undefined])]).await.unwrap();

	assert_eq!(rows, vec![Row::new(vec![Value::Undefined]), Row::new(vec![Value::Undefined])]);
	assert_eq!(harness.service.calls(), 0);
	// the batch still pauses and resumes the upstream
	assert_eq!(harness.upstream.pauses(), 1);
	assert_eq!(harness.upstream.resumes(), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_two_tables_in_one_row() {
	let log = EventLog::new();
	let orders = TableIdent::new("doc", "orders");
	let order_total = ColumnDescriptor::new(orders.clone(), "total", Type::Int8);
	let routing = FetchRouting::builder()
		.node("nodeOne", [0u32, 1, 4, 5])
		.reader_table(0u32, users())
		.reader_table(4u32, orders.clone())
		.source(users(), FetchSource::new(vec![0], vec![users_id()]))
		.source(orders, FetchSource::new(vec![1], vec![order_total.clone()]))
		.build();
	let projection = Projection::new(vec![
		OutputColumn::Fetch(FetchPlaceholder::new(0, users_id())),
		OutputColumn::Fetch(FetchPlaceholder::new(1, order_total)),
	]);
	let service = EchoFetchService::new(log.clone())
		.with_rows(|reader, doc| Row::new(vec![Value::Int8(reader.0 as i64 * 1000 + doc.0 as i64)]));

	let harness = Harness::wire(
		log.clone(),
		FetchConfig::new(),
		routing,
		projection,
		service,
		CollectingReceiver::new(log),
	)
	.unwrap();
	harness.operator.prepare().unwrap();

	let rows = harness
		.run(vec![Row::new(vec![fetch_id(0, 1), fetch_id(4, 2)]), Row::new(vec![fetch_id(1, 5), fetch_id(5, 6)])])
		.await
		.unwrap();

	assert_eq!(
		rows,
		vec![
			Row::new(vec![Value::Int8(1), Value::Int8(4002)]),
			Row::new(vec![Value::Int8(1005), Value::Int8(5006)]),
		]
	);
	// readers of both tables live on one node: a single call
	assert_eq!(harness.service.calls(), 1);
}
