// tests/integration_standalone_test.rs

mod common;

use bytes::Bytes;
use common::{ClusterSpec, spawn_node};
use peridot::core::batch::{Batch, BatchResponse};
use peridot::core::commands::string;
use peridot::{ChannelMode, ClientConfig, NodeAddress, PushMessage, StandaloneClient};
use std::sync::{Arc, Mutex};
use std::time::Duration;

async fn connect_client() -> (StandaloneClient, common::MockNode) {
    let node = spawn_node(None, Arc::new(Mutex::new(ClusterSpec::default()))).await;
    let mut config = ClientConfig::new(vec![NodeAddress::new(
        node.addr.ip().to_string(),
        node.addr.port(),
    )]);
    config.request_timeout_ms = 2000;
    config.connect_timeout_ms = 2000;
    let client = StandaloneClient::connect(config)
        .await
        .expect("standalone connect");
    (client, node)
}

#[tokio::test]
async fn test_set_then_get_roundtrip() {
    let (client, _node) = connect_client().await;
    client.set("k", "v").await.unwrap();
    assert_eq!(client.get("k").await.unwrap(), Some(Bytes::from("v")));
    assert_eq!(client.get("missing").await.unwrap(), None);
    client.close().await;
}

#[tokio::test]
async fn test_counter_sequence() {
    let (client, _node) = connect_client().await;
    assert_eq!(client.incr("c").await.unwrap(), 1);
    assert_eq!(client.incr("c").await.unwrap(), 2);
    assert_eq!(client.incrby("c", 5).await.unwrap(), 7);
    let value = client.incrbyfloat("c", 0.5).await.unwrap();
    assert!((value - 7.5).abs() < f64::EPSILON);
    client.close().await;
}

#[tokio::test]
async fn test_ping_and_echo() {
    let (client, _node) = connect_client().await;
    assert_eq!(client.ping().await.unwrap(), "PONG");
    assert_eq!(client.echo("hello").await.unwrap(), Bytes::from("hello"));
    client.close().await;
}

#[tokio::test]
async fn test_mget_preserves_positions() {
    let (client, _node) = connect_client().await;
    client.set("a", "1").await.unwrap();
    client.set("b", "2").await.unwrap();
    let values = client
        .mget(vec![Bytes::from("a"), Bytes::from("gone"), Bytes::from("b")])
        .await
        .unwrap();
    assert_eq!(
        values,
        vec![Some(Bytes::from("1")), None, Some(Bytes::from("2"))]
    );
    client.close().await;
}

#[tokio::test]
async fn test_aborted_transaction_returns_null_sentinel() {
    let (client, node) = connect_client().await;
    // The mock aborts EXEC while this sentinel key exists, standing in for a
    // watched key changing between WATCH and EXEC.
    node.store.lock().unwrap().insert(
        Bytes::from_static(b"__watch_dirty__"),
        Bytes::from_static(b"1"),
    );
    let batch = Batch::atomic().watch("k").cmd(string::set("k", "x"));
    match client.exec(batch).await.unwrap() {
        BatchResponse::Aborted => {}
        other => panic!("expected aborted transaction, got {other:?}"),
    }
    client.close().await;
}

#[tokio::test]
async fn test_empty_batch_returns_empty_array() {
    let (client, _node) = connect_client().await;
    match client.exec(Batch::pipeline()).await.unwrap() {
        BatchResponse::Completed(results) => assert!(results.is_empty()),
        other => panic!("expected empty completion, got {other:?}"),
    }
    client.close().await;
}

#[tokio::test]
async fn test_pubsub_delivery_and_convergence() {
    let (client, _node) = connect_client().await;
    let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel::<PushMessage>();
    client.set_message_handler(Arc::new(move |message| {
        let _ = tx.send(message);
    }));

    client.subscribe(vec![Bytes::from("news")]).await.unwrap();

    // The acknowledgement push moves the channel from desired to actual.
    let mut confirmed = false;
    for _ in 0..50 {
        if client
            .confirmed_subscriptions(ChannelMode::Exact)
            .contains(&Bytes::from("news"))
        {
            confirmed = true;
            break;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    assert!(confirmed, "subscription never acknowledged");

    let receivers = client.publish("news", "breaking").await.unwrap();
    assert_eq!(receivers, 1);

    let message = tokio::time::timeout(Duration::from_secs(2), rx.recv())
        .await
        .expect("no message within deadline")
        .expect("handler channel closed");
    assert_eq!(message.mode, ChannelMode::Exact);
    assert_eq!(message.channel, Bytes::from("news"));
    assert_eq!(message.payload, Bytes::from("breaking"));
    assert_eq!(client.pubsub_dropped_messages(), 0);
    client.close().await;
}

#[tokio::test]
async fn test_commands_after_close_fail_fast() {
    let (client, _node) = connect_client().await;
    client.close().await;
    let err = client.ping().await.unwrap_err();
    assert_eq!(err, peridot::ClientError::Closing);
}
