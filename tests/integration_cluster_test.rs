// tests/integration_cluster_test.rs

mod common;

use bytes::Bytes;
use common::{ClusterSpec, MockNode, SlotRange, spawn_node};
use peridot::core::cluster::key_hash_slot;
use peridot::core::commands::string;
use peridot::{Batch, BatchResponse, ClientConfig, ClusterClient, ClusterScanCursor, NodeAddress, ScanArgs, Value};
use std::sync::{Arc, Mutex};

const SPLIT: u16 = 8192;

/// Two primaries splitting the keyspace at `SPLIT`. When `advertise_truth`
/// is false, `CLUSTER SLOTS` claims node A owns everything, forcing MOVED
/// redirects onto requests for node B's keys.
async fn spawn_fleet(advertise_truth: bool) -> (ClusterClient, MockNode, MockNode) {
    let spec = Arc::new(Mutex::new(ClusterSpec::default()));
    let node_a = spawn_node(Some((0, SPLIT - 1)), spec.clone()).await;
    let node_b = spawn_node(Some((SPLIT, 16383)), spec.clone()).await;

    let actual = vec![
        SlotRange {
            start: 0,
            end: SPLIT - 1,
            addr: node_a.addr,
            node_id: "nodeA".to_string(),
        },
        SlotRange {
            start: SPLIT,
            end: 16383,
            addr: node_b.addr,
            node_id: "nodeB".to_string(),
        },
    ];
    let advertised = if advertise_truth {
        actual.clone()
    } else {
        vec![SlotRange {
            start: 0,
            end: 16383,
            addr: node_a.addr,
            node_id: "nodeA".to_string(),
        }]
    };
    {
        let mut spec = spec.lock().unwrap();
        spec.advertised = advertised;
        spec.actual = actual;
    }

    let mut config = ClientConfig::new(vec![NodeAddress::new(
        node_a.addr.ip().to_string(),
        node_a.addr.port(),
    )]);
    config.cluster_mode = true;
    config.request_timeout_ms = 2000;
    config.connect_timeout_ms = 2000;
    let client = ClusterClient::connect(config).await.expect("cluster connect");
    (client, node_a, node_b)
}

/// A key whose slot lands at or above `SPLIT` (owned by node B).
fn key_owned_by_b() -> Bytes {
    for i in 0..10_000u32 {
        let key = format!("key-{i}");
        if key_hash_slot(key.as_bytes()) >= SPLIT {
            return Bytes::from(key);
        }
    }
    unreachable!("no key hashed into node B's range");
}

fn key_owned_by_a() -> Bytes {
    for i in 0..10_000u32 {
        let key = format!("key-{i}");
        if key_hash_slot(key.as_bytes()) < SPLIT {
            return Bytes::from(key);
        }
    }
    unreachable!("no key hashed into node A's range");
}

#[tokio::test]
async fn test_moved_redirect_is_followed_transparently() {
    // CLUSTER SLOTS lies: everything points at node A, so node B's keys come
    // back MOVED and the client must follow the hint.
    let (client, _a, _b) = spawn_fleet(false).await;
    let key = key_owned_by_b();

    client.set(key.clone(), "v").await.unwrap();
    assert_eq!(client.get(key).await.unwrap(), Some(Bytes::from("v")));
    client.close().await;
}

#[tokio::test]
async fn test_cross_slot_pipeline_with_multikey_merge() {
    let (client, _a, _b) = spawn_fleet(true).await;
    let a = key_owned_by_a();
    let b = key_owned_by_b();

    let batch = Batch::pipeline()
        .cmd(string::set(a.clone(), "1"))
        .cmd(string::set(b.clone(), "2"))
        .cmd(string::mget(vec![a, b]));
    let BatchResponse::Completed(results) = client.exec(batch).await.unwrap() else {
        panic!("pipeline aborted");
    };
    assert_eq!(results.len(), 3);
    assert_eq!(results[0].as_ref().unwrap(), &Value::Ok);
    assert_eq!(results[1].as_ref().unwrap(), &Value::Ok);
    assert_eq!(
        results[2].as_ref().unwrap(),
        &Value::Array(vec![
            Value::String(Bytes::from("1")),
            Value::String(Bytes::from("2")),
        ])
    );
    client.close().await;
}

#[tokio::test]
async fn test_multikey_mget_splits_across_shards() {
    let (client, _a, _b) = spawn_fleet(true).await;
    let a = key_owned_by_a();
    let b = key_owned_by_b();
    client.set(a.clone(), "alpha").await.unwrap();
    client.set(b.clone(), "beta").await.unwrap();

    let values = client.mget(vec![a, b]).await.unwrap();
    assert_eq!(
        values,
        vec![Some(Bytes::from("alpha")), Some(Bytes::from("beta"))]
    );
    client.close().await;
}

#[tokio::test]
async fn test_atomic_batch_rejects_cross_slot_keys() {
    let (client, _a, _b) = spawn_fleet(true).await;
    let a = key_owned_by_a();
    let b = key_owned_by_b();

    let batch = Batch::atomic()
        .cmd(string::set(a, "1"))
        .cmd(string::set(b, "2"));
    let err = client.exec(batch).await.unwrap_err();
    assert_eq!(err, peridot::ClientError::CrossSlot);
    client.close().await;
}

#[tokio::test]
async fn test_cluster_scan_covers_both_shards() {
    let (client, node_a, node_b) = spawn_fleet(true).await;
    node_a
        .store
        .lock()
        .unwrap()
        .insert(Bytes::from("a1"), Bytes::from("x"));
    node_b
        .store
        .lock()
        .unwrap()
        .insert(Bytes::from("b1"), Bytes::from("y"));

    let cursor = ClusterScanCursor::new();
    let args = ScanArgs::default();
    let mut seen: Vec<Bytes> = Vec::new();
    // Bounded iterations: two nodes, one page each, plus the finishing call.
    for _ in 0..10 {
        let keys = client.cluster_scan(&cursor, &args).await.unwrap();
        seen.extend(keys);
        if cursor.is_finished() {
            break;
        }
    }
    assert!(cursor.is_finished());
    seen.sort();
    assert_eq!(seen, vec![Bytes::from("a1"), Bytes::from("b1")]);
    client.close().await;
}

#[tokio::test]
async fn test_topology_epoch_advances_on_refresh() {
    let (client, _a, _b) = spawn_fleet(true).await;
    let before = client.topology_epoch();
    let after = client.refresh_topology().await.unwrap();
    assert!(after > before);
    assert_eq!(client.topology_epoch(), after);
    client.close().await;
}
