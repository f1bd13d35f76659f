// tests/unit_topology_test.rs

use bytes::Bytes;
use peridot::NodeAddress;
use peridot::core::cluster::topology::{NodeRole, TopologyMap, TopologyView};
use peridot::core::protocol::Value;

fn string(s: &str) -> Value {
    Value::String(Bytes::from(s.to_string()))
}

/// Builds a `CLUSTER SLOTS`-shaped reply: two shards, the first with one
/// replica carrying an availability-zone tag.
fn sample_reply() -> Value {
    Value::Array(vec![
        Value::Array(vec![
            Value::Int(0),
            Value::Int(8191),
            Value::Array(vec![string("10.0.0.1"), Value::Int(6379), string("node-a")]),
            Value::Array(vec![
                string("10.0.0.2"),
                Value::Int(6379),
                string("node-a-replica"),
                Value::Array(vec![string("availability-zone"), string("us-east-1a")]),
            ]),
        ]),
        Value::Array(vec![
            Value::Int(8192),
            Value::Int(16383),
            Value::Array(vec![string("10.0.0.3"), Value::Int(6379), string("node-b")]),
        ]),
    ])
}

#[test]
fn test_cluster_slots_parsing() {
    let map = TopologyMap::from_cluster_slots(sample_reply(), 7).unwrap();
    assert_eq!(map.epoch(), 7);
    assert_eq!(map.shards().len(), 2);
    assert_eq!(map.nodes().count(), 3);

    let node_a = map.node_by_id("node-a").expect("node-a");
    assert_eq!(node_a.role, NodeRole::Primary);
    assert_eq!(node_a.addr, NodeAddress::new("10.0.0.1", 6379));

    let replica = map.node_by_id("node-a-replica").expect("replica");
    assert_eq!(replica.role, NodeRole::Replica);
    assert_eq!(replica.primary_id.as_deref(), Some("node-a"));
    assert_eq!(replica.zone.as_deref(), Some("us-east-1a"));
}

#[test]
fn test_slot_ownership_at_boundaries() {
    let map = TopologyMap::from_cluster_slots(sample_reply(), 2).unwrap();
    assert_eq!(map.shard_for_slot(0).unwrap().primary.id, "node-a");
    assert_eq!(map.shard_for_slot(8191).unwrap().primary.id, "node-a");
    assert_eq!(map.shard_for_slot(8192).unwrap().primary.id, "node-b");
    assert_eq!(map.shard_for_slot(16383).unwrap().primary.id, "node-b");
}

#[test]
fn test_partial_coverage_reports_unassigned_slots() {
    let reply = Value::Array(vec![Value::Array(vec![
        Value::Int(0),
        Value::Int(100),
        Value::Array(vec![string("10.0.0.1"), Value::Int(6379), string("node-a")]),
    ])]);
    let map = TopologyMap::from_cluster_slots(reply, 2).unwrap();
    assert!(map.shard_for_slot(100).is_ok());
    assert!(map.shard_for_slot(101).is_err());
}

#[test]
fn test_standalone_map_covers_every_slot() {
    let map = TopologyMap::standalone(NodeAddress::new("localhost", 6379));
    assert_eq!(map.shards().len(), 1);
    for slot in [0u16, 1, 8000, 16383] {
        assert_eq!(
            map.shard_for_slot(slot).unwrap().primary.addr,
            NodeAddress::new("localhost", 6379)
        );
    }
}

#[test]
fn test_view_swap_requires_strictly_greater_epoch() {
    let view = TopologyView::new(TopologyMap::from_cluster_slots(sample_reply(), 5).unwrap());
    assert_eq!(view.epoch(), 5);

    // A snapshot with a stale epoch must be rejected.
    let stale = TopologyMap::from_cluster_slots(sample_reply(), 5).unwrap();
    assert!(view.swap(stale).is_err());
    assert_eq!(view.epoch(), 5);

    let fresh = TopologyMap::from_cluster_slots(sample_reply(), 6).unwrap();
    view.swap(fresh).unwrap();
    assert_eq!(view.epoch(), 6);
}

#[test]
fn test_readers_keep_old_snapshots_alive_across_swaps() {
    let view = TopologyView::new(TopologyMap::from_cluster_slots(sample_reply(), 5).unwrap());
    let held = view.load();
    let fresh = TopologyMap::from_cluster_slots(sample_reply(), 6).unwrap();
    view.swap(fresh).unwrap();
    // The older reader still sees a fully consistent map.
    assert_eq!(held.epoch(), 5);
    assert!(held.shard_for_slot(0).is_ok());
    assert_eq!(view.load().epoch(), 6);
}

#[test]
fn test_malformed_reply_is_rejected() {
    assert!(TopologyMap::from_cluster_slots(Value::Array(Vec::new()), 2).is_err());
    let out_of_range = Value::Array(vec![Value::Array(vec![
        Value::Int(0),
        Value::Int(20_000),
        Value::Array(vec![string("10.0.0.1"), Value::Int(6379), string("node-a")]),
    ])]);
    assert!(TopologyMap::from_cluster_slots(out_of_range, 2).is_err());
}
