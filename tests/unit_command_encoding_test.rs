// tests/unit_command_encoding_test.rs

use bytes::Bytes;
use peridot::core::cluster::key_hash_slot;
use peridot::core::commands::string::{Expiry, SetCondition, SetOptions};
use peridot::core::commands::zset::{ZAddComparison, ZAddOptions};
use peridot::core::commands::{generic, pubsub, server, string, zset};
use peridot::core::protocol::RespFrame;
use peridot::core::routing::Route;

fn words(frame: RespFrame) -> Vec<Bytes> {
    match frame {
        RespFrame::Array(parts) => parts
            .into_iter()
            .map(|part| match part {
                RespFrame::BulkString(b) => b,
                other => panic!("command contained non-bulk frame {other:?}"),
            })
            .collect(),
        other => panic!("command was not an array: {other:?}"),
    }
}

#[test]
fn test_set_encodes_key_then_value() {
    let cmd = string::set("k", "v");
    assert!(cmd.is_write());
    assert_eq!(cmd.route, Route::Key(Bytes::from("k")));
    assert_eq!(words(cmd.to_frame()), vec!["SET", "k", "v"]);
}

#[test]
fn test_set_options_encode_in_canonical_order() {
    let cmd = string::set_with_options(
        "k",
        "v",
        SetOptions {
            condition: Some(SetCondition::IfNotExists),
            expiry: Some(Expiry::Milliseconds(1500)),
            return_old: true,
        },
    );
    assert_eq!(
        words(cmd.to_frame()),
        vec!["SET", "k", "v", "NX", "PX", "1500", "GET"]
    );
}

#[test]
fn test_expiry_at_timestamps_past_the_32_bit_boundary() {
    // EXAT far beyond 2^31 seconds must encode without truncation.
    let cmd = string::set_with_options(
        "k",
        "v",
        SetOptions {
            expiry: Some(Expiry::UnixSeconds(4_294_967_296)),
            ..Default::default()
        },
    );
    assert_eq!(
        words(cmd.to_frame()),
        vec!["SET", "k", "v", "EXAT", "4294967296"]
    );
}

#[test]
fn test_float_arguments_use_shortest_roundtrip_form() {
    let cmd = string::incrbyfloat("c", 0.5);
    assert_eq!(words(cmd.to_frame()), vec!["INCRBYFLOAT", "c", "0.5"]);

    let cmd = zset::zincrby("s", f64::INFINITY, "m");
    assert_eq!(words(cmd.to_frame()), vec!["ZINCRBY", "s", "+inf", "m"]);
}

#[test]
fn test_zadd_flags_precede_members() {
    let cmd = zset::zadd(
        "s",
        vec![(1.0, Bytes::from("a")), (2.5, Bytes::from("b"))],
        ZAddOptions {
            comparison: Some(ZAddComparison::GreaterThan),
            changed: true,
            ..Default::default()
        },
    );
    assert_eq!(
        words(cmd.to_frame()),
        vec!["ZADD", "s", "GT", "CH", "1.0", "a", "2.5", "b"]
    );
}

#[test]
fn test_multi_word_names_split_into_bulk_strings() {
    let cmd = server::config_get("maxmemory");
    assert_eq!(words(cmd.to_frame()), vec!["CONFIG", "GET", "maxmemory"]);
}

#[test]
fn test_key_commands_route_by_their_key() {
    let cmd = string::get("user:{42}:name");
    assert_eq!(cmd.slot(), Some(key_hash_slot(b"user:{42}:name")));
    assert_eq!(cmd.slot(), Some(key_hash_slot(b"42")));
    assert!(!cmd.is_write());
}

#[test]
fn test_keyless_commands_route_randomly() {
    assert_eq!(server::ping().route, Route::Random);
    assert_eq!(server::ping().slot(), None);
}

#[test]
fn test_fanout_commands_declare_their_aggregation() {
    use peridot::core::commands::Aggregate;
    assert_eq!(server::dbsize().route, Route::AllPrimaries);
    assert_eq!(server::dbsize().aggregate, Aggregate::Sum);
    assert_eq!(generic::keys("*").aggregate, Aggregate::Union);
    assert_eq!(server::flushall().aggregate, Aggregate::AllOk);
    assert_eq!(server::info(None).aggregate, Aggregate::MapByNode);
}

#[test]
fn test_sharded_subscribe_routes_by_channel_slot() {
    let cmd = pubsub::ssubscribe(Bytes::from("orders"));
    assert_eq!(cmd.slot(), Some(key_hash_slot(b"orders")));
}

#[test]
fn test_scan_args_encode_match_count_and_type() {
    use peridot::core::commands::generic::{ObjectType, ScanArgs};
    let args = ScanArgs {
        match_pattern: Some(Bytes::from("user:*")),
        count: Some(100),
        object_type: Some(ObjectType::Hash),
    };
    let cmd = generic::scan(5, &args);
    assert_eq!(
        words(cmd.to_frame()),
        vec!["SCAN", "5", "MATCH", "user:*", "COUNT", "100", "TYPE", "hash"]
    );
}
