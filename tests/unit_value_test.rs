// tests/unit_value_test.rs

use bytes::Bytes;
use peridot::core::protocol::{PushKind, RespFrame, Value, push_kind, reply_to_value};
use peridot::ClientError;

#[test]
fn test_ok_status_becomes_ok_value() {
    assert_eq!(
        reply_to_value(RespFrame::SimpleString("OK".to_string())).unwrap(),
        Value::Ok
    );
}

#[test]
fn test_non_ok_status_is_a_string_value() {
    assert_eq!(
        reply_to_value(RespFrame::SimpleString("PONG".to_string())).unwrap(),
        Value::String(Bytes::from("PONG"))
    );
}

#[test]
fn test_server_errors_surface_as_client_errors() {
    let err = reply_to_value(RespFrame::Error("ERR wrong type".to_string())).unwrap_err();
    assert_eq!(err, ClientError::Request("ERR wrong type".to_string()));
}

#[test]
fn test_redirects_classify_into_dedicated_variants() {
    let err = reply_to_value(RespFrame::Error("MOVED 3999 10.0.0.1:6381".to_string())).unwrap_err();
    assert_eq!(
        err,
        ClientError::Moved {
            slot: 3999,
            addr: "10.0.0.1:6381".to_string()
        }
    );
}

#[test]
fn test_nulls_collapse_to_null_value() {
    assert_eq!(reply_to_value(RespFrame::Null).unwrap(), Value::Null);
    assert_eq!(reply_to_value(RespFrame::NullArray).unwrap(), Value::Null);
}

#[test]
fn test_attribute_envelopes_unwrap_to_payload() {
    let frame = RespFrame::Attribute(
        vec![(
            RespFrame::SimpleString("ttl".to_string()),
            RespFrame::Integer(3600),
        )],
        Box::new(RespFrame::Integer(9)),
    );
    assert_eq!(reply_to_value(frame).unwrap(), Value::Int(9));
}

#[test]
fn test_nested_reply_decodes_recursively() {
    let frame = RespFrame::Array(vec![
        RespFrame::BulkString(Bytes::from("a")),
        RespFrame::Array(vec![RespFrame::Boolean(false), RespFrame::Double(1.5)]),
    ]);
    assert_eq!(
        reply_to_value(frame).unwrap(),
        Value::Array(vec![
            Value::String(Bytes::from("a")),
            Value::Array(vec![Value::Bool(false), Value::Float(1.5)]),
        ])
    );
}

fn message_array() -> RespFrame {
    RespFrame::Array(vec![
        RespFrame::BulkString(Bytes::from("message")),
        RespFrame::BulkString(Bytes::from("ch")),
        RespFrame::BulkString(Bytes::from("hi")),
    ])
}

#[test]
fn test_push_frames_always_classify_as_pushes() {
    let frame = RespFrame::Push(vec![
        RespFrame::BulkString(Bytes::from("smessage")),
        RespFrame::BulkString(Bytes::from("ch")),
        RespFrame::BulkString(Bytes::from("hi")),
    ]);
    let (kind, rest) = push_kind(&frame, false).expect("push");
    assert_eq!(kind, PushKind::SMessage);
    assert_eq!(rest.len(), 2);
}

#[test]
fn test_resp2_arrays_classify_only_in_subscriber_mode() {
    // The same array is a plain reply on a non-subscribed connection and a
    // push on a subscribed one.
    assert!(push_kind(&message_array(), false).is_none());
    assert!(push_kind(&message_array(), true).is_some());
}

#[test]
fn test_ordinary_arrays_never_classify_as_pushes() {
    let frame = RespFrame::Array(vec![
        RespFrame::BulkString(Bytes::from("value-a")),
        RespFrame::BulkString(Bytes::from("value-b")),
    ]);
    assert!(push_kind(&frame, true).is_none());
}
