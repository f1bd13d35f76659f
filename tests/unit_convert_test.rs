// tests/unit_convert_test.rs

use bytes::Bytes;
use peridot::core::protocol::{Value, convert};

#[test]
fn test_into_int_parses_string_replies() {
    assert_eq!(convert::into_int(Value::Int(7)).unwrap(), 7);
    assert_eq!(
        convert::into_int(Value::String(Bytes::from("42"))).unwrap(),
        42
    );
    assert!(convert::into_int(Value::String(Bytes::from("x"))).is_err());
}

#[test]
fn test_into_float_accepts_resp2_and_resp3_shapes() {
    assert_eq!(convert::into_float(Value::Float(1.5)).unwrap(), 1.5);
    assert_eq!(
        convert::into_float(Value::String(Bytes::from("7.5"))).unwrap(),
        7.5
    );
    assert_eq!(
        convert::into_float(Value::String(Bytes::from("-inf"))).unwrap(),
        f64::NEG_INFINITY
    );
}

#[test]
fn test_absent_values_are_none_not_empty() {
    assert_eq!(convert::into_optional_bytes(Value::Null).unwrap(), None);
    // An empty string is a value, not a signal.
    assert_eq!(
        convert::into_optional_bytes(Value::String(Bytes::new())).unwrap(),
        Some(Bytes::new())
    );
}

#[test]
fn test_into_bool_accepts_integer_and_boolean_replies() {
    assert!(convert::into_bool(Value::Int(1)).unwrap());
    assert!(!convert::into_bool(Value::Int(0)).unwrap());
    assert!(convert::into_bool(Value::Bool(true)).unwrap());
    assert!(!convert::into_bool(Value::Null).unwrap());
}

#[test]
fn test_into_pairs_accepts_flat_arrays_and_maps() {
    let flat = Value::Array(vec![
        Value::String(Bytes::from("f1")),
        Value::String(Bytes::from("v1")),
        Value::String(Bytes::from("f2")),
        Value::String(Bytes::from("v2")),
    ]);
    let map = Value::Map(vec![
        (
            Value::String(Bytes::from("f1")),
            Value::String(Bytes::from("v1")),
        ),
        (
            Value::String(Bytes::from("f2")),
            Value::String(Bytes::from("v2")),
        ),
    ]);
    let expected = vec![
        (Bytes::from("f1"), Bytes::from("v1")),
        (Bytes::from("f2"), Bytes::from("v2")),
    ];
    assert_eq!(convert::into_pairs(flat).unwrap(), expected);
    assert_eq!(convert::into_pairs(map).unwrap(), expected);
}

#[test]
fn test_into_scored_members_accepts_both_wire_shapes() {
    let resp2 = Value::Array(vec![
        Value::String(Bytes::from("a")),
        Value::String(Bytes::from("1")),
        Value::String(Bytes::from("b")),
        Value::String(Bytes::from("2.5")),
    ]);
    let resp3 = Value::Array(vec![
        Value::Array(vec![Value::String(Bytes::from("a")), Value::Float(1.0)]),
        Value::Array(vec![Value::String(Bytes::from("b")), Value::Float(2.5)]),
    ]);
    let expected = vec![(Bytes::from("a"), 1.0), (Bytes::from("b"), 2.5)];
    assert_eq!(convert::into_scored_members(resp2).unwrap(), expected);
    assert_eq!(convert::into_scored_members(resp3).unwrap(), expected);
}

#[test]
fn test_into_scan_page() {
    let reply = Value::Array(vec![
        Value::String(Bytes::from("17")),
        Value::Array(vec![
            Value::String(Bytes::from("k1")),
            Value::String(Bytes::from("k2")),
        ]),
    ]);
    let (cursor, keys) = convert::into_scan_page(reply).unwrap();
    assert_eq!(cursor, 17);
    assert_eq!(keys, vec![Bytes::from("k1"), Bytes::from("k2")]);
}

#[test]
fn test_shape_mismatch_is_a_protocol_error() {
    assert!(convert::into_unit(Value::Int(1)).is_err());
    assert!(convert::into_bytes(Value::Int(1)).is_err());
    assert!(convert::into_pairs(Value::Array(vec![Value::Null])).is_err());
}
