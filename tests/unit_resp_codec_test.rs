// tests/unit_resp_codec_test.rs

use bytes::{Bytes, BytesMut};
use peridot::core::protocol::{RespCodec, RespFrame};
use tokio_util::codec::{Decoder, Encoder};

fn decode_all(input: &[u8]) -> Vec<RespFrame> {
    let mut codec = RespCodec;
    let mut buf = BytesMut::from(input);
    let mut frames = Vec::new();
    while let Some(frame) = codec.decode(&mut buf).expect("decode") {
        frames.push(frame);
    }
    assert!(buf.is_empty(), "decoder left {} bytes unconsumed", buf.len());
    frames
}

fn encode(frame: RespFrame) -> Vec<u8> {
    let mut codec = RespCodec;
    let mut buf = BytesMut::new();
    codec.encode(frame, &mut buf).expect("encode");
    buf.to_vec()
}

#[test]
fn test_decode_simple_types() {
    assert_eq!(
        decode_all(b"+OK\r\n"),
        vec![RespFrame::SimpleString("OK".to_string())]
    );
    assert_eq!(
        decode_all(b"-ERR boom\r\n"),
        vec![RespFrame::Error("ERR boom".to_string())]
    );
    assert_eq!(decode_all(b":42\r\n"), vec![RespFrame::Integer(42)]);
    assert_eq!(
        decode_all(b"$5\r\nhello\r\n"),
        vec![RespFrame::BulkString(Bytes::from("hello"))]
    );
    assert_eq!(decode_all(b"$-1\r\n"), vec![RespFrame::Null]);
    assert_eq!(decode_all(b"*-1\r\n"), vec![RespFrame::NullArray]);
    assert_eq!(decode_all(b"_\r\n"), vec![RespFrame::Null]);
}

#[test]
fn test_decode_nested_array() {
    let frames = decode_all(b"*2\r\n$3\r\nfoo\r\n*1\r\n:7\r\n");
    assert_eq!(
        frames,
        vec![RespFrame::Array(vec![
            RespFrame::BulkString(Bytes::from("foo")),
            RespFrame::Array(vec![RespFrame::Integer(7)]),
        ])]
    );
}

#[test]
fn test_decode_resp3_aggregates() {
    assert_eq!(
        decode_all(b"%1\r\n+key\r\n:1\r\n"),
        vec![RespFrame::Map(vec![(
            RespFrame::SimpleString("key".to_string()),
            RespFrame::Integer(1),
        )])]
    );
    assert_eq!(
        decode_all(b"~2\r\n:1\r\n:2\r\n"),
        vec![RespFrame::Set(vec![
            RespFrame::Integer(1),
            RespFrame::Integer(2)
        ])]
    );
    assert_eq!(decode_all(b"#t\r\n"), vec![RespFrame::Boolean(true)]);
    assert_eq!(decode_all(b",3.5\r\n"), vec![RespFrame::Double(3.5)]);
    assert_eq!(decode_all(b",inf\r\n"), vec![RespFrame::Double(f64::INFINITY)]);
}

#[test]
fn test_decode_push_frame() {
    let frames = decode_all(b">3\r\n$7\r\nmessage\r\n$2\r\nch\r\n$5\r\nhello\r\n");
    assert_eq!(
        frames,
        vec![RespFrame::Push(vec![
            RespFrame::BulkString(Bytes::from("message")),
            RespFrame::BulkString(Bytes::from("ch")),
            RespFrame::BulkString(Bytes::from("hello")),
        ])]
    );
}

#[test]
fn test_incomplete_frames_wait_for_more_data() {
    let mut codec = RespCodec;
    for partial in [
        &b"$5\r\nhel"[..],
        &b"*2\r\n$3\r\nfoo\r\n"[..],
        &b":42"[..],
        &b"%1\r\n+key\r\n"[..],
    ] {
        let mut buf = BytesMut::from(partial);
        assert_eq!(codec.decode(&mut buf).expect("no error"), None);
        // Nothing may be consumed until a full frame is available.
        assert_eq!(buf.len(), partial.len());
    }
}

#[test]
fn test_decode_across_split_buffers() {
    let mut codec = RespCodec;
    let mut buf = BytesMut::from(&b"$5\r\nhel"[..]);
    assert_eq!(codec.decode(&mut buf).unwrap(), None);
    buf.extend_from_slice(b"lo\r\n:1\r\n");
    assert_eq!(
        codec.decode(&mut buf).unwrap(),
        Some(RespFrame::BulkString(Bytes::from("hello")))
    );
    assert_eq!(codec.decode(&mut buf).unwrap(), Some(RespFrame::Integer(1)));
}

#[test]
fn test_encode_command_array() {
    let frame = RespFrame::command(vec![Bytes::from("SET"), Bytes::from("k"), Bytes::from("v")]);
    assert_eq!(
        encode(frame),
        b"*3\r\n$3\r\nSET\r\n$1\r\nk\r\n$1\r\nv\r\n".to_vec()
    );
}

#[test]
fn test_encode_non_finite_doubles() {
    assert_eq!(encode(RespFrame::Double(f64::INFINITY)), b",inf\r\n".to_vec());
    assert_eq!(
        encode(RespFrame::Double(f64::NEG_INFINITY)),
        b",-inf\r\n".to_vec()
    );
    assert_eq!(encode(RespFrame::Double(f64::NAN)), b",nan\r\n".to_vec());
}

#[test]
fn test_decode_blob_error() {
    assert_eq!(
        decode_all(b"!8\r\nERR boom\r\n"),
        vec![RespFrame::Error("ERR boom".to_string())]
    );
}

#[test]
fn test_unknown_prefix_is_a_protocol_error() {
    let mut codec = RespCodec;
    let mut buf = BytesMut::from(&b"@3\r\nerr\r\n"[..]);
    assert!(codec.decode(&mut buf).is_err());
}
