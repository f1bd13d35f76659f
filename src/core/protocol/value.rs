// src/core/protocol/value.rs

//! The decoded value tree handed to per-command converters, and the
//! classification of incoming frames into replies and pushes.
//!
//! This is the client-side counterpart of the wire-level [`RespFrame`]: the
//! command layer should not care whether a reply arrived as RESP2 or RESP3,
//! only what it means.

use super::resp_frame::RespFrame;
use crate::core::errors::ClientError;
use bytes::Bytes;

/// A fully decoded server reply.
///
/// Server errors are not values; they are reported as `Err(ClientError)` by
/// [`reply_to_value`], so a `Value` always represents a successful reply.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    /// The canonical `+OK` status reply.
    Ok,
    Bool(bool),
    Int(i64),
    Float(f64),
    /// Opaque bytes: bulk strings and non-OK status lines.
    String(Bytes),
    Array(Vec<Value>),
    Map(Vec<(Value, Value)>),
    Set(Vec<Value>),
    BigNumber(String),
    Verbatim(String, Bytes),
}

impl Value {
    /// A short tag for error messages about unexpected reply shapes.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Ok => "ok",
            Value::Bool(_) => "boolean",
            Value::Int(_) => "integer",
            Value::Float(_) => "double",
            Value::String(_) => "string",
            Value::Array(_) => "array",
            Value::Map(_) => "map",
            Value::Set(_) => "set",
            Value::BigNumber(_) => "big number",
            Value::Verbatim(_, _) => "verbatim string",
        }
    }
}

/// Translates a reply frame into a [`Value`], surfacing server errors as
/// [`ClientError`] and transparently unwrapping RESP3 attribute envelopes.
///
/// Push frames must never reach this function; the connection actor diverts
/// them to the Pub/Sub engine before replies are matched to waiters.
pub fn reply_to_value(frame: RespFrame) -> Result<Value, ClientError> {
    match frame {
        RespFrame::SimpleString(s) => {
            if s == "OK" {
                Ok(Value::Ok)
            } else {
                Ok(Value::String(Bytes::from(s)))
            }
        }
        RespFrame::Error(message) => Err(ClientError::from_server_message(&message)),
        RespFrame::Integer(i) => Ok(Value::Int(i)),
        RespFrame::BulkString(b) => Ok(Value::String(b)),
        RespFrame::Null | RespFrame::NullArray => Ok(Value::Null),
        RespFrame::Array(arr) => Ok(Value::Array(
            arr.into_iter()
                .map(reply_to_value)
                .collect::<Result<_, _>>()?,
        )),
        RespFrame::Map(pairs) => Ok(Value::Map(
            pairs
                .into_iter()
                .map(|(k, v)| Ok((reply_to_value(k)?, reply_to_value(v)?)))
                .collect::<Result<_, ClientError>>()?,
        )),
        RespFrame::Set(items) => Ok(Value::Set(
            items
                .into_iter()
                .map(reply_to_value)
                .collect::<Result<_, _>>()?,
        )),
        RespFrame::Boolean(b) => Ok(Value::Bool(b)),
        RespFrame::Double(d) => Ok(Value::Float(d)),
        RespFrame::BigNumber(s) => Ok(Value::BigNumber(s)),
        RespFrame::VerbatimString(format, text) => Ok(Value::Verbatim(format, text)),
        // Attributes carry out-of-band metadata the command layer does not use.
        RespFrame::Attribute(_, data) => reply_to_value(*data),
        RespFrame::Push(_) => Err(ClientError::Protocol(
            "push frame reached the reply path".to_string(),
        )),
    }
}

/// The kind tag of a server push, taken from the first element of the frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PushKind {
    Message,
    PMessage,
    SMessage,
    Subscribe,
    Unsubscribe,
    PSubscribe,
    PUnsubscribe,
    SSubscribe,
    SUnsubscribe,
    /// Client-side caching invalidation; currently logged and dropped.
    Invalidate,
}

impl PushKind {
    fn from_tag(tag: &[u8]) -> Option<PushKind> {
        Some(match tag {
            b"message" => PushKind::Message,
            b"pmessage" => PushKind::PMessage,
            b"smessage" => PushKind::SMessage,
            b"subscribe" => PushKind::Subscribe,
            b"unsubscribe" => PushKind::Unsubscribe,
            b"psubscribe" => PushKind::PSubscribe,
            b"punsubscribe" => PushKind::PUnsubscribe,
            b"ssubscribe" => PushKind::SSubscribe,
            b"sunsubscribe" => PushKind::SUnsubscribe,
            b"invalidate" => PushKind::Invalidate,
            _ => return None,
        })
    }
}

/// Classifies an incoming frame as a push.
///
/// RESP3 push frames are always out-of-band. Under RESP2 there is no push
/// type; a connection that has issued at least one subscription
/// (`subscriber_mode`) receives Pub/Sub traffic as plain arrays whose first
/// element is the kind tag, so those are classified as pushes as well.
pub fn push_kind(frame: &RespFrame, subscriber_mode: bool) -> Option<(PushKind, &[RespFrame])> {
    let elements = match frame {
        RespFrame::Push(elements) => elements.as_slice(),
        RespFrame::Array(elements) if subscriber_mode => elements.as_slice(),
        _ => return None,
    };
    let (first, rest) = elements.split_first()?;
    let kind = match first {
        RespFrame::BulkString(tag) => PushKind::from_tag(tag)?,
        RespFrame::SimpleString(tag) => PushKind::from_tag(tag.as_bytes())?,
        _ => return None,
    };
    Some((kind, rest))
}
