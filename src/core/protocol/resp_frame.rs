// src/core/protocol/resp_frame.rs

//! Implements the RESP (REdis Serialization Protocol) frame structure and the
//! corresponding `Encoder` and `Decoder` for network communication.
//!
//! The client encodes RESP2 command arrays and decodes whatever the server
//! negotiated: RESP2 replies, or RESP3 replies including out-of-band `Push`
//! frames.

use crate::core::errors::ClientError;
use bytes::{Buf, Bytes, BytesMut};
use tokio_util::codec::{Decoder, Encoder};

/// The CRLF (Carriage Return, Line Feed) sequence used to terminate lines in RESP.
const CRLF: &[u8] = b"\r\n";
const CRLF_LEN: usize = 2;

// Protocol-level limits to guard against malformed frames.
const MAX_FRAME_ELEMENTS: usize = 1_024 * 1_024; // Max elements in an aggregate frame.
const MAX_BULK_STRING_SIZE: usize = 512 * 1024 * 1024; // 512MB max bulk string size.

/// An enum representing a single frame in the RESP protocol.
/// This is the low-level representation of data exchanged with the server.
#[derive(Debug, Clone, PartialEq)]
pub enum RespFrame {
    SimpleString(String),
    Error(String),
    Integer(i64),
    BulkString(Bytes),
    Null,
    NullArray,
    Array(Vec<RespFrame>),
    // RESP3 additions
    Map(Vec<(RespFrame, RespFrame)>),
    Set(Vec<RespFrame>),
    Boolean(bool),
    Double(f64),
    BigNumber(String),
    VerbatimString(String, Bytes),
    Attribute(Vec<(RespFrame, RespFrame)>, Box<RespFrame>),
    /// A server-originated message not tied to any pending request
    /// (Pub/Sub delivery, subscription acknowledgements, invalidation).
    Push(Vec<RespFrame>),
}

impl RespFrame {
    /// Builds the standard command representation: an array of bulk strings.
    pub fn command(parts: Vec<Bytes>) -> RespFrame {
        RespFrame::Array(parts.into_iter().map(RespFrame::BulkString).collect())
    }

    /// A convenience method to encode a frame into a `Vec<u8>`.
    pub fn encode_to_vec(&self) -> Result<Vec<u8>, ClientError> {
        let mut buf = BytesMut::new();
        RespCodec.encode(self.clone(), &mut buf)?;
        Ok(buf.to_vec())
    }
}

/// A `tokio_util::codec` implementation for encoding and decoding `RespFrame`s.
///
/// Decoding accepts the full RESP3 grammar unconditionally; which types
/// actually appear on the wire is decided by the server during the HELLO
/// negotiation, not by the codec.
#[derive(Debug, Default, Clone, Copy)]
pub struct RespCodec;

impl Encoder<RespFrame> for RespCodec {
    type Error = ClientError;

    /// Encodes a `RespFrame` into a `BytesMut` buffer according to the RESP specification.
    fn encode(&mut self, item: RespFrame, dst: &mut BytesMut) -> Result<(), Self::Error> {
        match item {
            RespFrame::SimpleString(s) => {
                dst.extend_from_slice(b"+");
                dst.extend_from_slice(s.as_bytes());
                dst.extend_from_slice(CRLF);
            }
            RespFrame::Error(s) => {
                dst.extend_from_slice(b"-");
                dst.extend_from_slice(s.as_bytes());
                dst.extend_from_slice(CRLF);
            }
            RespFrame::Integer(i) => {
                let mut itoa_buf = itoa::Buffer::new();
                dst.extend_from_slice(b":");
                dst.extend_from_slice(itoa_buf.format(i).as_bytes());
                dst.extend_from_slice(CRLF);
            }
            RespFrame::BulkString(b) => {
                let mut itoa_buf = itoa::Buffer::new();
                dst.extend_from_slice(b"$");
                dst.extend_from_slice(itoa_buf.format(b.len()).as_bytes());
                dst.extend_from_slice(CRLF);
                dst.extend_from_slice(&b);
                dst.extend_from_slice(CRLF);
            }
            RespFrame::Null => {
                dst.extend_from_slice(b"$-1\r\n");
            }
            RespFrame::NullArray => {
                dst.extend_from_slice(b"*-1\r\n");
            }
            RespFrame::Array(arr) => {
                self.encode_aggregate(b'*', arr, dst)?;
            }
            RespFrame::Map(map) => {
                let mut itoa_buf = itoa::Buffer::new();
                dst.extend_from_slice(b"%");
                dst.extend_from_slice(itoa_buf.format(map.len()).as_bytes());
                dst.extend_from_slice(CRLF);
                for (k, v) in map {
                    self.encode(k, dst)?;
                    self.encode(v, dst)?;
                }
            }
            RespFrame::Set(set) => {
                self.encode_aggregate(b'~', set, dst)?;
            }
            RespFrame::Boolean(b) => {
                dst.extend_from_slice(if b { b"#t" } else { b"#f" });
                dst.extend_from_slice(CRLF);
            }
            RespFrame::Double(d) => {
                dst.extend_from_slice(b",");
                if d.is_finite() {
                    let mut ryu_buf = ryu::Buffer::new();
                    dst.extend_from_slice(ryu_buf.format_finite(d).as_bytes());
                } else if d.is_nan() {
                    dst.extend_from_slice(b"nan");
                } else if d > 0.0 {
                    dst.extend_from_slice(b"inf");
                } else {
                    dst.extend_from_slice(b"-inf");
                }
                dst.extend_from_slice(CRLF);
            }
            RespFrame::BigNumber(bn) => {
                dst.extend_from_slice(b"(");
                dst.extend_from_slice(bn.as_bytes());
                dst.extend_from_slice(CRLF);
            }
            RespFrame::VerbatimString(format, text) => {
                let mut itoa_buf = itoa::Buffer::new();
                dst.extend_from_slice(b"=");
                // The encoded length covers the 3-byte format, the colon, and the payload.
                dst.extend_from_slice(itoa_buf.format(format.len() + 1 + text.len()).as_bytes());
                dst.extend_from_slice(CRLF);
                dst.extend_from_slice(format.as_bytes());
                dst.extend_from_slice(b":");
                dst.extend_from_slice(&text);
                dst.extend_from_slice(CRLF);
            }
            RespFrame::Attribute(attrs, data) => {
                let mut itoa_buf = itoa::Buffer::new();
                dst.extend_from_slice(b"|");
                dst.extend_from_slice(itoa_buf.format(attrs.len()).as_bytes());
                dst.extend_from_slice(CRLF);
                for (k, v) in attrs {
                    self.encode(k, dst)?;
                    self.encode(v, dst)?;
                }
                self.encode(*data, dst)?;
            }
            RespFrame::Push(arr) => {
                self.encode_aggregate(b'>', arr, dst)?;
            }
        }
        Ok(())
    }
}

impl RespCodec {
    /// Encodes a length-prefixed sequence of frames (array, set, push).
    fn encode_aggregate(
        &mut self,
        prefix: u8,
        frames: Vec<RespFrame>,
        dst: &mut BytesMut,
    ) -> Result<(), ClientError> {
        let mut itoa_buf = itoa::Buffer::new();
        dst.extend_from_slice(&[prefix]);
        dst.extend_from_slice(itoa_buf.format(frames.len()).as_bytes());
        dst.extend_from_slice(CRLF);
        for frame in frames {
            self.encode(frame, dst)?;
        }
        Ok(())
    }
}

impl Decoder for RespCodec {
    type Item = RespFrame;
    type Error = ClientError;

    /// Decodes a `RespFrame` from a `BytesMut` buffer.
    ///
    /// It returns `Ok(None)` if the buffer does not contain a full frame yet,
    /// allowing the `Framed` stream to wait for more data from the network.
    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        match parse_frame(src) {
            Ok((frame, len)) => {
                // Advance the buffer past the successfully parsed frame.
                src.advance(len);
                Ok(Some(frame))
            }
            // If the data is incomplete, wait for more data.
            Err(ClientError::IncompleteData) => Ok(None),
            // For other errors, propagate them up to the connection actor.
            Err(e) => Err(e),
        }
    }
}

/// The main parsing entry point. It inspects the first byte (the type prefix)
/// and dispatches to the appropriate parsing function.
pub(crate) fn parse_frame(src: &[u8]) -> Result<(RespFrame, usize), ClientError> {
    if src.is_empty() {
        return Err(ClientError::IncompleteData);
    }
    match src[0] {
        b'+' => parse_simple_string(src),
        b'-' => parse_error(src),
        b':' => parse_integer(src),
        b'$' => parse_bulk_string(src),
        b'*' => parse_array(src),
        // RESP3 additions
        b'%' => parse_map(src),
        b'~' => parse_set(src),
        b'#' => parse_boolean(src),
        b',' => parse_double(src),
        b'(' => parse_big_number(src),
        b'=' => parse_verbatim_string(src),
        b'|' => parse_attribute(src),
        b'>' => parse_push(src),
        b'!' => parse_blob_error(src),
        b'_' => parse_resp3_null(src),
        other => Err(ClientError::Protocol(format!(
            "unknown frame prefix byte 0x{other:02x}"
        ))),
    }
}

/// Helper function to find the next CRLF sequence in a buffer.
fn find_crlf(src: &[u8]) -> Option<usize> {
    src.windows(CRLF_LEN).position(|window| window == CRLF)
}

/// Parses a single line (up to CRLF) from a buffer.
fn parse_line(src: &[u8]) -> Result<(&[u8], usize), ClientError> {
    find_crlf(src)
        .map(|pos| (&src[..pos], pos + CRLF_LEN))
        .ok_or(ClientError::IncompleteData)
}

/// Parses the length header of an aggregate frame, returning (length, consumed).
/// A length of -1 is reported as `None` (null aggregate).
fn parse_length(src: &[u8]) -> Result<(Option<usize>, usize), ClientError> {
    let (line, len_of_line) = parse_line(&src[1..])?;
    let s = std::str::from_utf8(line)?;
    let declared = s
        .parse::<isize>()
        .map_err(|_| ClientError::Protocol(format!("invalid length header {s:?}")))?;
    if declared == -1 {
        return Ok((None, len_of_line + 1));
    }
    if declared < 0 {
        return Err(ClientError::Protocol(format!("negative length {declared}")));
    }
    Ok((Some(declared as usize), len_of_line + 1))
}

/// Parses a Simple String (e.g., `+OK\r\n`).
fn parse_simple_string(src: &[u8]) -> Result<(RespFrame, usize), ClientError> {
    let (line, len) = parse_line(&src[1..])?;
    Ok((
        RespFrame::SimpleString(String::from_utf8_lossy(line).to_string()),
        len + 1,
    ))
}

/// Parses an Error (e.g., `-ERR message\r\n`).
fn parse_error(src: &[u8]) -> Result<(RespFrame, usize), ClientError> {
    let (line, len) = parse_line(&src[1..])?;
    Ok((
        RespFrame::Error(String::from_utf8_lossy(line).to_string()),
        len + 1,
    ))
}

/// Parses an Integer (e.g., `:1000\r\n`).
fn parse_integer(src: &[u8]) -> Result<(RespFrame, usize), ClientError> {
    let (line, len) = parse_line(&src[1..])?;
    let s = std::str::from_utf8(line)?;
    let i = s
        .parse::<i64>()
        .map_err(|_| ClientError::Protocol(format!("invalid integer {s:?}")))?;
    Ok((RespFrame::Integer(i), len + 1))
}

/// Parses a Bulk String (e.g., `$5\r\nhello\r\n`).
fn parse_bulk_string(src: &[u8]) -> Result<(RespFrame, usize), ClientError> {
    let (len, header) = parse_length(src)?;
    // Handle Null Bulk String ($-1\r\n).
    let Some(str_len) = len else {
        return Ok((RespFrame::Null, header));
    };
    if str_len > MAX_BULK_STRING_SIZE {
        return Err(ClientError::Protocol(format!(
            "bulk string of {str_len} bytes exceeds limit"
        )));
    }

    // Check if the entire bulk string (including its data and final CRLF) is in the buffer.
    if src.len() < header + str_len + CRLF_LEN {
        return Err(ClientError::IncompleteData);
    }

    // Validate the trailing CRLF.
    if &src[header + str_len..header + str_len + CRLF_LEN] != CRLF {
        return Err(ClientError::Protocol(
            "bulk string missing terminating CRLF".to_string(),
        ));
    }

    let data = Bytes::copy_from_slice(&src[header..header + str_len]);
    Ok((RespFrame::BulkString(data), header + str_len + CRLF_LEN))
}

/// Parses a run of `count` frames starting at `src[offset..]`.
fn parse_elements(
    src: &[u8],
    offset: usize,
    count: usize,
) -> Result<(Vec<RespFrame>, usize), ClientError> {
    if count > MAX_FRAME_ELEMENTS {
        return Err(ClientError::Protocol(format!(
            "aggregate of {count} elements exceeds limit"
        )));
    }
    let mut frames = Vec::with_capacity(count);
    let mut cursor = offset;
    for _ in 0..count {
        let (frame, frame_len) = parse_frame(&src[cursor..])?;
        frames.push(frame);
        cursor += frame_len;
    }
    Ok((frames, cursor))
}

/// Parses a run of `count` key-value frame pairs starting at `src[offset..]`.
fn parse_pairs(
    src: &[u8],
    offset: usize,
    count: usize,
) -> Result<(Vec<(RespFrame, RespFrame)>, usize), ClientError> {
    if count > MAX_FRAME_ELEMENTS {
        return Err(ClientError::Protocol(format!(
            "aggregate of {count} pairs exceeds limit"
        )));
    }
    let mut pairs = Vec::with_capacity(count);
    let mut cursor = offset;
    for _ in 0..count {
        let (key, key_len) = parse_frame(&src[cursor..])?;
        cursor += key_len;
        let (value, value_len) = parse_frame(&src[cursor..])?;
        cursor += value_len;
        pairs.push((key, value));
    }
    Ok((pairs, cursor))
}

/// Parses an Array (e.g., `*2\r\n$3\r\nfoo\r\n$3\r\nbar\r\n`).
fn parse_array(src: &[u8]) -> Result<(RespFrame, usize), ClientError> {
    let (len, header) = parse_length(src)?;
    // Handle Null Array (*-1\r\n).
    let Some(arr_len) = len else {
        return Ok((RespFrame::NullArray, header));
    };
    let (frames, consumed) = parse_elements(src, header, arr_len)?;
    Ok((RespFrame::Array(frames), consumed))
}

/// Parses a Map (e.g., `%2\r\n+key1\r\n+value1\r\n+key2\r\n+value2\r\n`).
fn parse_map(src: &[u8]) -> Result<(RespFrame, usize), ClientError> {
    let (len, header) = parse_length(src)?;
    let map_len = len.ok_or_else(|| ClientError::Protocol("null map header".to_string()))?;
    let (pairs, consumed) = parse_pairs(src, header, map_len)?;
    Ok((RespFrame::Map(pairs), consumed))
}

/// Parses a Set (e.g., `~2\r\n+element1\r\n+element2\r\n`).
fn parse_set(src: &[u8]) -> Result<(RespFrame, usize), ClientError> {
    let (len, header) = parse_length(src)?;
    let set_len = len.ok_or_else(|| ClientError::Protocol("null set header".to_string()))?;
    let (frames, consumed) = parse_elements(src, header, set_len)?;
    Ok((RespFrame::Set(frames), consumed))
}

/// Parses a Boolean (e.g., `#t\r\n` or `#f\r\n`).
fn parse_boolean(src: &[u8]) -> Result<(RespFrame, usize), ClientError> {
    let (line, len) = parse_line(&src[1..])?;
    match line {
        b"t" => Ok((RespFrame::Boolean(true), len + 1)),
        b"f" => Ok((RespFrame::Boolean(false), len + 1)),
        other => Err(ClientError::Protocol(format!(
            "invalid boolean body {:?}",
            String::from_utf8_lossy(other)
        ))),
    }
}

/// Parses a Double (e.g., `,1.23\r\n`). `inf`, `-inf` and `nan` are valid bodies.
fn parse_double(src: &[u8]) -> Result<(RespFrame, usize), ClientError> {
    let (line, len) = parse_line(&src[1..])?;
    let s = std::str::from_utf8(line)?;
    let d = match s {
        "inf" => f64::INFINITY,
        "-inf" => f64::NEG_INFINITY,
        "nan" => f64::NAN,
        other => other
            .parse::<f64>()
            .map_err(|_| ClientError::Protocol(format!("invalid double {other:?}")))?,
    };
    Ok((RespFrame::Double(d), len + 1))
}

/// Parses a Big Number (e.g., `(12345678901234567890\r\n`).
fn parse_big_number(src: &[u8]) -> Result<(RespFrame, usize), ClientError> {
    let (line, len) = parse_line(&src[1..])?;
    let s = String::from_utf8_lossy(line).to_string();
    // Basic validation: ensure it's a valid number string.
    if s.is_empty() || !s.chars().all(|c| c.is_ascii_digit() || c == '-' || c == '+') {
        return Err(ClientError::Protocol(format!("invalid big number {s:?}")));
    }
    Ok((RespFrame::BigNumber(s), len + 1))
}

/// Parses a Verbatim String (e.g., `=15\r\ntxt:Some text\r\n`).
fn parse_verbatim_string(src: &[u8]) -> Result<(RespFrame, usize), ClientError> {
    let (len, header) = parse_length(src)?;
    let str_len =
        len.ok_or_else(|| ClientError::Protocol("null verbatim string header".to_string()))?;
    if str_len > MAX_BULK_STRING_SIZE {
        return Err(ClientError::Protocol(format!(
            "verbatim string of {str_len} bytes exceeds limit"
        )));
    }
    if src.len() < header + str_len + CRLF_LEN {
        return Err(ClientError::IncompleteData);
    }
    if &src[header + str_len..header + str_len + CRLF_LEN] != CRLF {
        return Err(ClientError::Protocol(
            "verbatim string missing terminating CRLF".to_string(),
        ));
    }

    let data_slice = &src[header..header + str_len];
    // Split the 3-byte format tag from the payload at the first colon.
    let colon_pos = data_slice
        .iter()
        .position(|&b| b == b':')
        .ok_or_else(|| ClientError::Protocol("verbatim string missing format tag".to_string()))?;

    let format = String::from_utf8_lossy(&data_slice[..colon_pos]).to_string();
    let text = Bytes::copy_from_slice(&data_slice[colon_pos + 1..]);
    Ok((
        RespFrame::VerbatimString(format, text),
        header + str_len + CRLF_LEN,
    ))
}

/// Parses an Attribute (e.g., `|1\r\n+key\r\n+value\r\n$5\r\nhello\r\n`).
fn parse_attribute(src: &[u8]) -> Result<(RespFrame, usize), ClientError> {
    let (len, header) = parse_length(src)?;
    let attr_len = len.ok_or_else(|| ClientError::Protocol("null attribute header".to_string()))?;
    let (attributes, mut cursor) = parse_pairs(src, header, attr_len)?;

    // The last part of an attribute is the actual data frame.
    let (data_frame, data_len) = parse_frame(&src[cursor..])?;
    cursor += data_len;

    Ok((
        RespFrame::Attribute(attributes, Box::new(data_frame)),
        cursor,
    ))
}

/// Parses a Push frame (e.g., `>3\r\n$7\r\nmessage\r\n$2\r\nch\r\n$5\r\nhello\r\n`).
fn parse_push(src: &[u8]) -> Result<(RespFrame, usize), ClientError> {
    let (len, header) = parse_length(src)?;
    let push_len = len.ok_or_else(|| ClientError::Protocol("null push header".to_string()))?;
    let (frames, consumed) = parse_elements(src, header, push_len)?;
    Ok((RespFrame::Push(frames), consumed))
}

/// Parses a RESP3 Blob Error (e.g. `!9\r\nERR boom!\r\n`), folded into the
/// plain error variant.
fn parse_blob_error(src: &[u8]) -> Result<(RespFrame, usize), ClientError> {
    let (len, header) = parse_length(src)?;
    let err_len = len.ok_or_else(|| ClientError::Protocol("null blob error header".to_string()))?;
    if src.len() < header + err_len + CRLF_LEN {
        return Err(ClientError::IncompleteData);
    }
    if &src[header + err_len..header + err_len + CRLF_LEN] != CRLF {
        return Err(ClientError::Protocol(
            "blob error missing terminating CRLF".to_string(),
        ));
    }
    let message = String::from_utf8_lossy(&src[header..header + err_len]).to_string();
    Ok((RespFrame::Error(message), header + err_len + CRLF_LEN))
}

/// Parses the RESP3 Null (`_\r\n`).
fn parse_resp3_null(src: &[u8]) -> Result<(RespFrame, usize), ClientError> {
    let (line, len) = parse_line(&src[1..])?;
    if !line.is_empty() {
        return Err(ClientError::Protocol("malformed RESP3 null".to_string()));
    }
    Ok((RespFrame::Null, len + 1))
}
