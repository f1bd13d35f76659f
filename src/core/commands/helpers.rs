// src/core/commands/helpers.rs

//! Argument-encoding helpers shared by the command constructors.

use bytes::Bytes;

/// Encodes a signed integer argument.
pub fn int_arg(value: i64) -> Bytes {
    let mut buf = itoa::Buffer::new();
    Bytes::copy_from_slice(buf.format(value).as_bytes())
}

/// Encodes an unsigned integer argument (cursor values, unix timestamps past
/// 2^31 included).
pub fn uint_arg(value: u64) -> Bytes {
    let mut buf = itoa::Buffer::new();
    Bytes::copy_from_slice(buf.format(value).as_bytes())
}

/// Encodes a float argument using the shortest decimal representation that
/// round-trips, with the protocol spellings for the non-finite values.
pub fn float_arg(value: f64) -> Bytes {
    if value.is_nan() {
        return Bytes::from_static(b"nan");
    }
    if value.is_infinite() {
        return if value > 0.0 {
            Bytes::from_static(b"+inf")
        } else {
            Bytes::from_static(b"-inf")
        };
    }
    // ryu prints integral doubles as "1.0"; the server accepts that form.
    let mut buf = ryu::Buffer::new();
    Bytes::copy_from_slice(buf.format(value).as_bytes())
}
