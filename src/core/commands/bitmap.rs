// src/core/commands/bitmap.rs

//! Constructors for the bitmap command family.

use super::Cmd;
use bytes::Bytes;

/// The bitwise operation of `BITOP`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BitwiseOp {
    And,
    Or,
    Xor,
    Not,
}

impl BitwiseOp {
    fn as_arg(self) -> &'static str {
        match self {
            BitwiseOp::And => "AND",
            BitwiseOp::Or => "OR",
            BitwiseOp::Xor => "XOR",
            BitwiseOp::Not => "NOT",
        }
    }
}

pub fn setbit(key: impl Into<Bytes>, offset: u64, value: bool) -> Cmd {
    let key = key.into();
    Cmd::write("SETBIT")
        .by_key(&key)
        .arg(key)
        .arg_uint(offset)
        .arg(if value { "1" } else { "0" })
}

pub fn getbit(key: impl Into<Bytes>, offset: u64) -> Cmd {
    let key = key.into();
    Cmd::read("GETBIT").by_key(&key).arg(key).arg_uint(offset)
}

pub fn bitcount(key: impl Into<Bytes>, range: Option<(i64, i64)>) -> Cmd {
    let key = key.into();
    let cmd = Cmd::read("BITCOUNT").by_key(&key).arg(key);
    match range {
        Some((start, end)) => cmd.arg_int(start).arg_int(end),
        None => cmd,
    }
}

pub fn bitpos(key: impl Into<Bytes>, bit: bool, range: Option<(i64, i64)>) -> Cmd {
    let key = key.into();
    let cmd = Cmd::read("BITPOS")
        .by_key(&key)
        .arg(key)
        .arg(if bit { "1" } else { "0" });
    match range {
        Some((start, end)) => cmd.arg_int(start).arg_int(end),
        None => cmd,
    }
}

/// `BITOP` routes by the destination key; all keys must share a slot in
/// cluster mode.
pub fn bitop(op: BitwiseOp, destination: impl Into<Bytes>, keys: Vec<Bytes>) -> Cmd {
    let destination = destination.into();
    Cmd::write("BITOP")
        .by_key(&destination)
        .arg(op.as_arg())
        .arg(destination)
        .args(keys)
}
