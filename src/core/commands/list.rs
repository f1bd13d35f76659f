// src/core/commands/list.rs

//! Constructors for the list command family.

use super::Cmd;
use bytes::Bytes;

/// Pivot position for `LINSERT`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertPosition {
    Before,
    After,
}

/// End selector for `LMOVE`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListEnd {
    Left,
    Right,
}

impl ListEnd {
    fn as_arg(self) -> &'static str {
        match self {
            ListEnd::Left => "LEFT",
            ListEnd::Right => "RIGHT",
        }
    }
}

pub fn lpush(key: impl Into<Bytes>, values: Vec<Bytes>) -> Cmd {
    let key = key.into();
    Cmd::write("LPUSH").by_key(&key).arg(key).args(values)
}

pub fn rpush(key: impl Into<Bytes>, values: Vec<Bytes>) -> Cmd {
    let key = key.into();
    Cmd::write("RPUSH").by_key(&key).arg(key).args(values)
}

pub fn lpushx(key: impl Into<Bytes>, values: Vec<Bytes>) -> Cmd {
    let key = key.into();
    Cmd::write("LPUSHX").by_key(&key).arg(key).args(values)
}

pub fn rpushx(key: impl Into<Bytes>, values: Vec<Bytes>) -> Cmd {
    let key = key.into();
    Cmd::write("RPUSHX").by_key(&key).arg(key).args(values)
}

pub fn lpop(key: impl Into<Bytes>, count: Option<u64>) -> Cmd {
    let key = key.into();
    let cmd = Cmd::write("LPOP").by_key(&key).arg(key);
    match count {
        Some(count) => cmd.arg_uint(count),
        None => cmd,
    }
}

pub fn rpop(key: impl Into<Bytes>, count: Option<u64>) -> Cmd {
    let key = key.into();
    let cmd = Cmd::write("RPOP").by_key(&key).arg(key);
    match count {
        Some(count) => cmd.arg_uint(count),
        None => cmd,
    }
}

pub fn llen(key: impl Into<Bytes>) -> Cmd {
    let key = key.into();
    Cmd::read("LLEN").by_key(&key).arg(key)
}

pub fn lrange(key: impl Into<Bytes>, start: i64, stop: i64) -> Cmd {
    let key = key.into();
    Cmd::read("LRANGE")
        .by_key(&key)
        .arg(key)
        .arg_int(start)
        .arg_int(stop)
}

pub fn lindex(key: impl Into<Bytes>, index: i64) -> Cmd {
    let key = key.into();
    Cmd::read("LINDEX").by_key(&key).arg(key).arg_int(index)
}

pub fn linsert(
    key: impl Into<Bytes>,
    position: InsertPosition,
    pivot: impl Into<Bytes>,
    value: impl Into<Bytes>,
) -> Cmd {
    let key = key.into();
    Cmd::write("LINSERT")
        .by_key(&key)
        .arg(key)
        .arg(match position {
            InsertPosition::Before => "BEFORE",
            InsertPosition::After => "AFTER",
        })
        .arg(pivot.into())
        .arg(value.into())
}

pub fn lset(key: impl Into<Bytes>, index: i64, value: impl Into<Bytes>) -> Cmd {
    let key = key.into();
    Cmd::write("LSET")
        .by_key(&key)
        .arg(key)
        .arg_int(index)
        .arg(value.into())
}

pub fn lrem(key: impl Into<Bytes>, count: i64, value: impl Into<Bytes>) -> Cmd {
    let key = key.into();
    Cmd::write("LREM")
        .by_key(&key)
        .arg(key)
        .arg_int(count)
        .arg(value.into())
}

pub fn ltrim(key: impl Into<Bytes>, start: i64, stop: i64) -> Cmd {
    let key = key.into();
    Cmd::write("LTRIM")
        .by_key(&key)
        .arg(key)
        .arg_int(start)
        .arg_int(stop)
}

/// `LMOVE` routes by its source key; both keys must share a slot in cluster
/// mode.
pub fn lmove(
    source: impl Into<Bytes>,
    destination: impl Into<Bytes>,
    from: ListEnd,
    to: ListEnd,
) -> Cmd {
    let source = source.into();
    Cmd::write("LMOVE")
        .by_key(&source)
        .arg(source)
        .arg(destination.into())
        .arg(from.as_arg())
        .arg(to.as_arg())
}
