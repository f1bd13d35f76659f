// src/core/commands/streams.rs

//! Constructors for the stream command family.

use super::Cmd;
use bytes::Bytes;

/// `XADD` with an explicit or auto-generated (`*`) entry id.
pub fn xadd(key: impl Into<Bytes>, id: impl Into<Bytes>, pairs: Vec<(Bytes, Bytes)>) -> Cmd {
    let key = key.into();
    let mut cmd = Cmd::write("XADD").by_key(&key).arg(key).arg(id.into());
    for (field, value) in pairs {
        cmd = cmd.arg(field).arg(value);
    }
    cmd
}

pub fn xlen(key: impl Into<Bytes>) -> Cmd {
    let key = key.into();
    Cmd::read("XLEN").by_key(&key).arg(key)
}

pub fn xrange(
    key: impl Into<Bytes>,
    start: impl Into<Bytes>,
    end: impl Into<Bytes>,
    count: Option<u64>,
) -> Cmd {
    let key = key.into();
    let cmd = Cmd::read("XRANGE")
        .by_key(&key)
        .arg(key)
        .arg(start.into())
        .arg(end.into());
    match count {
        Some(count) => cmd.arg("COUNT").arg_uint(count),
        None => cmd,
    }
}

pub fn xrevrange(
    key: impl Into<Bytes>,
    end: impl Into<Bytes>,
    start: impl Into<Bytes>,
    count: Option<u64>,
) -> Cmd {
    let key = key.into();
    let cmd = Cmd::read("XREVRANGE")
        .by_key(&key)
        .arg(key)
        .arg(end.into())
        .arg(start.into());
    match count {
        Some(count) => cmd.arg("COUNT").arg_uint(count),
        None => cmd,
    }
}

pub fn xdel(key: impl Into<Bytes>, ids: Vec<Bytes>) -> Cmd {
    let key = key.into();
    Cmd::write("XDEL").by_key(&key).arg(key).args(ids)
}

/// `XTRIM key MAXLEN [~] threshold`.
pub fn xtrim(key: impl Into<Bytes>, max_len: u64, approximate: bool) -> Cmd {
    let key = key.into();
    let mut cmd = Cmd::write("XTRIM").by_key(&key).arg(key).arg("MAXLEN");
    if approximate {
        cmd = cmd.arg("~");
    }
    cmd.arg_uint(max_len)
}
