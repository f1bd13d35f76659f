// src/core/commands/string.rs

//! Constructors for the string command family.

use super::Cmd;
use bytes::Bytes;

/// Conditional-set variants of `SET`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SetCondition {
    /// `NX`: only set if the key does not exist.
    IfNotExists,
    /// `XX`: only set if the key already exists.
    IfExists,
}

/// Expiry variants shared by `SET` and `GETEX`. All timestamps are
/// milliseconds unless a `unix_seconds` variant is explicitly selected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Expiry {
    Seconds(u64),
    Milliseconds(u64),
    UnixSeconds(u64),
    UnixMilliseconds(u64),
    KeepTtl,
}

impl Expiry {
    fn apply(&self, cmd: Cmd) -> Cmd {
        match *self {
            Expiry::Seconds(s) => cmd.arg("EX").arg_uint(s),
            Expiry::Milliseconds(ms) => cmd.arg("PX").arg_uint(ms),
            Expiry::UnixSeconds(ts) => cmd.arg("EXAT").arg_uint(ts),
            Expiry::UnixMilliseconds(ts) => cmd.arg("PXAT").arg_uint(ts),
            Expiry::KeepTtl => cmd.arg("KEEPTTL"),
        }
    }
}

/// Options for `SET`. Plain value type; absent fields mean "not sent".
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SetOptions {
    pub condition: Option<SetCondition>,
    pub expiry: Option<Expiry>,
    /// `GET`: return the previous value of the key.
    pub return_old: bool,
}

pub fn get(key: impl Into<Bytes>) -> Cmd {
    let key = key.into();
    Cmd::read("GET").by_key(&key).arg(key)
}

pub fn set(key: impl Into<Bytes>, value: impl Into<Bytes>) -> Cmd {
    let key = key.into();
    Cmd::write("SET").by_key(&key).arg(key).arg(value.into())
}

pub fn set_with_options(
    key: impl Into<Bytes>,
    value: impl Into<Bytes>,
    options: SetOptions,
) -> Cmd {
    let mut cmd = set(key, value);
    match options.condition {
        Some(SetCondition::IfNotExists) => cmd = cmd.arg("NX"),
        Some(SetCondition::IfExists) => cmd = cmd.arg("XX"),
        None => {}
    }
    if let Some(expiry) = &options.expiry {
        cmd = expiry.apply(cmd);
    }
    if options.return_old {
        cmd = cmd.arg("GET");
    }
    cmd
}

pub fn setnx(key: impl Into<Bytes>, value: impl Into<Bytes>) -> Cmd {
    let key = key.into();
    Cmd::write("SETNX").by_key(&key).arg(key).arg(value.into())
}

pub fn setex(key: impl Into<Bytes>, seconds: u64, value: impl Into<Bytes>) -> Cmd {
    let key = key.into();
    Cmd::write("SETEX")
        .by_key(&key)
        .arg(key)
        .arg_uint(seconds)
        .arg(value.into())
}

pub fn psetex(key: impl Into<Bytes>, milliseconds: u64, value: impl Into<Bytes>) -> Cmd {
    let key = key.into();
    Cmd::write("PSETEX")
        .by_key(&key)
        .arg(key)
        .arg_uint(milliseconds)
        .arg(value.into())
}

pub fn getdel(key: impl Into<Bytes>) -> Cmd {
    let key = key.into();
    Cmd::write("GETDEL").by_key(&key).arg(key)
}

pub fn getrange(key: impl Into<Bytes>, start: i64, end: i64) -> Cmd {
    let key = key.into();
    Cmd::read("GETRANGE")
        .by_key(&key)
        .arg(key)
        .arg_int(start)
        .arg_int(end)
}

pub fn setrange(key: impl Into<Bytes>, offset: u64, value: impl Into<Bytes>) -> Cmd {
    let key = key.into();
    Cmd::write("SETRANGE")
        .by_key(&key)
        .arg(key)
        .arg_uint(offset)
        .arg(value.into())
}

pub fn append(key: impl Into<Bytes>, value: impl Into<Bytes>) -> Cmd {
    let key = key.into();
    Cmd::write("APPEND").by_key(&key).arg(key).arg(value.into())
}

pub fn strlen(key: impl Into<Bytes>) -> Cmd {
    let key = key.into();
    Cmd::read("STRLEN").by_key(&key).arg(key)
}

pub fn incr(key: impl Into<Bytes>) -> Cmd {
    let key = key.into();
    Cmd::write("INCR").by_key(&key).arg(key)
}

pub fn decr(key: impl Into<Bytes>) -> Cmd {
    let key = key.into();
    Cmd::write("DECR").by_key(&key).arg(key)
}

pub fn incrby(key: impl Into<Bytes>, delta: i64) -> Cmd {
    let key = key.into();
    Cmd::write("INCRBY").by_key(&key).arg(key).arg_int(delta)
}

pub fn decrby(key: impl Into<Bytes>, delta: i64) -> Cmd {
    let key = key.into();
    Cmd::write("DECRBY").by_key(&key).arg(key).arg_int(delta)
}

pub fn incrbyfloat(key: impl Into<Bytes>, delta: f64) -> Cmd {
    let key = key.into();
    Cmd::write("INCRBYFLOAT")
        .by_key(&key)
        .arg(key)
        .arg_float(delta)
}

/// MGET routes by its first key; in cluster mode all keys must share a slot.
pub fn mget(keys: Vec<Bytes>) -> Cmd {
    let mut cmd = Cmd::read("MGET");
    if let Some(first) = keys.first() {
        cmd = cmd.by_key(first);
    }
    cmd.args(keys)
}

pub fn mset(pairs: Vec<(Bytes, Bytes)>) -> Cmd {
    let mut cmd = Cmd::write("MSET");
    if let Some((first, _)) = pairs.first() {
        cmd = cmd.by_key(first);
    }
    for (key, value) in pairs {
        cmd = cmd.arg(key).arg(value);
    }
    cmd
}

pub fn msetnx(pairs: Vec<(Bytes, Bytes)>) -> Cmd {
    let mut cmd = Cmd::write("MSETNX");
    if let Some((first, _)) = pairs.first() {
        cmd = cmd.by_key(first);
    }
    for (key, value) in pairs {
        cmd = cmd.arg(key).arg(value);
    }
    cmd
}
