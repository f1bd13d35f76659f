// src/core/commands/hash.rs

//! Constructors for the hash command family.

use super::Cmd;
use super::generic::ScanArgs;
use bytes::Bytes;

pub fn hset(key: impl Into<Bytes>, pairs: Vec<(Bytes, Bytes)>) -> Cmd {
    let key = key.into();
    let mut cmd = Cmd::write("HSET").by_key(&key).arg(key);
    for (field, value) in pairs {
        cmd = cmd.arg(field).arg(value);
    }
    cmd
}

pub fn hsetnx(key: impl Into<Bytes>, field: impl Into<Bytes>, value: impl Into<Bytes>) -> Cmd {
    let key = key.into();
    Cmd::write("HSETNX")
        .by_key(&key)
        .arg(key)
        .arg(field.into())
        .arg(value.into())
}

pub fn hget(key: impl Into<Bytes>, field: impl Into<Bytes>) -> Cmd {
    let key = key.into();
    Cmd::read("HGET").by_key(&key).arg(key).arg(field.into())
}

pub fn hgetall(key: impl Into<Bytes>) -> Cmd {
    let key = key.into();
    Cmd::read("HGETALL").by_key(&key).arg(key)
}

pub fn hdel(key: impl Into<Bytes>, fields: Vec<Bytes>) -> Cmd {
    let key = key.into();
    Cmd::write("HDEL").by_key(&key).arg(key).args(fields)
}

pub fn hexists(key: impl Into<Bytes>, field: impl Into<Bytes>) -> Cmd {
    let key = key.into();
    Cmd::read("HEXISTS").by_key(&key).arg(key).arg(field.into())
}

pub fn hlen(key: impl Into<Bytes>) -> Cmd {
    let key = key.into();
    Cmd::read("HLEN").by_key(&key).arg(key)
}

pub fn hkeys(key: impl Into<Bytes>) -> Cmd {
    let key = key.into();
    Cmd::read("HKEYS").by_key(&key).arg(key)
}

pub fn hvals(key: impl Into<Bytes>) -> Cmd {
    let key = key.into();
    Cmd::read("HVALS").by_key(&key).arg(key)
}

pub fn hmget(key: impl Into<Bytes>, fields: Vec<Bytes>) -> Cmd {
    let key = key.into();
    Cmd::read("HMGET").by_key(&key).arg(key).args(fields)
}

pub fn hincrby(key: impl Into<Bytes>, field: impl Into<Bytes>, delta: i64) -> Cmd {
    let key = key.into();
    Cmd::write("HINCRBY")
        .by_key(&key)
        .arg(key)
        .arg(field.into())
        .arg_int(delta)
}

pub fn hincrbyfloat(key: impl Into<Bytes>, field: impl Into<Bytes>, delta: f64) -> Cmd {
    let key = key.into();
    Cmd::write("HINCRBYFLOAT")
        .by_key(&key)
        .arg(key)
        .arg(field.into())
        .arg_float(delta)
}

pub fn hrandfield(key: impl Into<Bytes>, count: Option<i64>) -> Cmd {
    let key = key.into();
    let cmd = Cmd::read("HRANDFIELD").by_key(&key).arg(key);
    match count {
        Some(count) => cmd.arg_int(count),
        None => cmd,
    }
}

pub fn hscan(key: impl Into<Bytes>, cursor: u64, args: &ScanArgs) -> Cmd {
    let key = key.into();
    args.apply(
        Cmd::read("HSCAN").by_key(&key).arg(key).arg_uint(cursor),
        false,
    )
}
