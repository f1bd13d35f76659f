// src/core/commands/zset.rs

//! Constructors for the sorted-set command family.
//!
//! Range bounds are passed in their protocol spelling (`"1"`, `"(1"`,
//! `"+inf"`, `"[a"`, `"-"`); scores are formatted with the shortest
//! round-trip representation.

use super::Cmd;
use super::generic::ScanArgs;
use bytes::Bytes;

/// Update conditions for `ZADD`. Plain value type; absent fields mean
/// "not sent".
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ZAddOptions {
    /// `NX` / `XX`.
    pub condition: Option<ZAddCondition>,
    /// `GT` / `LT` score comparison gates.
    pub comparison: Option<ZAddComparison>,
    /// `CH`: count changed elements instead of added ones.
    pub changed: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ZAddCondition {
    IfNotExists,
    IfExists,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ZAddComparison {
    GreaterThan,
    LessThan,
}

pub fn zadd(key: impl Into<Bytes>, members: Vec<(f64, Bytes)>, options: ZAddOptions) -> Cmd {
    let key = key.into();
    let mut cmd = Cmd::write("ZADD").by_key(&key).arg(key);
    match options.condition {
        Some(ZAddCondition::IfNotExists) => cmd = cmd.arg("NX"),
        Some(ZAddCondition::IfExists) => cmd = cmd.arg("XX"),
        None => {}
    }
    match options.comparison {
        Some(ZAddComparison::GreaterThan) => cmd = cmd.arg("GT"),
        Some(ZAddComparison::LessThan) => cmd = cmd.arg("LT"),
        None => {}
    }
    if options.changed {
        cmd = cmd.arg("CH");
    }
    for (score, member) in members {
        cmd = cmd.arg_float(score).arg(member);
    }
    cmd
}

pub fn zscore(key: impl Into<Bytes>, member: impl Into<Bytes>) -> Cmd {
    let key = key.into();
    Cmd::read("ZSCORE").by_key(&key).arg(key).arg(member.into())
}

pub fn zmscore(key: impl Into<Bytes>, members: Vec<Bytes>) -> Cmd {
    let key = key.into();
    Cmd::read("ZMSCORE").by_key(&key).arg(key).args(members)
}

pub fn zincrby(key: impl Into<Bytes>, delta: f64, member: impl Into<Bytes>) -> Cmd {
    let key = key.into();
    Cmd::write("ZINCRBY")
        .by_key(&key)
        .arg(key)
        .arg_float(delta)
        .arg(member.into())
}

pub fn zcard(key: impl Into<Bytes>) -> Cmd {
    let key = key.into();
    Cmd::read("ZCARD").by_key(&key).arg(key)
}

pub fn zcount(key: impl Into<Bytes>, min: impl Into<Bytes>, max: impl Into<Bytes>) -> Cmd {
    let key = key.into();
    Cmd::read("ZCOUNT")
        .by_key(&key)
        .arg(key)
        .arg(min.into())
        .arg(max.into())
}

pub fn zrange(key: impl Into<Bytes>, start: i64, stop: i64, withscores: bool) -> Cmd {
    let key = key.into();
    let cmd = Cmd::read("ZRANGE")
        .by_key(&key)
        .arg(key)
        .arg_int(start)
        .arg_int(stop);
    if withscores { cmd.arg("WITHSCORES") } else { cmd }
}

pub fn zrevrange(key: impl Into<Bytes>, start: i64, stop: i64, withscores: bool) -> Cmd {
    let key = key.into();
    let cmd = Cmd::read("ZREVRANGE")
        .by_key(&key)
        .arg(key)
        .arg_int(start)
        .arg_int(stop);
    if withscores { cmd.arg("WITHSCORES") } else { cmd }
}

pub fn zrangebyscore(
    key: impl Into<Bytes>,
    min: impl Into<Bytes>,
    max: impl Into<Bytes>,
    limit: Option<(i64, i64)>,
) -> Cmd {
    let key = key.into();
    let mut cmd = Cmd::read("ZRANGEBYSCORE")
        .by_key(&key)
        .arg(key)
        .arg(min.into())
        .arg(max.into());
    if let Some((offset, count)) = limit {
        cmd = cmd.arg("LIMIT").arg_int(offset).arg_int(count);
    }
    cmd
}

pub fn zrangebylex(
    key: impl Into<Bytes>,
    min: impl Into<Bytes>,
    max: impl Into<Bytes>,
    limit: Option<(i64, i64)>,
) -> Cmd {
    let key = key.into();
    let mut cmd = Cmd::read("ZRANGEBYLEX")
        .by_key(&key)
        .arg(key)
        .arg(min.into())
        .arg(max.into());
    if let Some((offset, count)) = limit {
        cmd = cmd.arg("LIMIT").arg_int(offset).arg_int(count);
    }
    cmd
}

pub fn zrank(key: impl Into<Bytes>, member: impl Into<Bytes>) -> Cmd {
    let key = key.into();
    Cmd::read("ZRANK").by_key(&key).arg(key).arg(member.into())
}

pub fn zrevrank(key: impl Into<Bytes>, member: impl Into<Bytes>) -> Cmd {
    let key = key.into();
    Cmd::read("ZREVRANK")
        .by_key(&key)
        .arg(key)
        .arg(member.into())
}

pub fn zrem(key: impl Into<Bytes>, members: Vec<Bytes>) -> Cmd {
    let key = key.into();
    Cmd::write("ZREM").by_key(&key).arg(key).args(members)
}

pub fn zremrangebyrank(key: impl Into<Bytes>, start: i64, stop: i64) -> Cmd {
    let key = key.into();
    Cmd::write("ZREMRANGEBYRANK")
        .by_key(&key)
        .arg(key)
        .arg_int(start)
        .arg_int(stop)
}

pub fn zremrangebyscore(key: impl Into<Bytes>, min: impl Into<Bytes>, max: impl Into<Bytes>) -> Cmd {
    let key = key.into();
    Cmd::write("ZREMRANGEBYSCORE")
        .by_key(&key)
        .arg(key)
        .arg(min.into())
        .arg(max.into())
}

pub fn zpopmin(key: impl Into<Bytes>, count: Option<u64>) -> Cmd {
    let key = key.into();
    let cmd = Cmd::write("ZPOPMIN").by_key(&key).arg(key);
    match count {
        Some(count) => cmd.arg_uint(count),
        None => cmd,
    }
}

pub fn zpopmax(key: impl Into<Bytes>, count: Option<u64>) -> Cmd {
    let key = key.into();
    let cmd = Cmd::write("ZPOPMAX").by_key(&key).arg(key);
    match count {
        Some(count) => cmd.arg_uint(count),
        None => cmd,
    }
}

pub fn zrandmember(key: impl Into<Bytes>, count: Option<i64>) -> Cmd {
    let key = key.into();
    let cmd = Cmd::read("ZRANDMEMBER").by_key(&key).arg(key);
    match count {
        Some(count) => cmd.arg_int(count),
        None => cmd,
    }
}

pub fn zunionstore(destination: impl Into<Bytes>, keys: Vec<Bytes>) -> Cmd {
    let destination = destination.into();
    Cmd::write("ZUNIONSTORE")
        .by_key(&destination)
        .arg(destination)
        .arg_uint(keys.len() as u64)
        .args(keys)
}

pub fn zinterstore(destination: impl Into<Bytes>, keys: Vec<Bytes>) -> Cmd {
    let destination = destination.into();
    Cmd::write("ZINTERSTORE")
        .by_key(&destination)
        .arg(destination)
        .arg_uint(keys.len() as u64)
        .args(keys)
}

pub fn zscan(key: impl Into<Bytes>, cursor: u64, args: &ScanArgs) -> Cmd {
    let key = key.into();
    args.apply(
        Cmd::read("ZSCAN").by_key(&key).arg(key).arg_uint(cursor),
        false,
    )
}
