// src/core/commands/set.rs

//! Constructors for the set command family.

use super::Cmd;
use super::generic::ScanArgs;
use bytes::Bytes;

pub fn sadd(key: impl Into<Bytes>, members: Vec<Bytes>) -> Cmd {
    let key = key.into();
    Cmd::write("SADD").by_key(&key).arg(key).args(members)
}

pub fn srem(key: impl Into<Bytes>, members: Vec<Bytes>) -> Cmd {
    let key = key.into();
    Cmd::write("SREM").by_key(&key).arg(key).args(members)
}

pub fn smembers(key: impl Into<Bytes>) -> Cmd {
    let key = key.into();
    Cmd::read("SMEMBERS").by_key(&key).arg(key)
}

pub fn sismember(key: impl Into<Bytes>, member: impl Into<Bytes>) -> Cmd {
    let key = key.into();
    Cmd::read("SISMEMBER")
        .by_key(&key)
        .arg(key)
        .arg(member.into())
}

pub fn smismember(key: impl Into<Bytes>, members: Vec<Bytes>) -> Cmd {
    let key = key.into();
    Cmd::read("SMISMEMBER").by_key(&key).arg(key).args(members)
}

pub fn scard(key: impl Into<Bytes>) -> Cmd {
    let key = key.into();
    Cmd::read("SCARD").by_key(&key).arg(key)
}

pub fn spop(key: impl Into<Bytes>, count: Option<u64>) -> Cmd {
    let key = key.into();
    let cmd = Cmd::write("SPOP").by_key(&key).arg(key);
    match count {
        Some(count) => cmd.arg_uint(count),
        None => cmd,
    }
}

pub fn srandmember(key: impl Into<Bytes>, count: Option<i64>) -> Cmd {
    let key = key.into();
    let cmd = Cmd::read("SRANDMEMBER").by_key(&key).arg(key);
    match count {
        Some(count) => cmd.arg_int(count),
        None => cmd,
    }
}

pub fn smove(
    source: impl Into<Bytes>,
    destination: impl Into<Bytes>,
    member: impl Into<Bytes>,
) -> Cmd {
    let source = source.into();
    Cmd::write("SMOVE")
        .by_key(&source)
        .arg(source)
        .arg(destination.into())
        .arg(member.into())
}

pub fn sunion(keys: Vec<Bytes>) -> Cmd {
    let mut cmd = Cmd::read("SUNION");
    if let Some(first) = keys.first() {
        cmd = cmd.by_key(first);
    }
    cmd.args(keys)
}

pub fn sinter(keys: Vec<Bytes>) -> Cmd {
    let mut cmd = Cmd::read("SINTER");
    if let Some(first) = keys.first() {
        cmd = cmd.by_key(first);
    }
    cmd.args(keys)
}

pub fn sdiff(keys: Vec<Bytes>) -> Cmd {
    let mut cmd = Cmd::read("SDIFF");
    if let Some(first) = keys.first() {
        cmd = cmd.by_key(first);
    }
    cmd.args(keys)
}

pub fn sunionstore(destination: impl Into<Bytes>, keys: Vec<Bytes>) -> Cmd {
    let destination = destination.into();
    Cmd::write("SUNIONSTORE")
        .by_key(&destination)
        .arg(destination)
        .args(keys)
}

pub fn sinterstore(destination: impl Into<Bytes>, keys: Vec<Bytes>) -> Cmd {
    let destination = destination.into();
    Cmd::write("SINTERSTORE")
        .by_key(&destination)
        .arg(destination)
        .args(keys)
}

pub fn sdiffstore(destination: impl Into<Bytes>, keys: Vec<Bytes>) -> Cmd {
    let destination = destination.into();
    Cmd::write("SDIFFSTORE")
        .by_key(&destination)
        .arg(destination)
        .args(keys)
}

pub fn sscan(key: impl Into<Bytes>, cursor: u64, args: &ScanArgs) -> Cmd {
    let key = key.into();
    args.apply(
        Cmd::read("SSCAN").by_key(&key).arg(key).arg_uint(cursor),
        false,
    )
}
