// src/core/commands/generic.rs

//! Constructors for the generic key-management command family.

use super::{Aggregate, Cmd};
use crate::core::routing::Route;
use bytes::Bytes;
use strum_macros::{Display, EnumString};

/// Conditions restricting when an expiry update applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExpireCondition {
    /// `NX`: only when the key has no expiry.
    HasNoExpiry,
    /// `XX`: only when the key has an expiry.
    HasExpiry,
    /// `GT`: only when the new expiry is greater than the current one.
    GreaterThan,
    /// `LT`: only when the new expiry is less than the current one.
    LessThan,
}

impl ExpireCondition {
    fn apply(&self, cmd: Cmd) -> Cmd {
        match self {
            ExpireCondition::HasNoExpiry => cmd.arg("NX"),
            ExpireCondition::HasExpiry => cmd.arg("XX"),
            ExpireCondition::GreaterThan => cmd.arg("GT"),
            ExpireCondition::LessThan => cmd.arg("LT"),
        }
    }
}

/// Value types recognized by the `TYPE` filter of `SCAN`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum ObjectType {
    String,
    List,
    Set,
    ZSet,
    Hash,
    Stream,
}

/// Optional arguments for `SCAN` and its per-type variants.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanArgs {
    pub match_pattern: Option<Bytes>,
    pub count: Option<u32>,
    pub object_type: Option<ObjectType>,
}

impl ScanArgs {
    pub(crate) fn apply(&self, mut cmd: Cmd, with_type: bool) -> Cmd {
        if let Some(pattern) = &self.match_pattern {
            cmd = cmd.arg("MATCH").arg(pattern.clone());
        }
        if let Some(count) = self.count {
            cmd = cmd.arg("COUNT").arg_uint(count as u64);
        }
        if with_type && let Some(object_type) = self.object_type {
            cmd = cmd.arg("TYPE").arg(object_type.to_string());
        }
        cmd
    }
}

pub fn del(keys: Vec<Bytes>) -> Cmd {
    let mut cmd = Cmd::write("DEL");
    if let Some(first) = keys.first() {
        cmd = cmd.by_key(first);
    }
    cmd.args(keys)
}

pub fn unlink(keys: Vec<Bytes>) -> Cmd {
    let mut cmd = Cmd::write("UNLINK");
    if let Some(first) = keys.first() {
        cmd = cmd.by_key(first);
    }
    cmd.args(keys)
}

pub fn exists(keys: Vec<Bytes>) -> Cmd {
    let mut cmd = Cmd::read("EXISTS");
    if let Some(first) = keys.first() {
        cmd = cmd.by_key(first);
    }
    cmd.args(keys)
}

pub fn expire(key: impl Into<Bytes>, seconds: i64, condition: Option<ExpireCondition>) -> Cmd {
    let key = key.into();
    let cmd = Cmd::write("EXPIRE").by_key(&key).arg(key).arg_int(seconds);
    match condition {
        Some(c) => c.apply(cmd),
        None => cmd,
    }
}

pub fn pexpire(key: impl Into<Bytes>, millis: i64, condition: Option<ExpireCondition>) -> Cmd {
    let key = key.into();
    let cmd = Cmd::write("PEXPIRE").by_key(&key).arg(key).arg_int(millis);
    match condition {
        Some(c) => c.apply(cmd),
        None => cmd,
    }
}

/// `unix_seconds` may exceed 2^31; the argument is encoded as u64.
pub fn expireat(
    key: impl Into<Bytes>,
    unix_seconds: u64,
    condition: Option<ExpireCondition>,
) -> Cmd {
    let key = key.into();
    let cmd = Cmd::write("EXPIREAT")
        .by_key(&key)
        .arg(key)
        .arg_uint(unix_seconds);
    match condition {
        Some(c) => c.apply(cmd),
        None => cmd,
    }
}

pub fn pexpireat(
    key: impl Into<Bytes>,
    unix_millis: u64,
    condition: Option<ExpireCondition>,
) -> Cmd {
    let key = key.into();
    let cmd = Cmd::write("PEXPIREAT")
        .by_key(&key)
        .arg(key)
        .arg_uint(unix_millis);
    match condition {
        Some(c) => c.apply(cmd),
        None => cmd,
    }
}

pub fn ttl(key: impl Into<Bytes>) -> Cmd {
    let key = key.into();
    Cmd::read("TTL").by_key(&key).arg(key)
}

pub fn pttl(key: impl Into<Bytes>) -> Cmd {
    let key = key.into();
    Cmd::read("PTTL").by_key(&key).arg(key)
}

pub fn persist(key: impl Into<Bytes>) -> Cmd {
    let key = key.into();
    Cmd::write("PERSIST").by_key(&key).arg(key)
}

pub fn key_type(key: impl Into<Bytes>) -> Cmd {
    let key = key.into();
    Cmd::read("TYPE").by_key(&key).arg(key)
}

pub fn rename(key: impl Into<Bytes>, new_key: impl Into<Bytes>) -> Cmd {
    let key = key.into();
    Cmd::write("RENAME").by_key(&key).arg(key).arg(new_key.into())
}

pub fn renamenx(key: impl Into<Bytes>, new_key: impl Into<Bytes>) -> Cmd {
    let key = key.into();
    Cmd::write("RENAMENX")
        .by_key(&key)
        .arg(key)
        .arg(new_key.into())
}

pub fn touch(keys: Vec<Bytes>) -> Cmd {
    let mut cmd = Cmd::write("TOUCH");
    if let Some(first) = keys.first() {
        cmd = cmd.by_key(first);
    }
    cmd.args(keys)
}

pub fn copy(source: impl Into<Bytes>, destination: impl Into<Bytes>, replace: bool) -> Cmd {
    let source = source.into();
    let mut cmd = Cmd::write("COPY")
        .by_key(&source)
        .arg(source)
        .arg(destination.into());
    if replace {
        cmd = cmd.arg("REPLACE");
    }
    cmd
}

/// `KEYS` fans out to every primary and unions the result.
pub fn keys(pattern: impl Into<Bytes>) -> Cmd {
    Cmd::read("KEYS")
        .route(Route::AllPrimaries)
        .aggregate(Aggregate::Union)
        .arg(pattern.into())
}

pub fn randomkey() -> Cmd {
    Cmd::read("RANDOMKEY")
}

/// A single-node `SCAN` step. Routing defaults to random; the cluster scan
/// pins it to a concrete node id per iteration.
pub fn scan(cursor: u64, args: &ScanArgs) -> Cmd {
    args.apply(Cmd::read("SCAN").arg_uint(cursor), true)
}

/// Releases keys watched outside a transaction preamble.
pub fn unwatch() -> Cmd {
    Cmd::write("UNWATCH")
}
