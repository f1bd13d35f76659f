// src/core/commands/scripting.rs

//! Constructors for the scripting command family.

use super::{Aggregate, Cmd};
use crate::core::routing::Route;
use bytes::Bytes;

fn with_keys(mut cmd: Cmd, keys: Vec<Bytes>, args: Vec<Bytes>) -> Cmd {
    if let Some(first) = keys.first() {
        cmd = cmd.by_key(first);
    }
    cmd.arg_uint(keys.len() as u64).args(keys).args(args)
}

pub fn eval(source: impl Into<Bytes>, keys: Vec<Bytes>, args: Vec<Bytes>) -> Cmd {
    with_keys(Cmd::write("EVAL").arg(source.into()), keys, args)
}

pub fn evalsha(sha1: impl Into<Bytes>, keys: Vec<Bytes>, args: Vec<Bytes>) -> Cmd {
    with_keys(Cmd::write("EVALSHA").arg(sha1.into()), keys, args)
}

/// `SCRIPT LOAD` is propagated to every primary so a later `EVALSHA` finds
/// the script wherever it routes.
pub fn script_load(source: impl Into<Bytes>) -> Cmd {
    Cmd::write("SCRIPT LOAD")
        .route(Route::AllPrimaries)
        .arg(source.into())
}

pub fn script_exists(sha1s: Vec<Bytes>) -> Cmd {
    Cmd::read("SCRIPT EXISTS").args(sha1s)
}

pub fn script_flush() -> Cmd {
    Cmd::write("SCRIPT FLUSH")
        .route(Route::AllPrimaries)
        .aggregate(Aggregate::AllOk)
}
