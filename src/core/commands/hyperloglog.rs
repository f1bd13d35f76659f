// src/core/commands/hyperloglog.rs

//! Constructors for the HyperLogLog command family.

use super::Cmd;
use bytes::Bytes;

pub fn pfadd(key: impl Into<Bytes>, elements: Vec<Bytes>) -> Cmd {
    let key = key.into();
    Cmd::write("PFADD").by_key(&key).arg(key).args(elements)
}

pub fn pfcount(keys: Vec<Bytes>) -> Cmd {
    let mut cmd = Cmd::read("PFCOUNT");
    if let Some(first) = keys.first() {
        cmd = cmd.by_key(first);
    }
    cmd.args(keys)
}

pub fn pfmerge(destination: impl Into<Bytes>, sources: Vec<Bytes>) -> Cmd {
    let destination = destination.into();
    Cmd::write("PFMERGE")
        .by_key(&destination)
        .arg(destination)
        .args(sources)
}
