// src/core/commands/pubsub.rs

//! Constructors for publish and subscription-management commands.
//!
//! The subscribe/unsubscribe constructors are consumed by the Pub/Sub engine
//! and the reconnect handshake; applications use the engine's API rather
//! than issuing these directly.

use super::{Aggregate, Cmd};
use crate::core::routing::Route;
use bytes::Bytes;

pub fn publish(channel: impl Into<Bytes>, message: impl Into<Bytes>) -> Cmd {
    Cmd::write("PUBLISH").arg(channel.into()).arg(message.into())
}

/// Sharded publish: routed by the channel's slot.
pub fn spublish(channel: impl Into<Bytes>, message: impl Into<Bytes>) -> Cmd {
    let channel = channel.into();
    Cmd::write("SPUBLISH")
        .by_key(&channel)
        .arg(channel)
        .arg(message.into())
}

pub fn subscribe(channels: Vec<Bytes>) -> Cmd {
    Cmd::write("SUBSCRIBE").args(channels)
}

pub fn unsubscribe(channels: Vec<Bytes>) -> Cmd {
    Cmd::write("UNSUBSCRIBE").args(channels)
}

pub fn psubscribe(patterns: Vec<Bytes>) -> Cmd {
    Cmd::write("PSUBSCRIBE").args(patterns)
}

pub fn punsubscribe(patterns: Vec<Bytes>) -> Cmd {
    Cmd::write("PUNSUBSCRIBE").args(patterns)
}

pub fn ssubscribe(channel: Bytes) -> Cmd {
    let route = Route::Key(channel.clone());
    Cmd::write("SSUBSCRIBE").route(route).arg(channel)
}

pub fn sunsubscribe(channel: Bytes) -> Cmd {
    let route = Route::Key(channel.clone());
    Cmd::write("SUNSUBSCRIBE").route(route).arg(channel)
}

pub fn pubsub_channels(pattern: Option<Bytes>) -> Cmd {
    let cmd = Cmd::read("PUBSUB CHANNELS")
        .route(Route::AllNodes)
        .aggregate(Aggregate::Union);
    match pattern {
        Some(pattern) => cmd.arg(pattern),
        None => cmd,
    }
}

pub fn pubsub_numsub(channels: Vec<Bytes>) -> Cmd {
    Cmd::read("PUBSUB NUMSUB").args(channels)
}

pub fn pubsub_numpat() -> Cmd {
    Cmd::read("PUBSUB NUMPAT")
        .route(Route::AllNodes)
        .aggregate(Aggregate::Sum)
}
