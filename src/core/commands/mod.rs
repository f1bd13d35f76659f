// src/core/commands/mod.rs

//! The command vocabulary: typed constructors that encode each command's
//! arguments, routing classification, and write/read profile.
//!
//! Constructors return a [`Cmd`]; the dispatcher and the batch executor
//! consume them identically, so everything built here works both as a direct
//! call and inside a pipeline or transaction.

use crate::core::protocol::RespFrame;
use crate::core::routing::Route;
use bitflags::bitflags;
use bytes::Bytes;

pub mod bitmap;
pub mod cluster;
pub mod generic;
pub mod geospatial;
pub mod hash;
pub mod helpers;
pub mod hyperloglog;
pub mod list;
pub mod pubsub;
pub mod scripting;
pub mod server;
pub mod set;
pub mod string;
pub mod streams;
pub mod zset;

bitflags! {
    /// Classification flags for a command.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct CommandFlags: u8 {
        /// The command may mutate server state; always routed to primaries.
        const WRITE    = 1 << 0;
        /// The command is read-only; read strategies may route it to replicas.
        const READONLY = 1 << 1;
    }
}

/// How fan-out results are folded into a single reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Aggregate {
    /// Single-target commands: the one reply is the reply.
    #[default]
    Single,
    /// Sum integer replies (DBSIZE, PUBSUB NUMPAT).
    Sum,
    /// Concatenate array replies (KEYS).
    Union,
    /// Map of `host:port` to each node's reply (INFO).
    MapByNode,
    /// Expect `+OK` everywhere and collapse to one `Ok` (FLUSHALL).
    AllOk,
}

/// One encoded command: canonical name, arguments, routing directive, and
/// classification.
#[derive(Debug, Clone)]
pub struct Cmd {
    pub name: &'static str,
    pub args: Vec<Bytes>,
    pub flags: CommandFlags,
    pub route: Route,
    pub aggregate: Aggregate,
}

impl Cmd {
    /// A read-classified command. Keyless reads default to random routing.
    pub fn read(name: &'static str) -> Self {
        Self {
            name,
            args: Vec::new(),
            flags: CommandFlags::READONLY,
            route: Route::Random,
            aggregate: Aggregate::Single,
        }
    }

    /// A write-classified command. Writes ignore read strategies.
    pub fn write(name: &'static str) -> Self {
        Self {
            name,
            args: Vec::new(),
            flags: CommandFlags::WRITE,
            route: Route::Random,
            aggregate: Aggregate::Single,
        }
    }

    /// Routes by the slot of `key`.
    pub fn by_key(mut self, key: &Bytes) -> Self {
        self.route = Route::Key(key.clone());
        self
    }

    pub fn route(mut self, route: Route) -> Self {
        self.route = route;
        self
    }

    pub fn aggregate(mut self, aggregate: Aggregate) -> Self {
        self.aggregate = aggregate;
        self
    }

    pub fn arg(mut self, arg: impl Into<Bytes>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn arg_int(self, value: i64) -> Self {
        self.arg(helpers::int_arg(value))
    }

    pub fn arg_uint(self, value: u64) -> Self {
        self.arg(helpers::uint_arg(value))
    }

    pub fn arg_float(self, value: f64) -> Self {
        self.arg(helpers::float_arg(value))
    }

    pub fn args<I, A>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = A>,
        A: Into<Bytes>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn is_write(&self) -> bool {
        self.flags.contains(CommandFlags::WRITE)
    }

    /// The slot this command hashes to, when it routes by key.
    pub fn slot(&self) -> Option<u16> {
        match &self.route {
            Route::Key(key) => Some(crate::core::cluster::key_hash_slot(key)),
            _ => None,
        }
    }

    /// Encodes the command as its wire frame. Multi-word names
    /// (`CLIENT SETNAME`) become separate bulk strings.
    pub fn to_frame(&self) -> RespFrame {
        let mut parts: Vec<Bytes> =
            Vec::with_capacity(self.args.len() + self.name.split(' ').count());
        for word in self.name.split(' ') {
            parts.push(Bytes::copy_from_slice(word.as_bytes()));
        }
        parts.extend(self.args.iter().cloned());
        RespFrame::command(parts)
    }
}
