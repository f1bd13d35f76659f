// src/core/commands/cluster.rs

//! Constructors for cluster introspection commands.

use super::Cmd;

/// The topology discovery query; issued against an arbitrary healthy node.
pub fn cluster_slots() -> Cmd {
    Cmd::read("CLUSTER SLOTS")
}

pub fn cluster_info() -> Cmd {
    Cmd::read("CLUSTER INFO")
}

pub fn cluster_nodes() -> Cmd {
    Cmd::read("CLUSTER NODES")
}
