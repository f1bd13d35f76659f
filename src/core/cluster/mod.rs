// src/core/cluster/mod.rs

//! Cluster keyspace partitioning and the client's view of the server fleet.

pub mod slot;
pub mod topology;

pub use slot::{SLOT_COUNT, key_hash_slot};
pub use topology::{ClusterNode, NodeRole, Shard, TopologyMap, TopologyView};
