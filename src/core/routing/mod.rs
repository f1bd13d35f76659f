// src/core/routing/mod.rs

//! Picks the connection(s) a command goes to.
//!
//! Single-target directives resolve through the current topology snapshot
//! plus any temporary MOVED hints; read strategies overlay key-based routing
//! for read-classified commands only.

use crate::config::{NodeAddress, ReadFrom};
use crate::core::cluster::topology::{ClusterNode, Shard, TopologyView};
use crate::core::cluster::key_hash_slot;
use crate::core::connection::ConnectionState;
use crate::core::connection::manager::ConnectionManager;
use crate::core::connection::NodeConnection;
use crate::core::errors::ClientError;
use bytes::Bytes;
use dashmap::DashMap;
use rand::Rng;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

/// A routing directive, attached to every command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    /// Route by the slot of this key.
    Key(Bytes),
    /// Any healthy primary.
    Random,
    /// Fan out to every primary.
    AllPrimaries,
    /// Fan out to every replica.
    AllReplicas,
    /// Fan out to every node.
    AllNodes,
    /// A concrete address.
    Address(NodeAddress),
    /// A node resolved by cluster id through the topology map.
    NodeId(String),
}

impl Route {
    /// True for the fan-out directives.
    pub fn is_multi(&self) -> bool {
        matches!(
            self,
            Route::AllPrimaries | Route::AllReplicas | Route::AllNodes
        )
    }
}

pub struct Router {
    topology: Arc<TopologyView>,
    manager: Arc<ConnectionManager>,
    read_from: ReadFrom,
    /// Slot semantics apply (multi-key commands must be split per slot).
    cluster_mode: bool,
    /// Replica round-robin position per primary node id. Survives topology
    /// swaps so rotation does not restart on every refresh.
    rr_counters: DashMap<String, AtomicUsize>,
    /// Temporary slot -> address overrides learned from MOVED redirects;
    /// cleared when a fresh topology snapshot is installed.
    moved_hints: DashMap<u16, NodeAddress>,
}

impl Router {
    pub fn new(
        topology: Arc<TopologyView>,
        manager: Arc<ConnectionManager>,
        read_from: ReadFrom,
        cluster_mode: bool,
    ) -> Self {
        Self {
            topology,
            manager,
            read_from,
            cluster_mode,
            rr_counters: DashMap::new(),
            moved_hints: DashMap::new(),
        }
    }

    pub fn is_cluster(&self) -> bool {
        self.cluster_mode
    }

    pub fn manager(&self) -> &Arc<ConnectionManager> {
        &self.manager
    }

    pub fn topology(&self) -> &Arc<TopologyView> {
        &self.topology
    }

    /// Records a MOVED hint so follow-up requests for the slot go straight to
    /// the new owner until the next topology refresh confirms it.
    pub fn learn_moved(&self, slot: u16, addr: NodeAddress) {
        self.moved_hints.insert(slot, addr);
    }

    pub fn clear_moved_hints(&self) {
        self.moved_hints.clear();
    }

    /// Resolves a single-target directive to a connection.
    pub fn target_for(&self, route: &Route, is_write: bool) -> Result<NodeConnection, ClientError> {
        let addr = match route {
            Route::Address(addr) => addr.clone(),
            Route::NodeId(id) => {
                let topology = self.topology.load();
                topology
                    .node_by_id(id)
                    .map(|node| node.addr.clone())
                    .ok_or_else(|| {
                        ClientError::Connection(format!("unknown node id {id:?}"))
                    })?
            }
            Route::Key(key) => self.address_for_slot(key_hash_slot(key), is_write)?,
            Route::Random => self.random_primary_address(),
            multi => {
                return Err(ClientError::Configuration(format!(
                    "fan-out directive {multi:?} used as a single-target route"
                )));
            }
        };
        Ok(self.manager.get_or_connect(&addr))
    }

    /// Resolves a fan-out directive to `(node id, connection)` pairs.
    pub fn fanout_targets(
        &self,
        route: &Route,
    ) -> Result<Vec<(Arc<ClusterNode>, NodeConnection)>, ClientError> {
        let topology = self.topology.load();
        let nodes: Vec<Arc<ClusterNode>> = match route {
            Route::AllPrimaries => topology.primaries().cloned().collect(),
            Route::AllReplicas => topology.replicas().cloned().collect(),
            Route::AllNodes => topology.nodes().cloned().collect(),
            single => {
                return Err(ClientError::Configuration(format!(
                    "single-target directive {single:?} used as a fan-out route"
                )));
            }
        };
        Ok(nodes
            .into_iter()
            .map(|node| {
                let connection = self.manager.get_or_connect(&node.addr);
                (node, connection)
            })
            .collect())
    }

    /// Resolves a slot directly to a connection; used by the batch executor
    /// after it has reduced an atomic batch to its one shared slot.
    pub fn target_for_slot(
        &self,
        slot: u16,
        is_write: bool,
    ) -> Result<NodeConnection, ClientError> {
        let addr = self.address_for_slot(slot, is_write)?;
        Ok(self.manager.get_or_connect(&addr))
    }

    /// The address serving `slot`, honoring MOVED hints and, for reads, the
    /// client's read strategy.
    fn address_for_slot(&self, slot: u16, is_write: bool) -> Result<NodeAddress, ClientError> {
        // A MOVED hint outranks the (stale) snapshot for both reads and
        // writes; replica routing resumes once the topology catches up.
        if let Some(hint) = self.moved_hints.get(&slot) {
            return Ok(hint.clone());
        }
        let topology = self.topology.load();
        let shard = topology.shard_for_slot(slot)?;
        if is_write {
            return Ok(shard.primary.addr.clone());
        }
        Ok(match &self.read_from {
            ReadFrom::Primary => shard.primary.addr.clone(),
            ReadFrom::PreferReplica => self.pick_replica(shard, None),
            ReadFrom::AzAffinity { zone } => self.pick_replica(shard, Some(zone)),
        })
    }

    /// Round-robin over the shard's healthy replicas, preferring the given
    /// zone when one is supplied; the primary is the fallback.
    fn pick_replica(&self, shard: &Shard, zone: Option<&str>) -> NodeAddress {
        let healthy: Vec<&Arc<ClusterNode>> = shard
            .replicas
            .iter()
            .filter(|replica| self.is_candidate(&replica.addr))
            .collect();
        if healthy.is_empty() {
            return shard.primary.addr.clone();
        }

        if let Some(zone) = zone {
            let zonal: Vec<&&Arc<ClusterNode>> = healthy
                .iter()
                .filter(|replica| replica.zone.as_deref() == Some(zone))
                .collect();
            if !zonal.is_empty() {
                let idx = self.next_rr(&shard.primary.id, zonal.len());
                return zonal[idx].addr.clone();
            }
        }

        let idx = self.next_rr(&shard.primary.id, healthy.len());
        healthy[idx].addr.clone()
    }

    /// A node is a routing candidate unless its connection is known-bad. An
    /// address with no connection yet is assumed healthy and dialed on use.
    fn is_candidate(&self, addr: &NodeAddress) -> bool {
        match self.manager.get(addr) {
            Some(connection) => matches!(
                connection.state(),
                ConnectionState::Ready | ConnectionState::Connecting
            ),
            None => true,
        }
    }

    fn next_rr(&self, primary_id: &str, len: usize) -> usize {
        let counter = self
            .rr_counters
            .entry(primary_id.to_string())
            .or_insert_with(|| AtomicUsize::new(0));
        counter.fetch_add(1, Ordering::Relaxed) % len
    }

    fn random_primary_address(&self) -> NodeAddress {
        let topology = self.topology.load();
        let shards = topology.shards();
        // Prefer a primary with a usable connection; settle for a random one.
        let start = rand::thread_rng().gen_range(0..shards.len());
        for offset in 0..shards.len() {
            let candidate = &shards[(start + offset) % shards.len()].primary;
            if self.is_candidate(&candidate.addr) {
                return candidate.addr.clone();
            }
        }
        shards[start].primary.addr.clone()
    }
}
