// src/core/cluster/topology.rs

//! The client's view of the server fleet: immutable topology snapshots and
//! the shared, atomically swapped handle through which they are read.

use super::slot::SLOT_COUNT;
use crate::config::NodeAddress;
use crate::core::errors::ClientError;
use crate::core::protocol::Value;
use crate::core::protocol::convert;
use parking_lot::RwLock;
use rand::Rng;
use std::collections::HashMap;
use std::sync::Arc;

/// The role of a node in the cluster.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeRole {
    Primary,
    Replica,
}

/// One server node as seen by the client.
///
/// The `id` is the cluster-assigned node id; it is only stable within one
/// topology epoch. In standalone mode a synthetic id derived from the address
/// is used.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClusterNode {
    pub id: String,
    pub addr: NodeAddress,
    pub role: NodeRole,
    /// Availability-zone tag, when the server advertises one.
    pub zone: Option<String>,
    /// Back-reference to the owning primary; `None` for primaries.
    pub primary_id: Option<String>,
}

impl ClusterNode {
    pub fn is_primary(&self) -> bool {
        self.role == NodeRole::Primary
    }
}

/// A primary and its replicas.
#[derive(Debug, Clone)]
pub struct Shard {
    pub primary: Arc<ClusterNode>,
    pub replicas: Vec<Arc<ClusterNode>>,
}

/// An immutable snapshot of cluster topology.
///
/// Snapshots are never mutated in place; a refresh builds a complete new map
/// and swaps it into the [`TopologyView`]. Readers hold an `Arc`, which keeps
/// an old snapshot alive until its last reader is done.
#[derive(Debug)]
pub struct TopologyMap {
    epoch: u64,
    shards: Vec<Shard>,
    nodes: HashMap<String, Arc<ClusterNode>>,
    /// Dense slot table: slot -> index into `shards`. `u16::MAX` marks an
    /// unassigned slot.
    slots: Vec<u16>,
}

const UNASSIGNED: u16 = u16::MAX;

impl TopologyMap {
    /// A synthetic single-node topology for standalone mode: one shard owns
    /// every slot.
    pub fn standalone(addr: NodeAddress) -> Self {
        let node = Arc::new(ClusterNode {
            id: format!("standalone:{addr}"),
            addr,
            role: NodeRole::Primary,
            zone: None,
            primary_id: None,
        });
        let mut nodes = HashMap::new();
        nodes.insert(node.id.clone(), node.clone());
        Self {
            epoch: 1,
            shards: vec![Shard {
                primary: node,
                replicas: Vec::new(),
            }],
            nodes,
            slots: vec![0; SLOT_COUNT as usize],
        }
    }

    /// A pre-discovery cluster bootstrap: every seed is assumed to be a
    /// primary and the first one temporarily owns the whole keyspace. The
    /// initial discovery replaces this map before the client is handed out.
    pub fn bootstrap(seeds: &[NodeAddress]) -> Self {
        let mut nodes = HashMap::new();
        let mut shards = Vec::with_capacity(seeds.len());
        for addr in seeds {
            let node = Arc::new(ClusterNode {
                id: format!("seed:{addr}"),
                addr: addr.clone(),
                role: NodeRole::Primary,
                zone: None,
                primary_id: None,
            });
            nodes.insert(node.id.clone(), node.clone());
            shards.push(Shard {
                primary: node,
                replicas: Vec::new(),
            });
        }
        Self {
            epoch: 1,
            shards,
            nodes,
            slots: vec![0; SLOT_COUNT as usize],
        }
    }

    /// Parses a `CLUSTER SLOTS` reply into a snapshot with the given epoch.
    ///
    /// Each entry is `[start, end, primary, replica...]` where a node is
    /// `[host, port, id, metadata?]`. Ranges for an already-seen primary are
    /// merged into its shard.
    pub fn from_cluster_slots(reply: Value, epoch: u64) -> Result<Self, ClientError> {
        let mut shards: Vec<Shard> = Vec::new();
        let mut shard_index_by_primary: HashMap<String, u16> = HashMap::new();
        let mut nodes: HashMap<String, Arc<ClusterNode>> = HashMap::new();
        let mut slots = vec![UNASSIGNED; SLOT_COUNT as usize];

        for entry in convert::into_array(reply)? {
            let mut parts = convert::into_array(entry)?.into_iter();
            let start = convert::into_int(parts.next().ok_or_else(short_entry)?)?;
            let end = convert::into_int(parts.next().ok_or_else(short_entry)?)?;
            if !(0..SLOT_COUNT as i64).contains(&start) || !(start..SLOT_COUNT as i64).contains(&end)
            {
                return Err(ClientError::Protocol(format!(
                    "invalid slot range {start}-{end} in CLUSTER SLOTS"
                )));
            }

            let primary = parse_node(parts.next().ok_or_else(short_entry)?, NodeRole::Primary, None)?;
            let primary_id = primary.id.clone();
            let shard_idx = match shard_index_by_primary.get(&primary_id) {
                Some(idx) => *idx,
                None => {
                    let primary = Arc::new(primary);
                    nodes.insert(primary_id.clone(), primary.clone());

                    let mut replicas = Vec::new();
                    for replica_entry in parts {
                        let replica = Arc::new(parse_node(
                            replica_entry,
                            NodeRole::Replica,
                            Some(&primary_id),
                        )?);
                        nodes.insert(replica.id.clone(), replica.clone());
                        replicas.push(replica);
                    }

                    let idx = shards.len() as u16;
                    shards.push(Shard { primary, replicas });
                    shard_index_by_primary.insert(primary_id, idx);
                    idx
                }
            };

            for slot in start..=end {
                slots[slot as usize] = shard_idx;
            }
        }

        if shards.is_empty() {
            return Err(ClientError::Protocol(
                "CLUSTER SLOTS reply contained no shards".to_string(),
            ));
        }
        Ok(Self {
            epoch,
            shards,
            nodes,
            slots,
        })
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    pub fn shards(&self) -> &[Shard] {
        &self.shards
    }

    pub fn shard_for_slot(&self, slot: u16) -> Result<&Shard, ClientError> {
        let idx = self
            .slots
            .get(slot as usize)
            .copied()
            .unwrap_or(UNASSIGNED);
        if idx == UNASSIGNED {
            return Err(ClientError::Connection(format!(
                "no node serves slot {slot}"
            )));
        }
        Ok(&self.shards[idx as usize])
    }

    pub fn node_by_id(&self, id: &str) -> Option<&Arc<ClusterNode>> {
        self.nodes.get(id)
    }

    pub fn nodes(&self) -> impl Iterator<Item = &Arc<ClusterNode>> {
        self.nodes.values()
    }

    pub fn primaries(&self) -> impl Iterator<Item = &Arc<ClusterNode>> {
        self.shards.iter().map(|s| &s.primary)
    }

    pub fn replicas(&self) -> impl Iterator<Item = &Arc<ClusterNode>> {
        self.shards.iter().flat_map(|s| s.replicas.iter())
    }

    /// Uniformly samples one primary.
    pub fn random_primary(&self) -> &Arc<ClusterNode> {
        let idx = rand::thread_rng().gen_range(0..self.shards.len());
        &self.shards[idx].primary
    }

    /// True if `addr` belongs to any node in this snapshot.
    pub fn contains_address(&self, addr: &NodeAddress) -> bool {
        self.nodes.values().any(|n| &n.addr == addr)
    }
}

fn short_entry() -> ClientError {
    ClientError::Protocol("short CLUSTER SLOTS entry".to_string())
}

/// Parses one `[host, port, id, metadata?]` node entry.
fn parse_node(
    value: Value,
    role: NodeRole,
    primary_id: Option<&str>,
) -> Result<ClusterNode, ClientError> {
    let mut parts = convert::into_array(value)?.into_iter();
    let host = convert::into_string(parts.next().ok_or_else(short_entry)?)?;
    let port = convert::into_int(parts.next().ok_or_else(short_entry)?)?;
    let addr = NodeAddress::new(host, port as u16);
    // Very old servers omit the node id; fall back to the address.
    let id = match parts.next() {
        Some(v) => convert::into_string(v)?,
        None => addr.to_string(),
    };
    let zone = parts.next().and_then(|meta| zone_from_metadata(meta));
    Ok(ClusterNode {
        id,
        addr,
        role,
        zone,
        primary_id: primary_id.map(str::to_string),
    })
}

/// Extracts an `availability-zone` tag from the optional node-metadata map.
fn zone_from_metadata(meta: Value) -> Option<String> {
    let pairs = convert::into_pairs(meta).ok()?;
    pairs.into_iter().find_map(|(k, v)| {
        (k.as_ref() == b"availability-zone" && !v.is_empty())
            .then(|| String::from_utf8_lossy(&v).to_string())
    })
}

/// The shared, atomically swapped handle to the current topology snapshot.
#[derive(Debug)]
pub struct TopologyView {
    current: RwLock<Arc<TopologyMap>>,
}

impl TopologyView {
    pub fn new(initial: TopologyMap) -> Self {
        Self {
            current: RwLock::new(Arc::new(initial)),
        }
    }

    /// The current snapshot. Readers clone the `Arc` and may keep using the
    /// snapshot after a concurrent swap.
    pub fn load(&self) -> Arc<TopologyMap> {
        self.current.read().clone()
    }

    pub fn epoch(&self) -> u64 {
        self.current.read().epoch
    }

    /// Installs a new snapshot. Refreshes are serialized by the topology
    /// task, so a stale candidate (epoch not above the current one) is a bug
    /// upstream and is rejected here.
    pub fn swap(&self, map: TopologyMap) -> Result<Arc<TopologyMap>, ClientError> {
        let mut guard = self.current.write();
        if map.epoch <= guard.epoch {
            return Err(ClientError::Protocol(format!(
                "stale topology epoch {} (current {})",
                map.epoch, guard.epoch
            )));
        }
        let map = Arc::new(map);
        *guard = map.clone();
        Ok(map)
    }
}
