// src/core/scan.rs

//! Cluster-wide SCAN with a cursor that survives topology changes.
//!
//! The cursor tracks, per primary, the server-side cursor value and the set
//! of node ids already fully enumerated. One node advances per call, in
//! round-robin order. When the topology epoch moves mid-scan, primaries that
//! appeared start from cursor 0 and vanished primaries are dropped; keys may
//! therefore be observed more than once, but every key present for the whole
//! scan is returned at least once.

use crate::core::commands::generic::{self, ScanArgs};
use crate::core::dispatch;
use crate::core::errors::ClientError;
use crate::core::protocol::convert;
use crate::core::routing::{Route, Router};
use crate::core::tasks::topology_refresh::RefreshSignal;
use bytes::Bytes;
use parking_lot::Mutex;
use std::collections::{HashSet, VecDeque};
use std::sync::Arc;
use std::time::Duration;

/// Progress on one primary.
#[derive(Debug, Clone, PartialEq, Eq)]
struct NodeProgress {
    node_id: String,
    cursor: u64,
}

#[derive(Debug, Default)]
struct ScanState {
    /// The topology epoch the pending list was last reconciled against;
    /// zero until the first call.
    epoch: u64,
    /// Primaries with enumeration still in progress, in round-robin order.
    pending: VecDeque<NodeProgress>,
    /// Node ids fully enumerated. Keyed by id, not address, so a node that
    /// moved address is not rescanned.
    finished: HashSet<String>,
    /// Set once every known primary is finished.
    exhausted: bool,
}

/// An opaque, resumable cursor over the whole cluster keyspace.
///
/// The cursor holds no reference to the client that created it; it may be
/// resumed on any client connected to the same cluster.
#[derive(Debug, Clone, Default)]
pub struct ClusterScanCursor {
    state: Arc<Mutex<ScanState>>,
}

impl ClusterScanCursor {
    pub fn new() -> Self {
        Self::default()
    }

    /// True once the scan has enumerated every node it knows about.
    pub fn is_finished(&self) -> bool {
        self.state.lock().exhausted
    }

    /// Node ids already fully enumerated.
    pub fn finished_nodes(&self) -> Vec<String> {
        self.state.lock().finished.iter().cloned().collect()
    }
}

/// Runs one scan iteration: reconcile the cursor with the current topology,
/// advance one node, and return that page of keys. An empty page with
/// [`ClusterScanCursor::is_finished`] set marks completion.
pub async fn scan_step(
    router: &Router,
    refresh: &RefreshSignal,
    cursor: &ClusterScanCursor,
    args: &ScanArgs,
    timeout: Duration,
) -> Result<Vec<Bytes>, ClientError> {
    let Some(progress) = next_target(router, cursor) else {
        return Ok(Vec::new());
    };

    let cmd = generic::scan(progress.cursor, args).route(Route::NodeId(progress.node_id.clone()));
    let reply = match dispatch::dispatch(router, refresh, &cmd, timeout).await {
        Ok(reply) => reply,
        Err(e) => {
            // Put the node back so the cursor remains usable; a vanished node
            // is reconciled away on the next call once the topology catches up.
            cursor.state.lock().pending.push_back(progress);
            return Err(e);
        }
    };
    let (next_cursor, keys) = convert::into_scan_page(reply)?;

    let mut state = cursor.state.lock();
    if next_cursor == 0 {
        state.finished.insert(progress.node_id);
    } else {
        state.pending.push_back(NodeProgress {
            node_id: progress.node_id,
            cursor: next_cursor,
        });
    }
    Ok(keys)
}

/// Reconciles the cursor with the topology and pops the next node to scan.
fn next_target(router: &Router, cursor: &ClusterScanCursor) -> Option<NodeProgress> {
    let topology = router.topology().load();
    let mut state = cursor.state.lock();

    if state.epoch == 0 {
        // First call: every primary starts at cursor 0.
        state.epoch = topology.epoch();
        state.pending = topology
            .primaries()
            .map(|node| NodeProgress {
                node_id: node.id.clone(),
                cursor: 0,
            })
            .collect();
    } else if topology.epoch() > state.epoch {
        state.epoch = topology.epoch();
        // Vanished primaries are dropped mid-scan.
        state
            .pending
            .retain(|progress| topology.node_by_id(&progress.node_id).is_some());
        // Primaries that appeared (or took over slots) start from zero
        // unless already fully enumerated under the same id.
        for node in topology.primaries() {
            let known = state.finished.contains(&node.id)
                || state.pending.iter().any(|p| p.node_id == node.id);
            if !known {
                state.pending.push_back(NodeProgress {
                    node_id: node.id.clone(),
                    cursor: 0,
                });
            }
        }
    }

    match state.pending.pop_front() {
        Some(progress) => Some(progress),
        None => {
            state.exhausted = true;
            None
        }
    }
}
