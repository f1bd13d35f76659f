// src/core/tasks/topology_refresh.rs

//! Discovers and refreshes the cluster topology.
//!
//! Refreshes run on demand (startup, MOVED redirects) and on a coarse timer
//! that only acts when unhealthy connections outnumber healthy ones.
//! Concurrent requests coalesce into one discovery query.

use crate::config::NodeAddress;
use crate::core::commands::cluster::cluster_slots;
use crate::core::cluster::topology::TopologyMap;
use crate::core::connection::NodeConnection;
use crate::core::errors::ClientError;
use crate::core::protocol::reply_to_value;
use crate::core::routing::Router;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, Notify};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Wakes the refresh task outside its timer schedule.
#[derive(Debug, Default)]
pub struct RefreshSignal {
    notify: Notify,
}

impl RefreshSignal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn request(&self) {
        self.notify.notify_one();
    }

    pub async fn wait(&self) {
        self.notify.notified().await;
    }
}

/// Issues the discovery query and swaps new snapshots into the shared view.
pub struct TopologyRefresher {
    router: Arc<Router>,
    seeds: Vec<NodeAddress>,
    signal: Arc<RefreshSignal>,
    /// Serializes refreshes; a second caller waits for the first to finish
    /// and then observes the fresh snapshot instead of re-querying.
    in_flight: Mutex<()>,
}

impl TopologyRefresher {
    pub fn new(router: Arc<Router>, seeds: Vec<NodeAddress>, signal: Arc<RefreshSignal>) -> Self {
        Self {
            router,
            seeds,
            signal,
            in_flight: Mutex::new(()),
        }
    }

    pub fn signal(&self) -> &Arc<RefreshSignal> {
        &self.signal
    }

    /// Runs one discovery round: query an arbitrary healthy node, parse, and
    /// atomically install the snapshot with a strictly greater epoch.
    pub async fn refresh_once(&self) -> Result<u64, ClientError> {
        let _guard = self.in_flight.lock().await;
        let topology = self.router.topology();
        let manager = self.router.manager();

        let connection = self.discovery_connection();
        // Bound the discovery query so a wedged connection cannot block the
        // refresh pipeline (and with it the in-flight mutex) indefinitely.
        let settings = &manager.context().settings;
        let deadline = settings.connect_timeout() + settings.request_timeout();
        let reply = tokio::time::timeout(deadline, connection.request(cluster_slots().to_frame()))
            .await
            .map_err(|_| ClientError::Timeout)??;
        let value = reply_to_value(reply)?;

        let epoch = topology.epoch() + 1;
        let map = TopologyMap::from_cluster_slots(value, epoch)?;
        let node_count = map.nodes().count();
        let installed = topology.swap(map)?;
        self.router.clear_moved_hints();

        // Drop connections to nodes that left the cluster; seeds are kept as
        // rediscovery anchors.
        let seeds = self.seeds.clone();
        manager.retain_addresses(|addr| {
            installed.contains_address(addr) || seeds.contains(addr)
        });

        info!(
            "Installed topology epoch {} with {} nodes across {} shards.",
            epoch,
            node_count,
            installed.shards().len()
        );
        Ok(epoch)
    }

    /// Picks the node to query: any ready connection, else a seed.
    fn discovery_connection(&self) -> NodeConnection {
        let manager = self.router.manager();
        if let Some(connection) = manager.any_ready() {
            return connection;
        }
        let idx = rand::random::<usize>() % self.seeds.len();
        manager.get_or_connect(&self.seeds[idx])
    }

    /// The task loop. The timer branch refreshes only while the fleet looks
    /// unhealthy; the signal branch serves MOVED-driven demand.
    pub async fn run(self: Arc<Self>, interval: Duration, shutdown: CancellationToken) {
        loop {
            tokio::select! {
                biased;
                _ = shutdown.cancelled() => {
                    debug!("Topology refresh task shutting down.");
                    return;
                }
                _ = self.signal.wait() => {
                    if let Err(e) = self.refresh_once().await {
                        warn!("On-demand topology refresh failed: {}", e);
                    }
                }
                _ = tokio::time::sleep(interval) => {
                    let manager = self.router.manager();
                    if manager.disabled_count() > manager.ready_count()
                        && let Err(e) = self.refresh_once().await
                    {
                        warn!("Periodic topology refresh failed: {}", e);
                    }
                }
            }
        }
    }
}
