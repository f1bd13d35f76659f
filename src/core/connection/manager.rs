// src/core/connection/manager.rs

//! The connection registry: one actor per node address, created on demand.

use super::{ConnectionState, NodeConnection, PushEvent, ResubscribeHook};
use crate::config::{ClientConfig, NodeAddress};
use crate::core::credentials::CredentialStore;
use dashmap::DashMap;
use once_cell::sync::OnceCell;
use std::sync::Arc;
use std::sync::atomic::AtomicU32;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;
use tracing::debug;

/// Everything a connection actor needs from the rest of the client.
pub struct ConnectionContext {
    pub settings: Arc<ClientConfig>,
    /// The database applied by the handshake's `SELECT`; mutated by
    /// `StandaloneClient::select`.
    pub database_id: AtomicU32,
    pub credentials: Arc<CredentialStore>,
    pub push_tx: mpsc::UnboundedSender<PushEvent>,
    /// Registered by the Pub/Sub engine after construction; connections
    /// created before registration simply have nothing to replay.
    pub resubscribe: OnceCell<Arc<dyn ResubscribeHook>>,
    pub shutdown: CancellationToken,
}

/// Owns every [`NodeConnection`] of a client, keyed by address.
pub struct ConnectionManager {
    ctx: Arc<ConnectionContext>,
    connections: DashMap<NodeAddress, NodeConnection>,
    tasks: TaskTracker,
}

impl ConnectionManager {
    pub fn new(ctx: Arc<ConnectionContext>) -> Self {
        Self {
            ctx,
            connections: DashMap::new(),
            tasks: TaskTracker::new(),
        }
    }

    pub fn context(&self) -> &Arc<ConnectionContext> {
        &self.ctx
    }

    /// Returns the connection for `addr`, spawning its actor if absent. A
    /// connection that terminally closed (reconnect budget exhausted) is
    /// replaced under the same identity.
    pub fn get_or_connect(&self, addr: &NodeAddress) -> NodeConnection {
        let entry = self.connections.entry(addr.clone()).or_insert_with(|| {
            debug!("Opening connection to {}.", addr);
            self.spawn(addr.clone())
        });
        if entry.state() == ConnectionState::Closed && !self.ctx.shutdown.is_cancelled() {
            debug!("Replacing terminally closed connection to {}.", addr);
            let replacement = self.spawn(addr.clone());
            let mut entry = entry;
            *entry.value_mut() = replacement.clone();
            return replacement;
        }
        entry.clone()
    }

    fn spawn(&self, addr: NodeAddress) -> NodeConnection {
        let (connection, handle) = NodeConnection::spawn(addr, self.ctx.clone());
        self.tasks.spawn(async move {
            let _ = handle.await;
        });
        connection
    }

    pub fn get(&self, addr: &NodeAddress) -> Option<NodeConnection> {
        self.connections.get(addr).map(|c| c.clone())
    }

    pub fn connections(&self) -> Vec<NodeConnection> {
        self.connections.iter().map(|c| c.clone()).collect()
    }

    pub fn ready_count(&self) -> usize {
        self.connections.iter().filter(|c| c.is_ready()).count()
    }

    /// Connections currently unable to serve traffic (not `Ready`).
    pub fn disabled_count(&self) -> usize {
        self.connections.iter().filter(|c| !c.is_ready()).count()
    }

    /// Picks an arbitrary ready connection, e.g. for topology discovery.
    pub fn any_ready(&self) -> Option<NodeConnection> {
        self.connections
            .iter()
            .find(|c| c.is_ready())
            .map(|c| c.clone())
    }

    /// Closes and removes connections whose address fails the predicate.
    /// Used after a topology swap to drop vanished nodes.
    pub fn retain_addresses(&self, keep: impl Fn(&NodeAddress) -> bool) {
        self.connections.retain(|addr, connection| {
            if keep(addr) {
                true
            } else {
                debug!("Pruning connection to departed node {}.", addr);
                connection.close();
                false
            }
        });
    }

    /// Signals every actor to stop and waits for them to finish.
    pub async fn close_all(&self) {
        for connection in self.connections.iter() {
            connection.close();
        }
        self.tasks.close();
        self.tasks.wait().await;
    }
}
