// src/core/tasks/credential_refresh.rs

//! Periodic credential rotation: fetch a fresh token from the provider,
//! store it for future handshakes, and re-AUTH every open connection.

use crate::core::commands::server;
use crate::core::connection::ConnectionState;
use crate::core::connection::manager::ConnectionManager;
use crate::core::credentials::{CredentialProvider, CredentialStore};
use crate::core::errors::ClientError;
use crate::core::protocol::reply_to_value;
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

pub struct CredentialRefresher {
    provider: Arc<dyn CredentialProvider>,
    store: Arc<CredentialStore>,
    manager: Arc<ConnectionManager>,
    /// Coalesces concurrent manual and scheduled refreshes.
    refresh_lock: Mutex<()>,
}

impl CredentialRefresher {
    pub fn new(
        provider: Arc<dyn CredentialProvider>,
        store: Arc<CredentialStore>,
        manager: Arc<ConnectionManager>,
    ) -> Self {
        Self {
            provider,
            store,
            manager,
            refresh_lock: Mutex::new(()),
        }
    }

    /// One refresh round. Also the manual entry point; a round already in
    /// progress is simply joined.
    pub async fn refresh_once(&self) -> Result<(), ClientError> {
        let _guard = self.refresh_lock.lock().await;
        let credentials = self.provider.fetch().await?;
        // Stored before the AUTH sweep so reconnects handshake with the new
        // token even if their re-AUTH below loses a race with a disconnect.
        let epoch = self.store.store(credentials.clone());
        debug!("Fetched credentials; advancing to auth epoch {}.", epoch);

        let auth =
            server::auth(credentials.username.as_deref(), &credentials.password).to_frame();
        let deadline = self.manager.context().settings.request_timeout();
        for connection in self.manager.connections() {
            if connection.state() == ConnectionState::Closed {
                continue;
            }
            let outcome = tokio::time::timeout(deadline, connection.request(auth.clone()))
                .await
                .map_err(|_| ClientError::Timeout)
                .and_then(|reply| reply);
            match outcome.map(reply_to_value) {
                Ok(Ok(_)) => connection.set_auth_epoch(epoch),
                Ok(Err(e)) => {
                    warn!("Re-AUTH rejected by {}: {}", connection.addr(), e);
                }
                Err(e) => {
                    // The next handshake on this connection picks the new
                    // credentials up from the store.
                    debug!("Re-AUTH not delivered to {}: {}", connection.addr(), e);
                }
            }
        }
        Ok(())
    }

    /// The task loop, ticking at the provider's refresh interval.
    pub async fn run(self: Arc<Self>, shutdown: CancellationToken) {
        let interval = self.provider.refresh_interval();
        loop {
            tokio::select! {
                biased;
                _ = shutdown.cancelled() => {
                    debug!("Credential refresh task shutting down.");
                    return;
                }
                _ = tokio::time::sleep(interval) => {
                    if let Err(e) = self.refresh_once().await {
                        warn!("Credential refresh failed: {}", e);
                    }
                }
            }
        }
    }
}
