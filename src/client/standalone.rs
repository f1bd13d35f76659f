// src/client/standalone.rs

//! The standalone-server client flavor.

use super::{Client, ClientBuilder};
use crate::config::ClientConfig;
use crate::core::commands::server;
use crate::core::errors::ClientError;
use crate::core::protocol::convert;
use std::ops::Deref;
use std::sync::atomic::Ordering;

/// A client for a single standalone server. Every command routes to the sole
/// node; `SELECT` is supported and re-applied by reconnect handshakes.
#[derive(Clone, Debug)]
pub struct StandaloneClient {
    client: Client,
}

impl StandaloneClient {
    pub async fn connect(config: ClientConfig) -> Result<Self, ClientError> {
        Self::connect_with(ClientBuilder::new(config)).await
    }

    pub(crate) async fn connect_with(builder: ClientBuilder) -> Result<Self, ClientError> {
        if builder.config.cluster_mode {
            return Err(ClientError::Configuration(
                "cluster_mode is enabled; use ClusterClient".to_string(),
            ));
        }
        let client = Client::connect_core(builder).await?;
        Ok(Self { client })
    }

    /// Switches the logical database. The choice is remembered so reconnect
    /// handshakes re-apply it.
    pub async fn select(&self, database_id: u32) -> Result<(), ClientError> {
        convert::into_unit(self.client.dispatch(server::select(database_id)).await?)?;
        self.client
            .manager()
            .context()
            .database_id
            .store(database_id, Ordering::Release);
        Ok(())
    }

    pub fn database_id(&self) -> u32 {
        self.client
            .manager()
            .context()
            .database_id
            .load(Ordering::Acquire)
    }
}

impl Deref for StandaloneClient {
    type Target = Client;

    fn deref(&self) -> &Client {
        &self.client
    }
}
