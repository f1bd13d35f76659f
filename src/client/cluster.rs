// src/client/cluster.rs

//! The cluster client flavor: topology introspection and cluster-wide SCAN.

use super::{Client, ClientBuilder};
use crate::config::ClientConfig;
use crate::core::commands::cluster as cluster_commands;
use crate::core::commands::generic::ScanArgs;
use crate::core::errors::ClientError;
use crate::core::protocol::convert;
use crate::core::scan::{self, ClusterScanCursor};
use bytes::Bytes;
use futures::Stream;
use std::ops::Deref;

/// A client for a sharded cluster. `SELECT` does not exist on this flavor;
/// routing consults the slot map and the configured read strategy.
#[derive(Clone, Debug)]
pub struct ClusterClient {
    client: Client,
}

impl ClusterClient {
    pub async fn connect(config: ClientConfig) -> Result<Self, ClientError> {
        Self::connect_with(ClientBuilder::new(config)).await
    }

    pub(crate) async fn connect_with(builder: ClientBuilder) -> Result<Self, ClientError> {
        if !builder.config.cluster_mode {
            return Err(ClientError::Configuration(
                "cluster_mode is disabled; use StandaloneClient".to_string(),
            ));
        }
        let client = Client::connect_core(builder).await?;
        Ok(Self { client })
    }

    /// Runs one iteration of a cluster-wide SCAN, advancing one node. An
    /// empty page with the cursor finished marks completion.
    pub async fn cluster_scan(
        &self,
        cursor: &ClusterScanCursor,
        args: &ScanArgs,
    ) -> Result<Vec<Bytes>, ClientError> {
        scan::scan_step(
            &self.client.core.router,
            &self.client.core.refresh_signal,
            cursor,
            args,
            self.client.core.config.request_timeout(),
        )
        .await
    }

    /// Streams the whole keyspace as pages of keys, driving a fresh cursor
    /// to completion.
    pub fn scan_stream(
        &self,
        args: ScanArgs,
    ) -> impl Stream<Item = Result<Vec<Bytes>, ClientError>> {
        let client = self.client.clone();
        let cursor = ClusterScanCursor::new();
        async_stream::try_stream! {
            loop {
                let keys = scan::scan_step(
                    &client.core.router,
                    &client.core.refresh_signal,
                    &cursor,
                    &args,
                    client.core.config.request_timeout(),
                )
                .await?;
                if !keys.is_empty() {
                    yield keys;
                }
                if cursor.is_finished() {
                    break;
                }
            }
        }
    }

    /// Forces a topology refresh and returns the new epoch.
    pub async fn refresh_topology(&self) -> Result<u64, ClientError> {
        match &self.client.core.topology_refresher {
            Some(refresher) => refresher.refresh_once().await,
            None => Err(ClientError::Configuration(
                "topology refresh requires cluster mode".to_string(),
            )),
        }
    }

    pub async fn cluster_info(&self) -> Result<String, ClientError> {
        convert::into_string(self.client.dispatch(cluster_commands::cluster_info()).await?)
    }

    pub async fn cluster_nodes(&self) -> Result<String, ClientError> {
        convert::into_string(self.client.dispatch(cluster_commands::cluster_nodes()).await?)
    }
}

impl Deref for ClusterClient {
    type Target = Client;

    fn deref(&self) -> &Client {
        &self.client
    }
}
