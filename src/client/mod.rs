// src/client/mod.rs

//! The client facade: lifecycle, the shared runtime, and the builder.
//!
//! [`Client`] is the shared base carrying the whole command vocabulary (the
//! per-family method impls live under `client::commands`);
//! [`StandaloneClient`] and [`ClusterClient`] wrap it with their
//! flavor-specific operations.

pub mod cluster;
pub mod commands;
pub mod standalone;

pub use cluster::ClusterClient;
pub use standalone::StandaloneClient;

use crate::config::{ClientConfig, NodeAddress};
use crate::core::batch::{self, Batch, BatchResponse};
use crate::core::cluster::topology::{TopologyMap, TopologyView};
use crate::core::commands::{Cmd, scripting as scripting_commands, server as server_commands};
use crate::core::connection::manager::{ConnectionContext, ConnectionManager};
use crate::core::connection::ResubscribeHook;
use crate::core::credentials::{CredentialProvider, CredentialStore};
use crate::core::dispatch;
use crate::core::errors::ClientError;
use crate::core::protocol::{Value, reply_to_value};
use crate::core::pubsub::{ChannelMode, MessageHandler, PubSubEngine};
use crate::core::routing::Router;
use crate::core::scripting::{Script, ScriptCache};
use crate::core::tasks::credential_refresh::CredentialRefresher;
use crate::core::tasks::topology_refresh::{RefreshSignal, TopologyRefresher};
use bytes::Bytes;
use once_cell::sync::OnceCell;
use parking_lot::Mutex;
use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// The shared runtime behind every client handle.
pub(crate) struct ClientCore {
    pub(crate) config: Arc<ClientConfig>,
    pub(crate) router: Arc<Router>,
    pub(crate) refresh_signal: Arc<RefreshSignal>,
    pub(crate) topology_refresher: Option<Arc<TopologyRefresher>>,
    pub(crate) pubsub: Arc<PubSubEngine>,
    pub(crate) credential_refresher: Option<Arc<CredentialRefresher>>,
    pub(crate) shutdown: CancellationToken,
    pub(crate) tasks: Mutex<Vec<JoinHandle<()>>>,
    pub(crate) closed: AtomicBool,
}

/// The shared client base. Cheap to clone; every clone drives the same
/// runtime.
#[derive(Clone)]
pub struct Client {
    pub(crate) core: Arc<ClientCore>,
    /// The per-handle request deadline; see [`Client::with_request_timeout`].
    request_timeout: Duration,
}

/// Configures the non-serializable extras of a client before connecting.
pub struct ClientBuilder {
    config: ClientConfig,
    credential_provider: Option<Arc<dyn CredentialProvider>>,
    message_handler: Option<MessageHandler>,
}

impl ClientBuilder {
    pub fn new(config: ClientConfig) -> Self {
        Self {
            config,
            credential_provider: None,
            message_handler: None,
        }
    }

    /// Installs a dynamic credential provider; a refresh task reissues AUTH
    /// at the provider's interval.
    pub fn credential_provider(mut self, provider: Arc<dyn CredentialProvider>) -> Self {
        self.credential_provider = Some(provider);
        self
    }

    /// Installs the Pub/Sub message callback.
    pub fn message_handler(mut self, handler: MessageHandler) -> Self {
        self.message_handler = Some(handler);
        self
    }

    pub async fn connect_standalone(self) -> Result<StandaloneClient, ClientError> {
        StandaloneClient::connect_with(self).await
    }

    pub async fn connect_cluster(self) -> Result<ClusterClient, ClientError> {
        ClusterClient::connect_with(self).await
    }
}

impl Client {
    pub fn builder(config: ClientConfig) -> ClientBuilder {
        ClientBuilder::new(config)
    }

    /// Assembles and starts the shared runtime. Used by both flavors.
    pub(crate) async fn connect_core(builder: ClientBuilder) -> Result<Client, ClientError> {
        let ClientBuilder {
            config,
            credential_provider,
            message_handler,
        } = builder;
        config.validate()?;
        let config = Arc::new(config);
        let shutdown = CancellationToken::new();
        let credentials = Arc::new(CredentialStore::new(config.credentials.clone()));
        let (push_tx, push_rx) = mpsc::unbounded_channel();

        let ctx = Arc::new(ConnectionContext {
            settings: config.clone(),
            database_id: AtomicU32::new(config.database_id),
            credentials: credentials.clone(),
            push_tx,
            resubscribe: OnceCell::new(),
            shutdown: shutdown.clone(),
        });
        let manager = Arc::new(ConnectionManager::new(ctx.clone()));

        let initial_map = if config.cluster_mode {
            TopologyMap::bootstrap(&config.addresses)
        } else {
            TopologyMap::standalone(config.addresses[0].clone())
        };
        let topology = Arc::new(TopologyView::new(initial_map));
        let router = Arc::new(Router::new(
            topology.clone(),
            manager.clone(),
            config.read_from.clone(),
            config.cluster_mode,
        ));

        let pubsub = Arc::new(PubSubEngine::new(
            topology.clone(),
            config.pubsub_queue_capacity,
            config.pubsub_queue_policy,
            message_handler,
        ));
        pubsub.register_manager(manager.clone());
        let hook: Arc<dyn ResubscribeHook> = pubsub.clone();
        let _ = ctx.resubscribe.set(hook);

        let refresh_signal = Arc::new(RefreshSignal::new());
        let mut tasks = pubsub.clone().spawn_tasks(push_rx, shutdown.clone());

        // Dynamic credentials are fetched before the first dial so the very
        // first handshake already carries a valid token.
        let credential_refresher = match credential_provider {
            Some(provider) => {
                let refresher = Arc::new(CredentialRefresher::new(
                    provider,
                    credentials.clone(),
                    manager.clone(),
                ));
                refresher.refresh_once().await?;
                tasks.push(tokio::spawn(refresher.clone().run(shutdown.clone())));
                Some(refresher)
            }
            None => None,
        };

        let startup_deadline = config.connect_timeout() + config.request_timeout();
        let topology_refresher = if config.cluster_mode {
            let refresher = Arc::new(TopologyRefresher::new(
                router.clone(),
                config.addresses.clone(),
                refresh_signal.clone(),
            ));
            tokio::time::timeout(startup_deadline, refresher.refresh_once())
                .await
                .map_err(|_| {
                    ClientError::Connection("initial topology discovery timed out".to_string())
                })??;
            tasks.push(tokio::spawn(
                refresher
                    .clone()
                    .run(config.topology_check_interval(), shutdown.clone()),
            ));
            Some(refresher)
        } else {
            // Standalone: verify the sole node is reachable before handing
            // the client out.
            let connection = manager.get_or_connect(&config.addresses[0]);
            let ping = server_commands::ping().to_frame();
            let reply = tokio::time::timeout(startup_deadline, connection.request(ping))
                .await
                .map_err(|_| {
                    ClientError::Connection(format!(
                        "initial connection to {} timed out",
                        config.addresses[0]
                    ))
                })??;
            reply_to_value(reply)?;
            None
        };

        let request_timeout = config.request_timeout();
        let client = Client {
            core: Arc::new(ClientCore {
                config: config.clone(),
                router,
                refresh_signal,
                topology_refresher,
                pubsub: pubsub.clone(),
                credential_refresher,
                shutdown,
                tasks: Mutex::new(tasks),
                closed: AtomicBool::new(false),
            }),
            request_timeout,
        };

        // Apply the configured initial subscription set.
        if let Some(subs) = &config.pubsub_subscriptions {
            client
                .subscribe(subs.channels.iter().map(|c| Bytes::from(c.clone())).collect())
                .await?;
            client
                .psubscribe(subs.patterns.iter().map(|c| Bytes::from(c.clone())).collect())
                .await?;
            client
                .ssubscribe(subs.sharded.iter().map(|c| Bytes::from(c.clone())).collect())
                .await?;
        }

        info!(
            "Client connected ({} mode, {} seed address(es)).",
            if config.cluster_mode { "cluster" } else { "standalone" },
            config.addresses.len()
        );
        Ok(client)
    }

    /// A handle whose commands use a different per-request deadline.
    pub fn with_request_timeout(&self, timeout: Duration) -> Client {
        Client {
            core: self.core.clone(),
            request_timeout: timeout,
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.core.config
    }

    /// The epoch of the topology snapshot currently used for routing.
    pub fn topology_epoch(&self) -> u64 {
        self.core.router.topology().epoch()
    }

    /// The single execution entry point behind every command method.
    pub(crate) async fn dispatch(&self, cmd: Cmd) -> Result<Value, ClientError> {
        if self.core.closed.load(Ordering::Acquire) {
            return Err(ClientError::Closing);
        }
        dispatch::dispatch(
            &self.core.router,
            &self.core.refresh_signal,
            &cmd,
            self.request_timeout,
        )
        .await
    }

    /// Executes a batch (pipeline or transaction); see [`Batch`].
    pub async fn exec(&self, batch: Batch) -> Result<BatchResponse, ClientError> {
        if self.core.closed.load(Ordering::Acquire) {
            return Err(ClientError::Closing);
        }
        batch::execute(
            &self.core.router,
            &self.core.refresh_signal,
            &batch,
            self.request_timeout,
        )
        .await
    }

    // --- Scripting ---

    /// Invokes a registered script by SHA1, transparently loading the source
    /// and retrying exactly once when the server reports `NOSCRIPT`.
    pub async fn invoke_script(
        &self,
        script: &Script,
        keys: Vec<Bytes>,
        args: Vec<Bytes>,
    ) -> Result<Value, ClientError> {
        let cmd = scripting_commands::evalsha(script.sha1().to_string(), keys.clone(), args.clone());
        match self.dispatch(cmd).await {
            Err(ClientError::NoScript) => {
                let source = ScriptCache::global().get(script.sha1()).ok_or_else(|| {
                    ClientError::Request(format!(
                        "NOSCRIPT script {} is not in the local cache",
                        script.sha1()
                    ))
                })?;
                debug!("Reloading script {} after NOSCRIPT.", script.sha1());
                self.dispatch(scripting_commands::script_load(source)).await?;
                self.dispatch(scripting_commands::evalsha(
                    script.sha1().to_string(),
                    keys,
                    args,
                ))
                .await
            }
            other => other,
        }
    }

    /// Forgets a script locally; no server-side unload is issued.
    pub fn drop_script(&self, sha1: &str) {
        ScriptCache::global().remove(sha1);
    }

    // --- Pub/Sub surface ---

    /// Applies the request deadline to a subscription-state change so a
    /// wedged connection cannot hang the caller; the desired-set update
    /// itself is immediate and replayed by reconnect handshakes.
    async fn pubsub_op(
        &self,
        op: impl Future<Output = Result<(), ClientError>>,
    ) -> Result<(), ClientError> {
        match tokio::time::timeout(self.request_timeout, op).await {
            Ok(result) => result,
            Err(_) => Err(ClientError::Timeout),
        }
    }

    pub async fn subscribe(&self, channels: Vec<Bytes>) -> Result<(), ClientError> {
        self.pubsub_op(self.core.pubsub.subscribe(ChannelMode::Exact, channels))
            .await
    }

    pub async fn unsubscribe(&self, channels: Vec<Bytes>) -> Result<(), ClientError> {
        self.pubsub_op(self.core.pubsub.unsubscribe(ChannelMode::Exact, channels))
            .await
    }

    pub async fn psubscribe(&self, patterns: Vec<Bytes>) -> Result<(), ClientError> {
        self.pubsub_op(self.core.pubsub.subscribe(ChannelMode::Pattern, patterns))
            .await
    }

    pub async fn punsubscribe(&self, patterns: Vec<Bytes>) -> Result<(), ClientError> {
        self.pubsub_op(self.core.pubsub.unsubscribe(ChannelMode::Pattern, patterns))
            .await
    }

    pub async fn ssubscribe(&self, channels: Vec<Bytes>) -> Result<(), ClientError> {
        self.pubsub_op(self.core.pubsub.subscribe(ChannelMode::Sharded, channels))
            .await
    }

    pub async fn sunsubscribe(&self, channels: Vec<Bytes>) -> Result<(), ClientError> {
        self.pubsub_op(self.core.pubsub.unsubscribe(ChannelMode::Sharded, channels))
            .await
    }

    pub fn set_message_handler(&self, handler: MessageHandler) {
        self.core.pubsub.set_handler(handler);
    }

    /// Channels of a mode the servers have acknowledged.
    pub fn confirmed_subscriptions(&self, mode: ChannelMode) -> Vec<Bytes> {
        self.core.pubsub.confirmed(mode)
    }

    /// Messages discarded by the Pub/Sub overflow policy.
    pub fn pubsub_dropped_messages(&self) -> u64 {
        self.core.pubsub.dropped_messages()
    }

    // --- Credentials ---

    /// Manually triggers a credential refresh; coalesces with a scheduled
    /// refresh already in flight.
    pub async fn refresh_credentials(&self) -> Result<(), ClientError> {
        match &self.core.credential_refresher {
            Some(refresher) => refresher.refresh_once().await,
            None => Err(ClientError::Configuration(
                "no credential provider is configured".to_string(),
            )),
        }
    }

    // --- Lifecycle ---

    /// Shuts the client down: new requests fail with `Closing`, pending
    /// waiters are cancelled, connections close, and background tasks join
    /// within the shutdown deadline.
    pub async fn close(&self) {
        if self.core.closed.swap(true, Ordering::AcqRel) {
            return;
        }
        info!("Closing client.");
        self.core.shutdown.cancel();

        let tasks: Vec<JoinHandle<()>> = self.core.tasks.lock().drain(..).collect();
        let teardown = async {
            self.core.router.manager().close_all().await;
            for task in tasks {
                let _ = task.await;
            }
        };
        if tokio::time::timeout(self.core.config.shutdown_timeout(), teardown)
            .await
            .is_err()
        {
            warn!("Shutdown deadline elapsed before all tasks joined.");
        }
    }

    pub(crate) fn manager(&self) -> &Arc<ConnectionManager> {
        self.core.router.manager()
    }

    pub(crate) fn seed_address(&self) -> &NodeAddress {
        &self.core.config.addresses[0]
    }
}

impl std::fmt::Debug for Client {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Client")
            .field("cluster_mode", &self.core.config.cluster_mode)
            .field("closed", &self.core.closed.load(Ordering::Relaxed))
            .finish()
    }
}
