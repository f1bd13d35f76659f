// src/config.rs

//! Client configuration: the recognized options, their defaults, and
//! pre-connection validation.

use crate::core::errors::ClientError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;
use url::Url;

/// A `(host, port)` pair identifying one server endpoint.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Hash)]
pub struct NodeAddress {
    pub host: String,
    pub port: u16,
}

impl NodeAddress {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }
}

impl fmt::Display for NodeAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}

impl FromStr for NodeAddress {
    type Err = ClientError;

    /// Parses `host:port`. IPv6 hosts may be bracketed (`[::1]:6379`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (host, port) = s
            .rsplit_once(':')
            .ok_or_else(|| ClientError::Configuration(format!("invalid address {s:?}")))?;
        let port = port
            .parse::<u16>()
            .map_err(|_| ClientError::Configuration(format!("invalid port in {s:?}")))?;
        let host = host.trim_start_matches('[').trim_end_matches(']');
        if host.is_empty() {
            return Err(ClientError::Configuration(format!("empty host in {s:?}")));
        }
        Ok(NodeAddress::new(host, port))
    }
}

/// Static username/password credentials. A password alone authenticates as
/// the `default` user.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    #[serde(default)]
    pub username: Option<String>,
    pub password: String,
}

/// The per-client policy deciding where read-classified commands go.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Default)]
#[serde(rename_all = "kebab-case")]
pub enum ReadFrom {
    /// Strong consistency: always the slot's owning primary.
    #[default]
    Primary,
    /// Round-robin over the owning primary's replicas; the primary is the
    /// fallback when no replica is healthy.
    PreferReplica,
    /// Prefer a replica in the client's availability zone, then any replica,
    /// then the primary.
    AzAffinity { zone: String },
}

/// Reconnection backoff parameters. The delay for attempt `n` is
/// `min(base_ms * factor^n, max_ms)` plus a random jitter in `[0, base_ms)`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct BackoffConfig {
    #[serde(default = "default_backoff_base_ms")]
    pub base_ms: u64,
    #[serde(default = "default_backoff_factor")]
    pub factor: u32,
    #[serde(default = "default_backoff_max_ms")]
    pub max_ms: u64,
    /// `None` reconnects forever.
    #[serde(default)]
    pub max_attempts: Option<u32>,
}

impl Default for BackoffConfig {
    fn default() -> Self {
        Self {
            base_ms: default_backoff_base_ms(),
            factor: default_backoff_factor(),
            max_ms: default_backoff_max_ms(),
            max_attempts: None,
        }
    }
}

fn default_backoff_base_ms() -> u64 {
    5
}
fn default_backoff_factor() -> u32 {
    2
}
fn default_backoff_max_ms() -> u64 {
    1000
}

/// What to do with a new Pub/Sub message when the delivery queue is full.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "kebab-case")]
pub enum QueueOverflowPolicy {
    #[default]
    DropOldest,
    DropNewest,
    Block,
}

/// The initial desired subscription set, applied as soon as connections
/// become ready.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct PubSubChannels {
    #[serde(default)]
    pub channels: Vec<String>,
    #[serde(default)]
    pub patterns: Vec<String>,
    /// Sharded channels are routed by slot and require cluster mode.
    #[serde(default)]
    pub sharded: Vec<String>,
}

impl PubSubChannels {
    pub fn is_empty(&self) -> bool {
        self.channels.is_empty() && self.patterns.is_empty() && self.sharded.is_empty()
    }
}

/// The full recognized configuration surface of a client.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct ClientConfig {
    /// Seed list of endpoints; at least one is required. In cluster mode the
    /// full topology is discovered from these seeds.
    pub addresses: Vec<NodeAddress>,

    #[serde(default)]
    pub cluster_mode: bool,

    #[serde(default)]
    pub credentials: Option<Credentials>,

    #[serde(default)]
    pub use_tls: bool,

    /// Logical database selected on each connection. Standalone only.
    #[serde(default)]
    pub database_id: u32,

    /// Tag applied with `CLIENT SETNAME` during the handshake.
    #[serde(default)]
    pub client_name: Option<String>,

    #[serde(default)]
    pub read_from: ReadFrom,

    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,

    #[serde(default = "default_connect_timeout_ms")]
    pub connect_timeout_ms: u64,

    /// Upper bound on how long `close` waits for background tasks to join.
    #[serde(default = "default_shutdown_timeout_ms")]
    pub shutdown_timeout_ms: u64,

    #[serde(default)]
    pub reconnect_backoff: BackoffConfig,

    /// How often the topology health timer fires in cluster mode.
    #[serde(default = "default_topology_check_interval_ms")]
    pub topology_check_interval_ms: u64,

    #[serde(default)]
    pub pubsub_subscriptions: Option<PubSubChannels>,

    #[serde(default)]
    pub pubsub_queue_policy: QueueOverflowPolicy,

    #[serde(default = "default_pubsub_queue_capacity")]
    pub pubsub_queue_capacity: usize,
}

fn default_request_timeout_ms() -> u64 {
    250
}
fn default_connect_timeout_ms() -> u64 {
    250
}
fn default_shutdown_timeout_ms() -> u64 {
    5000
}
fn default_topology_check_interval_ms() -> u64 {
    10_000
}
fn default_pubsub_queue_capacity() -> usize {
    1024
}

impl ClientConfig {
    /// A configuration with defaults for everything except the seed list.
    pub fn new(addresses: Vec<NodeAddress>) -> Self {
        Self {
            addresses,
            cluster_mode: false,
            credentials: None,
            use_tls: false,
            database_id: 0,
            client_name: None,
            read_from: ReadFrom::default(),
            request_timeout_ms: default_request_timeout_ms(),
            connect_timeout_ms: default_connect_timeout_ms(),
            shutdown_timeout_ms: default_shutdown_timeout_ms(),
            reconnect_backoff: BackoffConfig::default(),
            topology_check_interval_ms: default_topology_check_interval_ms(),
            pubsub_subscriptions: None,
            pubsub_queue_policy: QueueOverflowPolicy::default(),
            pubsub_queue_capacity: default_pubsub_queue_capacity(),
        }
    }

    /// Builds a configuration from a `redis://`, `rediss://`, `valkey://` or
    /// `valkeys://` URL. The path component selects the database, userinfo
    /// the credentials, and the `s`-suffixed schemes enable TLS.
    pub fn from_url(raw: &str) -> Result<Self, ClientError> {
        let url = Url::parse(raw)
            .map_err(|e| ClientError::Configuration(format!("invalid URL {raw:?}: {e}")))?;
        let use_tls = match url.scheme() {
            "redis" | "valkey" => false,
            "rediss" | "valkeys" => true,
            other => {
                return Err(ClientError::Configuration(format!(
                    "unsupported URL scheme {other:?}"
                )));
            }
        };
        let host = url
            .host_str()
            .ok_or_else(|| ClientError::Configuration("URL is missing a host".to_string()))?;
        let port = url.port().unwrap_or(6379);

        let mut config = ClientConfig::new(vec![NodeAddress::new(host, port)]);
        config.use_tls = use_tls;

        if let Some(password) = url.password() {
            let username = (!url.username().is_empty()).then(|| url.username().to_string());
            config.credentials = Some(Credentials {
                username,
                password: password.to_string(),
            });
        }

        let db_path = url.path().trim_start_matches('/');
        if !db_path.is_empty() {
            config.database_id = db_path.parse::<u32>().map_err(|_| {
                ClientError::Configuration(format!("invalid database in URL path {db_path:?}"))
            })?;
        }
        Ok(config)
    }

    /// Validates the configuration before any connection is attempted.
    pub fn validate(&self) -> Result<(), ClientError> {
        if self.addresses.is_empty() {
            return Err(ClientError::Configuration(
                "at least one seed address is required".to_string(),
            ));
        }
        if let Some(addr) = self.addresses.iter().find(|a| a.host.is_empty() || a.port == 0) {
            return Err(ClientError::Configuration(format!(
                "invalid seed address {addr}"
            )));
        }
        if self.cluster_mode && self.database_id != 0 {
            return Err(ClientError::Configuration(
                "database_id is only supported in standalone mode".to_string(),
            ));
        }
        if self.request_timeout_ms == 0 || self.connect_timeout_ms == 0 {
            return Err(ClientError::Configuration(
                "timeouts must be non-zero".to_string(),
            ));
        }
        if self.reconnect_backoff.base_ms == 0 || self.reconnect_backoff.factor == 0 {
            return Err(ClientError::Configuration(
                "reconnect backoff base and factor must be non-zero".to_string(),
            ));
        }
        if self.reconnect_backoff.max_ms < self.reconnect_backoff.base_ms {
            return Err(ClientError::Configuration(
                "reconnect backoff max_ms must be >= base_ms".to_string(),
            ));
        }
        if let ReadFrom::AzAffinity { zone } = &self.read_from
            && zone.is_empty()
        {
            return Err(ClientError::Configuration(
                "az-affinity requires a non-empty zone".to_string(),
            ));
        }
        if let Some(subs) = &self.pubsub_subscriptions
            && !subs.sharded.is_empty()
            && !self.cluster_mode
        {
            return Err(ClientError::Configuration(
                "sharded subscriptions require cluster mode".to_string(),
            ));
        }
        if self.pubsub_queue_capacity == 0 {
            return Err(ClientError::Configuration(
                "pubsub_queue_capacity must be non-zero".to_string(),
            ));
        }
        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }

    pub fn shutdown_timeout(&self) -> Duration {
        Duration::from_millis(self.shutdown_timeout_ms)
    }

    pub fn topology_check_interval(&self) -> Duration {
        Duration::from_millis(self.topology_check_interval_ms)
    }
}
