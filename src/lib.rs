// src/lib.rs

pub mod client;
pub mod config;
pub mod core;

// Re-export the public surface.
pub use crate::client::{Client, ClientBuilder, ClusterClient, StandaloneClient};
pub use crate::config::{
    BackoffConfig, ClientConfig, Credentials, NodeAddress, PubSubChannels, QueueOverflowPolicy,
    ReadFrom,
};
pub use crate::core::batch::{Batch, BatchResponse};
pub use crate::core::commands::Cmd;
pub use crate::core::commands::generic::{ObjectType, ScanArgs};
pub use crate::core::credentials::CredentialProvider;
pub use crate::core::errors::ClientError;
pub use crate::core::protocol::Value;
pub use crate::core::pubsub::{ChannelMode, MessageHandler, PushMessage};
pub use crate::core::scan::ClusterScanCursor;
pub use crate::core::scripting::{Script, ScriptCache};
