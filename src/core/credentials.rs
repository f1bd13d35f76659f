// src/core/credentials.rs

//! Credential storage and the pluggable provider interface.

use crate::config::Credentials;
use crate::core::errors::ClientError;
use async_trait::async_trait;
use parking_lot::RwLock;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

/// A source of dynamic credentials (e.g. IAM-style tokens).
///
/// The credential refresher calls `fetch` every `refresh_interval` and
/// re-authenticates every open connection with the result.
#[async_trait]
pub trait CredentialProvider: Send + Sync {
    async fn fetch(&self) -> Result<Credentials, ClientError>;

    fn refresh_interval(&self) -> Duration;
}

/// The most recent credentials, shared by connection handshakes and the
/// refresher. Swapped atomically: a reader sees either the old or the new
/// value, never a mix.
#[derive(Debug, Default)]
pub struct CredentialStore {
    current: RwLock<Option<Credentials>>,
    /// Bumped on every store; connections record the epoch they
    /// authenticated with so stale AUTHs are observable.
    epoch: AtomicU64,
}

impl CredentialStore {
    pub fn new(initial: Option<Credentials>) -> Self {
        let store = Self {
            current: RwLock::new(None),
            epoch: AtomicU64::new(0),
        };
        if let Some(credentials) = initial {
            store.store(credentials);
        }
        store
    }

    /// Installs new credentials and returns the new epoch.
    pub fn store(&self, credentials: Credentials) -> u64 {
        *self.current.write() = Some(credentials);
        self.epoch.fetch_add(1, Ordering::AcqRel) + 1
    }

    pub fn snapshot(&self) -> Option<Credentials> {
        self.current.read().clone()
    }

    pub fn epoch(&self) -> u64 {
        self.epoch.load(Ordering::Acquire)
    }
}
