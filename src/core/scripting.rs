// src/core/scripting.rs

//! The process-wide script cache backing `EVALSHA` invocation.
//!
//! Sources are registered locally by SHA1 and only shipped to a server when
//! an invocation observes `NOSCRIPT`. Dropping a script forgets it locally;
//! no server-side unload is issued.

use bytes::Bytes;
use dashmap::DashMap;
use once_cell::sync::Lazy;
use sha1::{Digest, Sha1};

static GLOBAL_CACHE: Lazy<ScriptCache> = Lazy::new(ScriptCache::new);

/// A SHA1-keyed map of script sources, shared by every client in the process.
#[derive(Debug)]
pub struct ScriptCache {
    scripts: DashMap<String, Bytes>,
}

impl ScriptCache {
    fn new() -> Self {
        Self {
            scripts: DashMap::new(),
        }
    }

    /// The process-wide cache instance.
    pub fn global() -> &'static ScriptCache {
        &GLOBAL_CACHE
    }

    /// Computes the script's SHA1, stores the source under it, and returns
    /// the hex digest. Re-registering the same source is idempotent.
    pub fn insert(&self, source: Bytes) -> String {
        let mut hasher = Sha1::new();
        hasher.update(&source);
        let sha1 = hex::encode(hasher.finalize());
        self.scripts.insert(sha1.clone(), source);
        sha1
    }

    /// Resolves a cached source for a `NOSCRIPT` reload.
    pub fn get(&self, sha1: &str) -> Option<Bytes> {
        self.scripts.get(sha1).map(|entry| entry.value().clone())
    }

    pub fn contains(&self, sha1: &str) -> bool {
        self.scripts.contains_key(sha1)
    }

    /// Forgets a script locally.
    pub fn remove(&self, sha1: &str) {
        self.scripts.remove(sha1);
    }

    pub fn len(&self) -> usize {
        self.scripts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scripts.is_empty()
    }
}

/// A handle to a registered script, invoked through
/// `Client::invoke_script`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Script {
    sha1: String,
}

impl Script {
    /// Registers `source` in the process-wide cache.
    pub fn new(source: impl Into<Bytes>) -> Self {
        let sha1 = ScriptCache::global().insert(source.into());
        Self { sha1 }
    }

    /// A handle to an already-known digest, e.g. one persisted elsewhere.
    /// Invocations can only recover from `NOSCRIPT` if the source is cached.
    pub fn from_sha1(sha1: impl Into<String>) -> Self {
        Self { sha1: sha1.into() }
    }

    pub fn sha1(&self) -> &str {
        &self.sha1
    }

    /// Removes this script from the process-wide cache.
    pub fn forget(&self) {
        ScriptCache::global().remove(&self.sha1);
    }
}
