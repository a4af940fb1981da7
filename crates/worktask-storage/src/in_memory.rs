//! In-Memory Key-Value Storage
//!
//! Stores all values in memory behind `Arc<RwLock<>>`. Suitable for
//! tests and for hosts without a durable store; nothing survives the
//! process.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::{debug, info};

use crate::traits::{KeyValueStorage, StorageError, StorageScope};

/// Configuration for in-memory storage.
#[derive(Debug, Clone)]
pub struct InMemoryConfig {
    /// Maximum number of entries across both scopes.
    pub max_entries: usize,
}

impl Default for InMemoryConfig {
    fn default() -> Self {
        Self { max_entries: 10_000 }
    }
}

#[derive(Debug, Clone)]
struct Entry {
    value: String,
    /// Expiry stamp in Unix millis; `None` means no expiry.
    expires_at: Option<u64>,
}

impl Entry {
    fn is_expired(&self, now: u64) -> bool {
        matches!(self.expires_at, Some(deadline) if now >= deadline)
    }
}

fn now_millis() -> u64 {
    chrono::Utc::now().timestamp_millis() as u64
}

/// In-memory storage over both scopes.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStorage {
    entries: Arc<RwLock<HashMap<(StorageScope, String), Entry>>>,
    config: InMemoryConfig,
}

impl InMemoryStorage {
    /// Create storage with default configuration.
    pub fn new() -> Self {
        Self::with_config(InMemoryConfig::default())
    }

    /// Create storage with custom configuration.
    pub fn with_config(config: InMemoryConfig) -> Self {
        Self {
            entries: Arc::new(RwLock::new(HashMap::new())),
            config,
        }
    }

    /// Current statistics.
    pub async fn stats(&self) -> InMemoryStats {
        let entries = self.entries.read().await;
        let now = now_millis();
        let live_count = entries.values().filter(|e| !e.is_expired(now)).count();
        InMemoryStats {
            entry_count: entries.len(),
            live_count,
            max_entries: self.config.max_entries,
        }
    }

    /// Drop expired entries. Expired values are already invisible to
    /// `get`; this reclaims their memory.
    pub async fn purge_expired(&self) -> u64 {
        let mut entries = self.entries.write().await;
        let now = now_millis();
        let before = entries.len();
        entries.retain(|_, entry| !entry.is_expired(now));
        let removed = (before - entries.len()) as u64;
        if removed > 0 {
            info!(removed, "purged expired storage entries");
        }
        removed
    }
}

/// Statistics for in-memory storage.
#[derive(Debug, Clone)]
pub struct InMemoryStats {
    pub entry_count: usize,
    pub live_count: usize,
    pub max_entries: usize,
}

#[async_trait]
impl KeyValueStorage for InMemoryStorage {
    fn backend_name(&self) -> &'static str {
        "InMemory"
    }

    async fn get(&self, scope: StorageScope, key: &str) -> Result<Option<String>, StorageError> {
        let entries = self.entries.read().await;
        let now = now_millis();
        Ok(entries
            .get(&(scope, key.to_string()))
            .filter(|entry| !entry.is_expired(now))
            .map(|entry| entry.value.clone()))
    }

    async fn set(
        &self,
        scope: StorageScope,
        key: &str,
        value: String,
        ttl: Option<Duration>,
    ) -> Result<(), StorageError> {
        let mut entries = self.entries.write().await;
        let entry_key = (scope, key.to_string());
        if !entries.contains_key(&entry_key) && entries.len() >= self.config.max_entries {
            return Err(StorageError::CapacityExceeded(self.config.max_entries));
        }

        let expires_at = ttl.map(|ttl| now_millis() + ttl.as_millis() as u64);
        debug!(%scope, key, ttl_ms = ttl.map(|t| t.as_millis() as u64), "storing value");
        entries.insert(entry_key, Entry { value, expires_at });
        Ok(())
    }

    async fn delete(&self, scope: StorageScope, key: &str) -> Result<bool, StorageError> {
        let mut entries = self.entries.write().await;
        let now = now_millis();
        let removed = entries.remove(&(scope, key.to_string()));
        Ok(removed.is_some_and(|entry| !entry.is_expired(now)))
    }
}
