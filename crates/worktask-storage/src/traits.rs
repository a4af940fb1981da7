//! Key-Value Storage Trait
//!
//! The narrow interface the client reads and writes persistent state
//! through. Values are plain-text JSON strings; callers own
//! serialization so backends stay format-agnostic.

use async_trait::async_trait;
use std::fmt;
use std::time::Duration;
use thiserror::Error;

/// Lifetime scope of a stored value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StorageScope {
    /// Request-readable scope with bounded lifetimes; holds credentials.
    ShortLived,
    /// Page-readable scope without implicit expiry; holds cached entities.
    LongLived,
}

impl fmt::Display for StorageScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageScope::ShortLived => write!(f, "short-lived"),
            StorageScope::LongLived => write!(f, "long-lived"),
        }
    }
}

/// Error type for storage operations.
#[derive(Debug, Clone, Error)]
pub enum StorageError {
    #[error("storage backend unavailable: {0}")]
    Unavailable(String),

    #[error("storage capacity exceeded: {0} entries")]
    CapacityExceeded(usize),
}

/// Core trait for key-value storage backends.
///
/// Implementations must be safe to share across tasks; the client holds
/// one instance behind an `Arc` and calls it concurrently.
#[async_trait]
pub trait KeyValueStorage: Send + Sync {
    /// Backend name for logging and debugging.
    fn backend_name(&self) -> &'static str;

    /// Read the value stored under `key`, if any live one exists.
    async fn get(&self, scope: StorageScope, key: &str) -> Result<Option<String>, StorageError>;

    /// Store `value` under `key`. A `ttl` bounds the value's lifetime;
    /// `None` keeps it until deleted.
    async fn set(
        &self,
        scope: StorageScope,
        key: &str,
        value: String,
        ttl: Option<Duration>,
    ) -> Result<(), StorageError>;

    /// Remove the value stored under `key`. Returns whether a live value
    /// was removed.
    async fn delete(&self, scope: StorageScope, key: &str) -> Result<bool, StorageError>;
}
