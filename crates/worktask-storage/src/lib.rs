//! # worktask Storage
//!
//! Key-value persistence abstraction for the worktask client.
//!
//! The client never touches a concrete store directly: tokens and cached
//! entities go through the [`KeyValueStorage`] trait, injected at
//! construction. Two scopes model the two lifetimes the application
//! needs: a short-lived, TTL-bearing scope for credentials and a
//! long-lived scope for cached entities.
//!
//! [`InMemoryStorage`] is the default backend, suitable for tests and for
//! hosts that supply no durable store of their own. Durable backends
//! (a cookie jar, a browser-profile store) implement the same trait.

pub mod in_memory;
pub mod traits;

pub use in_memory::{InMemoryConfig, InMemoryStats, InMemoryStorage};
pub use traits::{KeyValueStorage, StorageError, StorageScope};
