//! In-flight request de-duplication
//!
//! Collapses concurrent identical reads into one shared network call.
//! Entries live only while the underlying call is outstanding; nothing is
//! cached once it settles, so sequential callers always reach the network
//! and never observe stale data from this layer.

use futures::FutureExt;
use futures::future::{BoxFuture, Shared};
use serde_json::Value;
use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::debug;

use crate::error::ClientResult;
use crate::transport::Method;

/// A request outstanding under some fingerprint.
type InFlight = Shared<BoxFuture<'static, ClientResult<Value>>>;

/// Fingerprint identifying logically-identical concurrent requests.
pub fn fingerprint(method: Method, path: &str) -> String {
    format!("{method} {path}")
}

/// Registry of in-flight requests keyed by fingerprint.
#[derive(Default)]
pub struct RequestDeduper {
    in_flight: Arc<Mutex<HashMap<String, InFlight>>>,
}

impl RequestDeduper {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of requests currently outstanding.
    pub async fn in_flight_count(&self) -> usize {
        self.in_flight.lock().await.len()
    }

    /// Run `producer` at most once per in-flight window, sharing its
    /// outcome (success or failure, unsuppressed) with every caller that
    /// overlaps it.
    pub async fn dedupe<F, Fut>(&self, fingerprint: &str, producer: F) -> ClientResult<Value>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = ClientResult<Value>> + Send + 'static,
    {
        let pending = {
            let mut in_flight = self.in_flight.lock().await;
            match in_flight.get(fingerprint) {
                Some(pending) => {
                    debug!(fingerprint, "joining in-flight request");
                    pending.clone()
                }
                None => {
                    let key = fingerprint.to_string();
                    let registry = self.in_flight.clone();
                    let produced = producer();
                    let pending: InFlight = async move {
                        let outcome = produced.await;
                        // The entry is removed when the call settles,
                        // success or failure alike.
                        registry.lock().await.remove(&key);
                        outcome
                    }
                    .boxed()
                    .shared();
                    in_flight.insert(fingerprint.to_string(), pending.clone());
                    pending
                }
            }
        };
        pending.await
    }
}
