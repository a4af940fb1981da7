//! Access/refresh token lifecycle
//!
//! The token manager is the only writer of the persisted token pair. Its
//! refresh path is single-flight: however many callers hit a 401 at once,
//! one network refresh is issued and every caller receives that one
//! outcome.

use futures::FutureExt;
use futures::future::{BoxFuture, Shared};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, warn};

use worktask_protocol::{RefreshTokenRequest, RefreshTokenResponse};
use worktask_storage::{KeyValueStorage, StorageScope};

use crate::config::ClientConfig;
use crate::error::ClientResult;
use crate::transport::{ApiRequest, Method, SharedTransport};

/// Storage key for the access token.
pub const ACCESS_TOKEN_KEY: &str = "worktask-access-token";
/// Storage key for the refresh token.
pub const REFRESH_TOKEN_KEY: &str = "worktask-refresh-token";

/// Outcome of an in-flight refresh, shared by all its callers.
type SharedRefresh = Shared<BoxFuture<'static, Option<String>>>;

/// Owner of the access/refresh token pair.
pub struct TokenManager {
    storage: Arc<dyn KeyValueStorage>,
    transport: SharedTransport,
    config: Arc<ClientConfig>,
    /// At most one refresh outstanding system-wide. Holds the shared
    /// future while one is in flight; the future clears the slot itself
    /// when it settles.
    refresh_slot: Arc<Mutex<Option<SharedRefresh>>>,
}

impl TokenManager {
    /// Create a token manager over the given storage and transport.
    pub fn new(
        storage: Arc<dyn KeyValueStorage>,
        transport: SharedTransport,
        config: Arc<ClientConfig>,
    ) -> Self {
        Self {
            storage,
            transport,
            config,
            refresh_slot: Arc::new(Mutex::new(None)),
        }
    }

    /// Currently stored access token. Never touches the network.
    pub async fn access_token(&self) -> ClientResult<Option<String>> {
        read_token(self.storage.as_ref(), ACCESS_TOKEN_KEY).await
    }

    /// Persist the token pair with the configured lifetimes.
    pub async fn save_tokens(&self, access: &str, refresh: Option<&str>) -> ClientResult<()> {
        persist_tokens(self.storage.as_ref(), &self.config, access, refresh).await
    }

    /// Remove both tokens immediately.
    pub async fn clear_tokens(&self) -> ClientResult<()> {
        self.storage
            .delete(StorageScope::ShortLived, ACCESS_TOKEN_KEY)
            .await?;
        self.storage
            .delete(StorageScope::ShortLived, REFRESH_TOKEN_KEY)
            .await?;
        debug!("tokens cleared");
        Ok(())
    }

    /// Obtain a fresh access token, serializing concurrent callers.
    ///
    /// While a refresh is outstanding every caller awaits the same shared
    /// future, so exactly one network call is issued per settled outcome.
    /// Resolves to `None` when no refresh token is stored (fail-fast, no
    /// network call) or when the refresh call fails; failures are terminal
    /// here and not retried.
    pub async fn refresh(&self) -> Option<String> {
        let pending = {
            let mut slot = self.refresh_slot.lock().await;
            match slot.as_ref() {
                Some(pending) => {
                    debug!("refresh already in flight, awaiting shared outcome");
                    pending.clone()
                }
                None => {
                    let storage = self.storage.clone();
                    let transport = self.transport.clone();
                    let config = self.config.clone();
                    let slot_handle = self.refresh_slot.clone();
                    let pending: SharedRefresh = async move {
                        let outcome = perform_refresh(storage, transport, config).await;
                        // Release the slot before any caller observes the
                        // outcome; late arrivals start a fresh refresh.
                        *slot_handle.lock().await = None;
                        outcome
                    }
                    .boxed()
                    .shared();
                    *slot = Some(pending.clone());
                    pending
                }
            }
        };
        pending.await
    }
}

/// Execute one refresh call against the server.
async fn perform_refresh(
    storage: Arc<dyn KeyValueStorage>,
    transport: SharedTransport,
    config: Arc<ClientConfig>,
) -> Option<String> {
    let refresh_token = match read_token(storage.as_ref(), REFRESH_TOKEN_KEY).await {
        Ok(Some(token)) => token,
        Ok(None) => {
            warn!("no refresh token available");
            return None;
        }
        Err(error) => {
            warn!(error = %error, "failed to read refresh token");
            return None;
        }
    };

    let body = match serde_json::to_value(RefreshTokenRequest { refresh_token }) {
        Ok(body) => body,
        Err(error) => {
            warn!(error = %error, "failed to serialize refresh request");
            return None;
        }
    };
    let request =
        ApiRequest::new(Method::Post, config.versioned_path("/auth/refresh")).with_body(body);

    let response = match transport.execute(request).await {
        Ok(response) => response,
        Err(error) => {
            warn!(error = %error, "token refresh call failed");
            return None;
        }
    };
    if !response.is_success() {
        warn!(status = response.status, "token refresh rejected by server");
        return None;
    }

    let parsed: RefreshTokenResponse = match serde_json::from_str(&response.body) {
        Ok(parsed) => parsed,
        Err(error) => {
            warn!(error = %error, "refresh response not parseable");
            return None;
        }
    };

    if let Err(error) = persist_tokens(
        storage.as_ref(),
        &config,
        &parsed.access_token,
        parsed.refresh_token.as_deref(),
    )
    .await
    {
        warn!(error = %error, "failed to persist refreshed tokens");
        return None;
    }

    debug!("access token refreshed");
    Some(parsed.access_token)
}

async fn read_token(
    storage: &dyn KeyValueStorage,
    key: &str,
) -> ClientResult<Option<String>> {
    match storage.get(StorageScope::ShortLived, key).await? {
        Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
        None => Ok(None),
    }
}

async fn persist_tokens(
    storage: &dyn KeyValueStorage,
    config: &ClientConfig,
    access: &str,
    refresh: Option<&str>,
) -> ClientResult<()> {
    storage
        .set(
            StorageScope::ShortLived,
            ACCESS_TOKEN_KEY,
            serde_json::to_string(access)?,
            Some(config.tokens.access_ttl),
        )
        .await?;
    if let Some(refresh) = refresh {
        storage
            .set(
                StorageScope::ShortLived,
                REFRESH_TOKEN_KEY,
                serde_json::to_string(refresh)?,
                Some(config.tokens.refresh_ttl),
            )
            .await?;
    }
    debug!("tokens persisted");
    Ok(())
}
