//! HTTP request gateway
//!
//! Wraps every outbound call with authorization-header injection, 401
//! interception, single-flight refresh coordination, and exactly one
//! retry. Everything above this module works with parsed payloads;
//! everything below it works with raw responses.

use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::config::ClientConfig;
use crate::error::{ClientResult, WorkTaskError};
use crate::token::TokenManager;
use crate::transport::{ApiRequest, ApiResponse, Method, SharedTransport};

/// Session-level notifications surfaced to the UI layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthEvent {
    /// Refresh could not produce a usable token; the UI should route to
    /// the sign-in flow.
    SessionExpired,
}

/// Receiver half of the auth event channel.
pub type AuthEventReceiver = mpsc::UnboundedReceiver<AuthEvent>;

/// Gateway for all API calls.
pub struct RequestGateway {
    transport: SharedTransport,
    tokens: Arc<TokenManager>,
    config: Arc<ClientConfig>,
    events: mpsc::UnboundedSender<AuthEvent>,
}

impl RequestGateway {
    /// Create a gateway; the returned receiver carries session events for
    /// the UI layer.
    pub fn new(
        transport: SharedTransport,
        tokens: Arc<TokenManager>,
        config: Arc<ClientConfig>,
    ) -> (Self, AuthEventReceiver) {
        let (events, receiver) = mpsc::unbounded_channel();
        (
            Self {
                transport,
                tokens,
                config,
                events,
            },
            receiver,
        )
    }

    /// Authentication endpoints bypass token attachment entirely.
    fn is_auth_endpoint(endpoint: &str) -> bool {
        endpoint.starts_with("/auth/")
    }

    /// Issue an API call and parse the success body as `T`.
    pub async fn request<T: DeserializeOwned>(
        &self,
        method: Method,
        endpoint: &str,
        body: Option<Value>,
    ) -> ClientResult<T> {
        let response = self.request_raw(method, endpoint, body).await?;
        serde_json::from_str(&response.body).map_err(Into::into)
    }

    /// Issue an API call, returning the raw response on success without
    /// assuming a body shape.
    pub async fn request_raw(
        &self,
        method: Method,
        endpoint: &str,
        body: Option<Value>,
    ) -> ClientResult<ApiResponse> {
        let response = self.execute_with_refresh(method, endpoint, body).await?;
        if !response.is_success() {
            warn!(status = response.status, endpoint, "API request failed");
            return Err(WorkTaskError::http(response.status, Some(response.body)));
        }
        Ok(response)
    }

    async fn execute_with_refresh(
        &self,
        method: Method,
        endpoint: &str,
        body: Option<Value>,
    ) -> ClientResult<ApiResponse> {
        let is_auth = Self::is_auth_endpoint(endpoint);
        let bearer = if is_auth {
            None
        } else {
            Some(
                self.tokens
                    .access_token()
                    .await?
                    .ok_or(WorkTaskError::MissingToken)?,
            )
        };

        let path = self.config.versioned_path(endpoint);
        let response = self
            .transport
            .execute(build_request(method, &path, bearer, body.clone()))
            .await?;
        if response.status != 401 || is_auth {
            return Ok(response);
        }

        debug!(endpoint, "received 401, attempting token refresh");
        let Some(refreshed) = self.tokens.refresh().await else {
            return Err(self.expire_session().await);
        };

        debug!(endpoint, "token refreshed, retrying request once");
        let retried = self
            .transport
            .execute(build_request(method, &path, Some(refreshed), body))
            .await?;
        if retried.status == 401 {
            // The refreshed token was rejected too; terminal, no second
            // retry loop.
            return Err(self.expire_session().await);
        }
        Ok(retried)
    }

    /// Destroy the session and signal the UI layer.
    async fn expire_session(&self) -> WorkTaskError {
        if let Err(error) = self.tokens.clear_tokens().await {
            warn!(error = %error, "failed to clear tokens for expired session");
        }
        let _ = self.events.send(AuthEvent::SessionExpired);
        warn!("session expired, sign-in required");
        WorkTaskError::SessionExpired
    }
}

fn build_request(
    method: Method,
    path: &str,
    bearer: Option<String>,
    body: Option<Value>,
) -> ApiRequest {
    let mut request = ApiRequest::new(method, path);
    if let Some(token) = bearer {
        request = request.with_bearer(token);
    }
    if let Some(body) = body {
        request = request.with_body(body);
    }
    request
}
