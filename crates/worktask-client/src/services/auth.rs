//! Authentication service

use std::sync::Arc;
use tracing::info;

use worktask_protocol::{LoginRequest, LoginResponse, UserProfile};
use worktask_storage::{KeyValueStorage, StorageScope};

use crate::error::{ClientResult, WorkTaskError};
use crate::gateway::RequestGateway;
use crate::token::TokenManager;
use crate::transport::Method;

/// Storage key for the signed-in user's profile record.
pub const USER_DATA_KEY: &str = "user-data";

/// Login, logout and profile access.
pub struct AuthService {
    gateway: Arc<RequestGateway>,
    tokens: Arc<TokenManager>,
    storage: Arc<dyn KeyValueStorage>,
}

impl AuthService {
    pub(crate) fn new(
        gateway: Arc<RequestGateway>,
        tokens: Arc<TokenManager>,
        storage: Arc<dyn KeyValueStorage>,
    ) -> Self {
        Self {
            gateway,
            tokens,
            storage,
        }
    }

    /// Log in and persist the returned token pair plus a profile record.
    pub async fn login(&self, username: &str, password: &str) -> ClientResult<LoginResponse> {
        let body = serde_json::to_value(LoginRequest {
            username: username.to_string(),
            password: password.to_string(),
        })?;
        let response: LoginResponse = self
            .gateway
            .request(Method::Post, "/auth/login", Some(body))
            .await?;

        self.tokens
            .save_tokens(&response.access_token, Some(&response.refresh_token))
            .await?;

        // The API exposes no profile endpoint; capture what we know now.
        let profile = UserProfile {
            id: "temp-user-id".to_string(),
            name: username.to_string(),
            email: username.to_string(),
            created_at: Some(chrono::Utc::now().to_rfc3339()),
        };
        self.storage
            .set(
                StorageScope::LongLived,
                USER_DATA_KEY,
                serde_json::to_string(&profile)?,
                None,
            )
            .await?;

        info!(username, "logged in");
        Ok(response)
    }

    /// Profile of the signed-in user: the record captured at login, with
    /// placeholder defaults when none is stored. Fails without a stored
    /// access token.
    pub async fn current_user(&self) -> ClientResult<UserProfile> {
        if self.tokens.access_token().await?.is_none() {
            return Err(WorkTaskError::MissingToken);
        }
        match self.storage.get(StorageScope::LongLived, USER_DATA_KEY).await? {
            Some(raw) => Ok(serde_json::from_str(&raw)?),
            None => Ok(UserProfile::placeholder()),
        }
    }

    /// Clear the token pair and the stored profile.
    pub async fn logout(&self) -> ClientResult<()> {
        self.tokens.clear_tokens().await?;
        self.storage
            .delete(StorageScope::LongLived, USER_DATA_KEY)
            .await?;
        info!("logged out");
        Ok(())
    }
}
