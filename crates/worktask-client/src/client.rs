//! Client facade wiring transport, storage and services

use std::sync::Arc;

use worktask_storage::{InMemoryStorage, KeyValueStorage};

use crate::config::ClientConfig;
use crate::error::ClientResult;
use crate::gateway::{AuthEventReceiver, RequestGateway};
use crate::services::{AuthService, ProjectService, TaskService};
use crate::token::TokenManager;
use crate::transport::{HttpTransport, SharedTransport, TransportStatistics};

/// Main worktask client
pub struct WorkTaskClient {
    auth: AuthService,
    projects: ProjectService,
    tasks: TaskService,
    tokens: Arc<TokenManager>,
    transport: SharedTransport,
    auth_events: parking_lot::Mutex<Option<AuthEventReceiver>>,
}

impl WorkTaskClient {
    /// Start building a client.
    pub fn builder() -> WorkTaskClientBuilder {
        WorkTaskClientBuilder::new()
    }

    /// Authentication operations.
    pub fn auth(&self) -> &AuthService {
        &self.auth
    }

    /// Project operations.
    pub fn projects(&self) -> &ProjectService {
        &self.projects
    }

    /// Task cache operations.
    pub fn tasks(&self) -> &TaskService {
        &self.tasks
    }

    /// Token lifecycle owner.
    pub fn tokens(&self) -> &TokenManager {
        &self.tokens
    }

    /// Take the session event receiver. The UI layer owns it and reacts
    /// to `SessionExpired` by routing to sign-in. Returns `None` once
    /// taken.
    pub fn take_auth_events(&self) -> Option<AuthEventReceiver> {
        self.auth_events.lock().take()
    }

    /// Transport statistics.
    pub fn transport_statistics(&self) -> TransportStatistics {
        self.transport.statistics()
    }
}

/// Builder for creating worktask clients
pub struct WorkTaskClientBuilder {
    config: Option<ClientConfig>,
    transport: Option<SharedTransport>,
    storage: Option<Arc<dyn KeyValueStorage>>,
}

impl WorkTaskClientBuilder {
    /// Create a new client builder
    pub fn new() -> Self {
        Self {
            config: None,
            transport: None,
            storage: None,
        }
    }

    /// Set configuration; defaults to [`ClientConfig::from_env`].
    pub fn with_config(mut self, config: ClientConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Set transport; defaults to [`HttpTransport`] over the configured
    /// base URL.
    pub fn with_transport(mut self, transport: SharedTransport) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Set the persistence backend; defaults to [`InMemoryStorage`].
    pub fn with_storage(mut self, storage: Arc<dyn KeyValueStorage>) -> Self {
        self.storage = Some(storage);
        self
    }

    /// Build the client.
    pub fn build(self) -> ClientResult<WorkTaskClient> {
        let config = Arc::new(self.config.unwrap_or_else(ClientConfig::from_env));
        let transport: SharedTransport = match self.transport {
            Some(transport) => transport,
            None => Arc::new(HttpTransport::new(&config)?),
        };
        let storage = self
            .storage
            .unwrap_or_else(|| Arc::new(InMemoryStorage::new()));

        let tokens = Arc::new(TokenManager::new(
            storage.clone(),
            transport.clone(),
            config.clone(),
        ));
        let (gateway, auth_events) =
            RequestGateway::new(transport.clone(), tokens.clone(), config);
        let gateway = Arc::new(gateway);

        Ok(WorkTaskClient {
            auth: AuthService::new(gateway.clone(), tokens.clone(), storage.clone()),
            projects: ProjectService::new(gateway.clone()),
            tasks: TaskService::new(gateway, storage),
            tokens,
            transport,
            auth_events: parking_lot::Mutex::new(Some(auth_events)),
        })
    }
}

impl Default for WorkTaskClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MockTransport;
    use serde_json::json;

    #[test]
    fn builder_defaults_produce_a_client() {
        let client = WorkTaskClient::builder()
            .with_config(ClientConfig::with_base_url("http://localhost:9090"))
            .build()
            .unwrap();

        assert!(client.take_auth_events().is_some());
        // The receiver can only be taken once.
        assert!(client.take_auth_events().is_none());
    }

    #[tokio::test]
    async fn facade_wires_services_over_one_transport() {
        let transport = Arc::new(MockTransport::new());
        transport.push_response(
            200,
            json!({ "accessToken": "a1", "refreshToken": "r1" }).to_string(),
        );
        transport.push_response(
            200,
            json!([{ "projectId": "p-1", "projectName": "Website" }]).to_string(),
        );

        let client = WorkTaskClient::builder()
            .with_transport(transport.clone())
            .build()
            .unwrap();

        client.auth().login("ada", "hunter2").await.unwrap();
        let projects = client.projects().user_projects().await.unwrap();
        assert_eq!(projects[0].name, "Website");

        // The project list went out under the freshly saved token.
        assert_eq!(transport.requests()[1].bearer.as_deref(), Some("a1"));
    }
}
