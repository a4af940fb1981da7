//! Test doubles shared across unit tests

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::Arc;
use tokio::sync::Notify;

use worktask_storage::InMemoryStorage;

use crate::config::ClientConfig;
use crate::error::{ClientResult, WorkTaskError};
use crate::gateway::{AuthEventReceiver, RequestGateway};
use crate::token::TokenManager;
use crate::transport::{ApiRequest, ApiResponse, ApiTransport};

/// One scripted transport exchange.
struct Scripted {
    /// When set, the call blocks until the gate is notified, letting
    /// tests hold a request in flight deterministically.
    gate: Option<Arc<Notify>>,
    result: ClientResult<ApiResponse>,
}

/// Transport double serving scripted responses in call order.
///
/// Panics on a call with no scripted response left: an unexpected
/// network call is a test failure, not a silent success.
pub(crate) struct MockTransport {
    script: Mutex<VecDeque<Scripted>>,
    requests: Mutex<Vec<ApiRequest>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self {
            script: Mutex::new(VecDeque::new()),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn push_response(&self, status: u16, body: impl Into<String>) {
        self.script.lock().push_back(Scripted {
            gate: None,
            result: Ok(ApiResponse {
                status,
                body: body.into(),
            }),
        });
    }

    pub fn push_gated_response(&self, gate: Arc<Notify>, status: u16, body: impl Into<String>) {
        self.script.lock().push_back(Scripted {
            gate: Some(gate),
            result: Ok(ApiResponse {
                status,
                body: body.into(),
            }),
        });
    }

    pub fn push_error(&self, error: WorkTaskError) {
        self.script.lock().push_back(Scripted {
            gate: None,
            result: Err(error),
        });
    }

    /// Requests seen so far, in arrival order.
    pub fn requests(&self) -> Vec<ApiRequest> {
        self.requests.lock().clone()
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().len()
    }
}

#[async_trait]
impl ApiTransport for MockTransport {
    async fn execute(&self, request: ApiRequest) -> ClientResult<ApiResponse> {
        self.requests.lock().push(request);
        let entry = self
            .script
            .lock()
            .pop_front()
            .expect("mock transport: unexpected request");
        if let Some(gate) = &entry.gate {
            gate.notified().await;
        }
        entry.result
    }

    fn endpoint(&self) -> &str {
        "mock://worktask"
    }
}

/// Fully wired client internals over a mock transport and in-memory
/// storage.
pub(crate) struct TestContext {
    pub transport: Arc<MockTransport>,
    pub storage: Arc<InMemoryStorage>,
    pub tokens: Arc<TokenManager>,
    pub gateway: Arc<RequestGateway>,
    pub auth_events: AuthEventReceiver,
}

pub(crate) fn context() -> TestContext {
    let config = Arc::new(ClientConfig::default());
    let transport = Arc::new(MockTransport::new());
    let storage = Arc::new(InMemoryStorage::new());
    let tokens = Arc::new(TokenManager::new(
        storage.clone(),
        transport.clone(),
        config.clone(),
    ));
    let (gateway, auth_events) = RequestGateway::new(transport.clone(), tokens.clone(), config);
    TestContext {
        transport,
        storage,
        tokens,
        gateway: Arc::new(gateway),
        auth_events,
    }
}
