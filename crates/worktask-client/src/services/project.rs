//! Project service

use serde_json::Value;
use std::sync::Arc;
use tracing::info;

use worktask_protocol::{ApiProject, CreateProjectRequest, Project, transform};

use crate::dedupe::{RequestDeduper, fingerprint};
use crate::error::ClientResult;
use crate::gateway::RequestGateway;
use crate::transport::Method;

const USER_PROJECTS_ENDPOINT: &str = "/projects/users-projects";

/// Project listing and creation.
pub struct ProjectService {
    gateway: Arc<RequestGateway>,
    deduper: RequestDeduper,
}

impl ProjectService {
    pub(crate) fn new(gateway: Arc<RequestGateway>) -> Self {
        Self {
            gateway,
            deduper: RequestDeduper::new(),
        }
    }

    /// Projects visible to the signed-in user.
    ///
    /// Concurrent callers share one in-flight fetch, so several
    /// components mounting at once issue a single network call; nothing
    /// is cached past the request window.
    pub async fn user_projects(&self) -> ClientResult<Vec<Project>> {
        let gateway = self.gateway.clone();
        let key = fingerprint(Method::Get, USER_PROJECTS_ENDPOINT);
        let raw = self
            .deduper
            .dedupe(&key, move || async move {
                gateway
                    .request::<Value>(Method::Get, USER_PROJECTS_ENDPOINT, None)
                    .await
            })
            .await?;

        let projects: Vec<ApiProject> = serde_json::from_value(raw)?;
        Ok(transform::projects_to_app(&projects))
    }

    /// Create a project owned by the signed-in user.
    pub async fn create_project(&self, request: &CreateProjectRequest) -> ClientResult<Project> {
        let body = serde_json::to_value(request)?;
        let created: ApiProject = self
            .gateway
            .request(Method::Post, "/projects/create-project", Some(body))
            .await?;
        info!(project_id = %created.project_id, "project created");
        Ok(transform::project_to_app(&created))
    }
}
