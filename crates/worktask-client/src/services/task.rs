//! Task cache and reconciliation
//!
//! Holds the authoritative local snapshot of a project's tasks, applies
//! optimistic drag-and-drop edits, and pushes confirmed status changes
//! back to the server. Cache writes are whole-list, last-writer-wins;
//! drag gestures are assumed UI-serialized.

use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info};

use worktask_protocol::{ApiTask, Task, TaskStatus, UpdateTaskStatusRequest, transform};
use worktask_storage::{KeyValueStorage, StorageScope};

use crate::error::{ClientResult, WorkTaskError};
use crate::gateway::RequestGateway;
use crate::transport::Method;

/// Storage key recording the currently active project.
pub const ACTIVE_PROJECT_KEY: &str = "current-project-id";

/// Spacing between recomputed board positions.
const POSITION_STEP: i64 = 1000;
/// Ceiling applied to every recomputed position.
const POSITION_CEILING: i64 = 1_000_000;

fn task_list_key(project_id: &str) -> String {
    format!("project-{project_id}-tasks")
}

/// In-memory filters applied to cached task reads.
#[derive(Debug, Clone, Default)]
pub struct TaskFilter {
    /// Status equality.
    pub status: Option<TaskStatus>,
    /// Assignee equality.
    pub assignee_id: Option<String>,
    /// Case-insensitive substring match on name or description.
    pub search: Option<String>,
    /// Exact due-date match.
    pub due_date: Option<String>,
}

impl TaskFilter {
    fn matches(&self, task: &Task) -> bool {
        if let Some(status) = self.status
            && task.status != status
        {
            return false;
        }
        if let Some(assignee) = &self.assignee_id
            && task.assignee_id.as_deref() != Some(assignee.as_str())
        {
            return false;
        }
        if let Some(search) = &self.search {
            let needle = search.to_lowercase();
            let in_name = task.name.to_lowercase().contains(&needle);
            let in_description = task
                .description
                .as_deref()
                .is_some_and(|description| description.to_lowercase().contains(&needle));
            if !in_name && !in_description {
                return false;
            }
        }
        if let Some(due_date) = &self.due_date
            && task.due_date.as_deref() != Some(due_date.as_str())
        {
            return false;
        }
        true
    }
}

/// Destination of a completed drag operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DropTarget {
    pub status: TaskStatus,
    pub index: usize,
}

/// A task whose status changed during a reorder; the payload to
/// synchronize remotely. Position-only moves never produce one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskStatusChange {
    pub id: String,
    pub status: TaskStatus,
    pub position: i64,
    /// Stable key for the update call, when the task carried one.
    pub code: Option<String>,
}

/// Task cache and reconciler over the persisted project task lists.
pub struct TaskService {
    gateway: Arc<RequestGateway>,
    storage: Arc<dyn KeyValueStorage>,
}

impl TaskService {
    pub(crate) fn new(gateway: Arc<RequestGateway>, storage: Arc<dyn KeyValueStorage>) -> Self {
        Self { gateway, storage }
    }

    /// Activate a project: fetch its authoritative task list, assign
    /// synthetic positions where the server sent none, persist the list,
    /// and record the project as active.
    pub async fn activate_project(&self, project_id: &str) -> ClientResult<Vec<Task>> {
        let endpoint = format!("/projects/set-project/{project_id}");
        let mut tasks: Vec<ApiTask> = self.gateway.request(Method::Post, &endpoint, None).await?;

        for (index, task) in tasks.iter_mut().enumerate() {
            if task.position.is_none() {
                task.position = Some((index as i64 + 1) * POSITION_STEP);
            }
        }

        self.persist_tasks(project_id, &tasks).await?;
        self.storage
            .set(
                StorageScope::LongLived,
                ACTIVE_PROJECT_KEY,
                serde_json::to_string(project_id)?,
                None,
            )
            .await?;

        info!(project_id, count = tasks.len(), "project activated");
        Ok(transform::tasks_to_app(&tasks))
    }

    /// Cached tasks for `project_id`, filtered in memory. Returns an
    /// empty list when nothing is cached for the project.
    pub async fn tasks(&self, project_id: &str, filter: &TaskFilter) -> ClientResult<Vec<Task>> {
        let Some(stored) = self.load_tasks(project_id).await? else {
            return Ok(Vec::new());
        };
        Ok(transform::tasks_to_app(&stored)
            .into_iter()
            .filter(|task| filter.matches(task))
            .collect())
    }

    /// Currently active project id, if a project has been activated.
    pub async fn active_project(&self) -> ClientResult<Option<String>> {
        match self
            .storage
            .get(StorageScope::LongLived, ACTIVE_PROJECT_KEY)
            .await?
        {
            Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
            None => Ok(None),
        }
    }

    /// Apply a drag-and-drop move to the cached list of the active
    /// project.
    ///
    /// The full recomputed list is persisted before this returns. The
    /// result holds the tasks whose status genuinely changed, which is
    /// the payload for [`Self::sync_status_changes`]; moves within one
    /// column produce an empty payload. A drop with no destination is a
    /// no-op.
    pub async fn apply_reorder(
        &self,
        task_id: &str,
        source_status: TaskStatus,
        destination: Option<DropTarget>,
    ) -> ClientResult<Vec<TaskStatusChange>> {
        let Some(destination) = destination else {
            debug!(task_id, "drop without destination ignored");
            return Ok(Vec::new());
        };

        let project_id = self
            .active_project()
            .await?
            .ok_or_else(|| WorkTaskError::ProjectNotFound("no active project".to_string()))?;
        let stored = self
            .load_tasks(&project_id)
            .await?
            .ok_or_else(|| WorkTaskError::ProjectNotFound(project_id.clone()))?;

        // Bucket per status in cached order; the stable sort keeps tasks
        // sharing a position in their stored order.
        let mut columns: HashMap<TaskStatus, Vec<ApiTask>> = HashMap::new();
        for task in &stored {
            columns.entry(task.status).or_default().push(task.clone());
        }
        for column in columns.values_mut() {
            column.sort_by_key(|task| task.position.unwrap_or(transform::DEFAULT_POSITION));
        }

        let source_column = columns.entry(source_status).or_default();
        let source_index = source_column
            .iter()
            .position(|task| task.id == task_id)
            .ok_or_else(|| WorkTaskError::TaskNotFound(task_id.to_string()))?;
        let mut moved = source_column.remove(source_index);
        if source_status != destination.status {
            moved.status = destination.status;
        }

        let destination_column = columns.entry(destination.status).or_default();
        let insert_at = destination.index.min(destination_column.len());
        destination_column.insert(insert_at, moved);

        // Recompute positions for every bucket, scoped per status.
        let mut placements: HashMap<String, (TaskStatus, i64)> = HashMap::new();
        for (status, column) in &columns {
            for (index, task) in column.iter().enumerate() {
                let position = ((index as i64 + 1) * POSITION_STEP).min(POSITION_CEILING);
                placements.insert(task.id.clone(), (*status, position));
            }
        }

        // Persist in the stored order, collecting genuine status changes.
        let mut updated = stored;
        let mut changes = Vec::new();
        for task in &mut updated {
            let Some((status, position)) = placements.get(&task.id) else {
                continue;
            };
            if task.status != *status {
                changes.push(TaskStatusChange {
                    id: task.id.clone(),
                    status: *status,
                    position: *position,
                    code: task.code.clone(),
                });
            }
            task.status = *status;
            task.position = Some(*position);
        }
        self.persist_tasks(&project_id, &updated).await?;

        debug!(task_id, changed = changes.len(), "reorder applied");
        Ok(changes)
    }

    /// Push one confirmed status change to the server.
    ///
    /// The task's stable code comes from the change itself or, failing
    /// that, from the persisted list by id; without one the update is not
    /// sent. On success the confirmed status is reconciled back into the
    /// cache.
    pub async fn sync_status_change(&self, change: &TaskStatusChange) -> ClientResult<()> {
        let code = match &change.code {
            Some(code) => code.clone(),
            None => self.lookup_code(&change.id).await?,
        };

        let body = serde_json::to_value(UpdateTaskStatusRequest {
            code,
            status: change.status,
        })?;
        self.gateway
            .request_raw(Method::Put, "/task/update-status", Some(body))
            .await?;

        self.confirm_status(&change.id, change.status).await?;
        info!(task_id = %change.id, status = %change.status, "task status synchronized");
        Ok(())
    }

    /// Push several confirmed status changes, in order.
    pub async fn sync_status_changes(&self, changes: &[TaskStatusChange]) -> ClientResult<()> {
        for change in changes {
            self.sync_status_change(change).await?;
        }
        Ok(())
    }

    /// Resolve a task's stable code from the persisted active-project
    /// list.
    async fn lookup_code(&self, task_id: &str) -> ClientResult<String> {
        let unresolvable = || WorkTaskError::TaskCodeUnresolvable(task_id.to_string());

        let Some(project_id) = self.active_project().await? else {
            return Err(unresolvable());
        };
        let Some(stored) = self.load_tasks(&project_id).await? else {
            return Err(unresolvable());
        };
        stored
            .iter()
            .find(|task| task.id == task_id)
            .and_then(|task| task.code.clone())
            .ok_or_else(unresolvable)
    }

    /// Reconcile a server-confirmed status into the cached list.
    async fn confirm_status(&self, task_id: &str, status: TaskStatus) -> ClientResult<()> {
        let Some(project_id) = self.active_project().await? else {
            return Ok(());
        };
        let Some(mut stored) = self.load_tasks(&project_id).await? else {
            return Ok(());
        };
        for task in &mut stored {
            if task.id == task_id {
                task.status = status;
            }
        }
        self.persist_tasks(&project_id, &stored).await
    }

    async fn load_tasks(&self, project_id: &str) -> ClientResult<Option<Vec<ApiTask>>> {
        match self
            .storage
            .get(StorageScope::LongLived, &task_list_key(project_id))
            .await?
        {
            Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
            None => Ok(None),
        }
    }

    async fn persist_tasks(&self, project_id: &str, tasks: &[ApiTask]) -> ClientResult<()> {
        self.storage
            .set(
                StorageScope::LongLived,
                &task_list_key(project_id),
                serde_json::to_string(tasks)?,
                None,
            )
            .await
            .map_err(Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{TestContext, context};
    use serde_json::json;

    fn wire_task(id: &str, status: &str, position: i64, code: Option<&str>) -> serde_json::Value {
        let mut task = json!({
            "id": id,
            "title": format!("Task {id}"),
            "status": status,
            "projectId": "p-1",
            "position": position,
            "assignee": "u-1",
        });
        if let Some(code) = code {
            task["code"] = json!(code);
        }
        task
    }

    async fn activated_service(ctx: &TestContext, tasks: serde_json::Value) -> TaskService {
        ctx.tokens.save_tokens("a1", Some("r1")).await.unwrap();
        ctx.transport.push_response(200, tasks.to_string());
        let service = TaskService::new(ctx.gateway.clone(), ctx.storage.clone());
        service.activate_project("p-1").await.unwrap();
        service
    }

    #[tokio::test]
    async fn activation_assigns_synthetic_positions_and_records_project() {
        let ctx = context();
        ctx.tokens.save_tokens("a1", Some("r1")).await.unwrap();
        ctx.transport.push_response(
            200,
            json!([
                { "id": "t-1", "title": "First", "status": "TODO", "projectId": "p-1" },
                { "id": "t-2", "title": "Second", "status": "TODO", "projectId": "p-1" },
                { "id": "t-3", "title": "Third", "status": "DONE", "projectId": "p-1", "position": 500 },
            ])
            .to_string(),
        );

        let service = TaskService::new(ctx.gateway.clone(), ctx.storage.clone());
        let tasks = service.activate_project("p-1").await.unwrap();

        assert_eq!(service.active_project().await.unwrap().as_deref(), Some("p-1"));
        // Missing positions become (index + 1) * 1000; existing ones stay.
        let by_id: HashMap<&str, i64> =
            tasks.iter().map(|task| (task.id.as_str(), task.position)).collect();
        assert_eq!(by_id["t-1"], 1000);
        assert_eq!(by_id["t-2"], 2000);
        assert_eq!(by_id["t-3"], 500);
    }

    #[tokio::test]
    async fn tasks_returns_empty_for_uncached_project() {
        let ctx = context();
        let service = TaskService::new(ctx.gateway.clone(), ctx.storage.clone());
        let tasks = service.tasks("p-unknown", &TaskFilter::default()).await.unwrap();
        assert!(tasks.is_empty());
    }

    #[tokio::test]
    async fn filters_compose_over_status_and_search() {
        let ctx = context();
        let mut named = wire_task("t-3", "IN_PROGRESS", 2000, None);
        named["title"] = json!("Fix login flow");
        let service = activated_service(
            &ctx,
            json!([
                wire_task("t-1", "TODO", 1000, None),
                wire_task("t-2", "IN_PROGRESS", 1000, None),
                named,
                wire_task("t-4", "REVIEW", 1000, None),
                wire_task("t-5", "DONE", 1000, None),
            ]),
        )
        .await;

        let filter = TaskFilter {
            status: Some(TaskStatus::InProgress),
            search: Some("login".to_string()),
            ..TaskFilter::default()
        };
        let tasks = service.tasks("p-1", &filter).await.unwrap();

        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].id, "t-3");
    }

    #[tokio::test]
    async fn filter_matches_assignee_and_due_date() {
        let ctx = context();
        let mut with_due = wire_task("t-2", "TODO", 2000, None);
        with_due["creationDate"] = json!("2024-06-01T00:00:00Z");
        let service = activated_service(
            &ctx,
            json!([wire_task("t-1", "TODO", 1000, None), with_due]),
        )
        .await;

        let filter = TaskFilter {
            assignee_id: Some("u-1".to_string()),
            due_date: Some("2024-06-01T00:00:00Z".to_string()),
            ..TaskFilter::default()
        };
        let tasks = service.tasks("p-1", &filter).await.unwrap();
        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].id, "t-2");
    }

    #[tokio::test]
    async fn same_column_move_produces_no_sync_payload() {
        let ctx = context();
        let service = activated_service(
            &ctx,
            json!([
                wire_task("t-1", "TODO", 1000, Some("WT-1")),
                wire_task("t-2", "TODO", 2000, Some("WT-2")),
                wire_task("t-3", "TODO", 3000, Some("WT-3")),
            ]),
        )
        .await;

        let changes = service
            .apply_reorder(
                "t-3",
                TaskStatus::Todo,
                Some(DropTarget { status: TaskStatus::Todo, index: 0 }),
            )
            .await
            .unwrap();
        assert!(changes.is_empty());

        // Positions were still recomputed and persisted.
        let tasks = service.tasks("p-1", &TaskFilter::default()).await.unwrap();
        let ordered: Vec<(&str, i64)> =
            tasks.iter().map(|task| (task.id.as_str(), task.position)).collect();
        assert_eq!(ordered, [("t-3", 1000), ("t-1", 2000), ("t-2", 3000)]);
    }

    #[tokio::test]
    async fn cross_column_move_yields_one_status_change() {
        let ctx = context();
        let service = activated_service(
            &ctx,
            json!([
                wire_task("t-1", "TODO", 1000, Some("WT-1")),
                wire_task("t-2", "TODO", 2000, Some("WT-2")),
                wire_task("t-3", "DONE", 1000, Some("WT-3")),
            ]),
        )
        .await;

        let changes = service
            .apply_reorder(
                "t-1",
                TaskStatus::Todo,
                Some(DropTarget { status: TaskStatus::Done, index: 0 }),
            )
            .await
            .unwrap();

        assert_eq!(
            changes,
            [TaskStatusChange {
                id: "t-1".to_string(),
                status: TaskStatus::Done,
                position: 1000,
                code: Some("WT-1".to_string()),
            }]
        );

        // Both affected columns hold strictly increasing multiples of 1000
        // starting at 1000.
        let todo = service
            .tasks("p-1", &TaskFilter { status: Some(TaskStatus::Todo), ..TaskFilter::default() })
            .await
            .unwrap();
        let done = service
            .tasks("p-1", &TaskFilter { status: Some(TaskStatus::Done), ..TaskFilter::default() })
            .await
            .unwrap();
        assert_eq!(
            todo.iter().map(|t| t.position).collect::<Vec<_>>(),
            [1000]
        );
        assert_eq!(
            done.iter().map(|t| (t.id.as_str(), t.position)).collect::<Vec<_>>(),
            [("t-1", 1000), ("t-3", 2000)]
        );
    }

    #[tokio::test]
    async fn drop_without_destination_is_a_no_op() {
        let ctx = context();
        let service =
            activated_service(&ctx, json!([wire_task("t-1", "TODO", 1000, Some("WT-1"))])).await;
        let calls_before = ctx.transport.request_count();

        let changes = service
            .apply_reorder("t-1", TaskStatus::Todo, None)
            .await
            .unwrap();

        assert!(changes.is_empty());
        assert_eq!(ctx.transport.request_count(), calls_before);
    }

    #[tokio::test]
    async fn reorder_of_unknown_task_is_task_not_found() {
        let ctx = context();
        let service =
            activated_service(&ctx, json!([wire_task("t-1", "TODO", 1000, None)])).await;

        let error = service
            .apply_reorder(
                "missing",
                TaskStatus::Todo,
                Some(DropTarget { status: TaskStatus::Done, index: 0 }),
            )
            .await
            .unwrap_err();
        assert_eq!(error, WorkTaskError::TaskNotFound("missing".to_string()));
    }

    #[tokio::test]
    async fn positions_clamp_at_the_ceiling() {
        let ctx = context();
        let tasks: Vec<serde_json::Value> = (0..1100)
            .map(|i| wire_task(&format!("t-{i}"), "TODO", (i as i64 + 1) * 1000, None))
            .collect();
        let service = activated_service(&ctx, serde_json::Value::Array(tasks)).await;

        service
            .apply_reorder(
                "t-0",
                TaskStatus::Todo,
                Some(DropTarget { status: TaskStatus::Todo, index: 1099 }),
            )
            .await
            .unwrap();

        let cached = service.tasks("p-1", &TaskFilter::default()).await.unwrap();
        let max_position = cached.iter().map(|task| task.position).max().unwrap();
        assert_eq!(max_position, 1_000_000);
    }

    #[tokio::test]
    async fn sync_uses_inline_code_and_reconciles_cache() {
        let ctx = context();
        let service = activated_service(
            &ctx,
            json!([wire_task("t-1", "TODO", 1000, Some("WT-1"))]),
        )
        .await;
        ctx.transport.push_response(200, json!({ "updated": true }).to_string());

        service
            .sync_status_change(&TaskStatusChange {
                id: "t-1".to_string(),
                status: TaskStatus::Done,
                position: 1000,
                code: Some("WT-1".to_string()),
            })
            .await
            .unwrap();

        let update = ctx.transport.requests().last().unwrap().clone();
        assert_eq!(update.path, "/work-task/v1/task/update-status");
        assert_eq!(update.method, Method::Put);
        assert_eq!(update.body.unwrap(), json!({ "code": "WT-1", "status": "DONE" }));

        let cached = service.tasks("p-1", &TaskFilter::default()).await.unwrap();
        assert_eq!(cached[0].status, TaskStatus::Done);
    }

    #[tokio::test]
    async fn sync_falls_back_to_persisted_code() {
        let ctx = context();
        let service = activated_service(
            &ctx,
            json!([wire_task("t-1", "TODO", 1000, Some("WT-1"))]),
        )
        .await;
        ctx.transport.push_response(200, "{}".to_string());

        service
            .sync_status_change(&TaskStatusChange {
                id: "t-1".to_string(),
                status: TaskStatus::Review,
                position: 1000,
                code: None,
            })
            .await
            .unwrap();

        let update = ctx.transport.requests().last().unwrap().clone();
        assert_eq!(update.body.unwrap()["code"], json!("WT-1"));
    }

    #[tokio::test]
    async fn unresolvable_code_aborts_sync_before_any_network_call() {
        let ctx = context();
        let service =
            activated_service(&ctx, json!([wire_task("t-1", "TODO", 1000, None)])).await;
        let calls_before = ctx.transport.request_count();

        let error = service
            .sync_status_change(&TaskStatusChange {
                id: "t-1".to_string(),
                status: TaskStatus::Done,
                position: 1000,
                code: None,
            })
            .await
            .unwrap_err();

        assert_eq!(error, WorkTaskError::TaskCodeUnresolvable("t-1".to_string()));
        assert_eq!(ctx.transport.request_count(), calls_before);
    }
}
