//! Wire-to-application transformers
//!
//! Pure mapping functions with no side effects. The list transforms sort
//! by position with a stable sort, so tasks sharing a position keep the
//! order the server returned them in.

use crate::entities::{Project, Task};
use crate::types::{ApiProject, ApiTask};

/// Position assigned to tasks the server returned without one.
pub const DEFAULT_POSITION: i64 = 1000;

/// Map a wire task to the application shape.
///
/// The server carries no due date; the creation date stands in for it,
/// matching what the board displays.
pub fn task_to_app(task: &ApiTask) -> Task {
    Task {
        id: task.id.clone(),
        name: task.title.clone(),
        status: task.status,
        assignee_id: task.assignee.clone(),
        project_id: task.project_id.clone(),
        position: task.position.unwrap_or(DEFAULT_POSITION),
        due_date: task.creation_date.clone(),
        description: task.description.clone(),
        code: task.code.clone(),
    }
}

/// Map a wire task list to application tasks, sorted by position.
pub fn tasks_to_app(tasks: &[ApiTask]) -> Vec<Task> {
    let mut transformed: Vec<Task> = tasks.iter().map(task_to_app).collect();
    transformed.sort_by_key(|task| task.position);
    transformed
}

/// Map a wire project to the application shape.
pub fn project_to_app(project: &ApiProject) -> Project {
    Project {
        id: project.project_id.clone(),
        name: project.project_name.clone(),
        created_at: project.created_at.clone(),
        updated_at: project.updated_at.clone(),
        image_url: project.image_url.clone().or_else(|| project.image.clone()),
    }
}

/// Map a wire project list to application projects.
pub fn projects_to_app(projects: &[ApiProject]) -> Vec<Project> {
    projects.iter().map(project_to_app).collect()
}
