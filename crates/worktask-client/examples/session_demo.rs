//! Minimal end-to-end session walkthrough against a live server.
//!
//! ```bash
//! WORKTASK_API_BASE_URL=http://localhost:8080 \
//! WORKTASK_USERNAME=ada WORKTASK_PASSWORD=secret \
//! cargo run --example session_demo
//! ```

use worktask_client::prelude::*;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let username = std::env::var("WORKTASK_USERNAME")?;
    let password = std::env::var("WORKTASK_PASSWORD")?;

    let client = WorkTaskClient::builder()
        .with_config(ClientConfig::from_env())
        .build()?;

    client.auth().login(&username, &password).await?;

    let projects = client.projects().user_projects().await?;
    println!("{} project(s) visible", projects.len());

    let Some(project) = projects.first() else {
        return Ok(());
    };
    let tasks = client.tasks().activate_project(&project.id).await?;
    println!("activated '{}' with {} task(s)", project.name, tasks.len());

    let cached = client
        .tasks()
        .tasks(&project.id, &TaskFilter::default())
        .await?;
    for task in cached {
        println!("  [{}] {} (pos {})", task.status, task.name, task.position);
    }

    Ok(())
}
