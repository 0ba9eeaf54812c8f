//! Worker result callback: the only endpoint not behind API-key auth.

use axum::{extract::State, response::IntoResponse, Json};
use chrono::Utc;
use flowctl_storage::models::{RunStatus, TaskStatus, UpdateRunStatus, UpdateTaskStatus};
use serde::Deserialize;
use tracing::{info, instrument, warn};

use crate::handlers::ApiError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct TaskResultCallback {
    pub task_instance_id: String,
    pub status: TaskStatus,
    #[serde(default)]
    pub output: Option<String>,
    #[serde(default)]
    pub worker_id: Option<String>,
}

/// Apply a worker's reported outcome to a TaskInstance, then re-evaluate
/// whether the owning Run has become terminal.
#[instrument(skip(state, body), fields(task_instance_id = %body.task_instance_id))]
pub async fn task_result_callback(
    State(state): State<AppState>,
    Json(body): Json<TaskResultCallback>,
) -> Result<impl IntoResponse, ApiError> {
    let repos = state.repos();

    let instance = repos
        .task_instances()
        .get(&body.task_instance_id)
        .await?
        .ok_or_else(|| ApiError::not_found("TaskInstance", &body.task_instance_id))?;

    let now = Utc::now();

    match body.status {
        TaskStatus::Success => {
            let update = UpdateTaskStatus::new(TaskStatus::Success)
                .output(body.output.clone())
                .finished_at(Some(now))
                .worker_id(body.worker_id.clone());
            repos
                .task_instances()
                .update_status(&instance.id, update)
                .await?;
        }
        TaskStatus::Failed => {
            let next_status = if instance.retries_left > 0 {
                TaskStatus::Retrying
            } else {
                TaskStatus::Failed
            };
            let update = UpdateTaskStatus::new(next_status)
                .output(body.output.clone())
                .finished_at(Some(now))
                .worker_id(body.worker_id.clone());
            repos
                .task_instances()
                .update_status(&instance.id, update)
                .await?;
        }
        other => {
            return Err(ApiError::validation(vec![format!(
                "callback status must be SUCCESS or FAILED, got {other:?}"
            )]));
        }
    }

    let siblings = repos
        .task_instances()
        .list_by_run(&instance.run_id)
        .await?;

    if siblings.iter().all(|t| t.status == TaskStatus::Success) {
        repos
            .runs()
            .update_status(&instance.run_id, UpdateRunStatus::new(RunStatus::Success, Some(now)))
            .await?;
        info!(run_id = %instance.run_id, "run succeeded");
    } else if siblings.iter().any(|t| t.status == TaskStatus::Failed)
        && siblings.iter().all(|t| {
            !matches!(
                t.status,
                TaskStatus::Pending | TaskStatus::Running | TaskStatus::Retrying
            )
        })
    {
        repos
            .runs()
            .update_status(&instance.run_id, UpdateRunStatus::new(RunStatus::Failed, Some(now)))
            .await?;
        warn!(run_id = %instance.run_id, "run failed");
    }

    Ok(Json(serde_json::json!({ "ok": true })))
}
