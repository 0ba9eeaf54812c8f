//! Workflow registration and run-triggering handlers.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use flowctl_dag::{validate_definition, TaskDef, WorkflowDef};
use flowctl_storage::models::{CreateRun, CreateWorkflow};
use tracing::{info, instrument};
use ulid::Ulid;

use crate::handlers::ApiError;
use crate::state::AppState;

/// Register a new workflow. Checks for an id conflict before validating the
/// DAG, so re-registering an existing id always 409s regardless of whether
/// the new definition would itself be valid.
#[instrument(skip(state, body), fields(workflow_id))]
pub async fn create_workflow(
    State(state): State<AppState>,
    Json(body): Json<serde_json::Value>,
) -> Result<impl IntoResponse, ApiError> {
    let id = body
        .get("id")
        .and_then(|v| v.as_str())
        .ok_or_else(|| ApiError::validation(vec!["workflow must have 'id'".to_string()]))?;
    tracing::Span::current().record("workflow_id", id);

    if state.repos().workflows().get(id).await?.is_some() {
        return Err(ApiError::conflict(format!(
            "workflow '{id}' already exists"
        )));
    }

    let errors = validate_definition(&body);
    if !errors.is_empty() {
        return Err(ApiError::from(errors));
    }

    let workflow = state
        .repos()
        .workflows()
        .create(CreateWorkflow {
            id: id.to_string(),
            definition: body,
        })
        .await?;

    info!(workflow_id = %workflow.id, "workflow registered");

    Ok((StatusCode::OK, Json(workflow)))
}

#[instrument(skip(state))]
pub async fn list_workflows(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let workflows = state.repos().workflows().list().await?;
    Ok(Json(workflows))
}

#[instrument(skip(state))]
pub async fn get_workflow(
    State(state): State<AppState>,
    Path(workflow_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let workflow = state
        .repos()
        .workflows()
        .get(&workflow_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Workflow", &workflow_id))?;
    Ok(Json(workflow))
}

/// Trigger a run: create the Run and one TaskInstance per task, atomically.
#[instrument(skip(state), fields(workflow_id, run_id))]
pub async fn create_workflow_run(
    State(state): State<AppState>,
    Path(workflow_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let workflow = state
        .repos()
        .workflows()
        .get(&workflow_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Workflow", &workflow_id))?;

    let def: WorkflowDef = serde_json::from_value(workflow.definition)
        .map_err(|e| ApiError::internal(format!("stored definition is malformed: {e}")))?;
    let tasks: Vec<TaskDef> = def.tasks;

    let run_id = Ulid::new().to_string();
    tracing::Span::current().record("run_id", &run_id);

    let run = state
        .repos()
        .runs()
        .create(
            CreateRun {
                id: run_id,
                workflow_id: workflow_id.clone(),
            },
            &tasks,
        )
        .await?;

    info!(run_id = %run.id, workflow_id = %workflow_id, "run triggered");

    Ok((StatusCode::OK, Json(run)))
}
