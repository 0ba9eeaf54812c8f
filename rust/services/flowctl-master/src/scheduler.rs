//! The periodic tick that advances every active run: retry resets, then
//! dependency-driven dispatch to workers.

use chrono::Utc;
use flowctl_dag::WorkflowDag;
use flowctl_storage::models::{TaskInstance, TaskStatus, UpdateTaskStatus};
use reqwest::Client;
use serde::Serialize;
use std::collections::HashMap;
use std::time::Duration;
use tracing::{error, info, instrument, warn};

use crate::state::AppState;

const DISPATCH_TIMEOUT: Duration = Duration::from_secs(5);

/// Run forever, ticking on the configured interval. Each tick's errors are
/// logged and swallowed so the loop never exits.
pub async fn run(state: AppState) {
    let interval = state.config.scheduler_interval();
    info!(?interval, "scheduler starting");
    loop {
        if let Err(e) = tick(&state).await {
            error!(error = %e, "scheduler tick failed");
        }
        tokio::time::sleep(interval).await;
    }
}

/// Run a single tick: advance every active run by one retry-reset-then-
/// dispatch pass. Exposed so tests can drive the scheduler deterministically
/// instead of waiting on the real interval loop.
#[instrument(skip(state))]
pub async fn tick(state: &AppState) -> anyhow::Result<()> {
    let active_runs = state.repos().runs().get_active().await?;
    for run in active_runs {
        if let Err(e) = process_run(state, &run.id).await {
            error!(run_id = %run.id, error = %e, "failed to process run");
        }
    }
    Ok(())
}

#[instrument(skip(state), fields(run_id))]
async fn process_run(state: &AppState, run_id: &str) -> anyhow::Result<()> {
    let Some(run) = state.repos().runs().get(run_id).await? else {
        return Ok(());
    };

    let workflow = state
        .repos()
        .workflows()
        .get(&run.workflow_id)
        .await?
        .ok_or_else(|| {
            anyhow::anyhow!(
                "workflow '{}' missing for run '{}'",
                run.workflow_id,
                run_id
            )
        })?;
    let dag = WorkflowDag::from_definition(&workflow.definition)?;

    let instances = state.repos().task_instances().list_by_run(run_id).await?;
    let mut status_by_task_id: HashMap<String, TaskStatus> = instances
        .iter()
        .map(|t| (t.task_id.clone(), t.status))
        .collect();

    // Retry reset pass: RETRYING -> PENDING, retries_left -= 1.
    for instance in &instances {
        if instance.status != TaskStatus::Retrying {
            continue;
        }
        let update = UpdateTaskStatus::new(TaskStatus::Pending)
            .retries_left(instance.retries_left - 1)
            .started_at(None)
            .finished_at(None);
        state
            .repos()
            .task_instances()
            .update_status(&instance.id, update)
            .await?;
        status_by_task_id.insert(instance.task_id.clone(), TaskStatus::Pending);
    }

    // Dispatch pass: a PENDING task whose dependencies are all SUCCESS is
    // dispatched. A task that just reset from RETRYING above is eligible in
    // this same tick.
    for instance in &instances {
        let working_status = status_by_task_id
            .get(&instance.task_id)
            .copied()
            .unwrap_or(instance.status);
        if working_status != TaskStatus::Pending {
            continue;
        }

        let deps = dag.dependencies_of(&instance.task_id);
        let ready = deps
            .iter()
            .all(|dep| status_by_task_id.get(dep) == Some(&TaskStatus::Success));
        if !ready {
            continue;
        }

        if dispatch(state, instance).await {
            status_by_task_id.insert(instance.task_id.clone(), TaskStatus::Running);
        }
    }

    Ok(())
}

#[derive(Debug, Serialize)]
struct ExecuteRequest {
    task_instance_id: String,
    task_id: String,
    command: String,
    callback_url: String,
}

/// Select a worker round-robin, mark the instance RUNNING, POST to the
/// worker, and revert to PENDING on any non-200 or transport/timeout error.
/// Returns `true` if the instance is now RUNNING.
#[instrument(skip(state, instance), fields(task_instance_id = %instance.id))]
async fn dispatch(state: &AppState, instance: &TaskInstance) -> bool {
    let Some(worker_url) = state.next_worker() else {
        warn!("no workers configured, leaving task PENDING");
        return false;
    };

    let now = Utc::now();
    let mark_running = UpdateTaskStatus::new(TaskStatus::Running)
        .started_at(Some(now))
        .worker_id(Some(worker_url.clone()));
    if let Err(e) = state
        .repos()
        .task_instances()
        .update_status(&instance.id, mark_running)
        .await
    {
        error!(error = %e, "failed to mark task RUNNING before dispatch");
        return false;
    }

    let payload = ExecuteRequest {
        task_instance_id: instance.id.clone(),
        task_id: instance.task_id.clone(),
        command: instance.command.clone(),
        callback_url: state.config.callback_url(),
    };

    let client = Client::new();
    let result = client
        .post(format!("{worker_url}/execute"))
        .json(&payload)
        .timeout(DISPATCH_TIMEOUT)
        .send()
        .await;

    let accepted = matches!(&result, Ok(response) if response.status() == reqwest::StatusCode::OK);
    if accepted {
        return true;
    }

    match &result {
        Ok(response) => warn!(status = %response.status(), worker = %worker_url, "worker rejected dispatch"),
        Err(e) => warn!(error = %e, worker = %worker_url, "dispatch request failed"),
    }

    let revert = UpdateTaskStatus::new(TaskStatus::Pending)
        .started_at(None)
        .worker_id(None);
    if let Err(e) = state
        .repos()
        .task_instances()
        .update_status(&instance.id, revert)
        .await
    {
        error!(error = %e, "failed to revert task to PENDING after dispatch failure");
    }

    false
}
