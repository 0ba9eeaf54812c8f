//! TaskInstance entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A TaskInstance's lifecycle status. Terminal states are `SUCCESS` and
/// `FAILED`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(rename_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum TaskStatus {
    Pending,
    Running,
    Success,
    Failed,
    Retrying,
}

impl TaskStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, TaskStatus::Success | TaskStatus::Failed)
    }
}

/// The per-run execution record of one task in the DAG.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct TaskInstance {
    pub id: String,
    pub run_id: String,
    pub task_id: String,
    pub command: String,
    pub status: TaskStatus,
    pub retries_left: i64,
    pub max_retries: i64,
    pub started_at: Option<DateTime<Utc>>,
    pub finished_at: Option<DateTime<Utc>>,
    pub output: Option<String>,
    pub worker_id: Option<String>,
}

/// One row to insert per task when a Run is created; `retries_left` is
/// seeded to `max_retries` by the repository, not supplied here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateTaskInstance {
    pub id: String,
    pub run_id: String,
    pub task_id: String,
    pub command: String,
    pub max_retries: i64,
}

/// Partial update of a TaskInstance; only the `Some` fields are modified.
/// `status` is always supplied; every other field is optional. The doubled
/// `Option<Option<_>>` on the nullable fields distinguishes "leave
/// unchanged" (`None`) from "set to null" (`Some(None)`).
#[derive(Debug, Clone)]
pub struct UpdateTaskStatus {
    pub status: TaskStatus,
    pub worker_id: Option<Option<String>>,
    pub output: Option<Option<String>>,
    pub started_at: Option<Option<DateTime<Utc>>>,
    pub finished_at: Option<Option<DateTime<Utc>>>,
    pub retries_left: Option<i64>,
}

impl UpdateTaskStatus {
    pub fn new(status: TaskStatus) -> Self {
        Self {
            status,
            worker_id: None,
            output: None,
            started_at: None,
            finished_at: None,
            retries_left: None,
        }
    }

    pub fn worker_id(mut self, v: Option<String>) -> Self {
        self.worker_id = Some(v);
        self
    }

    pub fn output(mut self, v: Option<String>) -> Self {
        self.output = Some(v);
        self
    }

    pub fn started_at(mut self, v: Option<DateTime<Utc>>) -> Self {
        self.started_at = Some(v);
        self
    }

    pub fn finished_at(mut self, v: Option<DateTime<Utc>>) -> Self {
        self.finished_at = Some(v);
        self
    }

    pub fn retries_left(mut self, v: i64) -> Self {
        self.retries_left = Some(v);
        self
    }
}
