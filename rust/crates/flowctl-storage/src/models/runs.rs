//! Run entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A Run's lifecycle status. Created `RUNNING`; transitions only to
/// `SUCCESS` or `FAILED` (terminal). Never reopened.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(rename_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum RunStatus {
    Pending,
    Running,
    Success,
    Failed,
}

impl RunStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, RunStatus::Success | RunStatus::Failed)
    }
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Run {
    pub id: String,
    pub workflow_id: String,
    pub status: RunStatus,
    pub started_at: Option<DateTime<Utc>>,
    pub finished_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateRun {
    pub id: String,
    pub workflow_id: String,
}

/// Update a Run's status. `finished_at` must be supplied iff `status` is
/// terminal.
#[derive(Debug, Clone)]
pub struct UpdateRunStatus {
    pub status: RunStatus,
    pub finished_at: Option<DateTime<Utc>>,
}

impl UpdateRunStatus {
    pub fn new(status: RunStatus, finished_at: Option<DateTime<Utc>>) -> Self {
        Self {
            status,
            finished_at,
        }
    }
}
