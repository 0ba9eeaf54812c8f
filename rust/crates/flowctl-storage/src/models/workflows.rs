//! Workflow entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A registered, validated DAG. Immutable after creation; never deleted by
/// the core.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Workflow {
    pub id: String,
    #[sqlx(json)]
    pub definition: serde_json::Value,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateWorkflow {
    pub id: String,
    pub definition: serde_json::Value,
}
