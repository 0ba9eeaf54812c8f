//! Workflow repository.

use crate::models::{CreateWorkflow, Workflow};
use crate::DbPool;
use chrono::Utc;
use tracing::instrument;

#[derive(Clone)]
pub struct WorkflowsRepo {
    pool: DbPool,
}

impl WorkflowsRepo {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Insert a new workflow. Callers are responsible for checking whether
    /// `id` already exists and returning a conflict error before calling
    /// this, since the unique-constraint violation that would otherwise
    /// result is not disambiguated here.
    #[instrument(skip(self, workflow), fields(workflow_id = %workflow.id))]
    pub async fn create(&self, workflow: CreateWorkflow) -> Result<Workflow, sqlx::Error> {
        let now = Utc::now();
        let definition_json = serde_json::to_string(&workflow.definition)
            .expect("workflow definition is always valid JSON");

        sqlx::query("INSERT INTO workflows (id, definition, created_at) VALUES (?, ?, ?)")
            .bind(&workflow.id)
            .bind(&definition_json)
            .bind(now)
            .execute(&self.pool)
            .await?;

        Ok(Workflow {
            id: workflow.id,
            definition: workflow.definition,
            created_at: now,
        })
    }

    #[instrument(skip(self))]
    pub async fn get(&self, id: &str) -> Result<Option<Workflow>, sqlx::Error> {
        sqlx::query_as::<_, Workflow>("SELECT * FROM workflows WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
    }

    #[instrument(skip(self))]
    pub async fn list(&self) -> Result<Vec<Workflow>, sqlx::Error> {
        sqlx::query_as::<_, Workflow>("SELECT * FROM workflows ORDER BY created_at ASC")
            .fetch_all(&self.pool)
            .await
    }
}
