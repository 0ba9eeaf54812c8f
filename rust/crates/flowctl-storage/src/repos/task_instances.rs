//! TaskInstance repository.

use crate::models::{TaskInstance, UpdateTaskStatus};
use crate::DbPool;
use tracing::instrument;

#[derive(Clone)]
pub struct TaskInstancesRepo {
    pool: DbPool,
}

impl TaskInstancesRepo {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    #[instrument(skip(self))]
    pub async fn list_by_run(&self, run_id: &str) -> Result<Vec<TaskInstance>, sqlx::Error> {
        sqlx::query_as::<_, TaskInstance>(
            "SELECT * FROM task_instances WHERE run_id = ? ORDER BY rowid ASC",
        )
        .bind(run_id)
        .fetch_all(&self.pool)
        .await
    }

    #[instrument(skip(self))]
    pub async fn get(&self, id: &str) -> Result<Option<TaskInstance>, sqlx::Error> {
        sqlx::query_as::<_, TaskInstance>("SELECT * FROM task_instances WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
    }

    /// Only the fields set on `update` are modified; unsupplied fields are
    /// left untouched.
    #[instrument(skip(self, update), fields(task_instance_id = %id))]
    pub async fn update_status(&self, id: &str, update: UpdateTaskStatus) -> Result<(), sqlx::Error> {
        let mut set_clauses = vec!["status = ?".to_string()];
        if update.worker_id.is_some() {
            set_clauses.push("worker_id = ?".to_string());
        }
        if update.output.is_some() {
            set_clauses.push("output = ?".to_string());
        }
        if update.started_at.is_some() {
            set_clauses.push("started_at = ?".to_string());
        }
        if update.finished_at.is_some() {
            set_clauses.push("finished_at = ?".to_string());
        }
        if update.retries_left.is_some() {
            set_clauses.push("retries_left = ?".to_string());
        }

        let query = format!(
            "UPDATE task_instances SET {} WHERE id = ?",
            set_clauses.join(", ")
        );

        let mut q = sqlx::query(&query).bind(update.status);
        if let Some(worker_id) = update.worker_id {
            q = q.bind(worker_id);
        }
        if let Some(output) = update.output {
            q = q.bind(output);
        }
        if let Some(started_at) = update.started_at {
            q = q.bind(started_at);
        }
        if let Some(finished_at) = update.finished_at {
            q = q.bind(finished_at);
        }
        if let Some(retries_left) = update.retries_left {
            q = q.bind(retries_left);
        }
        q = q.bind(id);

        q.execute(&self.pool).await?;
        Ok(())
    }
}
