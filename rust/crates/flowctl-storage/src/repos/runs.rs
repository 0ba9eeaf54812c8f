//! Run repository.
//!
//! `create` additionally inserts one TaskInstance per task, matching
//! `create_run`'s atomic Run+TaskInstances contract in one transaction.

use crate::models::{CreateRun, CreateTaskInstance, Run, RunStatus, TaskStatus, UpdateRunStatus};
use crate::DbPool;
use chrono::Utc;
use flowctl_dag::TaskDef;
use tracing::instrument;

#[derive(Clone)]
pub struct RunsRepo {
    pool: DbPool,
}

impl RunsRepo {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Atomically create a Run (status=RUNNING, started_at=now) and one
    /// TaskInstance per task (status=PENDING, retries_left=max_retries).
    #[instrument(skip(self, tasks), fields(run_id = %new_run.id, workflow_id = %new_run.workflow_id))]
    pub async fn create(&self, new_run: CreateRun, tasks: &[TaskDef]) -> Result<Run, sqlx::Error> {
        let CreateRun { id, workflow_id } = new_run;
        let now = Utc::now();
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            "INSERT INTO workflow_runs (id, workflow_id, status, started_at, finished_at) \
             VALUES (?, ?, ?, ?, NULL)",
        )
        .bind(&id)
        .bind(&workflow_id)
        .bind(RunStatus::Running)
        .bind(now)
        .execute(&mut *tx)
        .await?;

        for task in tasks {
            let instance = CreateTaskInstance {
                id: ulid::Ulid::new().to_string(),
                run_id: id.clone(),
                task_id: task.id.clone(),
                command: task.command.clone(),
                max_retries: task.max_retries,
            };
            sqlx::query(
                "INSERT INTO task_instances \
                 (id, run_id, task_id, command, status, retries_left, max_retries) \
                 VALUES (?, ?, ?, ?, ?, ?, ?)",
            )
            .bind(&instance.id)
            .bind(&instance.run_id)
            .bind(&instance.task_id)
            .bind(&instance.command)
            .bind(TaskStatus::Pending)
            .bind(instance.max_retries)
            .bind(instance.max_retries)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        Ok(Run {
            id,
            workflow_id,
            status: RunStatus::Running,
            started_at: Some(now),
            finished_at: None,
        })
    }

    #[instrument(skip(self))]
    pub async fn get(&self, id: &str) -> Result<Option<Run>, sqlx::Error> {
        sqlx::query_as::<_, Run>("SELECT * FROM workflow_runs WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
    }

    /// All Runs with status=RUNNING.
    #[instrument(skip(self))]
    pub async fn get_active(&self) -> Result<Vec<Run>, sqlx::Error> {
        sqlx::query_as::<_, Run>("SELECT * FROM workflow_runs WHERE status = ?")
            .bind(RunStatus::Running)
            .fetch_all(&self.pool)
            .await
    }

    #[instrument(skip(self, update))]
    pub async fn update_status(&self, id: &str, update: UpdateRunStatus) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE workflow_runs SET status = ?, finished_at = ? WHERE id = ?")
            .bind(update.status)
            .bind(update.finished_at)
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}
