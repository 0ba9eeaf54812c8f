//! Application state

use flowctl_core::Config;
use flowctl_storage::{DbPool, RunsRepo, TaskInstancesRepo, WorkflowsRepo};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub db: DbPool,
    pub config: Arc<Config>,
    /// Round-robin counter for worker dispatch. Process-local and
    /// intentionally not persisted.
    next_worker_index: Arc<AtomicUsize>,
    repos: Repos,
}

/// Repository container, constructing a fresh repo per access from a cloned
/// pool handle.
#[derive(Clone)]
pub struct Repos {
    db: DbPool,
}

impl Repos {
    pub fn new(db: DbPool) -> Self {
        Self { db }
    }

    pub fn workflows(&self) -> WorkflowsRepo {
        WorkflowsRepo::new(self.db.clone())
    }

    pub fn runs(&self) -> RunsRepo {
        RunsRepo::new(self.db.clone())
    }

    pub fn task_instances(&self) -> TaskInstancesRepo {
        TaskInstancesRepo::new(self.db.clone())
    }
}

impl AppState {
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        let db = flowctl_storage::create_pool(&config.master_db_path, 5).await?;
        flowctl_storage::run_migrations(&db).await?;

        Ok(Self {
            repos: Repos::new(db.clone()),
            db,
            config: Arc::new(config),
            next_worker_index: Arc::new(AtomicUsize::new(0)),
        })
    }

    pub fn repos(&self) -> &Repos {
        &self.repos
    }

    /// Select the next worker URL round-robin, or `None` if no workers are
    /// configured.
    pub fn next_worker(&self) -> Option<String> {
        let workers = &self.config.master_workers;
        if workers.is_empty() {
            return None;
        }
        let idx = self.next_worker_index.fetch_add(1, Ordering::Relaxed);
        Some(workers[idx % workers.len()].clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn state_with_workers(workers: Vec<String>) -> AppState {
        let db_path =
            std::env::temp_dir().join(format!("flowctl-state-test-{}.db", ulid::Ulid::new()));
        let config = Config {
            master_api_key: "test-secret".to_string(),
            master_db_path: db_path.to_string_lossy().to_string(),
            master_host: "127.0.0.1".to_string(),
            master_port: 0,
            master_workers: workers,
            scheduler_interval: 60.0,
        };
        AppState::new(config).await.expect("state init")
    }

    #[tokio::test]
    async fn next_worker_is_none_when_no_workers_are_configured() {
        let state = state_with_workers(vec![]).await;
        assert_eq!(state.next_worker(), None);
    }

    #[tokio::test]
    async fn next_worker_round_robins_and_wraps_around() {
        let state = state_with_workers(vec![
            "http://a".to_string(),
            "http://b".to_string(),
            "http://c".to_string(),
        ])
        .await;

        assert_eq!(state.next_worker().as_deref(), Some("http://a"));
        assert_eq!(state.next_worker().as_deref(), Some("http://b"));
        assert_eq!(state.next_worker().as_deref(), Some("http://c"));
        assert_eq!(state.next_worker().as_deref(), Some("http://a"));
    }
}
