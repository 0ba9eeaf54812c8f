//! API routes

use axum::{
    middleware,
    routing::{get, post},
    Router,
};

use crate::handlers;
use crate::middleware::{auth_middleware, request_id_middleware};
use crate::state::AppState;

/// Build the full application router.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health::health_check))
        .route("/ready", get(handlers::health::readiness_check))
        .route(
            "/internal/task-result",
            post(handlers::internal::task_result_callback),
        )
        .merge(
            Router::new()
                .route(
                    "/workflows",
                    post(handlers::workflows::create_workflow).get(handlers::workflows::list_workflows),
                )
                .route("/workflows/{id}", get(handlers::workflows::get_workflow))
                .route(
                    "/workflows/{id}/run",
                    post(handlers::workflows::create_workflow_run),
                )
                .route("/runs/{id}", get(handlers::runs::get_run))
                .route("/runs/{id}/tasks", get(handlers::runs::list_run_tasks))
                .layer(middleware::from_fn_with_state(
                    state.clone(),
                    auth_middleware,
                )),
        )
        .layer(middleware::from_fn(request_id_middleware))
        .with_state(state)
}
