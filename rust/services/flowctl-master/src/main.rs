//! flowctl master: control API and scheduler.

use flowctl_core::Config;
use flowctl_master::{routes, scheduler, state::AppState};
use tokio::signal;
use tower_http::trace::TraceLayer;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info,flowctl_master=debug".to_string()),
        )
        .init();

    let config = Config::load()?;
    info!("starting flowctl-master");

    let state = AppState::new(config).await?;
    info!(db_path = %state.config.master_db_path, "connected to state store");

    tokio::spawn(scheduler::run(state.clone()));

    let app = routes::build_router(state.clone()).layer(TraceLayer::new_for_http());

    let addr = state.config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!(%addr, "listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("flowctl-master shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("received Ctrl+C, shutting down");
        }
        _ = terminate => {
            info!("received SIGTERM, shutting down");
        }
    }
}
