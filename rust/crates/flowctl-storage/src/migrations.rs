//! Database migration runner.
//!
//! Embeds and runs SQL migrations on startup.

use sqlx::SqlitePool;
use tracing::info;

/// Run all pending database migrations, embedded at compile time from the
/// crate-local `migrations/` directory.
pub async fn run_migrations(pool: &SqlitePool) -> Result<(), sqlx::migrate::MigrateError> {
    info!("Running database migrations...");

    sqlx::migrate!("./migrations").run(pool).await?;

    info!("Migrations complete");
    Ok(())
}
