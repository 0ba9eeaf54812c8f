//! flowctl storage layer
//!
//! SQLite-backed repositories for workflows, runs, and task instances.
//! Uses SQLx for compile-time checked queries.

pub mod migrations;
pub mod models;
pub mod pool;
pub mod repos;

pub use migrations::run_migrations;
pub use pool::{create_pool, DbPool};
pub use repos::*;
