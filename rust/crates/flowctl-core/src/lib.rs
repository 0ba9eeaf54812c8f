//! Core primitives shared by the flowctl crates and services:
//! - The crate-wide `Error` type
//! - Configuration loading
//! - Time helpers

pub mod config;
pub mod error;
pub mod time;

pub use config::Config;
pub use error::{Error, Result};
