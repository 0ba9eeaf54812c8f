//! Database entity models
//!
//! These structures map directly to database tables and are used for
//! CRUD operations.

pub mod runs;
pub mod task_instances;
pub mod workflows;

pub use runs::*;
pub use task_instances::*;
pub use workflows::*;
