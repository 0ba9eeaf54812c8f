//! Error types shared across flowctl crates and services.

/// Result type alias using the flowctl `Error`.
pub type Result<T> = std::result::Result<T, Error>;

/// The crate-wide error type. Each variant maps to an HTTP status code and a
/// stable error code via [`Error::status_code`]/[`Error::error_code`].
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("{entity} with id '{id}' not found")]
    NotFound { entity: &'static str, id: String },

    #[error("validation failed: {0:?}")]
    Validation(Vec<String>),

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("unauthorized: {0}")]
    Unauthorized(String),

    #[error("database error: {0}")]
    Database(String),

    /// A dispatch-layer failure (worker unreachable, non-200, timeout).
    /// Never propagated to an HTTP response; recovered by the scheduler.
    #[error("dispatch error: {0}")]
    Dispatch(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl Error {
    pub fn status_code(&self) -> u16 {
        match self {
            Error::NotFound { .. } => 404,
            Error::Validation(_) => 400,
            Error::Conflict(_) => 409,
            Error::Unauthorized(_) => 401,
            Error::Database(_) => 500,
            Error::Dispatch(_) => 500,
            Error::Internal(_) => 500,
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            Error::NotFound { .. } => "NOT_FOUND",
            Error::Validation(_) => "VALIDATION_ERROR",
            Error::Conflict(_) => "CONFLICT",
            Error::Unauthorized(_) => "UNAUTHORIZED",
            Error::Database(_) => "DATABASE_ERROR",
            Error::Dispatch(_) => "DISPATCH_ERROR",
            Error::Internal(_) => "INTERNAL_ERROR",
        }
    }

    pub fn not_found(entity: &'static str, id: impl Into<String>) -> Self {
        Error::NotFound {
            entity,
            id: id.into(),
        }
    }
}
