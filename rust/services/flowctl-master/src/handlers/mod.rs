//! Request handlers

pub mod health;
pub mod internal;
pub mod runs;
pub mod workflows;

#[cfg(test)]
mod tests;

use axum::{http::StatusCode, response::IntoResponse, response::Response, Json};
use serde_json::json;

/// Standard API error response: a uniform JSON error body
/// `{"error": {"code": ..., "message": ...}}`.
pub struct ApiError {
    pub status: StatusCode,
    pub code: &'static str,
    pub message: String,
}

impl ApiError {
    pub fn not_found(entity: &str, id: &str) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            code: "NOT_FOUND",
            message: format!("{entity} with id '{id}' not found"),
        }
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::CONFLICT,
            code: "CONFLICT",
            message: message.into(),
        }
    }

    pub fn validation(errors: Vec<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            code: "VALIDATION_ERROR",
            message: errors.join("; "),
        }
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::UNAUTHORIZED,
            code: "UNAUTHORIZED",
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            code: "INTERNAL_ERROR",
            message: message.into(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = json!({
            "error": {
                "code": self.code,
                "message": self.message
            }
        });
        (self.status, Json(body)).into_response()
    }
}

impl From<sqlx::Error> for ApiError {
    fn from(e: sqlx::Error) -> Self {
        match &e {
            sqlx::Error::RowNotFound => {
                tracing::debug!(error = %e, "record not found");
                Self::not_found("record", "unknown")
            }
            sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
                tracing::warn!(error = %e, "unique constraint violation");
                Self::conflict("resource already exists")
            }
            _ => {
                tracing::error!(error = %e, "database error");
                Self::internal("database error")
            }
        }
    }
}

/// The `validation` list form of errors (a list of human-readable
/// messages) gets its own conversion so handlers can `?` straight from
/// `Vec<String>` errors where convenient.
impl From<Vec<String>> for ApiError {
    fn from(errors: Vec<String>) -> Self {
        Self::validation(errors)
    }
}
