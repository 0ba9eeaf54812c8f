//! API key authentication middleware.
//!
//! All non-internal endpoints require header `X-API-Key: <configured
//! secret>`. Missing or wrong header -> 401. `/internal/task-result` does
//! not sit behind this middleware: it's called by trusted intra-host
//! workers, not external clients.

use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use subtle::ConstantTimeEq;
use tracing::warn;

use crate::state::AppState;

const API_KEY_HEADER: &str = "x-api-key";

/// Marker inserted into request extensions once the API key has checked out.
#[derive(Debug, Clone)]
#[allow(dead_code)]
pub struct AuthContext;

pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let provided = request
        .headers()
        .get(API_KEY_HEADER)
        .and_then(|h| h.to_str().ok());

    let Some(provided) = provided else {
        return unauthorized("Missing X-API-Key header");
    };

    let matches: bool = provided
        .as_bytes()
        .ct_eq(state.config.master_api_key.as_bytes())
        .into();

    if !matches {
        warn!("invalid API key attempt");
        return unauthorized("Invalid API key");
    }

    request.extensions_mut().insert(AuthContext);
    next.run(request).await
}

fn unauthorized(message: &str) -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({
            "error": {
                "code": "UNAUTHORIZED",
                "message": message
            }
        })),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constant_time_comparison_matches_equal_keys() {
        let matches: bool = b"secret".ct_eq(b"secret").into();
        assert!(matches);
    }

    #[test]
    fn constant_time_comparison_rejects_different_keys() {
        let matches: bool = b"secret".ct_eq(b"wrong").into();
        assert!(!matches);
    }
}
