//! HTTP mapping for store and auth failures.

use axum::Json;
use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;
use tracing::error;

use crate::error::{ConstraintKind, StoreError};

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("authentication required")]
    Unauthorized,

    /// A required key absent from the request body.
    #[error("missing field {0}")]
    MissingField(String),

    /// Body, query or path that could not be decoded.
    #[error("{message}")]
    BadRequest { status: StatusCode, message: String },

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Field named by a serde "missing field `x`" message.
fn missing_field(message: &str) -> Option<&str> {
    let rest = message.split("missing field `").nth(1)?;
    rest.split('`').next().filter(|f| !f.is_empty())
}

fn decode_failure(status: StatusCode, message: String) -> ApiError {
    match missing_field(&message) {
        Some(field) => ApiError::MissingField(field.to_string()),
        None => ApiError::BadRequest { status, message },
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        decode_failure(rejection.status(), rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        decode_failure(rejection.status(), rejection.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        ApiError::BadRequest {
            status: rejection.status(),
            message: rejection.body_text(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let message = self.to_string();
        let (status, body) = match &self {
            ApiError::Unauthorized => (StatusCode::UNAUTHORIZED, json!({ "error": message })),
            ApiError::MissingField(field) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                json!({ "error": message, "field": field, "kind": ConstraintKind::Required }),
            ),
            ApiError::BadRequest { status, .. } => (*status, json!({ "error": message })),
            ApiError::Store(StoreError::ConstraintViolation { field, kind }) => {
                let status = match kind {
                    ConstraintKind::Unique => StatusCode::CONFLICT,
                    _ => StatusCode::UNPROCESSABLE_ENTITY,
                };
                (status, json!({ "error": message, "field": field, "kind": kind }))
            }
            ApiError::Store(StoreError::NotPermitted) => (StatusCode::FORBIDDEN, json!({ "error": message })),
            ApiError::Store(StoreError::Database(err)) => {
                error!(error = %err, "storage failure");
                (StatusCode::INTERNAL_SERVER_ERROR, json!({ "error": message }))
            }
        };
        (status, Json(body)).into_response()
    }
}
