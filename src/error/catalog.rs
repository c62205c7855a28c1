use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use std::error::Error as _;
use thiserror::Error as ThisError;
use tracing::error;

use super::validation::{FieldIssue, ValidationErrors};

pub const GENERIC_ERROR_MESSAGE: &str = "An unexpected error occurred.";

#[derive(Debug, ThisError)]
pub enum CatalogError {
    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationErrors),

    #[error("{0}")]
    NotFound(String),

    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Handler panicked: {0}")]
    Panic(String),
}

impl CatalogError {
    pub fn not_found(what: impl Into<String>) -> Self {
        CatalogError::NotFound(what.into())
    }

    /// Stable variant name, exposed in development error bodies.
    pub fn name(&self) -> &'static str {
        match self {
            CatalogError::Validation(_) => "ValidationError",
            CatalogError::NotFound(_) => "NotFound",
            CatalogError::DatabaseError(_) => "DatabaseError",
            CatalogError::JsonError(_) => "JsonError",
            CatalogError::Panic(_) => "Panic",
        }
    }
}

/// `{ "errors": [...] }`
#[derive(Debug, Serialize)]
pub struct ErrorBody<T> {
    pub errors: Vec<T>,
}

impl<T> ErrorBody<T> {
    pub fn one(error: T) -> Self {
        Self {
            errors: vec![error],
        }
    }
}

/// Details of a server-side failure.
///
/// Attached to every 500 response as an extension; only rendered into the body
/// in development mode.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorReport {
    pub message: String,
    pub stack: String,
    pub name: String,
}

impl From<&CatalogError> for ErrorReport {
    fn from(err: &CatalogError) -> Self {
        let mut stack = format!("{}: {}", err.name(), err);
        let mut source = err.source();
        while let Some(cause) = source {
            stack.push_str("\n    caused by: ");
            stack.push_str(&cause.to_string());
            source = cause.source();
        }
        Self {
            message: err.to_string(),
            stack,
            name: err.name().to_string(),
        }
    }
}

impl IntoResponse for CatalogError {
    fn into_response(self) -> Response {
        match self {
            CatalogError::Validation(errors) => {
                let body = ErrorBody::<FieldIssue> {
                    errors: errors.issues().to_vec(),
                };
                (StatusCode::BAD_REQUEST, Json(body)).into_response()
            }

            CatalogError::NotFound(message) => {
                (StatusCode::NOT_FOUND, Json(ErrorBody::one(message))).into_response()
            }

            other => {
                error!(kind = other.name(), error = %other, "request failed");
                let report = ErrorReport::from(&other);
                let mut resp = (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(ErrorBody::one(GENERIC_ERROR_MESSAGE)),
                )
                    .into_response();
                resp.extensions_mut().insert(report);
                resp
            }
        }
    }
}

impl From<JsonRejection> for CatalogError {
    fn from(rejection: JsonRejection) -> Self {
        let detail = rejection.body_text();
        let code = match rejection {
            JsonRejection::JsonSyntaxError(_) => "invalid_json",
            JsonRejection::JsonDataError(_) => "invalid_type",
            JsonRejection::MissingJsonContentType(_) => "invalid_content_type",
            _ => "invalid_request",
        };
        CatalogError::Validation(ValidationErrors::single(code, &[], detail))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    async fn body_json(resp: Response) -> serde_json::Value {
        let bytes = to_bytes(resp.into_body(), usize::MAX)
            .await
            .expect("failed to read body");
        serde_json::from_slice(&bytes).expect("body was not JSON")
    }

    #[tokio::test]
    async fn validation_maps_to_400_with_issues() {
        let err = CatalogError::from(ValidationErrors::single(
            "too_small",
            &["name"],
            "must not be empty",
        ));
        let resp = err.into_response();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            body_json(resp).await,
            serde_json::json!({
                "errors": [{ "code": "too_small", "path": ["name"], "message": "must not be empty" }]
            })
        );
    }

    #[tokio::test]
    async fn internal_errors_are_opaque_but_carry_a_report() {
        let err = CatalogError::from(sqlx::Error::RowNotFound);
        let resp = err.into_response();
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let report = resp
            .extensions()
            .get::<ErrorReport>()
            .cloned()
            .expect("report attached");
        assert_eq!(report.name, "DatabaseError");
        assert!(report.stack.contains("caused by"));

        assert_eq!(
            body_json(resp).await,
            serde_json::json!({ "errors": [GENERIC_ERROR_MESSAGE] })
        );
    }
}
