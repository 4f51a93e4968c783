//! Mapping from store failures to HTTP responses.

use axum::{
    extract::rejection::{JsonRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use crate::common::StoreError;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),

    #[error("{entity} '{id}' not found")]
    NotFound { entity: &'static str, id: String },

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl ApiError {
    pub fn not_found(entity: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity,
            id: id.into(),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

#[derive(Serialize)]
pub struct ErrorBody {
    pub error: String,
    pub message: String,
}

impl ErrorBody {
    pub fn new(error: &str, message: impl Into<String>) -> Self {
        Self {
            error: error.to_string(),
            message: message.into(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            ApiError::BadRequest(message) => {
                (StatusCode::BAD_REQUEST, ErrorBody::new("Bad Request", message))
            }
            ApiError::NotFound { .. } => (
                StatusCode::NOT_FOUND,
                ErrorBody::new("Not Found", self.to_string()),
            ),
            ApiError::Store(StoreError::Validation(message)) => {
                (StatusCode::BAD_REQUEST, ErrorBody::new("Bad Request", message))
            }
            ApiError::Store(err) => {
                // Never turn a backend failure into an empty result
                tracing::error!(error = %err, "Civic store failure");
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    ErrorBody::new(
                        "Service Unavailable",
                        "The service is temporarily unavailable, please retry",
                    ),
                )
            }
        };

        (status, Json(body)).into_response()
    }
}

/// Fallback for unknown paths
pub async fn not_found_handler() -> (StatusCode, Json<ErrorBody>) {
    (
        StatusCode::NOT_FOUND,
        Json(ErrorBody::new(
            "Not Found",
            "The requested endpoint does not exist",
        )),
    )
}
