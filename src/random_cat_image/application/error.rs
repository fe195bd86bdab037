use thiserror::Error;
use crate::domain::error::FetchError;
use crate::infrastructure::error::InfrastructureError;

#[derive(Error, Debug)]
pub enum ApplicationError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    #[error("Infrastructure error occurred: {0}")]
    InfrastructureError(#[from] InfrastructureError),

    #[error("Internal error: {0}")]
    Internal(String),
}

use axum::response::{IntoResponse, Response};
use axum::http::StatusCode;
use axum::Json;
use serde_json::json;

impl IntoResponse for ApplicationError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApplicationError::Fetch(_) => StatusCode::BAD_GATEWAY,
            ApplicationError::InfrastructureError(infra_err) => {
                tracing::error!(error = ?infra_err, "infrastructure failure");
                match infra_err {
                    InfrastructureError::Base64DecodeError(_) => StatusCode::BAD_GATEWAY,
                    _ => StatusCode::INTERNAL_SERVER_ERROR,
                }
            }
            ApplicationError::ConfigurationError(_) | ApplicationError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        let body = Json(json!({ "success": false, "error": self.to_string() }));
        (status, body).into_response()
    }
}
