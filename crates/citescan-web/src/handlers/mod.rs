pub mod extract;
pub mod health;

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

use citescan_ingest::IngestError;

use crate::models::ErrorResponse;

/// Request-level failure, rendered as `{"detail": "..."}`.
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    PayloadTooLarge(String),
    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<IngestError> for ApiError {
    fn from(e: IngestError) -> Self {
        match e {
            IngestError::EmptyKeyword => ApiError::BadRequest("Keyword is required".into()),
            IngestError::InvalidKeyword(msg) => {
                ApiError::BadRequest(format!("Invalid keyword: {msg}"))
            }
            IngestError::NoFiles => {
                ApiError::BadRequest("At least one file is required".into())
            }
            IngestError::AllFilesFailed { skipped } => {
                let reasons: Vec<String> = skipped
                    .iter()
                    .map(|f| match f.skip_reason() {
                        Some(reason) => format!("{}: {}", f.name, reason),
                        None => f.name.clone(),
                    })
                    .collect();
                ApiError::BadRequest(format!(
                    "None of the uploaded files could be processed ({})",
                    reasons.join("; ")
                ))
            }
            e @ IngestError::Read { .. } => ApiError::Internal(e.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        } else {
            tracing::debug!(%status, error = %self, "request rejected");
        }
        let body = ErrorResponse {
            detail: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}
