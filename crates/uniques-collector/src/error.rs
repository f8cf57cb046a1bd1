//! HTTP mapping of collector errors
//!
//! Validation errors become 400, storage and config errors 500. No partial
//! or degraded responses exist.

use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use tracing::{debug, error};
use uniques_common::{StorageError, UniquesError};

/// Error returned from HTTP handlers
#[derive(Debug)]
pub struct ApiError(pub UniquesError);

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match &self.0 {
            UniquesError::Validation(_) => StatusCode::BAD_REQUEST,
            UniquesError::Storage(_) | UniquesError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<UniquesError> for ApiError {
    fn from(err: UniquesError) -> Self {
        ApiError(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match &self.0 {
            UniquesError::Validation(e) => {
                debug!(error = %e, "Rejected request");
                e.to_string()
            }
            UniquesError::Storage(e) => {
                error!(error = %e, "Storage failure");
                match e {
                    StorageError::DeadlineExceeded => "storage deadline exceeded".to_string(),
                    _ => "storage unavailable".to_string(),
                }
            }
            UniquesError::Config(e) => {
                error!(error = %e, "Configuration failure");
                "internal error".to_string()
            }
        };

        (status, [(header::CONTENT_TYPE, "text/plain; charset=utf-8")], body).into_response()
    }
}
