//! HTTP mapping for pipeline errors.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use wordlens_core::{types::ErrorBody, Error};

/// Error returned from handlers; renders as `{ error, details? }`.
#[derive(Debug)]
pub struct ApiError(pub Error);

impl ApiError {
    /// Status code for the wrapped error.
    pub fn status(&self) -> StatusCode {
        if self.0.is_client_error() {
            StatusCode::BAD_REQUEST
        } else {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }

    fn body(&self) -> ErrorBody {
        let error = match &self.0 {
            // Carry the caller-facing text without the variant prefix.
            Error::MalformedRequest(msg) => msg.clone(),
            Error::InferenceFailure(msg) => msg.clone(),
            other => other.to_string(),
        };
        ErrorBody {
            error,
            details: self.0.stage().map(|stage| json!({ "stage": stage })),
        }
    }
}

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self.0, stage = ?self.0.stage(), "Analysis failed");
        } else {
            tracing::debug!(error = %self.0, "Rejected request");
        }
        (status, Json(self.body())).into_response()
    }
}
