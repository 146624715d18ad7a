use axum::{ http::StatusCode, response::{ IntoResponse, Response }, Json };

use crate::error::RelayError;
use crate::models::api::ErrorBody;

/// HTTP rendering of a relay failure. `label` names the failed operation
/// (e.g. "Error in chat") and becomes the `error` field for upstream failures.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    body: ErrorBody,
}

impl ApiError {
    pub fn new(err: RelayError, label: &str) -> Self {
        match err {
            RelayError::Input(message) => ApiError {
                status: StatusCode::BAD_REQUEST,
                body: ErrorBody { error: message, message: None, details: None },
            },
            RelayError::Upstream { status, details } => ApiError {
                status,
                body: ErrorBody { error: label.to_string(), message: None, details: Some(details) },
            },
            err @ RelayError::Timeout(_) => ApiError {
                status: StatusCode::GATEWAY_TIMEOUT,
                body: ErrorBody {
                    error: label.to_string(),
                    message: None,
                    details: Some(serde_json::Value::String(err.to_string())),
                },
            },
        }
    }

    /// A request the extractors refused before the relay saw it.
    pub fn rejection(status: StatusCode, message: impl Into<String>) -> Self {
        ApiError {
            status,
            body: ErrorBody { error: message.into(), message: None, details: None },
        }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}
