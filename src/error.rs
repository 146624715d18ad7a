use reqwest::StatusCode;
use serde_json::Value as JsonValue;
use std::time::Duration;
use thiserror::Error;

/// Failures of the ingestion gateway and the conversation relay.
#[derive(Debug, Error)]
pub enum RelayError {
    /// The caller's request is structurally invalid. Nothing was sent upstream.
    #[error("{0}")]
    Input(String),

    /// The upstream failed or answered with a body we could not use.
    /// `status` is the upstream's own status when it sent one.
    #[error("upstream error ({status}): {details}")]
    Upstream { status: StatusCode, details: JsonValue },

    #[error("upstream did not respond within {0:?}")]
    Timeout(Duration),
}

impl RelayError {
    pub fn input(message: impl Into<String>) -> Self {
        RelayError::Input(message.into())
    }

    /// Transport failure with no upstream response to pass through.
    pub fn transport(err: &reqwest::Error, timeout: Duration) -> Self {
        if err.is_timeout() {
            return RelayError::Timeout(timeout);
        }
        RelayError::Upstream {
            status: err.status().unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
            details: JsonValue::String(err.to_string()),
        }
    }

    /// A 2xx answer that lacks the field we need.
    pub fn malformed(field: &str, body: JsonValue) -> Self {
        RelayError::Upstream {
            status: StatusCode::BAD_GATEWAY,
            details: serde_json::json!({
                "message": format!("upstream response is missing '{}' or it is empty", field),
                "body": body,
            }),
        }
    }
}

/// Upstream error payloads are passed through as JSON when they parse,
/// otherwise as the raw text.
pub fn details_from_body(body: &str) -> JsonValue {
    serde_json::from_str(body).unwrap_or_else(|_| JsonValue::String(body.to_string()))
}
