use std::collections::BTreeMap;

use reqwest::StatusCode;
use thiserror::Error;
use treino_shared::ErrorBody;

/// Failures reported by the Treino API, decoded from its error envelope.
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Not logged in. Run 'treino login' first.")]
    NotLoggedIn,

    #[error("Your session has expired. Run 'treino login' to log in again.")]
    SessionExpired,

    #[error("Not authorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("{}", describe_validation(.message, .details))]
    Validation {
        message: String,
        details: BTreeMap<String, Vec<String>>,
    },

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Too many requests: {0}")]
    RateLimited(String),

    #[error("Server error: {0}")]
    ServerError(String),

    #[error("Unexpected response: {0}")]
    UnexpectedResponse(String),
}

impl ApiError {
    pub fn from_status(status: StatusCode, message: String) -> Self {
        let msg = if message.is_empty() {
            status.canonical_reason().unwrap_or("Unknown error").to_string()
        } else {
            message
        };

        match status {
            StatusCode::UNAUTHORIZED => ApiError::Unauthorized(msg),
            StatusCode::FORBIDDEN => ApiError::Forbidden(msg),
            StatusCode::NOT_FOUND => ApiError::NotFound(msg),
            StatusCode::CONFLICT => ApiError::Conflict(msg),
            StatusCode::TOO_MANY_REQUESTS => ApiError::RateLimited(msg),
            StatusCode::BAD_REQUEST => ApiError::BadRequest(msg),
            status if status.is_server_error() => ApiError::ServerError(msg),
            status if status.is_client_error() => ApiError::BadRequest(msg),
            _ => ApiError::UnexpectedResponse(msg),
        }
    }

    /// Decode an error response body. Falls back to the raw text when the
    /// body is not the usual envelope.
    pub fn from_body(status: StatusCode, body: &str) -> Self {
        match serde_json::from_str::<ErrorBody>(body) {
            Ok(ErrorBody {
                message,
                details: Some(details),
                ..
            }) if status == StatusCode::BAD_REQUEST => ApiError::Validation { message, details },
            Ok(envelope) => ApiError::from_status(status, envelope.message),
            Err(_) => ApiError::from_status(status, body.trim().to_string()),
        }
    }
}

/// "Validation failed (email: Invalid email address; password: ...)"
pub fn describe_validation(message: &str, details: &BTreeMap<String, Vec<String>>) -> String {
    if details.is_empty() {
        return message.to_string();
    }

    let fields = details
        .iter()
        .map(|(field, messages)| format!("{field}: {}", messages.join(", ")))
        .collect::<Vec<_>>()
        .join("; ");

    format!("{message} ({fields})")
}
