use std::collections::BTreeMap;

use axum::{
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;
use treino_shared::{validation_details, ErrorBody};
use validator::ValidationErrors;

use crate::auth::password::PasswordError;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Validation failed")]
    Validation(BTreeMap<String, Vec<String>>),
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    Unauthorized(String),
    #[error("{0}")]
    Forbidden(String),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Conflict(String),
    #[error("Too many requests, try again later")]
    TooManyRequests,
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("JWT error: {0}")]
    Jwt(#[from] jsonwebtoken::errors::Error),
    #[error("Password hashing error: {0}")]
    PasswordHashing(#[from] PasswordError),
    #[error("Internal server error")]
    Internal(#[from] anyhow::Error),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) | ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::TooManyRequests => StatusCode::TOO_MANY_REQUESTS,
            ApiError::Database(err) if is_unique_violation(err) => StatusCode::CONFLICT,
            ApiError::Database(_)
            | ApiError::Jwt(_)
            | ApiError::PasswordHashing(_)
            | ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Map a unique-constraint violation to a 409 with `message`, passing other errors through.
    pub fn conflict_on_unique(message: &'static str) -> impl FnOnce(sqlx::Error) -> ApiError {
        move |err| {
            if is_unique_violation(&err) {
                ApiError::Conflict(message.to_string())
            } else {
                ApiError::Database(err)
            }
        }
    }
}

pub fn is_unique_violation(err: &sqlx::Error) -> bool {
    err.as_database_error()
        .map(|db_err| db_err.is_unique_violation())
        .unwrap_or(false)
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();

        let (message, details) = match self {
            ApiError::Validation(details) => ("Validation failed".to_string(), Some(details)),
            other if status.is_server_error() => {
                tracing::error!(error = %other, "request failed");
                ("Internal server error".to_string(), None)
            }
            // Only unique violations reach here; everything else from the database is a 500.
            ApiError::Database(_) => ("Resource already exists".to_string(), None),
            other => (other.to_string(), None),
        };

        let body = ErrorBody {
            success: false,
            error: status.canonical_reason().unwrap_or("Error").to_string(),
            message,
            details,
        };

        (status, Json(body)).into_response()
    }
}

impl From<ValidationErrors> for ApiError {
    fn from(errors: ValidationErrors) -> Self {
        ApiError::Validation(validation_details(&errors))
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}
