//! Error handling module for the homework backend.
//!
//! Every action failure is an `AppError`. The router serialises it exactly once
//! into the `{status: "error", code, message}` envelope.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

/// Error codes as constants to avoid stringly-typed errors.
pub mod codes {
    pub const MISSING_FIELD: &str = "MISSING_FIELD";
    pub const NOT_FOUND: &str = "NOT_FOUND";
    pub const ALREADY_EXISTS: &str = "ALREADY_EXISTS";
    pub const UNAUTHORIZED: &str = "UNAUTHORIZED";
    pub const STUDENT_NOT_IN_ROSTER: &str = "STUDENT_NOT_IN_ROSTER";
    pub const INVALID_ACTION: &str = "INVALID_ACTION";
    pub const VALIDATION_ERROR: &str = "VALIDATION_ERROR";
    pub const BAD_REQUEST: &str = "BAD_REQUEST";
    pub const DATABASE_ERROR: &str = "DATABASE_ERROR";
    pub const INTERNAL_ERROR: &str = "INTERNAL_ERROR";
}

/// Application error type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppError {
    /// A required payload field is absent or blank
    MissingField(String),
    /// User, assignment, question, note or roster row not found
    NotFound(String),
    /// Duplicate assignment id
    AlreadyExists(String),
    /// Teacher class lookup failed
    Unauthorized(String),
    /// Student has no row in the assignment's roster snapshot
    StudentNotInRoster {
        student_id: String,
        assignment_id: String,
    },
    /// Unknown action name
    InvalidAction(String),
    /// Field present but with an unacceptable value
    Validation(String),
    /// Malformed request body
    BadRequest(String),
    /// Database error
    Database(String),
    /// Internal server error
    Internal(String),
}

impl AppError {
    pub fn missing_field(field: &str) -> Self {
        AppError::MissingField(field.to_string())
    }

    /// Get the HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::MissingField(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::AlreadyExists(_) => StatusCode::CONFLICT,
            AppError::Unauthorized(_) => StatusCode::FORBIDDEN,
            AppError::StudentNotInRoster { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::InvalidAction(_) => StatusCode::BAD_REQUEST,
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get the error code for this error.
    pub fn error_code(&self) -> &'static str {
        match self {
            AppError::MissingField(_) => codes::MISSING_FIELD,
            AppError::NotFound(_) => codes::NOT_FOUND,
            AppError::AlreadyExists(_) => codes::ALREADY_EXISTS,
            AppError::Unauthorized(_) => codes::UNAUTHORIZED,
            AppError::StudentNotInRoster { .. } => codes::STUDENT_NOT_IN_ROSTER,
            AppError::InvalidAction(_) => codes::INVALID_ACTION,
            AppError::Validation(_) => codes::VALIDATION_ERROR,
            AppError::BadRequest(_) => codes::BAD_REQUEST,
            AppError::Database(_) => codes::DATABASE_ERROR,
            AppError::Internal(_) => codes::INTERNAL_ERROR,
        }
    }

    /// Human-readable message sent to the client.
    pub fn message(&self) -> String {
        match self {
            AppError::MissingField(field) => format!("Missing field: {}", field),
            AppError::InvalidAction(action) => format!("Invalid action: {}", action),
            AppError::StudentNotInRoster {
                student_id,
                assignment_id,
            } => format!(
                "Student {} is not in the roster of assignment {}",
                student_id, assignment_id
            ),
            AppError::NotFound(msg)
            | AppError::AlreadyExists(msg)
            | AppError::Unauthorized(msg)
            | AppError::Validation(msg)
            | AppError::BadRequest(msg)
            | AppError::Database(msg)
            | AppError::Internal(msg) => msg.clone(),
        }
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.error_code(), self.message())
    }
}

impl std::error::Error for AppError {}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        tracing::error!("Database error: {:?}", err);
        AppError::Database(format!("Database error: {}", err))
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        tracing::error!("JSON error: {:?}", err);
        AppError::BadRequest(format!("JSON error: {}", err))
    }
}

/// Error response envelope.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub status: String,
    pub code: String,
    pub message: String,
}

impl ErrorResponse {
    pub fn new(error: &AppError) -> Self {
        Self {
            status: "error".to_string(),
            code: error.error_code().to_string(),
            message: error.message(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match &self {
            AppError::Database(_) | AppError::Internal(_) => {
                tracing::error!(code = self.error_code(), "{}", self.message())
            }
            _ => tracing::debug!(code = self.error_code(), "{}", self.message()),
        }
        let status = self.status_code();
        (status, Json(ErrorResponse::new(&self))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_action_message() {
        let err = AppError::InvalidAction("fly".to_string());
        assert_eq!(err.message(), "Invalid action: fly");
        assert_eq!(err.error_code(), codes::INVALID_ACTION);
    }

    #[test]
    fn test_envelope_shape() {
        let body = ErrorResponse::new(&AppError::missing_field("userId"));
        assert_eq!(body.status, "error");
        assert_eq!(body.code, "MISSING_FIELD");
        assert_eq!(body.message, "Missing field: userId");
    }

    #[test]
    fn test_not_in_roster_status() {
        let err = AppError::StudentNotInRoster {
            student_id: "S9".to_string(),
            assignment_id: "HW1".to_string(),
        };
        assert_eq!(err.status_code(), StatusCode::UNPROCESSABLE_ENTITY);
        assert!(err.message().contains("S9"));
        assert!(err.message().contains("HW1"));
    }
}
