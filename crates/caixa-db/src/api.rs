//! # API Error Payload
//!
//! The serialized error shape handed to API-style callers (checkout,
//! catalog lookup). Mutating endpoints surface these as a message plus the
//! re-shown input; programmatic callers branch on the code.
//!
//! ```json
//! { "code": "INSUFFICIENT_STOCK", "message": "insufficient stock for ..." }
//! ```

use caixa_core::{CoreError, ValidationError};
use serde::Serialize;

use crate::error::DbError;

/// API error returned from boundary endpoints.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiError {
    /// Machine-readable error code for programmatic handling
    pub code: ErrorCode,

    /// Human-readable error message for display
    pub message: String,
}

/// Error codes, each with an HTTP-like status class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Resource not found (404)
    NotFound,

    /// Duplicate business identifier or second open till (409)
    Conflict,

    /// Caller identity does not allow the operation (403)
    Forbidden,

    /// Input validation failed (400)
    ValidationError,

    /// Entity state forbids the operation (422)
    InvalidState,

    /// Requested quantity exceeds stock (422)
    InsufficientStock,

    /// Required precondition does not hold, e.g. no open till (412)
    PreconditionFailed,

    /// Database operation failed (500)
    DatabaseError,

    /// Internal error (500)
    Internal,
}

impl ErrorCode {
    /// The HTTP status class this code maps to.
    pub const fn http_status(&self) -> u16 {
        match self {
            ErrorCode::NotFound => 404,
            ErrorCode::Conflict => 409,
            ErrorCode::Forbidden => 403,
            ErrorCode::ValidationError => 400,
            ErrorCode::InvalidState | ErrorCode::InsufficientStock => 422,
            ErrorCode::PreconditionFailed => 412,
            ErrorCode::DatabaseError | ErrorCode::Internal => 500,
        }
    }
}

impl ApiError {
    /// Creates a new API error.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        ApiError {
            code,
            message: message.into(),
        }
    }

    /// Creates a not found error.
    pub fn not_found(resource: &str, id: &str) -> Self {
        ApiError::new(ErrorCode::NotFound, format!("{} not found: {}", resource, id))
    }

    /// Creates a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::ValidationError, message)
    }
}

/// Converts domain errors to API errors.
impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        let code = match &err {
            CoreError::NotFound { .. } => ErrorCode::NotFound,
            CoreError::Conflict { .. } => ErrorCode::Conflict,
            CoreError::Forbidden(_) => ErrorCode::Forbidden,
            CoreError::InvalidState { .. } => ErrorCode::InvalidState,
            CoreError::InsufficientStock { .. } => ErrorCode::InsufficientStock,
            CoreError::Precondition(_) => ErrorCode::PreconditionFailed,
            CoreError::Validation(_) => ErrorCode::ValidationError,
            CoreError::Storage(msg) => {
                // log the raw storage failure, return a generic message
                tracing::error!("storage error: {}", msg);
                return ApiError::new(ErrorCode::DatabaseError, "database operation failed");
            }
        };
        ApiError::new(code, err.to_string())
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        ApiError::validation(err.to_string())
    }
}

/// Converts raw database errors to API errors.
impl From<DbError> for ApiError {
    fn from(err: DbError) -> Self {
        ApiError::from(CoreError::from(err))
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{:?}] {}", self.code, self.message)
    }
}

impl std::error::Error for ApiError {}

// =============================================================================
// Unit Tests
// =============================================================================
