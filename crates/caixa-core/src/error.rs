//! # Error Types
//!
//! Domain-specific error types for caixa-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                 │
//! │                                                                     │
//! │  caixa-core errors (this file)                                      │
//! │  ├── CoreError        - Business rule violations                    │
//! │  └── ValidationError  - Input validation failures                   │
//! │                                                                     │
//! │  caixa-db errors (separate crate)                                   │
//! │  ├── DbError          - Database operation failures                 │
//! │  └── ApiError         - Serialized boundary payload                 │
//! │                                                                     │
//! │  Flow: ValidationError → CoreError → ApiError → caller              │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Include context in error messages (barcode, id, quantities)
//! 3. Errors are enum variants, never bare strings

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Business rule violations and domain logic failures.
#[derive(Debug, Error)]
pub enum CoreError {
    /// A uniqueness or already-exists rule was violated: a second open till
    /// for the same operator, a duplicate barcode, a duplicate email.
    #[error("{what} '{value}' already exists")]
    Conflict { what: String, value: String },

    /// The entity is not in a state that allows the operation, e.g. closing
    /// a till session that is not open.
    #[error("{what} is {state}, cannot perform operation")]
    InvalidState { what: String, state: String },

    /// Entity not found (or soft-deleted and therefore invisible).
    #[error("{what} not found: {id}")]
    NotFound { what: String, id: String },

    /// Requested quantity exceeds current stock.
    ///
    /// ## User Workflow
    /// ```text
    /// Checkout (qty: 5)
    ///      │
    ///      ▼
    /// Check stock: available=3
    ///      │
    ///      ▼
    /// InsufficientStock { name: "Arroz Integral 1kg", available: 3, requested: 5 }
    ///      │
    ///      ▼
    /// Till shows: "Estoque insuficiente para Arroz Integral 1kg"
    /// ```
    #[error("insufficient stock for {name}: available {available}, requested {requested}")]
    InsufficientStock {
        name: String,
        available: i64,
        requested: i64,
    },

    /// A required precondition does not hold: selling without an open till.
    #[error("precondition failed: {0}")]
    Precondition(String),

    /// The caller's identity does not allow the operation.
    #[error("forbidden: {0}")]
    Forbidden(String),

    /// Input validation failed (wraps ValidationError).
    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Infrastructure failure surfaced through the domain API. Carries the
    /// storage-layer message; never used for business rule outcomes.
    #[error("storage error: {0}")]
    Storage(String),
}

impl CoreError {
    /// Creates a Conflict error.
    pub fn conflict(what: impl Into<String>, value: impl Into<String>) -> Self {
        CoreError::Conflict {
            what: what.into(),
            value: value.into(),
        }
    }

    /// Creates an InvalidState error.
    pub fn invalid_state(what: impl Into<String>, state: impl Into<String>) -> Self {
        CoreError::InvalidState {
            what: what.into(),
            state: state.into(),
        }
    }

    /// Creates a NotFound error.
    pub fn not_found(what: impl Into<String>, id: impl Into<String>) -> Self {
        CoreError::NotFound {
            what: what.into(),
            id: id.into(),
        }
    }
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors, raised before any business logic runs.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty (also: an empty cart).
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too short.
    #[error("{field} must be at least {min} characters")]
    TooShort { field: String, min: usize },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Invalid format (e.g. malformed email).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Value is not in the allowed set.
    #[error("{field} '{value}' must be one of: {allowed:?}")]
    NotAllowed {
        field: String,
        value: String,
        allowed: Vec<String>,
    },

    /// Cash tendered does not cover the sale total.
    #[error("tendered {tendered_cents} centavos is less than total {total_cents} centavos")]
    InsufficientTendered {
        total_cents: i64,
        tendered_cents: i64,
    },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================
