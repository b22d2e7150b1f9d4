//! # Validation Module
//!
//! Input validation utilities. These run before business logic and before
//! anything touches the database; NOT NULL / UNIQUE / CHECK constraints in
//! the schema are the second line of defense.

use crate::error::ValidationError;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Maximum quantity of a single item in one sale.
///
/// Prevents accidental over-ordering (typing 1000 instead of 10).
pub const MAX_ITEM_QUANTITY: i64 = 999;

/// Search terms shorter than this return no results instead of scanning the
/// whole catalog.
pub const MIN_SEARCH_TERM_LEN: usize = 2;

/// Maximum results a catalog search returns.
pub const SEARCH_RESULT_CAP: u32 = 20;

// =============================================================================
// String Validators
// =============================================================================

/// Validates a product barcode: non-empty, at most 50 characters.
pub fn validate_barcode(barcode: &str) -> ValidationResult<()> {
    let barcode = barcode.trim();

    if barcode.is_empty() {
        return Err(ValidationError::Required {
            field: "barcode".to_string(),
        });
    }

    if barcode.len() > 50 {
        return Err(ValidationError::TooLong {
            field: "barcode".to_string(),
            max: 50,
        });
    }

    Ok(())
}

/// Validates a product or operator name: non-empty, at most 200 characters.
pub fn validate_name(name: &str) -> ValidationResult<()> {
    let name = name.trim();

    if name.is_empty() {
        return Err(ValidationError::Required {
            field: "name".to_string(),
        });
    }

    if name.len() > 200 {
        return Err(ValidationError::TooLong {
            field: "name".to_string(),
            max: 200,
        });
    }

    Ok(())
}

/// Validates an operator email. Shallow on purpose: uniqueness is the store's
/// job and deliverability is the mail system's.
pub fn validate_email(email: &str) -> ValidationResult<()> {
    let email = email.trim();

    if email.is_empty() {
        return Err(ValidationError::Required {
            field: "email".to_string(),
        });
    }

    if email.len() > 100 {
        return Err(ValidationError::TooLong {
            field: "email".to_string(),
            max: 100,
        });
    }

    if !email.contains('@') {
        return Err(ValidationError::InvalidFormat {
            field: "email".to_string(),
            reason: "must contain '@'".to_string(),
        });
    }

    Ok(())
}

/// Normalizes a catalog search term.
///
/// Returns `None` for terms shorter than [`MIN_SEARCH_TERM_LEN`]: the caller
/// answers with an empty result set immediately, never reaching the store.
///
/// ## Example
/// ```rust
/// use caixa_core::validation::normalize_search_term;
///
/// assert_eq!(normalize_search_term("  ar ").unwrap(), Some("ar".to_string()));
/// assert_eq!(normalize_search_term("a").unwrap(), None);
/// ```
pub fn normalize_search_term(term: &str) -> ValidationResult<Option<String>> {
    let term = term.trim();

    if term.len() > 100 {
        return Err(ValidationError::TooLong {
            field: "search term".to_string(),
            max: 100,
        });
    }

    if term.chars().count() < MIN_SEARCH_TERM_LEN {
        return Ok(None);
    }

    Ok(Some(term.to_string()))
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates an item quantity: positive and at most [`MAX_ITEM_QUANTITY`].
pub fn validate_quantity(qty: i64) -> ValidationResult<()> {
    if qty <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }

    if qty > MAX_ITEM_QUANTITY {
        return Err(ValidationError::OutOfRange {
            field: "quantity".to_string(),
            min: 1,
            max: MAX_ITEM_QUANTITY,
        });
    }

    Ok(())
}

/// Validates a price in centavos: non-negative (zero = free item).
pub fn validate_price_cents(cents: i64) -> ValidationResult<()> {
    if cents < 0 {
        return Err(ValidationError::OutOfRange {
            field: "price".to_string(),
            min: 0,
            max: i64::MAX,
        });
    }

    Ok(())
}

/// Validates a cash amount (opening float, declared balance): non-negative.
pub fn validate_cash_amount(cents: i64) -> ValidationResult<()> {
    if cents < 0 {
        return Err(ValidationError::OutOfRange {
            field: "cash amount".to_string(),
            min: 0,
            max: i64::MAX,
        });
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
