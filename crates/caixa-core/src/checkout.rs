//! # Checkout Math
//!
//! The pure half of the checkout engine: cart line validation, payment
//! settlement and sale-number generation. The transactional half (stock
//! decrements, ledger insert) lives in caixa-db, which calls into here
//! before touching the store.
//!
//! ## Payment Rules
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │  dinheiro:  change = tendered - total                               │
//! │             tendered < total  →  ValidationError, nothing commits   │
//! │                                                                     │
//! │  cartao,    tendered is overwritten to equal the total              │
//! │  pix:       change = 0                                              │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{CoreResult, ValidationError};
use crate::money::Money;
use crate::types::PaymentMethod;
use crate::validation::validate_quantity;

/// Prefix of every generated sale number.
pub const SALE_NUMBER_PREFIX: &str = "V";

// =============================================================================
// Cart
// =============================================================================

/// One requested line of a checkout: which product, how many.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CartLine {
    pub product_id: String,
    pub quantity: i64,
}

impl CartLine {
    pub fn new(product_id: impl Into<String>, quantity: i64) -> Self {
        CartLine {
            product_id: product_id.into(),
            quantity,
        }
    }
}

/// Validates the cart shape: non-empty, every quantity positive and in range.
///
/// Stock availability is NOT checked here; that requires current store state
/// and happens inside the checkout transaction.
pub fn validate_cart(lines: &[CartLine]) -> CoreResult<()> {
    if lines.is_empty() {
        return Err(ValidationError::Required {
            field: "items".to_string(),
        }
        .into());
    }

    for line in lines {
        validate_quantity(line.quantity)?;
    }

    Ok(())
}

// =============================================================================
// Payment Settlement
// =============================================================================

/// The settled payment figures of a sale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settlement {
    pub tendered_cents: i64,
    pub change_cents: i64,
}

/// Applies the payment rules to a computed total.
///
/// Cash: change = tendered - total, rejecting short payments. Non-cash:
/// the tendered amount is forced equal to the total and change is zero,
/// whatever the caller sent.
pub fn settle_payment(
    method: PaymentMethod,
    total: Money,
    tendered: Money,
) -> CoreResult<Settlement> {
    if method.is_cash() {
        let change = tendered - total;
        if change.is_negative() {
            return Err(ValidationError::InsufficientTendered {
                total_cents: total.cents(),
                tendered_cents: tendered.cents(),
            }
            .into());
        }
        Ok(Settlement {
            tendered_cents: tendered.cents(),
            change_cents: change.cents(),
        })
    } else {
        Ok(Settlement {
            tendered_cents: total.cents(),
            change_cents: 0,
        })
    }
}

// =============================================================================
// Sale Number
// =============================================================================

/// Generates a sale number from the finalize instant: `V` + millisecond
/// timestamp, e.g. `V1718035200123`.
///
/// Milliseconds keep back-to-back sales distinct; a UNIQUE index on the
/// column is the backstop.
pub fn make_sale_number(at: DateTime<Utc>) -> String {
    format!("{}{}", SALE_NUMBER_PREFIX, at.timestamp_millis())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CoreError;
    use chrono::TimeZone;

    #[test]
    fn test_validate_cart_rejects_empty() {
        let err = validate_cart(&[]).unwrap_err();
        assert!(matches!(err, CoreError::Validation(_)));
    }

    #[test]
    fn test_validate_cart_rejects_bad_quantity() {
        assert!(validate_cart(&[CartLine::new("p-1", 0)]).is_err());
        assert!(validate_cart(&[CartLine::new("p-1", -2)]).is_err());
        assert!(validate_cart(&[CartLine::new("p-1", 1), CartLine::new("p-2", 3)]).is_ok());
    }

    #[test]
    fn test_cash_settlement_computes_change() {
        // sale at 6,50, customer hands over 10,00
        let s = settle_payment(
            PaymentMethod::Dinheiro,
            Money::from_cents(650),
            Money::from_cents(1000),
        )
        .unwrap();

        assert_eq!(s.tendered_cents, 1000);
        assert_eq!(s.change_cents, 350);
    }

    #[test]
    fn test_cash_settlement_exact_amount() {
        let s = settle_payment(
            PaymentMethod::Dinheiro,
            Money::from_cents(650),
            Money::from_cents(650),
        )
        .unwrap();

        assert_eq!(s.change_cents, 0);
    }

    #[test]
    fn test_cash_settlement_rejects_short_payment() {
        let err = settle_payment(
            PaymentMethod::Dinheiro,
            Money::from_cents(650),
            Money::from_cents(500),
        )
        .unwrap_err();

        assert!(matches!(
            err,
            CoreError::Validation(ValidationError::InsufficientTendered { .. })
        ));
    }

    #[test]
    fn test_non_cash_overwrites_tendered() {
        // whatever the terminal sent as tendered is ignored for card/pix
        for method in [PaymentMethod::Cartao, PaymentMethod::Pix] {
            let s = settle_payment(method, Money::from_cents(890), Money::from_cents(0)).unwrap();
            assert_eq!(s.tendered_cents, 890);
            assert_eq!(s.change_cents, 0);
        }
    }

    #[test]
    fn test_sale_number_format() {
        let at = Utc.with_ymd_and_hms(2024, 6, 10, 12, 0, 0).unwrap();
        let number = make_sale_number(at);
        assert!(number.starts_with('V'));
        assert_eq!(number, format!("V{}", at.timestamp_millis()));
    }
}
