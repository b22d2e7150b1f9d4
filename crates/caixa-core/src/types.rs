//! # Domain Types
//!
//! Core domain types used throughout Caixa POS.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                │
//! │                                                                     │
//! │  ┌───────────────┐   ┌───────────────┐   ┌───────────────────┐     │
//! │  │   Operator    │   │    Product    │   │       Sale        │     │
//! │  │ ───────────── │   │ ───────────── │   │ ───────────────── │     │
//! │  │ id (UUID)     │   │ id (UUID)     │   │ id (UUID)         │     │
//! │  │ email (biz)   │   │ barcode (biz) │   │ sale_number (biz) │     │
//! │  │ role          │   │ price_cents   │   │ payment_method    │     │
//! │  └───────────────┘   └───────────────┘   └──────┬────────────┘     │
//! │                                                 │ owns             │
//! │  ┌───────────────┐   ┌───────────────┐   ┌──────┴────────────┐     │
//! │  │  TillSession  │   │ PaymentMethod │   │     SaleItem      │     │
//! │  │ ───────────── │   │ ───────────── │   │ ───────────────── │     │
//! │  │ opened_at     │   │ Dinheiro      │   │ price snapshot    │     │
//! │  │ closed_at?    │   │ Cartao        │   │ quantity          │     │
//! │  │ declared?     │   │ Pix           │   │ subtotal          │     │
//! │  └───────────────┘   └───────────────┘   └───────────────────┘     │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Dual-Key Identity Pattern
//! Every entity has:
//! - `id`: UUID v4 - immutable, used for database relations
//! - Business ID: (barcode, email, sale_number) - human-readable
//!
//! Wire literals follow the store's conventions: roles are `admin`/`caixa`,
//! payment methods `dinheiro`/`cartao`/`pix`, statuses
//! `finalizada`/`cancelada` and `aberto`/`fechado`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ValidationError;
use crate::money::Money;

// =============================================================================
// Operator
// =============================================================================

/// Role of a system operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
pub enum Role {
    /// Back-office administrator: catalog, users, reports, oversight.
    #[serde(rename = "admin")]
    #[cfg_attr(feature = "sqlx", sqlx(rename = "admin"))]
    Admin,
    /// Till operator: opens/closes a drawer and sells.
    #[serde(rename = "caixa")]
    #[cfg_attr(feature = "sqlx", sqlx(rename = "caixa"))]
    Cashier,
}

impl Role {
    /// Checks if this role grants administrative access.
    #[inline]
    pub const fn is_admin(&self) -> bool {
        matches!(self, Role::Admin)
    }
}

/// A system operator (admin or cashier).
///
/// Carries no credential material: authentication lives outside the core,
/// which trusts the identity handed to it via [`OperatorContext`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Operator {
    /// Unique identifier (UUID v4).
    pub id: String,
    /// Display name.
    pub name: String,
    /// Login identity - unique across all operators, active or not.
    pub email: String,
    pub role: Role,
    /// Soft-delete flag. Deactivated operators keep their sale and till
    /// history (audit requirement), they just can no longer operate.
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

/// The authenticated caller of a core operation.
///
/// The original system read `current_user` out of ambient request state;
/// here the identity is an explicit parameter on every operation that
/// needs one.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OperatorContext {
    pub operator_id: String,
    pub role: Role,
}

impl OperatorContext {
    pub fn new(operator_id: impl Into<String>, role: Role) -> Self {
        OperatorContext {
            operator_id: operator_id.into(),
            role,
        }
    }

    #[inline]
    pub const fn is_admin(&self) -> bool {
        self.role.is_admin()
    }
}

// =============================================================================
// Product
// =============================================================================

/// A product available for sale.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Product {
    /// Unique identifier (UUID v4).
    pub id: String,
    /// Barcode (EAN-13 etc.) - the business identifier cashiers scan.
    pub barcode: String,
    /// Display name shown at the till and on receipts.
    pub name: String,
    pub description: Option<String>,
    /// Sell price in centavos.
    pub price_cents: i64,
    /// Cost price in centavos (margin reporting).
    pub cost_cents: i64,
    pub category: Option<String>,
    /// Current stock count. Never goes negative through a committed sale.
    pub stock: i64,
    /// Low-stock alarm threshold.
    pub min_stock: i64,
    /// Relative path handed back by the external image store.
    pub image_path: Option<String>,
    /// Soft-delete flag; inactive products are invisible to checkout.
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// Returns the sell price as a Money type.
    #[inline]
    pub fn price(&self) -> Money {
        Money::from_cents(self.price_cents)
    }

    /// Returns the cost price as a Money type.
    #[inline]
    pub fn cost(&self) -> Money {
        Money::from_cents(self.cost_cents)
    }

    /// Low stock = stock at or below the minimum threshold.
    #[inline]
    pub const fn is_low_stock(&self) -> bool {
        self.stock <= self.min_stock
    }

    /// Checks whether a requested quantity can be served from stock.
    #[inline]
    pub const fn has_stock_for(&self, quantity: i64) -> bool {
        self.stock >= quantity
    }
}

// =============================================================================
// Payment Method
// =============================================================================

/// How a sale was paid. Closed set; the wire literals are fixed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
pub enum PaymentMethod {
    /// Physical cash. The only method that feeds the drawer, and therefore
    /// the only one counted by the default expected-cash basis.
    #[serde(rename = "dinheiro")]
    #[cfg_attr(feature = "sqlx", sqlx(rename = "dinheiro"))]
    Dinheiro,
    /// Card on an external terminal.
    #[serde(rename = "cartao")]
    #[cfg_attr(feature = "sqlx", sqlx(rename = "cartao"))]
    Cartao,
    /// Instant bank transfer.
    #[serde(rename = "pix")]
    #[cfg_attr(feature = "sqlx", sqlx(rename = "pix"))]
    Pix,
}

impl PaymentMethod {
    /// All methods, in display order.
    pub const ALL: [PaymentMethod; 3] =
        [PaymentMethod::Dinheiro, PaymentMethod::Cartao, PaymentMethod::Pix];

    /// Whether this method puts money in the physical drawer.
    #[inline]
    pub const fn is_cash(&self) -> bool {
        matches!(self, PaymentMethod::Dinheiro)
    }

    /// The wire literal for this method.
    pub const fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::Dinheiro => "dinheiro",
            PaymentMethod::Cartao => "cartao",
            PaymentMethod::Pix => "pix",
        }
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PaymentMethod {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "dinheiro" => Ok(PaymentMethod::Dinheiro),
            "cartao" => Ok(PaymentMethod::Cartao),
            "pix" => Ok(PaymentMethod::Pix),
            other => Err(ValidationError::NotAllowed {
                field: "payment_method".to_string(),
                value: other.to_string(),
                allowed: vec![
                    "dinheiro".to_string(),
                    "cartao".to_string(),
                    "pix".to_string(),
                ],
            }),
        }
    }
}

// =============================================================================
// Sale
// =============================================================================

/// The status of a sale transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
pub enum SaleStatus {
    /// Committed at the till; counts toward every total.
    #[serde(rename = "finalizada")]
    #[cfg_attr(feature = "sqlx", sqlx(rename = "finalizada"))]
    Finalized,
    /// Cancelled after the fact; excluded from every total.
    #[serde(rename = "cancelada")]
    #[cfg_attr(feature = "sqlx", sqlx(rename = "cancelada"))]
    Cancelled,
}

/// A finalized (or later cancelled) sale transaction.
///
/// Append-only: after insert the only mutation ever applied is the
/// `finalizada → cancelada` status transition.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Sale {
    pub id: String,
    /// Human-readable identifier: `V` + finalize-time millisecond timestamp.
    pub sale_number: String,
    pub sold_at: DateTime<Utc>,
    /// Sum of item subtotals.
    pub total_cents: i64,
    /// Amount the customer handed over. For non-cash methods this is forced
    /// equal to the total.
    pub tendered_cents: i64,
    /// tendered - total for cash; always zero for non-cash.
    pub change_cents: i64,
    pub payment_method: PaymentMethod,
    pub status: SaleStatus,
    pub operator_id: String,
}

impl Sale {
    #[inline]
    pub fn total(&self) -> Money {
        Money::from_cents(self.total_cents)
    }

    #[inline]
    pub fn change(&self) -> Money {
        Money::from_cents(self.change_cents)
    }
}

/// A line item in a sale.
///
/// Uses the snapshot pattern: barcode, name and unit price are frozen at
/// sale time so history survives later catalog edits.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct SaleItem {
    pub id: String,
    pub sale_id: String,
    pub product_id: String,
    pub barcode_snapshot: String,
    pub name_snapshot: String,
    /// Unit price in centavos at time of sale (frozen).
    pub unit_price_cents: i64,
    /// Quantity sold, always > 0.
    pub quantity: i64,
    /// unit_price × quantity.
    pub subtotal_cents: i64,
}

impl SaleItem {
    #[inline]
    pub fn unit_price(&self) -> Money {
        Money::from_cents(self.unit_price_cents)
    }

    #[inline]
    pub fn subtotal(&self) -> Money {
        Money::from_cents(self.subtotal_cents)
    }
}

// =============================================================================
// Till Session
// =============================================================================

/// The status of a till (cash drawer) session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
pub enum TillStatus {
    #[serde(rename = "aberto")]
    #[cfg_attr(feature = "sqlx", sqlx(rename = "aberto"))]
    Open,
    #[serde(rename = "fechado")]
    #[cfg_attr(feature = "sqlx", sqlx(rename = "fechado"))]
    Closed,
}

/// One bounded cash-drawer period for one operator.
///
/// ## Lifecycle
/// ```text
/// open(operator, opening_cents)          close(declared_cents)
///        │                                      │
///        ▼                                      ▼
///   ┌─────────┐                           ┌──────────┐
///   │  aberto │ ────────────────────────► │ fechado  │  (terminal)
///   │         │   fills closed_at and     │          │
///   └─────────┘   declared exactly once   └──────────┘
/// ```
///
/// At most one open session per operator. `closed_at`, once written, is the
/// only upper bound ever used when attributing sales to this session.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct TillSession {
    pub id: String,
    pub operator_id: String,
    pub opened_at: DateTime<Utc>,
    /// Opening cash float in centavos.
    pub opening_cents: i64,
    pub status: TillStatus,
    /// Set exactly once, at close. None while open.
    pub closed_at: Option<DateTime<Utc>>,
    /// Cash the operator counted in the drawer at close. None while open.
    pub declared_cents: Option<i64>,
}

impl TillSession {
    #[inline]
    pub const fn is_open(&self) -> bool {
        matches!(self.status, TillStatus::Open)
    }

    #[inline]
    pub fn opening(&self) -> Money {
        Money::from_cents(self.opening_cents)
    }
}

/// Which sales count toward a session's expected cash balance.
///
/// The source system flip-flopped on this rule across revisions; it is a
/// named configuration point here so the choice is explicit and testable.
/// The default counts only cash-tendered sales, matching the latest store
/// behavior (card and pix money never enters the drawer).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ExpectedCashBasis {
    /// Only `dinheiro` sales feed the drawer.
    #[default]
    CashOnly,
    /// Every finalized sale counts, regardless of method.
    AllMethods,
}

/// Everything computed at the instant a till session closes.
///
/// All figures share the same closing instant; re-reading a closed session
/// later reproduces them exactly.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TillCloseSummary {
    pub session_id: String,
    pub closed_at: DateTime<Utc>,
    /// Total of all finalized sales in the window, any payment method
    /// (the figure shown to the operator at close).
    pub sales_total_cents: i64,
    /// Number of finalized sales in the window.
    pub sale_count: i64,
    /// opening + window sales on the configured basis.
    pub expected_cents: i64,
    pub declared_cents: i64,
    /// declared - expected.
    pub variance_cents: i64,
    /// True iff the variance is exactly zero centavos.
    pub balanced: bool,
}

impl TillCloseSummary {
    #[inline]
    pub fn variance(&self) -> Money {
        Money::from_cents(self.variance_cents)
    }
}

/// Oversight row: the till state of one operator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TillActivity {
    pub operator_id: String,
    pub operator_name: String,
    pub state: TillActivityState,
}

/// The most recent till activity of an operator, for the oversight board.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum TillActivityState {
    /// Operator has never opened a till.
    NeverOpened,
    /// Most recent session is still open.
    Open {
        session_id: String,
        opened_at: DateTime<Utc>,
        opening_cents: i64,
    },
    /// Most recent session is closed; variance computed against the
    /// persisted closing instant.
    Closed {
        session_id: String,
        closed_at: DateTime<Utc>,
        expected_cents: i64,
        declared_cents: i64,
        variance_cents: i64,
        /// True when the variance is nonzero and needs operator review.
        flagged: bool,
    },
}

// =============================================================================
// Unit Tests
// =============================================================================
