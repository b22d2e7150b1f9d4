//! # caixa-db: Database Layer for Caixa POS
//!
//! SQLite persistence for the Caixa POS system, built on sqlx.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                       Caixa POS Data Flow                           │
//! │                                                                     │
//! │  Caller (HTTP layer / till UI)                                      │
//! │       │                                                             │
//! │       ▼                                                             │
//! │  ┌───────────────────────────────────────────────────────────────┐ │
//! │  │                    caixa-db (THIS CRATE)                      │ │
//! │  │                                                               │ │
//! │  │  ┌────────────┐  ┌───────────────┐  ┌────────────────────┐   │ │
//! │  │  │  Database  │  │ Repositories  │  │ CheckoutService    │   │ │
//! │  │  │ (pool.rs)  │  │ catalog, till │  │ (one transaction   │   │ │
//! │  │  │ SqlitePool │◄─│ ledger, staff │  │  per finalize)     │   │ │
//! │  │  └────────────┘  └───────────────┘  └────────────────────┘   │ │
//! │  └───────────────────────────────────────────────────────────────┘ │
//! │       │                                                             │
//! │       ▼                                                             │
//! │  SQLite database (WAL mode, foreign keys on)                        │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types
//! - [`api`] - Serialized error payload for API-style callers
//! - [`repository`] - Repository implementations
//! - [`checkout`] - The transactional checkout service
//!
//! ## Usage
//!
//! ```rust,ignore
//! use caixa_db::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("./loja.db")).await?;
//!
//! let results = db.catalog().search("arroz").await?;
//! let receipt = db
//!     .checkout()
//!     .finalize(&ctx, &lines, PaymentMethod::Dinheiro, 1000)
//!     .await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod api;
pub mod checkout;
pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

#[cfg(test)]
pub(crate) mod testutil;

// =============================================================================
// Re-exports
// =============================================================================

pub use api::{ApiError, ErrorCode};
pub use checkout::{CheckoutReceipt, CheckoutService};
pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};

// Repository re-exports for convenience
pub use repository::operator::OperatorRepository;
pub use repository::product::CatalogRepository;
pub use repository::sale::LedgerRepository;
pub use repository::till::TillRepository;
