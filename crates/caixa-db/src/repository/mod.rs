//! # Repository Module
//!
//! Database repository implementations for Caixa POS.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │  Caller                                                             │
//! │     │   db.catalog().search("arroz")                                │
//! │     ▼                                                               │
//! │  CatalogRepository ── SQL ──► SQLite                                │
//! │                                                                     │
//! │  Benefits:                                                          │
//! │  • business rules checked next to the data they guard               │
//! │  • SQL isolated in one place per aggregate                          │
//! │  • connection-level helpers let services join transactions          │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`product::CatalogRepository`] - catalog lookups, search, stock, soft delete
//! - [`operator::OperatorRepository`] - operator records and the staff roster
//! - [`sale::LedgerRepository`] - append-only sales plus reporting aggregates
//! - [`till::TillRepository`] - the cash-drawer state machine

pub mod operator;
pub mod product;
pub mod sale;
pub mod till;
