//! # caixa-core: Pure Business Logic for Caixa POS
//!
//! This crate is the **heart** of Caixa POS. It contains all business rules
//! as pure functions with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                      Caixa POS Architecture                         │
//! │                                                                     │
//! │  ┌───────────────────────────────────────────────────────────────┐ │
//! │  │                  Front end / HTTP layer                       │ │
//! │  │   (external collaborator: routing, sessions, templates)      │ │
//! │  └──────────────────────────────┬────────────────────────────────┘ │
//! │                                 │                                   │
//! │  ┌──────────────────────────────▼────────────────────────────────┐ │
//! │  │               ★ caixa-core (THIS CRATE) ★                     │ │
//! │  │                                                               │ │
//! │  │  ┌─────────┐ ┌─────────┐ ┌──────────┐ ┌────────┐ ┌─────────┐ │ │
//! │  │  │  money  │ │  types  │ │ checkout │ │ report │ │validation│ │ │
//! │  │  │  Money  │ │ Product │ │ cart and │ │ window │ │  rules  │ │ │
//! │  │  │ centavos│ │ Till... │ │ payment  │ │ bounds │ │  checks │ │ │
//! │  │  └─────────┘ └─────────┘ └──────────┘ └────────┘ └─────────┘ │ │
//! │  │                                                               │ │
//! │  │  NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │ │
//! │  └──────────────────────────────┬────────────────────────────────┘ │
//! │                                 │                                   │
//! │  ┌──────────────────────────────▼────────────────────────────────┐ │
//! │  │                  caixa-db (Database Layer)                    │ │
//! │  │        SQLite repositories, transactional checkout            │ │
//! │  └───────────────────────────────────────────────────────────────┘ │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Operator, Product, Sale, TillSession, ...)
//! - [`money`] - Money type with integer arithmetic (no floating point!)
//! - [`checkout`] - Cart validation, payment settlement, sale numbers
//! - [`report`] - Report windows (local-day bounds) and aggregate shapes
//! - [`error`] - Domain error types
//! - [`validation`] - Input validation rules
//!
//! ## Design Principles
//!
//! 1. **Pure Functions**: deterministic - same input, same output
//! 2. **No I/O**: database, network and file system access are FORBIDDEN here
//! 3. **Integer Money**: all monetary values are centavos (i64), never floats
//! 4. **Explicit Identity**: the authenticated caller is a parameter
//!    ([`OperatorContext`]), never ambient state

// =============================================================================
// Module Declarations
// =============================================================================

pub mod checkout;
pub mod error;
pub mod money;
pub mod report;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================
// These allow users to do `use caixa_core::Money` instead of
// `use caixa_core::money::Money`.

pub use error::{CoreError, CoreResult, ValidationError};
pub use money::Money;
pub use types::*;
