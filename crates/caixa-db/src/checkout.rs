//! # Checkout Service
//!
//! The transactional half of the checkout engine: validates a cart against
//! live stock and commits sale + items + stock decrements atomically.
//!
//! ## Finalize Sequence
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │  finalize(operator, lines, method, tendered)                        │
//! │                                                                     │
//! │  1. open till?        no  → PreconditionFailed                      │
//! │  2. cart shape ok?    no  → ValidationError                         │
//! │  ── BEGIN TRANSACTION ──────────────────────────────────────────    │
//! │  3. per line: load active product → NotFound                        │
//! │               qty > stock         → InsufficientStock               │
//! │               snapshot price, accumulate total                      │
//! │  4. settle payment (cash change / non-cash overwrite)               │
//! │  5. guarded decrements: UPDATE ... WHERE stock >= qty               │
//! │     a racing checkout drained stock? → InsufficientStock            │
//! │  6. insert sale + items                                             │
//! │  ── COMMIT ─────────────────────────────────────────────────────    │
//! │                                                                     │
//! │  Any error before commit rolls everything back: stock and ledger    │
//! │  are never partially applied.                                       │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::DbError;
use crate::repository::sale::record_on;
use crate::repository::till::TillRepository;
use caixa_core::checkout::{make_sale_number, settle_payment, validate_cart, CartLine};
use caixa_core::{
    CoreError, CoreResult, Money, OperatorContext, PaymentMethod, Product, Sale, SaleItem,
    SaleStatus,
};

/// What the till screen needs after a successful checkout.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckoutReceipt {
    pub sale_id: String,
    pub sale_number: String,
    pub sold_at: DateTime<Utc>,
    pub total_cents: i64,
    pub tendered_cents: i64,
    pub change_cents: i64,
    pub payment_method: PaymentMethod,
}

impl CheckoutReceipt {
    #[inline]
    pub fn change(&self) -> Money {
        Money::from_cents(self.change_cents)
    }
}

/// The checkout engine: gated by the till, committed atomically.
#[derive(Debug, Clone)]
pub struct CheckoutService {
    pool: SqlitePool,
}

impl CheckoutService {
    /// Creates a new CheckoutService.
    pub fn new(pool: SqlitePool) -> Self {
        CheckoutService { pool }
    }

    /// Finalizes a sale for the calling operator.
    ///
    /// All-or-nothing: on success the sale, its items and every stock
    /// decrement are committed together; on any error nothing persists.
    pub async fn finalize(
        &self,
        operator: &OperatorContext,
        lines: &[CartLine],
        method: PaymentMethod,
        tendered_cents: i64,
    ) -> CoreResult<CheckoutReceipt> {
        // no sale without an open drawer
        let tills = TillRepository::new(self.pool.clone());
        if tills.open_session(&operator.operator_id).await?.is_none() {
            return Err(CoreError::Precondition(
                "operator has no open till session".to_string(),
            ));
        }

        validate_cart(lines)?;

        debug!(
            operator_id = %operator.operator_id,
            lines = lines.len(),
            method = %method,
            "finalizing sale"
        );

        let mut tx = self.pool.begin().await.map_err(DbError::from)?;

        let sold_at = Utc::now();
        let sale_id = Uuid::new_v4().to_string();

        // Pass 1: read and validate every line, snapshot prices, total up.
        let mut items = Vec::with_capacity(lines.len());
        let mut total = Money::zero();

        for line in lines {
            let product = sqlx::query_as::<_, Product>(
                "SELECT id, barcode, name, description, price_cents, cost_cents,
                        category, stock, min_stock, image_path, is_active,
                        created_at, updated_at
                 FROM products
                 WHERE id = ?1 AND is_active = 1",
            )
            .bind(&line.product_id)
            .fetch_optional(&mut *tx)
            .await
            .map_err(DbError::from)?
            .ok_or_else(|| CoreError::not_found("Product", &line.product_id))?;

            if !product.has_stock_for(line.quantity) {
                return Err(CoreError::InsufficientStock {
                    name: product.name,
                    available: product.stock,
                    requested: line.quantity,
                });
            }

            let subtotal = product.price().multiply_quantity(line.quantity);
            total += subtotal;

            items.push(SaleItem {
                id: Uuid::new_v4().to_string(),
                sale_id: sale_id.clone(),
                product_id: product.id,
                barcode_snapshot: product.barcode,
                name_snapshot: product.name,
                unit_price_cents: product.price_cents,
                quantity: line.quantity,
                subtotal_cents: subtotal.cents(),
            });
        }

        let settlement = settle_payment(method, total, Money::from_cents(tendered_cents))?;

        // Pass 2: guarded decrements. The stock >= qty guard re-checks under
        // the write lock; a racing checkout that drained stock first makes
        // the guard miss and this whole transaction rolls back.
        for item in &items {
            let result = sqlx::query(
                "UPDATE products
                 SET stock = stock - ?2, updated_at = ?3
                 WHERE id = ?1 AND stock >= ?2",
            )
            .bind(&item.product_id)
            .bind(item.quantity)
            .bind(sold_at)
            .execute(&mut *tx)
            .await
            .map_err(DbError::from)?;

            if result.rows_affected() == 0 {
                return Err(CoreError::InsufficientStock {
                    name: item.name_snapshot.clone(),
                    available: 0,
                    requested: item.quantity,
                });
            }
        }

        let sale = Sale {
            id: sale_id.clone(),
            sale_number: make_sale_number(sold_at),
            sold_at,
            total_cents: total.cents(),
            tendered_cents: settlement.tendered_cents,
            change_cents: settlement.change_cents,
            payment_method: method,
            status: SaleStatus::Finalized,
            operator_id: operator.operator_id.clone(),
        };

        record_on(&mut tx, &sale, &items).await?;

        tx.commit()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        info!(
            sale_id = %sale.id,
            sale_number = %sale.sale_number,
            total = %sale.total(),
            change = %sale.change(),
            items = items.len(),
            "sale finalized"
        );

        Ok(CheckoutReceipt {
            sale_id: sale.id,
            sale_number: sale.sale_number,
            sold_at,
            total_cents: sale.total_cents,
            tendered_cents: sale.tendered_cents,
            change_cents: sale.change_cents,
            payment_method: method,
        })
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
