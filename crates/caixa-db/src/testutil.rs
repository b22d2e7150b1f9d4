//! Shared helpers for the database tests: an in-memory database and a few
//! realistic fixtures.

use chrono::{DateTime, Utc};
use std::sync::atomic::{AtomicI64, Ordering};
use uuid::Uuid;

use crate::pool::{Database, DbConfig};
use caixa_core::{Operator, PaymentMethod, Product, Role, Sale, SaleItem, SaleStatus};

/// Fresh in-memory database with the full schema applied.
pub(crate) async fn test_db() -> Database {
    Database::new(DbConfig::in_memory()).await.expect("in-memory db")
}

/// An active product with a fresh id. min_stock is zero; tests that exercise
/// the low-stock threshold set it explicitly.
pub(crate) fn sample_product(barcode: &str, name: &str, price_cents: i64, stock: i64) -> Product {
    let now = Utc::now();
    Product {
        id: Uuid::new_v4().to_string(),
        barcode: barcode.to_string(),
        name: name.to_string(),
        description: None,
        price_cents,
        cost_cents: price_cents * 60 / 100,
        category: Some("Alimentos".to_string()),
        stock,
        min_stock: 0,
        image_path: None,
        is_active: true,
        created_at: now,
        updated_at: now,
    }
}

/// Inserts the standard two-person roster: one admin, one cashier.
pub(crate) async fn staff(db: &Database) -> (Operator, Operator) {
    let now = Utc::now();

    let admin = Operator {
        id: Uuid::new_v4().to_string(),
        name: "Administrador".to_string(),
        email: "admin@loja.com".to_string(),
        role: Role::Admin,
        is_active: true,
        created_at: now,
    };
    let cashier = Operator {
        id: Uuid::new_v4().to_string(),
        name: "Operador Caixa".to_string(),
        email: "caixa@loja.com".to_string(),
        role: Role::Cashier,
        is_active: true,
        created_at: now,
    };

    db.operators().insert(&admin).await.expect("insert admin");
    db.operators().insert(&cashier).await.expect("insert cashier");

    (admin, cashier)
}

// Monotonic sale-number source: back-to-back fixtures in one test would
// otherwise collide on the millisecond-derived number.
static SALE_SEQ: AtomicI64 = AtomicI64::new(1_700_000_000_000);

/// Records one single-item finalized sale directly on the ledger (bypassing
/// the till gate) and returns the sale id.
pub(crate) async fn recorded_sale(
    db: &Database,
    operator_id: &str,
    product: &Product,
    quantity: i64,
    method: PaymentMethod,
    sold_at: DateTime<Utc>,
) -> String {
    let sale_id = Uuid::new_v4().to_string();
    let subtotal = product.price_cents * quantity;

    let sale = Sale {
        id: sale_id.clone(),
        sale_number: format!("V{}", SALE_SEQ.fetch_add(1, Ordering::SeqCst)),
        sold_at,
        total_cents: subtotal,
        tendered_cents: subtotal,
        change_cents: 0,
        payment_method: method,
        status: SaleStatus::Finalized,
        operator_id: operator_id.to_string(),
    };

    let item = SaleItem {
        id: Uuid::new_v4().to_string(),
        sale_id: sale_id.clone(),
        product_id: product.id.clone(),
        barcode_snapshot: product.barcode.clone(),
        name_snapshot: product.name.clone(),
        unit_price_cents: product.price_cents,
        quantity,
        subtotal_cents: subtotal,
    };

    db.ledger().record(&sale, &[item]).await.expect("record sale");
    sale_id
}
