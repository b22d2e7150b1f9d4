//! # Catalog Repository
//!
//! Database operations for the product catalog.
//!
//! ## Key Operations
//! - Lookup by barcode (with id fallback, the way the till scans)
//! - Substring search for the F2 lookup modal
//! - Low-stock queries
//! - Soft delete (sale history must stay resolvable)
//!
//! ## Search
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │  Cashier types: "ar"                                                │
//! │       │                                                             │
//! │       ▼                                                             │
//! │  < 2 characters? return empty without touching the store            │
//! │       │                                                             │
//! │       ▼                                                             │
//! │  case-insensitive substring over name OR barcode, active only       │
//! │       │                                                             │
//! │       ▼                                                             │
//! │  "Arroz Integral 1kg"  ← match (ordered by name, capped at 20)      │
//! │  "Café em Pó 500g"     ← no match                                   │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;
use uuid::Uuid;

use crate::error::DbError;
use caixa_core::validation::{
    normalize_search_term, validate_barcode, validate_name, validate_price_cents,
    SEARCH_RESULT_CAP,
};
use caixa_core::{CoreError, CoreResult, Product};

const PRODUCT_COLUMNS: &str = "id, barcode, name, description, price_cents, cost_cents, \
     category, stock, min_stock, image_path, is_active, created_at, updated_at";

/// Repository for product catalog operations.
///
/// ## Usage
/// ```rust,ignore
/// let catalog = CatalogRepository::new(pool);
///
/// let results = catalog.search("arroz").await?;
/// let product = catalog.find_by_code("7891000315507").await?;
/// ```
#[derive(Debug, Clone)]
pub struct CatalogRepository {
    pool: SqlitePool,
}

impl CatalogRepository {
    /// Creates a new CatalogRepository.
    pub fn new(pool: SqlitePool) -> Self {
        CatalogRepository { pool }
    }

    /// Inserts a new product.
    ///
    /// Fails with `Conflict` when the barcode is already registered -
    /// checked against every row, active or not, since reactivating an old
    /// product must not collide with a new one.
    pub async fn insert(&self, product: &Product) -> CoreResult<()> {
        validate_barcode(&product.barcode)?;
        validate_name(&product.name)?;
        validate_price_cents(product.price_cents)?;
        validate_price_cents(product.cost_cents)?;

        debug!(barcode = %product.barcode, "inserting product");

        if self.barcode_taken(&product.barcode, None).await? {
            return Err(CoreError::conflict("barcode", &product.barcode));
        }

        sqlx::query(
            "INSERT INTO products (
                id, barcode, name, description, price_cents, cost_cents,
                category, stock, min_stock, image_path, is_active,
                created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)",
        )
        .bind(&product.id)
        .bind(&product.barcode)
        .bind(&product.name)
        .bind(&product.description)
        .bind(product.price_cents)
        .bind(product.cost_cents)
        .bind(&product.category)
        .bind(product.stock)
        .bind(product.min_stock)
        .bind(&product.image_path)
        .bind(product.is_active)
        .bind(product.created_at)
        .bind(product.updated_at)
        .execute(&self.pool)
        .await
        .map_err(DbError::from)?;

        Ok(())
    }

    /// Updates an existing product.
    ///
    /// Fails with `Conflict` when the new barcode belongs to another row,
    /// `NotFound` when the product doesn't exist.
    pub async fn update(&self, product: &Product) -> CoreResult<()> {
        validate_barcode(&product.barcode)?;
        validate_name(&product.name)?;
        validate_price_cents(product.price_cents)?;
        validate_price_cents(product.cost_cents)?;

        debug!(id = %product.id, "updating product");

        if self.barcode_taken(&product.barcode, Some(&product.id)).await? {
            return Err(CoreError::conflict("barcode", &product.barcode));
        }

        let now = Utc::now();

        let result = sqlx::query(
            "UPDATE products SET
                barcode = ?2,
                name = ?3,
                description = ?4,
                price_cents = ?5,
                cost_cents = ?6,
                category = ?7,
                stock = ?8,
                min_stock = ?9,
                is_active = ?10,
                updated_at = ?11
            WHERE id = ?1",
        )
        .bind(&product.id)
        .bind(&product.barcode)
        .bind(&product.name)
        .bind(&product.description)
        .bind(product.price_cents)
        .bind(product.cost_cents)
        .bind(&product.category)
        .bind(product.stock)
        .bind(product.min_stock)
        .bind(product.is_active)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(DbError::from)?;

        if result.rows_affected() == 0 {
            return Err(CoreError::not_found("Product", &product.id));
        }

        Ok(())
    }

    /// Looks up a product the way the till scans: by barcode first, then by
    /// id when no barcode matches. Active products only - for checkout
    /// purposes an inactive product does not exist.
    pub async fn find_by_code(&self, code: &str) -> CoreResult<Option<Product>> {
        let by_barcode = sqlx::query_as::<_, Product>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE barcode = ?1 AND is_active = 1"
        ))
        .bind(code)
        .fetch_optional(&self.pool)
        .await
        .map_err(DbError::from)?;

        if by_barcode.is_some() {
            return Ok(by_barcode);
        }

        self.find_by_id(code).await
    }

    /// Gets an active product by its ID. Inactive rows read as not-found.
    pub async fn find_by_id(&self, id: &str) -> CoreResult<Option<Product>> {
        let product = sqlx::query_as::<_, Product>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE id = ?1 AND is_active = 1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(DbError::from)?;

        Ok(product)
    }

    /// Gets a product by ID regardless of the active flag. For resolving
    /// historical sale items, never for selling.
    pub async fn find_by_id_any(&self, id: &str) -> CoreResult<Option<Product>> {
        let product = sqlx::query_as::<_, Product>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE id = ?1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(DbError::from)?;

        Ok(product)
    }

    /// Case-insensitive substring search over name OR barcode.
    ///
    /// Active products only, ordered by name, capped at
    /// [`SEARCH_RESULT_CAP`]. Terms shorter than 2 characters return an
    /// empty result immediately.
    pub async fn search(&self, term: &str) -> CoreResult<Vec<Product>> {
        let term = match normalize_search_term(term)? {
            Some(t) => t,
            None => return Ok(Vec::new()),
        };

        debug!(term = %term, "searching catalog");

        let pattern = format!("%{}%", term);

        let products = sqlx::query_as::<_, Product>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products
             WHERE (name LIKE ?1 OR barcode LIKE ?1) AND is_active = 1
             ORDER BY name
             LIMIT ?2"
        ))
        .bind(&pattern)
        .bind(SEARCH_RESULT_CAP)
        .fetch_all(&self.pool)
        .await
        .map_err(DbError::from)?;

        debug!(count = products.len(), "search returned products");
        Ok(products)
    }

    /// Active products at or below their minimum stock threshold.
    pub async fn low_stock(&self) -> CoreResult<Vec<Product>> {
        let products = sqlx::query_as::<_, Product>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products
             WHERE is_active = 1 AND stock <= min_stock
             ORDER BY name"
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(DbError::from)?;

        Ok(products)
    }

    /// Number of active products at or below their minimum stock.
    pub async fn low_stock_count(&self) -> CoreResult<i64> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM products WHERE is_active = 1 AND stock <= min_stock",
        )
        .fetch_one(&self.pool)
        .await
        .map_err(DbError::from)?;

        Ok(count)
    }

    /// Restock / stock correction by delta. Sale decrements never go through
    /// here - they happen inside the checkout transaction.
    ///
    /// Rejects adjustments that would take stock negative.
    pub async fn adjust_stock(&self, id: &str, delta: i64) -> CoreResult<()> {
        debug!(id = %id, delta = %delta, "adjusting stock");

        let now = Utc::now();

        let result = sqlx::query(
            "UPDATE products
             SET stock = stock + ?2, updated_at = ?3
             WHERE id = ?1 AND stock + ?2 >= 0",
        )
        .bind(id)
        .bind(delta)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(DbError::from)?;

        if result.rows_affected() == 0 {
            // guard missed: either the row is gone or the delta underflows
            return match self.find_by_id_any(id).await? {
                None => Err(CoreError::not_found("Product", id)),
                Some(p) => Err(CoreError::InsufficientStock {
                    name: p.name,
                    available: p.stock,
                    requested: -delta,
                }),
            };
        }

        Ok(())
    }

    /// Stores the relative image path handed back by the external image
    /// store.
    pub async fn set_image_path(&self, id: &str, path: &str) -> CoreResult<()> {
        let now = Utc::now();

        let result = sqlx::query(
            "UPDATE products SET image_path = ?2, updated_at = ?3 WHERE id = ?1",
        )
        .bind(id)
        .bind(path)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(DbError::from)?;

        if result.rows_affected() == 0 {
            return Err(CoreError::not_found("Product", id));
        }

        Ok(())
    }

    /// Soft-deletes a product by clearing is_active.
    ///
    /// The row stays: historical sale items reference it and reports join
    /// through it.
    pub async fn deactivate(&self, id: &str) -> CoreResult<()> {
        debug!(id = %id, "deactivating product");

        let now = Utc::now();

        let result = sqlx::query(
            "UPDATE products SET is_active = 0, updated_at = ?2 WHERE id = ?1",
        )
        .bind(id)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(DbError::from)?;

        if result.rows_affected() == 0 {
            return Err(CoreError::not_found("Product", id));
        }

        Ok(())
    }

    /// Full catalog listing for the back office, inactive rows included,
    /// ordered by name.
    pub async fn list_all(&self) -> CoreResult<Vec<Product>> {
        let products = sqlx::query_as::<_, Product>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products ORDER BY name"
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(DbError::from)?;

        Ok(products)
    }

    /// Counts active products.
    pub async fn count_active(&self) -> CoreResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products WHERE is_active = 1")
            .fetch_one(&self.pool)
            .await
            .map_err(DbError::from)?;

        Ok(count)
    }

    /// Whether a barcode is already registered to some other row.
    async fn barcode_taken(&self, barcode: &str, except_id: Option<&str>) -> CoreResult<bool> {
        let existing: Option<String> = sqlx::query_scalar(
            "SELECT id FROM products WHERE barcode = ?1 AND (?2 IS NULL OR id <> ?2)",
        )
        .bind(barcode)
        .bind(except_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(DbError::from)?;

        Ok(existing.is_some())
    }
}

/// Helper to generate a new product ID.
pub fn generate_product_id() -> String {
    Uuid::new_v4().to_string()
}

// =============================================================================
// Unit Tests
// =============================================================================
