//! # Sales Ledger Repository
//!
//! Append-only sale records plus the aggregation queries reporting and the
//! till reconciliation are built on.
//!
//! ## Ledger Rules
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │  record()   append-only insert of sale + items, one transaction     │
//! │  cancel()   the ONLY later mutation: finalizada → cancelada          │
//! │             cancelled sales vanish from every total                  │
//! │  delete()   explicit transactional items-then-sale removal           │
//! │                                                                     │
//! │  Every aggregate filters status = 'finalizada' and never errors     │
//! │  on an empty window - it returns zeros.                             │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, NaiveDate, Utc};
use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;
use uuid::Uuid;

use crate::error::DbError;
use caixa_core::report::{
    local_day_end_utc, local_day_start_utc, MethodBreakdown, ReportWindow, SaleItemExportRow,
    SalesSummary, TopProduct,
};
use caixa_core::{
    CoreError, CoreResult, ExpectedCashBasis, OperatorContext, PaymentMethod, Sale, SaleItem,
    SaleStatus,
};

const SALE_COLUMNS: &str = "id, sale_number, sold_at, total_cents, tendered_cents, \
     change_cents, payment_method, status, operator_id";

const SALE_ITEM_COLUMNS: &str = "id, sale_id, product_id, barcode_snapshot, name_snapshot, \
     unit_price_cents, quantity, subtotal_cents";

/// Repository for the sales ledger.
#[derive(Debug, Clone)]
pub struct LedgerRepository {
    pool: SqlitePool,
}

impl LedgerRepository {
    /// Creates a new LedgerRepository.
    pub fn new(pool: SqlitePool) -> Self {
        LedgerRepository { pool }
    }

    // =========================================================================
    // Writes
    // =========================================================================

    /// Records a finalized sale and its items in one transaction.
    ///
    /// Append-only: nothing ever updates these rows afterwards except the
    /// cancellation status flip.
    pub async fn record(&self, sale: &Sale, items: &[SaleItem]) -> CoreResult<()> {
        let mut tx = self.pool.begin().await.map_err(DbError::from)?;

        record_on(&mut tx, sale, items).await?;

        tx.commit()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        Ok(())
    }

    /// Cancels a sale: `finalizada → cancelada`, excluded from all totals.
    ///
    /// Fails with `InvalidState` when already cancelled. Stock is NOT
    /// restocked automatically - that is a deliberate manual back-office
    /// step via the catalog.
    pub async fn cancel(&self, sale_id: &str) -> CoreResult<()> {
        debug!(sale_id = %sale_id, "cancelling sale");

        let sale = self
            .find_by_id(sale_id)
            .await?
            .ok_or_else(|| CoreError::not_found("Sale", sale_id))?;

        if sale.status == SaleStatus::Cancelled {
            return Err(CoreError::invalid_state("sale", "cancelada"));
        }

        let result = sqlx::query(
            "UPDATE sales SET status = 'cancelada' WHERE id = ?1 AND status = 'finalizada'",
        )
        .bind(sale_id)
        .execute(&self.pool)
        .await
        .map_err(DbError::from)?;

        if result.rows_affected() == 0 {
            return Err(CoreError::invalid_state("sale", "cancelada"));
        }

        Ok(())
    }

    /// Deletes a sale and its items.
    ///
    /// Item removal is an explicit step in the same transaction, not a
    /// schema-level cascade.
    pub async fn delete(&self, sale_id: &str) -> CoreResult<()> {
        let mut tx = self.pool.begin().await.map_err(DbError::from)?;

        sqlx::query("DELETE FROM sale_items WHERE sale_id = ?1")
            .bind(sale_id)
            .execute(&mut *tx)
            .await
            .map_err(DbError::from)?;

        let result = sqlx::query("DELETE FROM sales WHERE id = ?1")
            .bind(sale_id)
            .execute(&mut *tx)
            .await
            .map_err(DbError::from)?;

        if result.rows_affected() == 0 {
            // dropping the transaction rolls the item deletes back
            return Err(CoreError::not_found("Sale", sale_id));
        }

        tx.commit()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        Ok(())
    }

    // =========================================================================
    // Lookups
    // =========================================================================

    /// Gets a sale by ID.
    pub async fn find_by_id(&self, id: &str) -> CoreResult<Option<Sale>> {
        let sale = sqlx::query_as::<_, Sale>(&format!(
            "SELECT {SALE_COLUMNS} FROM sales WHERE id = ?1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(DbError::from)?;

        Ok(sale)
    }

    /// Receipt lookup: a sale with its items, in cart order.
    ///
    /// Only an admin or the operator who made the sale may see it.
    pub async fn sale_with_items(
        &self,
        id: &str,
        caller: &OperatorContext,
    ) -> CoreResult<(Sale, Vec<SaleItem>)> {
        let sale = self
            .find_by_id(id)
            .await?
            .ok_or_else(|| CoreError::not_found("Sale", id))?;

        if !caller.is_admin() && sale.operator_id != caller.operator_id {
            return Err(CoreError::Forbidden(
                "receipt belongs to another operator".to_string(),
            ));
        }

        let items = self.items_for(id).await?;
        Ok((sale, items))
    }

    /// All items of a sale, in insertion (cart) order.
    pub async fn items_for(&self, sale_id: &str) -> CoreResult<Vec<SaleItem>> {
        let items = sqlx::query_as::<_, SaleItem>(&format!(
            "SELECT {SALE_ITEM_COLUMNS} FROM sale_items WHERE sale_id = ?1 ORDER BY rowid"
        ))
        .bind(sale_id)
        .fetch_all(&self.pool)
        .await
        .map_err(DbError::from)?;

        Ok(items)
    }

    // =========================================================================
    // Reporting
    // =========================================================================

    /// Headline figures for a report window: count, revenue, average ticket
    /// and the per-payment-method split. Finalized sales only, inclusive
    /// local-day bounds. Empty windows return zeros, never errors.
    pub async fn summary(
        &self,
        window: ReportWindow,
        operator_filter: Option<&str>,
        method_filter: Option<PaymentMethod>,
    ) -> CoreResult<SalesSummary> {
        let (from, to) = window.utc_bounds();

        let (sale_count, total_cents): (i64, i64) = sqlx::query_as(
            "SELECT COUNT(*), COALESCE(SUM(total_cents), 0)
             FROM sales
             WHERE status = 'finalizada'
               AND sold_at BETWEEN ?1 AND ?2
               AND (?3 IS NULL OR operator_id = ?3)
               AND (?4 IS NULL OR payment_method = ?4)",
        )
        .bind(from)
        .bind(to)
        .bind(operator_filter)
        .bind(method_filter)
        .fetch_one(&self.pool)
        .await
        .map_err(DbError::from)?;

        let by_method = sqlx::query_as::<_, MethodBreakdown>(
            "SELECT payment_method AS method,
                    COUNT(*) AS sale_count,
                    COALESCE(SUM(total_cents), 0) AS total_cents
             FROM sales
             WHERE status = 'finalizada'
               AND sold_at BETWEEN ?1 AND ?2
               AND (?3 IS NULL OR operator_id = ?3)
               AND (?4 IS NULL OR payment_method = ?4)
             GROUP BY payment_method
             ORDER BY payment_method",
        )
        .bind(from)
        .bind(to)
        .bind(operator_filter)
        .bind(method_filter)
        .fetch_all(&self.pool)
        .await
        .map_err(DbError::from)?;

        let average_ticket_cents = if sale_count > 0 { total_cents / sale_count } else { 0 };

        Ok(SalesSummary {
            sale_count,
            total_cents,
            average_ticket_cents,
            by_method,
        })
    }

    /// Best sellers: products ranked by summed quantity descending, ties
    /// broken by catalog insertion order (stable across runs).
    pub async fn top_products(
        &self,
        window: ReportWindow,
        operator_filter: Option<&str>,
        method_filter: Option<PaymentMethod>,
        limit: u32,
    ) -> CoreResult<Vec<TopProduct>> {
        let (from, to) = window.utc_bounds();

        let rows = sqlx::query_as::<_, TopProduct>(
            "SELECT p.id AS product_id,
                    p.barcode AS barcode,
                    p.name AS name,
                    SUM(i.quantity) AS quantity_sold,
                    COALESCE(SUM(i.subtotal_cents), 0) AS revenue_cents
             FROM sale_items i
             INNER JOIN sales s ON s.id = i.sale_id
             INNER JOIN products p ON p.id = i.product_id
             WHERE s.status = 'finalizada'
               AND s.sold_at BETWEEN ?1 AND ?2
               AND (?3 IS NULL OR s.operator_id = ?3)
               AND (?4 IS NULL OR s.payment_method = ?4)
             GROUP BY p.id
             ORDER BY SUM(i.quantity) DESC, p.rowid ASC
             LIMIT ?5",
        )
        .bind(from)
        .bind(to)
        .bind(operator_filter)
        .bind(method_filter)
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(DbError::from)?;

        Ok(rows)
    }

    /// Flat sale-item rows for the external spreadsheet exporter, newest
    /// sale first.
    pub async fn export_rows(
        &self,
        window: ReportWindow,
        operator_filter: Option<&str>,
        method_filter: Option<PaymentMethod>,
    ) -> CoreResult<Vec<SaleItemExportRow>> {
        let (from, to) = window.utc_bounds();

        let rows = sqlx::query_as::<_, SaleItemExportRow>(
            "SELECT s.id AS sale_id,
                    s.sale_number AS sale_number,
                    s.sold_at AS sold_at,
                    o.name AS operator_name,
                    s.payment_method AS payment_method,
                    i.barcode_snapshot AS product_barcode,
                    i.name_snapshot AS product_name,
                    i.quantity AS quantity,
                    i.unit_price_cents AS unit_price_cents,
                    i.subtotal_cents AS subtotal_cents
             FROM sale_items i
             INNER JOIN sales s ON s.id = i.sale_id
             INNER JOIN operators o ON o.id = s.operator_id
             WHERE s.status = 'finalizada'
               AND s.sold_at BETWEEN ?1 AND ?2
               AND (?3 IS NULL OR s.operator_id = ?3)
               AND (?4 IS NULL OR s.payment_method = ?4)
             ORDER BY s.sold_at DESC, i.rowid ASC",
        )
        .bind(from)
        .bind(to)
        .bind(operator_filter)
        .bind(method_filter)
        .fetch_all(&self.pool)
        .await
        .map_err(DbError::from)?;

        Ok(rows)
    }

    /// Finalized revenue of one local calendar day, all operators and
    /// methods (the dashboard "sold today" figure).
    pub async fn total_for_local_day(&self, day: NaiveDate) -> CoreResult<i64> {
        let from = local_day_start_utc(day);
        let to = local_day_end_utc(day);

        let total: i64 = sqlx::query_scalar(
            "SELECT COALESCE(SUM(total_cents), 0)
             FROM sales
             WHERE status = 'finalizada' AND sold_at BETWEEN ?1 AND ?2",
        )
        .bind(from)
        .bind(to)
        .fetch_one(&self.pool)
        .await
        .map_err(DbError::from)?;

        Ok(total)
    }

    /// Sum of one operator's finalized sales in `[from, to]` on the given
    /// expected-cash basis - the till reconciliation primitive.
    pub async fn window_cash_total(
        &self,
        operator_id: &str,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
        basis: ExpectedCashBasis,
    ) -> CoreResult<i64> {
        let mut conn = self.pool.acquire().await.map_err(DbError::from)?;
        let total = cash_basis_total_on(&mut conn, operator_id, from, to, basis).await?;
        Ok(total)
    }
}

// =============================================================================
// Connection-level helpers
// =============================================================================
// These take a bare connection so the checkout and till-close transactions
// can run them against their own uncommitted state.

/// Inserts a sale and its items on the given connection.
pub(crate) async fn record_on(
    conn: &mut SqliteConnection,
    sale: &Sale,
    items: &[SaleItem],
) -> CoreResult<()> {
    debug!(id = %sale.id, sale_number = %sale.sale_number, "inserting sale");

    sqlx::query(
        "INSERT INTO sales (
            id, sale_number, sold_at, total_cents, tendered_cents,
            change_cents, payment_method, status, operator_id
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
    )
    .bind(&sale.id)
    .bind(&sale.sale_number)
    .bind(sale.sold_at)
    .bind(sale.total_cents)
    .bind(sale.tendered_cents)
    .bind(sale.change_cents)
    .bind(sale.payment_method)
    .bind(sale.status)
    .bind(&sale.operator_id)
    .execute(&mut *conn)
    .await
    .map_err(DbError::from)?;

    for item in items {
        sqlx::query(
            "INSERT INTO sale_items (
                id, sale_id, product_id, barcode_snapshot, name_snapshot,
                unit_price_cents, quantity, subtotal_cents
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        )
        .bind(&item.id)
        .bind(&item.sale_id)
        .bind(&item.product_id)
        .bind(&item.barcode_snapshot)
        .bind(&item.name_snapshot)
        .bind(item.unit_price_cents)
        .bind(item.quantity)
        .bind(item.subtotal_cents)
        .execute(&mut *conn)
        .await
        .map_err(DbError::from)?;
    }

    Ok(())
}

/// (count, total) of one operator's finalized sales in `[from, to]`, any
/// payment method - the figure shown at till close.
pub(crate) async fn window_stats_on(
    conn: &mut SqliteConnection,
    operator_id: &str,
    from: DateTime<Utc>,
    to: DateTime<Utc>,
) -> CoreResult<(i64, i64)> {
    let row: (i64, i64) = sqlx::query_as(
        "SELECT COUNT(*), COALESCE(SUM(total_cents), 0)
         FROM sales
         WHERE operator_id = ?1
           AND status = 'finalizada'
           AND sold_at BETWEEN ?2 AND ?3",
    )
    .bind(operator_id)
    .bind(from)
    .bind(to)
    .fetch_one(conn)
    .await
    .map_err(DbError::from)?;

    Ok(row)
}

/// Sum of one operator's finalized sales in `[from, to]` on the configured
/// expected-cash basis.
pub(crate) async fn cash_basis_total_on(
    conn: &mut SqliteConnection,
    operator_id: &str,
    from: DateTime<Utc>,
    to: DateTime<Utc>,
    basis: ExpectedCashBasis,
) -> CoreResult<i64> {
    let method_filter = match basis {
        ExpectedCashBasis::CashOnly => Some(PaymentMethod::Dinheiro),
        ExpectedCashBasis::AllMethods => None,
    };

    let total: i64 = sqlx::query_scalar(
        "SELECT COALESCE(SUM(total_cents), 0)
         FROM sales
         WHERE operator_id = ?1
           AND status = 'finalizada'
           AND sold_at BETWEEN ?2 AND ?3
           AND (?4 IS NULL OR payment_method = ?4)",
    )
    .bind(operator_id)
    .bind(from)
    .bind(to)
    .bind(method_filter)
    .fetch_one(conn)
    .await
    .map_err(DbError::from)?;

    Ok(total)
}

/// Generates a new sale ID.
pub fn generate_sale_id() -> String {
    Uuid::new_v4().to_string()
}

/// Generates a new sale item ID.
pub fn generate_sale_item_id() -> String {
    Uuid::new_v4().to_string()
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::{recorded_sale, sample_product, staff, test_db};
    use caixa_core::report::ReportWindow;
    use chrono::{Duration, Local};

    fn today_window() -> ReportWindow {
        ReportWindow::single_day(Local::now().date_naive())
    }

    #[tokio::test]
    async fn test_summary_counts_and_groups_by_method() {
        let db = test_db().await;
        let (admin, cashier) = staff(&db).await;

        let product = sample_product("7891000315507", "Arroz Integral 1kg", 650, 50);
        db.catalog().insert(&product).await.unwrap();

        let now = Utc::now();
        recorded_sale(&db, &cashier.id, &product, 1, PaymentMethod::Dinheiro, now).await;
        recorded_sale(&db, &cashier.id, &product, 2, PaymentMethod::Dinheiro, now).await;
        recorded_sale(&db, &admin.id, &product, 1, PaymentMethod::Pix, now).await;

        let summary = db.ledger().summary(today_window(), None, None).await.unwrap();
        assert_eq!(summary.sale_count, 3);
        assert_eq!(summary.total_cents, 650 + 1300 + 650);
        assert_eq!(summary.average_ticket_cents, summary.total_cents / 3);

        let cash = summary
            .by_method
            .iter()
            .find(|m| m.method == PaymentMethod::Dinheiro)
            .unwrap();
        assert_eq!(cash.sale_count, 2);
        assert_eq!(cash.total_cents, 1950);

        let pix = summary
            .by_method
            .iter()
            .find(|m| m.method == PaymentMethod::Pix)
            .unwrap();
        assert_eq!(pix.sale_count, 1);

        // operator filter
        let only_cashier = db
            .ledger()
            .summary(today_window(), Some(&cashier.id), None)
            .await
            .unwrap();
        assert_eq!(only_cashier.sale_count, 2);

        // method filter
        let only_pix = db
            .ledger()
            .summary(today_window(), None, Some(PaymentMethod::Pix))
            .await
            .unwrap();
        assert_eq!(only_pix.sale_count, 1);
        assert_eq!(only_pix.total_cents, 650);
    }

    #[tokio::test]
    async fn test_cancelled_sales_vanish_from_totals() {
        let db = test_db().await;
        let (_, cashier) = staff(&db).await;

        let product = sample_product("7891000315507", "Arroz Integral 1kg", 650, 50);
        db.catalog().insert(&product).await.unwrap();

        let now = Utc::now();
        let sale_id = recorded_sale(&db, &cashier.id, &product, 1, PaymentMethod::Dinheiro, now).await;
        recorded_sale(&db, &cashier.id, &product, 1, PaymentMethod::Dinheiro, now).await;

        db.ledger().cancel(&sale_id).await.unwrap();

        let summary = db.ledger().summary(today_window(), None, None).await.unwrap();
        assert_eq!(summary.sale_count, 1);
        assert_eq!(summary.total_cents, 650);

        // cancelling twice is an invalid state transition
        let err = db.ledger().cancel(&sale_id).await.unwrap_err();
        assert!(matches!(err, CoreError::InvalidState { .. }));
    }

    #[tokio::test]
    async fn test_empty_window_returns_zeros_not_errors() {
        let db = test_db().await;

        let summary = db.ledger().summary(today_window(), None, None).await.unwrap();
        assert_eq!(summary.sale_count, 0);
        assert_eq!(summary.total_cents, 0);
        assert_eq!(summary.average_ticket_cents, 0);
        assert!(summary.by_method.is_empty());

        let top = db
            .ledger()
            .top_products(today_window(), None, None, 10)
            .await
            .unwrap();
        assert!(top.is_empty());
    }

    #[tokio::test]
    async fn test_top_products_ranked_by_quantity_with_stable_ties() {
        let db = test_db().await;
        let (_, cashier) = staff(&db).await;

        // insertion order: arroz, feijao, cafe
        let arroz = sample_product("1111111111111", "Arroz Integral 1kg", 650, 99);
        let feijao = sample_product("2222222222222", "Feijão Carioca 1kg", 890, 99);
        let cafe = sample_product("3333333333333", "Café em Pó 500g", 1290, 99);
        db.catalog().insert(&arroz).await.unwrap();
        db.catalog().insert(&feijao).await.unwrap();
        db.catalog().insert(&cafe).await.unwrap();

        let now = Utc::now();
        recorded_sale(&db, &cashier.id, &feijao, 5, PaymentMethod::Dinheiro, now).await;
        recorded_sale(&db, &cashier.id, &arroz, 2, PaymentMethod::Dinheiro, now).await;
        recorded_sale(&db, &cashier.id, &cafe, 2, PaymentMethod::Pix, now).await;

        let top = db
            .ledger()
            .top_products(today_window(), None, None, 10)
            .await
            .unwrap();

        assert_eq!(top.len(), 3);
        assert_eq!(top[0].name, "Feijão Carioca 1kg");
        assert_eq!(top[0].quantity_sold, 5);
        // arroz and cafe tie at 2; arroz entered the catalog first
        assert_eq!(top[1].name, "Arroz Integral 1kg");
        assert_eq!(top[2].name, "Café em Pó 500g");
    }

    #[tokio::test]
    async fn test_export_rows_flatten_items_with_operator_and_method() {
        let db = test_db().await;
        let (_, cashier) = staff(&db).await;

        let product = sample_product("7891000315507", "Arroz Integral 1kg", 650, 50);
        db.catalog().insert(&product).await.unwrap();

        let now = Utc::now();
        recorded_sale(&db, &cashier.id, &product, 3, PaymentMethod::Cartao, now).await;

        let rows = db.ledger().export_rows(today_window(), None, None).await.unwrap();
        assert_eq!(rows.len(), 1);

        let row = &rows[0];
        assert_eq!(row.operator_name, "Operador Caixa");
        assert_eq!(row.payment_method, PaymentMethod::Cartao);
        assert_eq!(row.product_barcode, "7891000315507");
        assert_eq!(row.product_name, "Arroz Integral 1kg");
        assert_eq!(row.quantity, 3);
        assert_eq!(row.unit_price_cents, 650);
        assert_eq!(row.subtotal_cents, 1950);
    }

    #[tokio::test]
    async fn test_receipt_lookup_enforces_ownership() {
        let db = test_db().await;
        let (admin, cashier) = staff(&db).await;

        let product = sample_product("7891000315507", "Arroz Integral 1kg", 650, 50);
        db.catalog().insert(&product).await.unwrap();

        let now = Utc::now();
        let sale_id = recorded_sale(&db, &cashier.id, &product, 1, PaymentMethod::Dinheiro, now).await;

        let owner_ctx = OperatorContext::new(&cashier.id, caixa_core::Role::Cashier);
        let (sale, items) = db.ledger().sale_with_items(&sale_id, &owner_ctx).await.unwrap();
        assert_eq!(sale.id, sale_id);
        assert_eq!(items.len(), 1);

        let admin_ctx = OperatorContext::new(&admin.id, caixa_core::Role::Admin);
        assert!(db.ledger().sale_with_items(&sale_id, &admin_ctx).await.is_ok());

        let stranger_ctx = OperatorContext::new("someone-else", caixa_core::Role::Cashier);
        let err = db
            .ledger()
            .sale_with_items(&sale_id, &stranger_ctx)
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::Forbidden(_)));
    }

    #[tokio::test]
    async fn test_delete_removes_items_with_the_sale() {
        let db = test_db().await;
        let (_, cashier) = staff(&db).await;

        let product = sample_product("7891000315507", "Arroz Integral 1kg", 650, 50);
        db.catalog().insert(&product).await.unwrap();

        let sale_id =
            recorded_sale(&db, &cashier.id, &product, 1, PaymentMethod::Dinheiro, Utc::now()).await;

        db.ledger().delete(&sale_id).await.unwrap();

        assert!(db.ledger().find_by_id(&sale_id).await.unwrap().is_none());
        assert!(db.ledger().items_for(&sale_id).await.unwrap().is_empty());

        let err = db.ledger().delete(&sale_id).await.unwrap_err();
        assert!(matches!(err, CoreError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_window_cash_total_respects_basis_and_bounds() {
        let db = test_db().await;
        let (_, cashier) = staff(&db).await;

        let product = sample_product("7891000315507", "Arroz Integral 1kg", 650, 50);
        db.catalog().insert(&product).await.unwrap();

        let now = Utc::now();
        recorded_sale(&db, &cashier.id, &product, 1, PaymentMethod::Dinheiro, now).await;
        recorded_sale(&db, &cashier.id, &product, 1, PaymentMethod::Cartao, now).await;
        // outside the window
        recorded_sale(
            &db,
            &cashier.id,
            &product,
            1,
            PaymentMethod::Dinheiro,
            now - Duration::hours(3),
        )
        .await;

        let from = now - Duration::hours(1);
        let to = now + Duration::hours(1);

        let cash_only = db
            .ledger()
            .window_cash_total(&cashier.id, from, to, ExpectedCashBasis::CashOnly)
            .await
            .unwrap();
        assert_eq!(cash_only, 650);

        let all = db
            .ledger()
            .window_cash_total(&cashier.id, from, to, ExpectedCashBasis::AllMethods)
            .await
            .unwrap();
        assert_eq!(all, 1300);
    }
}
