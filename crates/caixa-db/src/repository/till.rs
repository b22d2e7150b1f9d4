//! # Till Session Repository
//!
//! The cash-drawer state machine: open, close, reconcile, oversee.
//!
//! ## Closing Consistency
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │  close(session, declared)                                           │
//! │                                                                     │
//! │  1. closed_at = now()          ← captured ONCE                      │
//! │  2. window totals over [opened_at, closed_at]                       │
//! │  3. expected = opening + cash-basis total (same bounds)             │
//! │  4. persist closed_at + declared, flip status                       │
//! │                                                                     │
//! │  The persisted closed_at is the only upper bound ever used for      │
//! │  this session again. Recomputing "now" in a second query would      │
//! │  attribute a different set of sales than the close did - the        │
//! │  exact inconsistency the original dashboard suffered from.          │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{Local, Utc};
use sqlx::SqlitePool;
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::DbError;
use crate::repository::operator::OperatorRepository;
use crate::repository::sale::{cash_basis_total_on, window_stats_on};
use caixa_core::report::local_day_start_utc;
use caixa_core::validation::validate_cash_amount;
use caixa_core::{
    CoreError, CoreResult, ExpectedCashBasis, Money, OperatorContext, TillActivity,
    TillActivityState, TillCloseSummary, TillSession, TillStatus,
};

const TILL_COLUMNS: &str =
    "id, operator_id, opened_at, opening_cents, status, closed_at, declared_cents";

/// Repository for till (cash drawer) sessions.
#[derive(Debug, Clone)]
pub struct TillRepository {
    pool: SqlitePool,
}

impl TillRepository {
    /// Creates a new TillRepository.
    pub fn new(pool: SqlitePool) -> Self {
        TillRepository { pool }
    }

    // =========================================================================
    // Lifecycle
    // =========================================================================

    /// Opens a new till session for an operator.
    ///
    /// Fails with `Conflict` when the operator already has an open session.
    /// A partial unique index backs this check, so two racing opens cannot
    /// both succeed.
    pub async fn open(&self, operator_id: &str, opening_cents: i64) -> CoreResult<TillSession> {
        validate_cash_amount(opening_cents)?;

        if self.open_session(operator_id).await?.is_some() {
            return Err(CoreError::conflict("open till session", operator_id));
        }

        let session = TillSession {
            id: Uuid::new_v4().to_string(),
            operator_id: operator_id.to_string(),
            opened_at: Utc::now(),
            opening_cents,
            status: TillStatus::Open,
            closed_at: None,
            declared_cents: None,
        };

        debug!(operator_id = %operator_id, opening = %session.opening(), "opening till");

        sqlx::query(
            "INSERT INTO till_sessions (
                id, operator_id, opened_at, opening_cents, status, closed_at, declared_cents
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        )
        .bind(&session.id)
        .bind(&session.operator_id)
        .bind(session.opened_at)
        .bind(session.opening_cents)
        .bind(session.status)
        .bind(session.closed_at)
        .bind(session.declared_cents)
        .execute(&self.pool)
        .await
        .map_err(|e| match DbError::from(e) {
            // lost the race: someone opened between the check and the insert
            DbError::UniqueViolation { .. } => {
                CoreError::conflict("open till session", operator_id)
            }
            other => other.into(),
        })?;

        info!(session_id = %session.id, operator_id = %operator_id, "till opened");
        Ok(session)
    }

    /// Closes a till session, computing the reconciliation figures with one
    /// fixed closing instant.
    ///
    /// Fails with `InvalidState` when the session is not open. The returned
    /// summary and the persisted record share the same `closed_at`, so any
    /// later read reproduces these numbers exactly.
    pub async fn close(
        &self,
        session_id: &str,
        declared_cents: i64,
        basis: ExpectedCashBasis,
    ) -> CoreResult<TillCloseSummary> {
        validate_cash_amount(declared_cents)?;

        let mut tx = self.pool.begin().await.map_err(DbError::from)?;

        let session = sqlx::query_as::<_, TillSession>(&format!(
            "SELECT {TILL_COLUMNS} FROM till_sessions WHERE id = ?1"
        ))
        .bind(session_id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(DbError::from)?
        .ok_or_else(|| CoreError::not_found("Till session", session_id))?;

        if !session.is_open() {
            return Err(CoreError::invalid_state("till session", "fechado"));
        }

        // The single closing instant. Every figure below, and the persisted
        // record, use exactly this value.
        let closed_at = Utc::now();

        let (sale_count, sales_total_cents) =
            window_stats_on(&mut tx, &session.operator_id, session.opened_at, closed_at).await?;

        let basis_total =
            cash_basis_total_on(&mut tx, &session.operator_id, session.opened_at, closed_at, basis)
                .await?;

        let expected_cents = session.opening_cents + basis_total;
        let variance_cents = declared_cents - expected_cents;

        let result = sqlx::query(
            "UPDATE till_sessions
             SET status = 'fechado', closed_at = ?2, declared_cents = ?3
             WHERE id = ?1 AND status = 'aberto'",
        )
        .bind(session_id)
        .bind(closed_at)
        .bind(declared_cents)
        .execute(&mut *tx)
        .await
        .map_err(DbError::from)?;

        if result.rows_affected() == 0 {
            // concurrent close won; nothing here committed
            return Err(CoreError::invalid_state("till session", "fechado"));
        }

        tx.commit()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        let summary = TillCloseSummary {
            session_id: session_id.to_string(),
            closed_at,
            sales_total_cents,
            sale_count,
            expected_cents,
            declared_cents,
            variance_cents,
            balanced: variance_cents == 0,
        };

        info!(
            session_id = %session_id,
            sales_total = %Money::from_cents(sales_total_cents),
            variance = %summary.variance(),
            balanced = summary.balanced,
            "till closed"
        );

        Ok(summary)
    }

    // =========================================================================
    // Lookups
    // =========================================================================

    /// The operator's currently open session, if any - the "is the till
    /// open" gate checkout runs behind.
    pub async fn open_session(&self, operator_id: &str) -> CoreResult<Option<TillSession>> {
        let session = sqlx::query_as::<_, TillSession>(&format!(
            "SELECT {TILL_COLUMNS} FROM till_sessions
             WHERE operator_id = ?1 AND status = 'aberto'"
        ))
        .bind(operator_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(DbError::from)?;

        Ok(session)
    }

    /// Gets a session by ID.
    pub async fn find_by_id(&self, id: &str) -> CoreResult<Option<TillSession>> {
        let session = sqlx::query_as::<_, TillSession>(&format!(
            "SELECT {TILL_COLUMNS} FROM till_sessions WHERE id = ?1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(DbError::from)?;

        Ok(session)
    }

    /// An operator's most recent session by opening time.
    pub async fn latest_for_operator(&self, operator_id: &str) -> CoreResult<Option<TillSession>> {
        let session = sqlx::query_as::<_, TillSession>(&format!(
            "SELECT {TILL_COLUMNS} FROM till_sessions
             WHERE operator_id = ?1
             ORDER BY opened_at DESC
             LIMIT 1"
        ))
        .bind(operator_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(DbError::from)?;

        Ok(session)
    }

    // =========================================================================
    // Reconciliation
    // =========================================================================

    /// The cash the drawer should contain: opening float plus the window's
    /// sales on the configured basis.
    ///
    /// Closed sessions use their persisted closing instant, making the
    /// figure stable under repeated reads. Open sessions have no fixed
    /// upper bound yet, so "now" serves as the provisional window end.
    pub async fn expected_cash(
        &self,
        session: &TillSession,
        basis: ExpectedCashBasis,
    ) -> CoreResult<Money> {
        let upper = match session.closed_at {
            Some(closed_at) => closed_at,
            None => Utc::now(),
        };

        let mut conn = self.pool.acquire().await.map_err(DbError::from)?;
        let basis_total =
            cash_basis_total_on(&mut conn, &session.operator_id, session.opened_at, upper, basis)
                .await?;

        Ok(Money::from_cents(session.opening_cents + basis_total))
    }

    /// declared − expected, for a closed session.
    ///
    /// Fails with `InvalidState` while the session is open: there is no
    /// declared amount to compare against yet.
    pub async fn variance(
        &self,
        session: &TillSession,
        basis: ExpectedCashBasis,
    ) -> CoreResult<Money> {
        let declared = match session.declared_cents {
            Some(declared) if !session.is_open() => Money::from_cents(declared),
            _ => return Err(CoreError::invalid_state("till session", "aberto")),
        };

        let expected = self.expected_cash(session, basis).await?;
        Ok(declared - expected)
    }

    // =========================================================================
    // Oversight
    // =========================================================================

    /// The oversight board: for every active admin/cashier, their most
    /// recent session and - when closed - its variance. Operators who never
    /// opened a till report a distinct state.
    ///
    /// Admin-only.
    pub async fn status_for_all_operators(
        &self,
        caller: &OperatorContext,
        basis: ExpectedCashBasis,
    ) -> CoreResult<Vec<TillActivity>> {
        if !caller.is_admin() {
            return Err(CoreError::Forbidden(
                "till oversight is admin-only".to_string(),
            ));
        }

        let staff = OperatorRepository::new(self.pool.clone()).active_staff().await?;
        let mut board = Vec::with_capacity(staff.len());

        for operator in staff {
            let state = match self.latest_for_operator(&operator.id).await? {
                None => TillActivityState::NeverOpened,

                Some(session) if session.is_open() => TillActivityState::Open {
                    session_id: session.id,
                    opened_at: session.opened_at,
                    opening_cents: session.opening_cents,
                },

                Some(session) => {
                    // closed: recompute against the persisted closing instant
                    let expected = self.expected_cash(&session, basis).await?;
                    let declared = session.declared_cents.unwrap_or(0);
                    let variance_cents = declared - expected.cents();

                    TillActivityState::Closed {
                        session_id: session.id,
                        // the CHECK constraint guarantees closed rows carry
                        // a closing timestamp
                        closed_at: session.closed_at.unwrap_or(session.opened_at),
                        expected_cents: expected.cents(),
                        declared_cents: declared,
                        variance_cents,
                        flagged: variance_cents != 0,
                    }
                }
            };

            board.push(TillActivity {
                operator_id: operator.id,
                operator_name: operator.name,
                state,
            });
        }

        Ok(board)
    }

    /// Sessions still open from a previous local day - tills someone forgot
    /// to close. Newest first.
    pub async fn forgotten_sessions(&self) -> CoreResult<Vec<TillSession>> {
        let midnight = local_day_start_utc(Local::now().date_naive());

        let sessions = sqlx::query_as::<_, TillSession>(&format!(
            "SELECT {TILL_COLUMNS} FROM till_sessions
             WHERE status = 'aberto' AND opened_at < ?1
             ORDER BY opened_at DESC"
        ))
        .bind(midnight)
        .fetch_all(&self.pool)
        .await
        .map_err(DbError::from)?;

        Ok(sessions)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::{recorded_sale, sample_product, staff, test_db};
    use caixa_core::{PaymentMethod, Role};
    use chrono::Duration;

    #[tokio::test]
    async fn test_second_open_conflicts_and_leaves_first_untouched() {
        let db = test_db().await;
        let (_, cashier) = staff(&db).await;
        let tills = db.tills();

        let first = tills.open(&cashier.id, 10000).await.unwrap();

        let err = tills.open(&cashier.id, 5000).await.unwrap_err();
        assert!(matches!(err, CoreError::Conflict { .. }));

        let still_open = tills.open_session(&cashier.id).await.unwrap().unwrap();
        assert_eq!(still_open.id, first.id);
        assert_eq!(still_open.opening_cents, 10000);
    }

    #[tokio::test]
    async fn test_close_balanced_and_flagged() {
        let db = test_db().await;
        let (_, cashier) = staff(&db).await;
        let tills = db.tills();

        // opening float 100,00; one cash sale of 6,50 in the window
        let session = tills.open(&cashier.id, 10000).await.unwrap();

        let product = sample_product("7891000315507", "Arroz Integral 1kg", 650, 50);
        db.catalog().insert(&product).await.unwrap();
        recorded_sale(&db, &cashier.id, &product, 1, PaymentMethod::Dinheiro, Utc::now()).await;

        let summary = tills
            .close(&session.id, 10650, ExpectedCashBasis::CashOnly)
            .await
            .unwrap();

        assert_eq!(summary.sales_total_cents, 650);
        assert_eq!(summary.sale_count, 1);
        assert_eq!(summary.expected_cents, 10650);
        assert_eq!(summary.variance_cents, 0);
        assert!(summary.balanced);

        // same figures when re-derived from the persisted record
        let closed = tills.find_by_id(&session.id).await.unwrap().unwrap();
        assert_eq!(closed.closed_at, Some(summary.closed_at));
        let variance = tills.variance(&closed, ExpectedCashBasis::CashOnly).await.unwrap();
        assert!(variance.is_zero());
    }

    #[tokio::test]
    async fn test_close_with_short_drawer_flags_variance() {
        let db = test_db().await;
        let (_, cashier) = staff(&db).await;
        let tills = db.tills();

        let session = tills.open(&cashier.id, 10000).await.unwrap();

        let product = sample_product("7891000315507", "Arroz Integral 1kg", 650, 50);
        db.catalog().insert(&product).await.unwrap();
        recorded_sale(&db, &cashier.id, &product, 1, PaymentMethod::Dinheiro, Utc::now()).await;

        // operator declares only the float: 6,50 is missing
        let summary = tills
            .close(&session.id, 10000, ExpectedCashBasis::CashOnly)
            .await
            .unwrap();

        assert_eq!(summary.variance_cents, -650);
        assert!(!summary.balanced);
    }

    #[tokio::test]
    async fn test_non_cash_sales_do_not_feed_the_drawer() {
        let db = test_db().await;
        let (_, cashier) = staff(&db).await;
        let tills = db.tills();

        let session = tills.open(&cashier.id, 10000).await.unwrap();

        let product = sample_product("7891000315507", "Arroz Integral 1kg", 650, 50);
        db.catalog().insert(&product).await.unwrap();
        recorded_sale(&db, &cashier.id, &product, 1, PaymentMethod::Dinheiro, Utc::now()).await;
        recorded_sale(&db, &cashier.id, &product, 1, PaymentMethod::Cartao, Utc::now()).await;
        recorded_sale(&db, &cashier.id, &product, 1, PaymentMethod::Pix, Utc::now()).await;

        let summary = tills
            .close(&session.id, 10650, ExpectedCashBasis::CashOnly)
            .await
            .unwrap();

        // all three sales shown to the operator, only cash expected in hand
        assert_eq!(summary.sales_total_cents, 1950);
        assert_eq!(summary.sale_count, 3);
        assert_eq!(summary.expected_cents, 10650);
        assert!(summary.balanced);
    }

    #[tokio::test]
    async fn test_all_methods_basis_counts_everything() {
        let db = test_db().await;
        let (_, cashier) = staff(&db).await;
        let tills = db.tills();

        let session = tills.open(&cashier.id, 10000).await.unwrap();

        let product = sample_product("7891000315507", "Arroz Integral 1kg", 650, 50);
        db.catalog().insert(&product).await.unwrap();
        recorded_sale(&db, &cashier.id, &product, 1, PaymentMethod::Dinheiro, Utc::now()).await;
        recorded_sale(&db, &cashier.id, &product, 1, PaymentMethod::Pix, Utc::now()).await;

        let summary = tills
            .close(&session.id, 11300, ExpectedCashBasis::AllMethods)
            .await
            .unwrap();

        assert_eq!(summary.expected_cents, 11300);
        assert!(summary.balanced);
    }

    #[tokio::test]
    async fn test_close_is_terminal() {
        let db = test_db().await;
        let (_, cashier) = staff(&db).await;
        let tills = db.tills();

        let session = tills.open(&cashier.id, 10000).await.unwrap();
        tills.close(&session.id, 10000, ExpectedCashBasis::CashOnly).await.unwrap();

        let err = tills
            .close(&session.id, 10000, ExpectedCashBasis::CashOnly)
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::InvalidState { .. }));
    }

    #[tokio::test]
    async fn test_sales_after_close_never_join_the_window() {
        let db = test_db().await;
        let (_, cashier) = staff(&db).await;
        let tills = db.tills();

        let session = tills.open(&cashier.id, 10000).await.unwrap();

        let product = sample_product("7891000315507", "Arroz Integral 1kg", 650, 50);
        db.catalog().insert(&product).await.unwrap();
        recorded_sale(&db, &cashier.id, &product, 1, PaymentMethod::Dinheiro, Utc::now()).await;

        let summary = tills
            .close(&session.id, 10650, ExpectedCashBasis::CashOnly)
            .await
            .unwrap();
        assert!(summary.balanced);

        // a sale recorded after the closing instant
        recorded_sale(
            &db,
            &cashier.id,
            &product,
            1,
            PaymentMethod::Dinheiro,
            summary.closed_at + Duration::seconds(5),
        )
        .await;

        // the persisted closing instant keeps the figure stable
        let closed = tills.find_by_id(&session.id).await.unwrap().unwrap();
        let expected = tills
            .expected_cash(&closed, ExpectedCashBasis::CashOnly)
            .await
            .unwrap();
        assert_eq!(expected.cents(), 10650);

        let variance = tills.variance(&closed, ExpectedCashBasis::CashOnly).await.unwrap();
        assert!(variance.is_zero());
    }

    #[tokio::test]
    async fn test_variance_undefined_while_open() {
        let db = test_db().await;
        let (_, cashier) = staff(&db).await;
        let tills = db.tills();

        let session = tills.open(&cashier.id, 10000).await.unwrap();

        let err = tills
            .variance(&session, ExpectedCashBasis::CashOnly)
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::InvalidState { .. }));
    }

    #[tokio::test]
    async fn test_oversight_board_states() {
        let db = test_db().await;
        let (admin, cashier) = staff(&db).await;
        let tills = db.tills();
        let admin_ctx = OperatorContext::new(&admin.id, Role::Admin);

        // nobody opened anything yet
        let board = tills
            .status_for_all_operators(&admin_ctx, ExpectedCashBasis::CashOnly)
            .await
            .unwrap();
        assert_eq!(board.len(), 2);
        assert!(board
            .iter()
            .all(|row| matches!(row.state, TillActivityState::NeverOpened)));

        // cashier opens, sells cash 6,50, closes short by 6,50
        let session = tills.open(&cashier.id, 10000).await.unwrap();
        let product = sample_product("7891000315507", "Arroz Integral 1kg", 650, 50);
        db.catalog().insert(&product).await.unwrap();
        recorded_sale(&db, &cashier.id, &product, 1, PaymentMethod::Dinheiro, Utc::now()).await;
        tills
            .close(&session.id, 10000, ExpectedCashBasis::CashOnly)
            .await
            .unwrap();

        let board = tills
            .status_for_all_operators(&admin_ctx, ExpectedCashBasis::CashOnly)
            .await
            .unwrap();

        let cashier_row = board.iter().find(|r| r.operator_id == cashier.id).unwrap();
        match &cashier_row.state {
            TillActivityState::Closed {
                variance_cents,
                flagged,
                expected_cents,
                declared_cents,
                ..
            } => {
                assert_eq!(*expected_cents, 10650);
                assert_eq!(*declared_cents, 10000);
                assert_eq!(*variance_cents, -650);
                assert!(*flagged);
            }
            other => panic!("expected Closed state, got {:?}", other),
        }

        let admin_row = board.iter().find(|r| r.operator_id == admin.id).unwrap();
        assert!(matches!(admin_row.state, TillActivityState::NeverOpened));
    }

    #[tokio::test]
    async fn test_oversight_is_admin_only() {
        let db = test_db().await;
        let (_, cashier) = staff(&db).await;

        let ctx = OperatorContext::new(&cashier.id, Role::Cashier);
        let err = db
            .tills()
            .status_for_all_operators(&ctx, ExpectedCashBasis::CashOnly)
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::Forbidden(_)));
    }

    #[tokio::test]
    async fn test_forgotten_sessions_are_yesterdays_open_tills() {
        let db = test_db().await;
        let (_, cashier) = staff(&db).await;
        let tills = db.tills();

        let session = tills.open(&cashier.id, 10000).await.unwrap();
        assert!(tills.forgotten_sessions().await.unwrap().is_empty());

        // backdate the opening to two days ago
        let two_days_ago = Utc::now() - Duration::days(2);
        sqlx::query("UPDATE till_sessions SET opened_at = ?2 WHERE id = ?1")
            .bind(&session.id)
            .bind(two_days_ago)
            .execute(db.pool())
            .await
            .unwrap();

        let forgotten = tills.forgotten_sessions().await.unwrap();
        assert_eq!(forgotten.len(), 1);
        assert_eq!(forgotten[0].id, session.id);
    }
}
