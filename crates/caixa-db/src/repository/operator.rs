//! # Operator Repository
//!
//! Database operations for operators (admins and cashiers).
//!
//! Operators are soft-deleted only: their sales and till sessions must stay
//! attributable for audit. Credentials are not stored here - authentication
//! is an external collaborator.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;
use uuid::Uuid;

use crate::error::DbError;
use caixa_core::validation::{validate_email, validate_name};
use caixa_core::{CoreError, CoreResult, Operator, OperatorContext};

const OPERATOR_COLUMNS: &str = "id, name, email, role, is_active, created_at";

/// Repository for operator records.
#[derive(Debug, Clone)]
pub struct OperatorRepository {
    pool: SqlitePool,
}

impl OperatorRepository {
    /// Creates a new OperatorRepository.
    pub fn new(pool: SqlitePool) -> Self {
        OperatorRepository { pool }
    }

    /// Inserts a new operator. Fails with `Conflict` when the email is
    /// already registered (to anyone, active or not).
    pub async fn insert(&self, operator: &Operator) -> CoreResult<()> {
        validate_name(&operator.name)?;
        validate_email(&operator.email)?;

        debug!(email = %operator.email, "inserting operator");

        if self.email_taken(&operator.email, None).await? {
            return Err(CoreError::conflict("email", &operator.email));
        }

        sqlx::query(
            "INSERT INTO operators (id, name, email, role, is_active, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        )
        .bind(&operator.id)
        .bind(&operator.name)
        .bind(&operator.email)
        .bind(operator.role)
        .bind(operator.is_active)
        .bind(operator.created_at)
        .execute(&self.pool)
        .await
        .map_err(DbError::from)?;

        Ok(())
    }

    /// Updates name, email and role. Fails with `Conflict` when the new
    /// email belongs to another operator.
    pub async fn update(&self, operator: &Operator) -> CoreResult<()> {
        validate_name(&operator.name)?;
        validate_email(&operator.email)?;

        debug!(id = %operator.id, "updating operator");

        if self.email_taken(&operator.email, Some(&operator.id)).await? {
            return Err(CoreError::conflict("email", &operator.email));
        }

        let result = sqlx::query(
            "UPDATE operators SET name = ?2, email = ?3, role = ?4, is_active = ?5
             WHERE id = ?1",
        )
        .bind(&operator.id)
        .bind(&operator.name)
        .bind(&operator.email)
        .bind(operator.role)
        .bind(operator.is_active)
        .execute(&self.pool)
        .await
        .map_err(DbError::from)?;

        if result.rows_affected() == 0 {
            return Err(CoreError::not_found("Operator", &operator.id));
        }

        Ok(())
    }

    /// Gets an operator by ID, regardless of the active flag.
    pub async fn find_by_id(&self, id: &str) -> CoreResult<Option<Operator>> {
        let operator = sqlx::query_as::<_, Operator>(&format!(
            "SELECT {OPERATOR_COLUMNS} FROM operators WHERE id = ?1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(DbError::from)?;

        Ok(operator)
    }

    /// Gets an active operator by email - the login lookup. Deactivated
    /// operators can no longer sign in.
    pub async fn find_by_email(&self, email: &str) -> CoreResult<Option<Operator>> {
        let operator = sqlx::query_as::<_, Operator>(&format!(
            "SELECT {OPERATOR_COLUMNS} FROM operators WHERE email = ?1 AND is_active = 1"
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(DbError::from)?;

        Ok(operator)
    }

    /// All operators, active or not, ordered by name (back-office listing).
    pub async fn list(&self) -> CoreResult<Vec<Operator>> {
        let operators = sqlx::query_as::<_, Operator>(&format!(
            "SELECT {OPERATOR_COLUMNS} FROM operators ORDER BY name"
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(DbError::from)?;

        Ok(operators)
    }

    /// Active admins and cashiers, ordered by name - the roster the till
    /// oversight board iterates.
    pub async fn active_staff(&self) -> CoreResult<Vec<Operator>> {
        let operators = sqlx::query_as::<_, Operator>(&format!(
            "SELECT {OPERATOR_COLUMNS} FROM operators
             WHERE is_active = 1 AND role IN ('admin', 'caixa')
             ORDER BY name"
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(DbError::from)?;

        Ok(operators)
    }

    /// Soft-deletes an operator.
    ///
    /// Admin-only, and an admin cannot deactivate their own account - the
    /// store must never lock out its last administrator by accident.
    pub async fn deactivate(&self, id: &str, caller: &OperatorContext) -> CoreResult<()> {
        if !caller.is_admin() {
            return Err(CoreError::Forbidden(
                "only administrators manage operators".to_string(),
            ));
        }

        if caller.operator_id == id {
            return Err(CoreError::Forbidden(
                "cannot deactivate your own account".to_string(),
            ));
        }

        debug!(id = %id, "deactivating operator");

        let result = sqlx::query("UPDATE operators SET is_active = 0 WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(DbError::from)?;

        if result.rows_affected() == 0 {
            return Err(CoreError::not_found("Operator", id));
        }

        Ok(())
    }

    /// Whether an email is already registered to some other operator.
    async fn email_taken(&self, email: &str, except_id: Option<&str>) -> CoreResult<bool> {
        let existing: Option<String> = sqlx::query_scalar(
            "SELECT id FROM operators WHERE email = ?1 AND (?2 IS NULL OR id <> ?2)",
        )
        .bind(email)
        .bind(except_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(DbError::from)?;

        Ok(existing.is_some())
    }
}

/// Helper to generate a new operator ID.
pub fn generate_operator_id() -> String {
    Uuid::new_v4().to_string()
}

/// Builds a new active operator record with a fresh ID.
pub fn new_operator(name: &str, email: &str, role: caixa_core::Role) -> Operator {
    Operator {
        id: generate_operator_id(),
        name: name.to_string(),
        email: email.to_string(),
        role,
        is_active: true,
        created_at: Utc::now(),
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::test_db;
    use caixa_core::{CoreError, Role};

    #[tokio::test]
    async fn test_duplicate_email_conflicts() {
        let db = test_db().await;
        let operators = db.operators();

        operators
            .insert(&new_operator("Operador Caixa", "caixa@loja.com", Role::Cashier))
            .await
            .unwrap();

        let err = operators
            .insert(&new_operator("Outro Operador", "caixa@loja.com", Role::Cashier))
            .await
            .unwrap_err();

        assert!(matches!(err, CoreError::Conflict { .. }));
    }

    #[tokio::test]
    async fn test_deactivated_operator_cannot_login_but_stays_listed() {
        let db = test_db().await;
        let operators = db.operators();

        let admin = new_operator("Administrador", "admin@loja.com", Role::Admin);
        let cashier = new_operator("Operador Caixa", "caixa@loja.com", Role::Cashier);
        operators.insert(&admin).await.unwrap();
        operators.insert(&cashier).await.unwrap();

        let ctx = OperatorContext::new(&admin.id, Role::Admin);
        operators.deactivate(&cashier.id, &ctx).await.unwrap();

        assert!(operators.find_by_email("caixa@loja.com").await.unwrap().is_none());
        assert_eq!(operators.list().await.unwrap().len(), 2);
        assert_eq!(operators.active_staff().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_cannot_deactivate_self() {
        let db = test_db().await;
        let operators = db.operators();

        let admin = new_operator("Administrador", "admin@loja.com", Role::Admin);
        operators.insert(&admin).await.unwrap();

        let ctx = OperatorContext::new(&admin.id, Role::Admin);
        let err = operators.deactivate(&admin.id, &ctx).await.unwrap_err();

        assert!(matches!(err, CoreError::Forbidden(_)));
    }

    #[tokio::test]
    async fn test_deactivate_requires_admin() {
        let db = test_db().await;
        let operators = db.operators();

        let admin = new_operator("Administrador", "admin@loja.com", Role::Admin);
        let cashier = new_operator("Operador Caixa", "caixa@loja.com", Role::Cashier);
        operators.insert(&admin).await.unwrap();
        operators.insert(&cashier).await.unwrap();

        let ctx = OperatorContext::new(&cashier.id, Role::Cashier);
        let err = operators.deactivate(&admin.id, &ctx).await.unwrap_err();

        assert!(matches!(err, CoreError::Forbidden(_)));
    }
}
