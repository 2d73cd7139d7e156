// src/db/complaint_repo.rs

use async_trait::async_trait;
use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::{
        db_utils::{missing_reference, missing_reference_by},
        error::AppError,
    },
    db::store::ComplaintStore,
    models::complaint::{Complaint, ComplaintDetail, ComplaintStatus, NewComplaint},
};

const COMPLAINT_COLUMNS: &str =
    "id, user_id, product_id, assigned_admin_id, message, status, created_at, updated_at";

// Nomes fixados na migração
const AUTHOR_FK: &str = "complaints_user_id_fkey";
const PRODUCT_FK: &str = "complaints_product_id_fkey";
const ADMIN_FK: &str = "complaints_assigned_admin_id_fkey";

/// Referência da reclamação que sumiu entre a checagem e o INSERT.
fn vanished_reference(constraint: Option<&str>) -> Option<AppError> {
    match constraint? {
        PRODUCT_FK => Some(AppError::ProductNotFound),
        ADMIN_FK => Some(AppError::AdminNotFound),
        // autor apagado no meio da requisição: a sessão não vale mais
        AUTHOR_FK => Some(AppError::NotLoggedIn),
        _ => None,
    }
}

#[derive(Clone)]
pub struct ComplaintRepository {
    pool: PgPool,
}

impl ComplaintRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // +1 atômico; cria a linha zerada se ainda não existir
    async fn increment_complaints<'e, E>(&self, executor: E, product_id: Uuid) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query(
            r#"
            INSERT INTO product_stats (product_id, complaints)
            VALUES ($1, 1)
            ON CONFLICT (product_id) DO UPDATE SET
                complaints = product_stats.complaints + 1,
                updated_at = clock_timestamp()
            "#,
        )
        .bind(product_id)
        .execute(executor)
        .await
        .map_err(|e| missing_reference(e, AppError::ProductNotFound))?;
        Ok(())
    }

    // -1 com piso em zero
    async fn decrement_complaints<'e, E>(&self, executor: E, product_id: Uuid) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query(
            r#"
            UPDATE product_stats SET
                complaints = GREATEST(complaints - 1, 0),
                updated_at = clock_timestamp()
            WHERE product_id = $1
            "#,
        )
        .bind(product_id)
        .execute(executor)
        .await?;
        Ok(())
    }
}

#[async_trait]
impl ComplaintStore for ComplaintRepository {
    async fn create(&self, complaint: NewComplaint) -> Result<Complaint, AppError> {
        let mut tx = self.pool.begin().await?;

        let created = sqlx::query_as::<_, Complaint>(&format!(
            r#"
            INSERT INTO complaints (user_id, product_id, assigned_admin_id, message, status)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {COMPLAINT_COLUMNS}
            "#
        ))
        .bind(complaint.user_id)
        .bind(complaint.product_id)
        .bind(complaint.assigned_admin_id)
        .bind(&complaint.message)
        .bind(ComplaintStatus::Received)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| missing_reference_by(e, vanished_reference))?;

        if let Some(product_id) = complaint.product_id {
            self.increment_complaints(&mut *tx, product_id).await?;
        }

        tx.commit().await?;
        Ok(created)
    }

    async fn list(&self, status: Option<ComplaintStatus>) -> Result<Vec<ComplaintDetail>, AppError> {
        let complaints = sqlx::query_as::<_, ComplaintDetail>(
            r#"
            SELECT
                c.id, c.user_id, c.product_id, c.assigned_admin_id, c.message, c.status,
                c.created_at, c.updated_at,
                u.full_name AS user_name,
                u.email AS user_email,
                p.name AS product_name,
                p.thumbnail AS product_thumbnail,
                a.full_name AS assigned_admin_name
            FROM complaints c
            LEFT JOIN users u ON u.id = c.user_id
            LEFT JOIN products p ON p.id = c.product_id
            LEFT JOIN users a ON a.id = c.assigned_admin_id
            WHERE ($1::complaint_status IS NULL OR c.status = $1)
            ORDER BY c.created_at DESC
            "#,
        )
        .bind(status)
        .fetch_all(&self.pool)
        .await?;
        Ok(complaints)
    }

    async fn assign(&self, id: Uuid, admin_id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query(
            "UPDATE complaints SET assigned_admin_id = $2, updated_at = clock_timestamp() WHERE id = $1",
        )
        .bind(id)
        .bind(admin_id)
        .execute(&self.pool)
        .await
        .map_err(|e| missing_reference(e, AppError::AdminNotFound))?;
        Ok(result.rows_affected() > 0)
    }

    async fn set_status(&self, id: Uuid, status: ComplaintStatus) -> Result<bool, AppError> {
        let result = sqlx::query(
            "UPDATE complaints SET status = $2, updated_at = clock_timestamp() WHERE id = $1",
        )
        .bind(id)
        .bind(status)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn set_message(&self, id: Uuid, message: &str) -> Result<bool, AppError> {
        let result = sqlx::query(
            "UPDATE complaints SET message = $2, updated_at = clock_timestamp() WHERE id = $1",
        )
        .bind(id)
        .bind(message)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete(&self, id: Uuid) -> Result<Option<Complaint>, AppError> {
        let mut tx = self.pool.begin().await?;

        let deleted = sqlx::query_as::<_, Complaint>(&format!(
            "DELETE FROM complaints WHERE id = $1 RETURNING {COMPLAINT_COLUMNS}"
        ))
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?;

        if let Some(product_id) = deleted.as_ref().and_then(|c| c.product_id) {
            self.decrement_complaints(&mut *tx, product_id).await?;
        }

        tx.commit().await?;
        Ok(deleted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SCHEMA: &str = include_str!("../../migrations/20250101000000_storefront.sql");

    #[test]
    fn each_foreign_key_names_its_own_missing_row() {
        assert!(matches!(vanished_reference(Some(PRODUCT_FK)), Some(AppError::ProductNotFound)));
        assert!(matches!(vanished_reference(Some(ADMIN_FK)), Some(AppError::AdminNotFound)));
        assert!(matches!(vanished_reference(Some(AUTHOR_FK)), Some(AppError::NotLoggedIn)));
        assert!(vanished_reference(Some("complaints_outra_fkey")).is_none());
        assert!(vanished_reference(None).is_none());
    }

    #[test]
    fn constraint_names_match_the_schema() {
        for name in [AUTHOR_FK, PRODUCT_FK, ADMIN_FK] {
            assert!(SCHEMA.contains(&format!("CONSTRAINT {name}")), "{name}");
        }
    }

    #[test]
    fn unknown_errors_stay_database_errors() {
        let err = missing_reference_by(sqlx::Error::RowNotFound, vanished_reference);
        assert!(matches!(err, AppError::DatabaseError(sqlx::Error::RowNotFound)));
    }
}
