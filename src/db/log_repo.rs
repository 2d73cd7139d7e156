// src/db/log_repo.rs

use async_trait::async_trait;
use sqlx::PgPool;

use crate::{
    common::error::AppError,
    db::store::LogStore,
    models::log::{LogScope, LogView, NewLogEntry},
};

const LOG_SELECT: &str = r#"
    SELECT
        l.id, l.user_id, u.full_name AS user_name, l.user_role,
        l.action, l.target, l.target_id, l.ip, l.created_at
    FROM logs l
    LEFT JOIN users u ON u.id = l.user_id
"#;

// Trilha de auditoria: este repositório só insere e lê
#[derive(Clone)]
pub struct LogRepository {
    pool: PgPool,
}

impl LogRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl LogStore for LogRepository {
    async fn append(&self, entry: NewLogEntry) -> Result<(), AppError> {
        sqlx::query(
            r#"
            INSERT INTO logs (user_id, user_role, action, target, target_id, ip)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(entry.user_id)
        .bind(entry.user_role)
        .bind(&entry.action)
        .bind(&entry.target)
        .bind(entry.target_id)
        .bind(&entry.ip)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn recent(&self, scope: &LogScope, limit: i64) -> Result<Vec<LogView>, AppError> {
        let logs = match scope {
            LogScope::All => {
                sqlx::query_as::<_, LogView>(&format!(
                    "{LOG_SELECT} ORDER BY l.created_at DESC LIMIT $1"
                ))
                .bind(limit)
                .fetch_all(&self.pool)
                .await?
            }
            // União: feito pelo fornecedor OU sobre um produto dele
            LogScope::Supplier { supplier_id, product_ids } => {
                sqlx::query_as::<_, LogView>(&format!(
                    "{LOG_SELECT} WHERE l.user_id = $1 OR l.target_id = ANY($2) \
                     ORDER BY l.created_at DESC LIMIT $3"
                ))
                .bind(supplier_id)
                .bind(product_ids)
                .bind(limit)
                .fetch_all(&self.pool)
                .await?
            }
        };
        Ok(logs)
    }
}
