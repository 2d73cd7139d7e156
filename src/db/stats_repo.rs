// src/db/stats_repo.rs

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::{db_utils::missing_reference, error::AppError},
    db::store::StatsStore,
    models::stats::{Interaction, ProductStat},
};

#[derive(Clone)]
pub struct StatsRepository {
    pool: PgPool,
}

impl StatsRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl StatsStore for StatsRepository {
    async fn record_click(&self, product_id: Uuid, ip: Option<&str>) -> Result<ProductStat, AppError> {
        let mut tx = self.pool.begin().await?;

        let interaction = sqlx::query_as::<_, Interaction>(
            "INSERT INTO interactions (product_id, user_ip) VALUES ($1, $2) RETURNING id, product_id, user_ip, created_at",
        )
        .bind(product_id)
        .bind(ip)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| missing_reference(e, AppError::ProductNotFound))?;

        let stat = sqlx::query_as::<_, ProductStat>(
            r#"
            INSERT INTO product_stats (product_id, clicks)
            VALUES ($1, 1)
            ON CONFLICT (product_id) DO UPDATE SET
                clicks = product_stats.clicks + 1,
                updated_at = clock_timestamp()
            RETURNING product_id, views, clicks, complaints, rating_avg, updated_at
            "#,
        )
        .bind(product_id)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| missing_reference(e, AppError::ProductNotFound))?;

        tx.commit().await?;
        tracing::debug!("Interação {} registrada no produto {}", interaction.id, interaction.product_id);
        Ok(stat)
    }

    async fn record_view(&self, product_id: Uuid) -> Result<ProductStat, AppError> {
        let stat = sqlx::query_as::<_, ProductStat>(
            r#"
            INSERT INTO product_stats (product_id, views)
            VALUES ($1, 1)
            ON CONFLICT (product_id) DO UPDATE SET
                views = product_stats.views + 1,
                updated_at = clock_timestamp()
            RETURNING product_id, views, clicks, complaints, rating_avg, updated_at
            "#,
        )
        .bind(product_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| missing_reference(e, AppError::ProductNotFound))?;
        Ok(stat)
    }

    async fn find(&self, product_id: Uuid) -> Result<Option<ProductStat>, AppError> {
        let stat = sqlx::query_as::<_, ProductStat>(
            "SELECT product_id, views, clicks, complaints, rating_avg, updated_at FROM product_stats WHERE product_id = $1",
        )
        .bind(product_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(stat)
    }
}
