// src/db/rating_repo.rs

use async_trait::async_trait;
use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{product_repo::ProductRepository, store::RatingStore},
    models::rating::{average_weight, weight_of_tag, Rating, RatingLevel, RatingWithAuthor, RatingWrite},
};

const RATING_COLUMNS: &str = "id, user_id, product_id, level, comment, created_at, updated_at";

#[derive(Clone)]
pub struct RatingRepository {
    pool: PgPool,
    products: ProductRepository,
}

impl RatingRepository {
    pub fn new(pool: PgPool) -> Self {
        Self {
            products: ProductRepository::new(pool.clone()),
            pool,
        }
    }

    async fn find_pair<'e, E>(
        &self,
        executor: E,
        user_id: Uuid,
        product_id: Uuid,
    ) -> Result<Option<Rating>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let rating = sqlx::query_as::<_, Rating>(&format!(
            "SELECT {RATING_COLUMNS} FROM ratings WHERE user_id = $1 AND product_id = $2"
        ))
        .bind(user_id)
        .bind(product_id)
        .fetch_optional(executor)
        .await?;
        Ok(rating)
    }

    // Lido como texto: tag desconhecida pesa 3 em vez de quebrar o recálculo
    async fn weights_for_product<'e, E>(&self, executor: E, product_id: Uuid) -> Result<Vec<u8>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let tags = sqlx::query_scalar::<_, String>("SELECT level::text FROM ratings WHERE product_id = $1")
            .bind(product_id)
            .fetch_all(executor)
            .await?;
        Ok(tags.iter().map(|tag| weight_of_tag(tag)).collect())
    }

    async fn store_average<'e, E>(&self, executor: E, product_id: Uuid, avg: f64) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query(
            r#"
            INSERT INTO product_stats (product_id, rating_avg)
            VALUES ($1, $2)
            ON CONFLICT (product_id) DO UPDATE SET
                rating_avg = EXCLUDED.rating_avg,
                updated_at = clock_timestamp()
            "#,
        )
        .bind(product_id)
        .bind(avg)
        .execute(executor)
        .await?;
        Ok(())
    }
}

#[async_trait]
impl RatingStore for RatingRepository {
    async fn find(&self, id: Uuid) -> Result<Option<Rating>, AppError> {
        let rating = sqlx::query_as::<_, Rating>(&format!("SELECT {RATING_COLUMNS} FROM ratings WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(rating)
    }

    async fn upsert(
        &self,
        user_id: Uuid,
        product_id: Uuid,
        level: RatingLevel,
        comment: Option<String>,
    ) -> Result<RatingWrite, AppError> {
        let mut tx = self.pool.begin().await?;

        // A trava no produto serializa escrita + recálculo da média
        if !self.products.lock(&mut *tx, product_id).await? {
            return Err(AppError::ProductNotFound);
        }

        let existing = self.find_pair(&mut *tx, user_id, product_id).await?;
        let created = existing.is_none();

        let rating = match existing {
            Some(current) => {
                sqlx::query_as::<_, Rating>(&format!(
                    r#"
                    UPDATE ratings SET level = $2, comment = $3, updated_at = clock_timestamp()
                    WHERE id = $1
                    RETURNING {RATING_COLUMNS}
                    "#
                ))
                .bind(current.id)
                .bind(level)
                .bind(&comment)
                .fetch_one(&mut *tx)
                .await?
            }
            None => {
                sqlx::query_as::<_, Rating>(&format!(
                    r#"
                    INSERT INTO ratings (user_id, product_id, level, comment)
                    VALUES ($1, $2, $3, $4)
                    RETURNING {RATING_COLUMNS}
                    "#
                ))
                .bind(user_id)
                .bind(product_id)
                .bind(level)
                .bind(&comment)
                .fetch_one(&mut *tx)
                .await?
            }
        };

        let weights = self.weights_for_product(&mut *tx, product_id).await?;
        let rating_avg = average_weight(weights);
        self.store_average(&mut *tx, product_id, rating_avg).await?;

        tx.commit().await?;

        Ok(RatingWrite { rating, created, rating_avg })
    }

    async fn delete(&self, rating: &Rating) -> Result<f64, AppError> {
        let mut tx = self.pool.begin().await?;

        // Produto já apagado levou a avaliação junto
        if !self.products.lock(&mut *tx, rating.product_id).await? {
            return Err(AppError::RatingNotFound);
        }

        let result = sqlx::query("DELETE FROM ratings WHERE id = $1")
            .bind(rating.id)
            .execute(&mut *tx)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::RatingNotFound);
        }

        let weights = self.weights_for_product(&mut *tx, rating.product_id).await?;
        let rating_avg = average_weight(weights);
        self.store_average(&mut *tx, rating.product_id, rating_avg).await?;

        tx.commit().await?;
        Ok(rating_avg)
    }

    async fn list_for_product(&self, product_id: Uuid) -> Result<Vec<RatingWithAuthor>, AppError> {
        let ratings = sqlx::query_as::<_, RatingWithAuthor>(
            r#"
            SELECT
                r.id, r.user_id, r.product_id, r.level, r.comment, r.created_at, r.updated_at,
                u.full_name AS author_name,
                u.avatar AS author_avatar
            FROM ratings r
            JOIN users u ON u.id = r.user_id
            WHERE r.product_id = $1
            ORDER BY r.created_at DESC
            "#,
        )
        .bind(product_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(ratings)
    }
}
