// src/db/product_repo.rs

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{types::Json, Executor, FromRow, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::{db_utils::missing_reference, error::AppError},
    db::store::ProductStore,
    models::{
        product::{NewProduct, Product, ProductListing},
        stats::ProductStat,
    },
};

const PRODUCT_COLUMNS: &str = "p.id, p.name, p.short_desc, p.long_desc, p.price, p.stock, p.city, \
     p.thumbnail, p.images, p.is_new, p.supplier_id, p.created_at, p.updated_at";

// Produto + LEFT JOIN nos stats + contagem de avaliações
#[derive(FromRow)]
struct ListingRow {
    #[sqlx(flatten)]
    product: Product,
    stat_product_id: Option<Uuid>,
    stat_views: Option<i64>,
    stat_clicks: Option<i64>,
    stat_complaints: Option<i64>,
    stat_rating_avg: Option<f64>,
    stat_updated_at: Option<DateTime<Utc>>,
    rating_count: i64,
}

impl From<ListingRow> for ProductListing {
    fn from(row: ListingRow) -> Self {
        let stats = row.stat_product_id.map(|product_id| ProductStat {
            product_id,
            views: row.stat_views.unwrap_or(0),
            clicks: row.stat_clicks.unwrap_or(0),
            complaints: row.stat_complaints.unwrap_or(0),
            rating_avg: row.stat_rating_avg.unwrap_or(0.0),
            updated_at: row.stat_updated_at.unwrap_or(row.product.updated_at),
        });

        ProductListing {
            product: row.product,
            stats,
            rating_count: row.rating_count,
        }
    }
}

fn listing_query(filter: &str) -> String {
    format!(
        r#"
        SELECT
            {PRODUCT_COLUMNS},
            s.product_id AS stat_product_id,
            s.views AS stat_views,
            s.clicks AS stat_clicks,
            s.complaints AS stat_complaints,
            s.rating_avg AS stat_rating_avg,
            s.updated_at AS stat_updated_at,
            (SELECT COUNT(*) FROM ratings r WHERE r.product_id = p.id) AS rating_count
        FROM products p
        LEFT JOIN product_stats s ON s.product_id = p.id
        {filter}
        "#
    )
}

#[derive(Clone)]
pub struct ProductRepository {
    pool: PgPool,
}

impl ProductRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Trava a linha do produto até o fim da transação.
    /// Serializa quem recalcula agregados do mesmo produto.
    pub async fn lock<'e, E>(&self, executor: E, id: Uuid) -> Result<bool, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let found = sqlx::query_scalar::<_, Uuid>("SELECT id FROM products WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(executor)
            .await?;
        Ok(found.is_some())
    }
}

#[async_trait]
impl ProductStore for ProductRepository {
    async fn create(&self, product: NewProduct) -> Result<Product, AppError> {
        let created = sqlx::query_as::<_, Product>(
            r#"
            INSERT INTO products (
                name, short_desc, long_desc, price, stock, city,
                thumbnail, images, is_new, supplier_id
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING id, name, short_desc, long_desc, price, stock, city,
                      thumbnail, images, is_new, supplier_id, created_at, updated_at
            "#,
        )
        .bind(Json(&product.name))
        .bind(Json(&product.short_desc))
        .bind(Json(&product.long_desc))
        .bind(product.price)
        .bind(product.stock)
        .bind(&product.city)
        .bind(&product.thumbnail)
        .bind(&product.images)
        .bind(product.is_new)
        .bind(product.supplier_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| missing_reference(e, AppError::SupplierNotFound))?;

        Ok(created)
    }

    async fn update(&self, id: Uuid, product: NewProduct) -> Result<Option<Product>, AppError> {
        let updated = sqlx::query_as::<_, Product>(
            r#"
            UPDATE products SET
                name = $2, short_desc = $3, long_desc = $4, price = $5, stock = $6,
                city = $7, thumbnail = $8, images = $9, is_new = $10, supplier_id = $11,
                updated_at = clock_timestamp()
            WHERE id = $1
            RETURNING id, name, short_desc, long_desc, price, stock, city,
                      thumbnail, images, is_new, supplier_id, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(Json(&product.name))
        .bind(Json(&product.short_desc))
        .bind(Json(&product.long_desc))
        .bind(product.price)
        .bind(product.stock)
        .bind(&product.city)
        .bind(&product.thumbnail)
        .bind(&product.images)
        .bind(product.is_new)
        .bind(product.supplier_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| missing_reference(e, AppError::SupplierNotFound))?;

        Ok(updated)
    }

    async fn delete(&self, id: Uuid) -> Result<bool, AppError> {
        // ratings, interactions e product_stats caem por cascade;
        // complaints.product_id vira NULL (ver migração)
        let result = sqlx::query("DELETE FROM products WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn set_stock(&self, id: Uuid, stock: i32) -> Result<Option<Product>, AppError> {
        let updated = sqlx::query_as::<_, Product>(
            r#"
            UPDATE products SET stock = $2, updated_at = clock_timestamp()
            WHERE id = $1
            RETURNING id, name, short_desc, long_desc, price, stock, city,
                      thumbnail, images, is_new, supplier_id, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(stock)
        .fetch_optional(&self.pool)
        .await?;
        Ok(updated)
    }

    async fn find(&self, id: Uuid) -> Result<Option<Product>, AppError> {
        let product = sqlx::query_as::<_, Product>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products p WHERE p.id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(product)
    }

    async fn find_listing(&self, id: Uuid) -> Result<Option<ProductListing>, AppError> {
        let row = sqlx::query_as::<_, ListingRow>(&listing_query("WHERE p.id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(ProductListing::from))
    }

    async fn list(&self) -> Result<Vec<ProductListing>, AppError> {
        let rows = sqlx::query_as::<_, ListingRow>(&listing_query(
            "ORDER BY p.is_new DESC, p.created_at DESC",
        ))
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(ProductListing::from).collect())
    }

    async fn ids_by_supplier(&self, supplier_id: Uuid) -> Result<Vec<Uuid>, AppError> {
        let ids = sqlx::query_scalar::<_, Uuid>("SELECT id FROM products WHERE supplier_id = $1")
            .bind(supplier_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(ids)
    }
}
