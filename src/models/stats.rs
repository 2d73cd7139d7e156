// src/models/stats.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

// Contadores agregados por produto (criados sob demanda via upsert)
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProductStat {
    pub product_id: Uuid,
    pub views: i64,
    pub clicks: i64,
    pub complaints: i64,
    pub rating_avg: f64,
    pub updated_at: DateTime<Utc>,
}

impl ProductStat {
    #[cfg(test)]
    pub fn zeroed(product_id: Uuid, now: DateTime<Utc>) -> Self {
        Self {
            product_id,
            views: 0,
            clicks: 0,
            complaints: 0,
            rating_avg: 0.0,
            updated_at: now,
        }
    }
}

// Clique no botão do WhatsApp (intenção de compra). Só inserção.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Interaction {
    pub id: Uuid,
    pub product_id: Uuid,
    pub user_ip: Option<String>,
    pub created_at: DateTime<Utc>,
}
