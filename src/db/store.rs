// src/db/store.rs
//
// Contratos de persistência usados pelos serviços. Os repositórios Postgres
// implementam estes traits; os testes usam `db::memory::MemoryStore`.

use async_trait::async_trait;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::{
        complaint::{Complaint, ComplaintDetail, ComplaintStatus, NewComplaint},
        log::{LogScope, LogView, NewLogEntry},
        product::{NewProduct, Product, ProductListing},
        rating::{Rating, RatingLevel, RatingWithAuthor, RatingWrite},
        stats::ProductStat,
        user::{ExternalIdentity, User},
    },
};

#[async_trait]
pub trait UserStore: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, AppError>;

    async fn find_by_external_id(&self, external_id: &str) -> Result<Option<User>, AppError>;

    /// Cria o usuário local (papel USER) a partir da identidade verificada.
    async fn create_from_identity(&self, identity: &ExternalIdentity) -> Result<User, AppError>;

    /// Atualiza email/nome/avatar/verificação. Campos ausentes mantêm o valor atual;
    /// o papel nunca é tocado.
    async fn refresh_profile(&self, id: Uuid, identity: &ExternalIdentity) -> Result<User, AppError>;

    /// Admins em ordem de criação (o mais antigo primeiro).
    async fn list_admins(&self) -> Result<Vec<User>, AppError>;

    async fn earliest_admin(&self) -> Result<Option<User>, AppError>;
}

#[async_trait]
pub trait ProductStore: Send + Sync {
    async fn create(&self, product: NewProduct) -> Result<Product, AppError>;

    async fn update(&self, id: Uuid, product: NewProduct) -> Result<Option<Product>, AppError>;

    /// Apaga o produto: avaliações, interações e stats vão junto (cascade);
    /// reclamações só perdem a referência.
    async fn delete(&self, id: Uuid) -> Result<bool, AppError>;

    async fn set_stock(&self, id: Uuid, stock: i32) -> Result<Option<Product>, AppError>;

    async fn find(&self, id: Uuid) -> Result<Option<Product>, AppError>;

    async fn find_listing(&self, id: Uuid) -> Result<Option<ProductListing>, AppError>;

    /// Vitrine: `is_new` desc, depois `created_at` desc.
    async fn list(&self) -> Result<Vec<ProductListing>, AppError>;

    async fn ids_by_supplier(&self, supplier_id: Uuid) -> Result<Vec<Uuid>, AppError>;
}

#[async_trait]
pub trait RatingStore: Send + Sync {
    async fn find(&self, id: Uuid) -> Result<Option<Rating>, AppError>;

    /// Cria ou sobrescreve a avaliação do par (usuário, produto) e recalcula
    /// `rating_avg` na mesma unidade de trabalho.
    async fn upsert(
        &self,
        user_id: Uuid,
        product_id: Uuid,
        level: RatingLevel,
        comment: Option<String>,
    ) -> Result<RatingWrite, AppError>;

    /// Apaga e devolve a nova média do produto.
    async fn delete(&self, rating: &Rating) -> Result<f64, AppError>;

    async fn list_for_product(&self, product_id: Uuid) -> Result<Vec<RatingWithAuthor>, AppError>;
}

#[async_trait]
pub trait ComplaintStore: Send + Sync {
    /// Cria a reclamação (RECEIVED) e, se houver produto, incrementa o contador.
    async fn create(&self, complaint: NewComplaint) -> Result<Complaint, AppError>;

    async fn list(&self, status: Option<ComplaintStatus>) -> Result<Vec<ComplaintDetail>, AppError>;

    async fn assign(&self, id: Uuid, admin_id: Uuid) -> Result<bool, AppError>;

    async fn set_status(&self, id: Uuid, status: ComplaintStatus) -> Result<bool, AppError>;

    async fn set_message(&self, id: Uuid, message: &str) -> Result<bool, AppError>;

    /// Apaga e decrementa o contador do produto (piso em zero).
    async fn delete(&self, id: Uuid) -> Result<Option<Complaint>, AppError>;
}

#[async_trait]
pub trait StatsStore: Send + Sync {
    /// Insere a interação e incrementa `clicks` atomicamente.
    async fn record_click(&self, product_id: Uuid, ip: Option<&str>) -> Result<ProductStat, AppError>;

    async fn record_view(&self, product_id: Uuid) -> Result<ProductStat, AppError>;

    async fn find(&self, product_id: Uuid) -> Result<Option<ProductStat>, AppError>;
}

#[async_trait]
pub trait LogStore: Send + Sync {
    async fn append(&self, entry: NewLogEntry) -> Result<(), AppError>;

    /// Mais recentes primeiro.
    async fn recent(&self, scope: &LogScope, limit: i64) -> Result<Vec<LogView>, AppError>;
}
