// src/db/memory.rs
//
// Banco em memória para os testes de serviço. Reproduz as regras que o
// Postgres garante no esquema: par (usuário, produto) único, cascade nos
// filhos do produto, SET NULL nas reclamações e contadores com piso em zero.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use sqlx::types::Json;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::store::{ComplaintStore, LogStore, ProductStore, RatingStore, StatsStore, UserStore},
    models::{
        complaint::{Complaint, ComplaintDetail, ComplaintStatus, NewComplaint},
        log::{LogScope, LogView, NewLogEntry},
        product::{LocalizedText, NewProduct, Product, ProductListing},
        rating::{average_weight, Rating, RatingLevel, RatingWithAuthor, RatingWrite},
        stats::{Interaction, ProductStat},
        user::{ExternalIdentity, Role, User},
    },
};

#[derive(Default)]
struct Tables {
    users: Vec<User>,
    products: Vec<Product>,
    ratings: Vec<Rating>,
    complaints: Vec<Complaint>,
    interactions: Vec<Interaction>,
    stats: HashMap<Uuid, ProductStat>,
    logs: Vec<LogView>,
    last_tick: Option<DateTime<Utc>>,
}

impl Tables {
    // Relógio estritamente crescente, como clock_timestamp()
    fn tick(&mut self) -> DateTime<Utc> {
        let now = Utc::now();
        let next = match self.last_tick {
            Some(last) if now <= last => last + Duration::microseconds(1),
            _ => now,
        };
        self.last_tick = Some(next);
        next
    }

    fn product_exists(&self, id: Uuid) -> bool {
        self.products.iter().any(|p| p.id == id)
    }

    fn stat_entry(&mut self, product_id: Uuid) -> Result<&mut ProductStat, AppError> {
        if !self.product_exists(product_id) {
            return Err(AppError::ProductNotFound);
        }
        let now = self.tick();
        let stat = self
            .stats
            .entry(product_id)
            .or_insert_with(|| ProductStat::zeroed(product_id, now));
        stat.updated_at = now;
        Ok(stat)
    }

    fn recompute_average(&mut self, product_id: Uuid) -> Result<f64, AppError> {
        let avg = average_weight(
            self.ratings
                .iter()
                .filter(|r| r.product_id == product_id)
                .map(|r| r.level.weight()),
        );
        self.stat_entry(product_id)?.rating_avg = avg;
        Ok(avg)
    }

    fn user_name(&self, id: Option<Uuid>) -> Option<String> {
        id.and_then(|id| self.users.iter().find(|u| u.id == id))
            .and_then(|u| u.full_name.clone())
    }

    fn listing(&self, product: &Product) -> ProductListing {
        ProductListing {
            product: product.clone(),
            stats: self.stats.get(&product.id).cloned(),
            rating_count: self.ratings.iter().filter(|r| r.product_id == product.id).count() as i64,
        }
    }
}

#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
    fail_on_log: RwLock<bool>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn seed_user(&self, role: Role, full_name: &str) -> User {
        let mut tables = self.tables.write().await;
        let now = tables.tick();
        let user = User {
            id: Uuid::new_v4(),
            external_id: Some(format!("ext-{}", Uuid::new_v4())),
            email: Some(format!("{}@sarena.test", full_name.to_lowercase().replace(' ', "."))),
            full_name: Some(full_name.to_string()),
            avatar: None,
            phone: None,
            role,
            email_verified_at: None,
            created_at: now,
            updated_at: now,
        };
        tables.users.push(user.clone());
        user
    }

    pub async fn set_phone(&self, user_id: Uuid, phone: &str) {
        let mut tables = self.tables.write().await;
        if let Some(user) = tables.users.iter_mut().find(|u| u.id == user_id) {
            user.phone = Some(phone.to_string());
        }
    }

    pub async fn seed_product(&self, supplier_id: Uuid, name: &str) -> Product {
        let mut tables = self.tables.write().await;
        let now = tables.tick();
        let product = Product {
            id: Uuid::new_v4(),
            name: Json(LocalizedText::new(name, name)),
            short_desc: Json(LocalizedText::new("Description", "Description")),
            long_desc: Json(LocalizedText::default()),
            price: 10_000,
            stock: 10,
            city: "Douala".into(),
            thumbnail: None,
            images: vec![],
            is_new: false,
            supplier_id,
            created_at: now,
            updated_at: now,
        };
        tables.products.push(product.clone());
        product
    }

    /// Recua a data de criação do produto.
    pub async fn backdate_product(&self, product_id: Uuid, by: Duration) {
        let mut tables = self.tables.write().await;
        if let Some(product) = tables.products.iter_mut().find(|p| p.id == product_id) {
            product.created_at -= by;
        }
    }

    /// Faz o próximo `append` de log falhar (e os seguintes, até desligar).
    pub async fn set_fail_on_log(&self, fail: bool) {
        *self.fail_on_log.write().await = fail;
    }

    pub async fn log_entries(&self) -> Vec<LogView> {
        self.tables.read().await.logs.clone()
    }

    pub async fn rating_count(&self, product_id: Uuid) -> usize {
        let tables = self.tables.read().await;
        tables.ratings.iter().filter(|r| r.product_id == product_id).count()
    }

    pub async fn interaction_count(&self, product_id: Uuid) -> usize {
        let tables = self.tables.read().await;
        tables.interactions.iter().filter(|i| i.product_id == product_id).count()
    }

    pub async fn all_complaints(&self) -> Vec<Complaint> {
        self.tables.read().await.complaints.clone()
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, AppError> {
        let tables = self.tables.read().await;
        Ok(tables.users.iter().find(|u| u.id == id).cloned())
    }

    async fn find_by_external_id(&self, external_id: &str) -> Result<Option<User>, AppError> {
        let tables = self.tables.read().await;
        Ok(tables
            .users
            .iter()
            .find(|u| u.external_id.as_deref() == Some(external_id))
            .cloned())
    }

    async fn create_from_identity(&self, identity: &ExternalIdentity) -> Result<User, AppError> {
        let existing = self.find_by_external_id(&identity.subject).await?;
        if let Some(user) = existing {
            return self.refresh_profile(user.id, identity).await;
        }

        let mut tables = self.tables.write().await;
        let now = tables.tick();
        let user = User {
            id: Uuid::new_v4(),
            external_id: Some(identity.subject.clone()),
            email: identity.email.clone(),
            full_name: identity.full_name.clone(),
            avatar: identity.avatar_url.clone(),
            phone: None,
            role: Role::User,
            email_verified_at: identity.email_verified_at,
            created_at: now,
            updated_at: now,
        };
        tables.users.push(user.clone());
        Ok(user)
    }

    async fn refresh_profile(&self, id: Uuid, identity: &ExternalIdentity) -> Result<User, AppError> {
        let mut tables = self.tables.write().await;
        let now = tables.tick();
        let user = tables
            .users
            .iter_mut()
            .find(|u| u.id == id)
            .ok_or_else(|| AppError::InternalServerError(anyhow::anyhow!("usuário {id} sumiu durante o refresh")))?;

        if identity.email.is_some() {
            user.email = identity.email.clone();
        }
        if identity.full_name.is_some() {
            user.full_name = identity.full_name.clone();
        }
        if identity.avatar_url.is_some() {
            user.avatar = identity.avatar_url.clone();
        }
        if identity.email_verified_at.is_some() {
            user.email_verified_at = identity.email_verified_at;
        }
        user.updated_at = now;
        Ok(user.clone())
    }

    async fn list_admins(&self) -> Result<Vec<User>, AppError> {
        let tables = self.tables.read().await;
        let mut admins: Vec<User> = tables.users.iter().filter(|u| u.is_admin()).cloned().collect();
        // sort estável: empate fica na ordem de inserção
        admins.sort_by_key(|u| u.created_at);
        Ok(admins)
    }

    async fn earliest_admin(&self) -> Result<Option<User>, AppError> {
        Ok(self.list_admins().await?.into_iter().next())
    }
}

#[async_trait]
impl ProductStore for MemoryStore {
    async fn create(&self, product: NewProduct) -> Result<Product, AppError> {
        let mut tables = self.tables.write().await;
        if !tables.users.iter().any(|u| u.id == product.supplier_id) {
            return Err(AppError::SupplierNotFound);
        }
        let now = tables.tick();
        let created = Product {
            id: Uuid::new_v4(),
            name: Json(product.name),
            short_desc: Json(product.short_desc),
            long_desc: Json(product.long_desc),
            price: product.price,
            stock: product.stock,
            city: product.city,
            thumbnail: product.thumbnail,
            images: product.images,
            is_new: product.is_new,
            supplier_id: product.supplier_id,
            created_at: now,
            updated_at: now,
        };
        tables.products.push(created.clone());
        Ok(created)
    }

    async fn update(&self, id: Uuid, product: NewProduct) -> Result<Option<Product>, AppError> {
        let mut tables = self.tables.write().await;
        if !tables.users.iter().any(|u| u.id == product.supplier_id) {
            return Err(AppError::SupplierNotFound);
        }
        let now = tables.tick();
        let Some(current) = tables.products.iter_mut().find(|p| p.id == id) else {
            return Ok(None);
        };
        current.name = Json(product.name);
        current.short_desc = Json(product.short_desc);
        current.long_desc = Json(product.long_desc);
        current.price = product.price;
        current.stock = product.stock;
        current.city = product.city;
        current.thumbnail = product.thumbnail;
        current.images = product.images;
        current.is_new = product.is_new;
        current.supplier_id = product.supplier_id;
        current.updated_at = now;
        Ok(Some(current.clone()))
    }

    async fn delete(&self, id: Uuid) -> Result<bool, AppError> {
        let mut tables = self.tables.write().await;
        let before = tables.products.len();
        tables.products.retain(|p| p.id != id);
        if tables.products.len() == before {
            return Ok(false);
        }

        // ON DELETE CASCADE
        tables.ratings.retain(|r| r.product_id != id);
        tables.interactions.retain(|i| i.product_id != id);
        tables.stats.remove(&id);
        // ON DELETE SET NULL
        for complaint in tables.complaints.iter_mut().filter(|c| c.product_id == Some(id)) {
            complaint.product_id = None;
        }
        Ok(true)
    }

    async fn set_stock(&self, id: Uuid, stock: i32) -> Result<Option<Product>, AppError> {
        let mut tables = self.tables.write().await;
        let now = tables.tick();
        Ok(tables.products.iter_mut().find(|p| p.id == id).map(|p| {
            p.stock = stock;
            p.updated_at = now;
            p.clone()
        }))
    }

    async fn find(&self, id: Uuid) -> Result<Option<Product>, AppError> {
        let tables = self.tables.read().await;
        Ok(tables.products.iter().find(|p| p.id == id).cloned())
    }

    async fn find_listing(&self, id: Uuid) -> Result<Option<ProductListing>, AppError> {
        let tables = self.tables.read().await;
        Ok(tables.products.iter().find(|p| p.id == id).map(|p| tables.listing(p)))
    }

    async fn list(&self) -> Result<Vec<ProductListing>, AppError> {
        let tables = self.tables.read().await;
        let mut products: Vec<&Product> = tables.products.iter().collect();
        products.sort_by(|a, b| b.is_new.cmp(&a.is_new).then(b.created_at.cmp(&a.created_at)));
        Ok(products.into_iter().map(|p| tables.listing(p)).collect())
    }

    async fn ids_by_supplier(&self, supplier_id: Uuid) -> Result<Vec<Uuid>, AppError> {
        let tables = self.tables.read().await;
        Ok(tables
            .products
            .iter()
            .filter(|p| p.supplier_id == supplier_id)
            .map(|p| p.id)
            .collect())
    }
}

#[async_trait]
impl RatingStore for MemoryStore {
    async fn find(&self, id: Uuid) -> Result<Option<Rating>, AppError> {
        let tables = self.tables.read().await;
        Ok(tables.ratings.iter().find(|r| r.id == id).cloned())
    }

    async fn upsert(
        &self,
        user_id: Uuid,
        product_id: Uuid,
        level: RatingLevel,
        comment: Option<String>,
    ) -> Result<RatingWrite, AppError> {
        let mut tables = self.tables.write().await;
        if !tables.product_exists(product_id) {
            return Err(AppError::ProductNotFound);
        }
        let now = tables.tick();

        let existing = tables
            .ratings
            .iter_mut()
            .find(|r| r.user_id == user_id && r.product_id == product_id);

        let (rating, created) = match existing {
            Some(current) => {
                current.level = level;
                current.comment = comment;
                current.updated_at = now;
                (current.clone(), false)
            }
            None => {
                let rating = Rating {
                    id: Uuid::new_v4(),
                    user_id,
                    product_id,
                    level,
                    comment,
                    created_at: now,
                    updated_at: now,
                };
                tables.ratings.push(rating.clone());
                (rating, true)
            }
        };

        let rating_avg = tables.recompute_average(product_id)?;
        Ok(RatingWrite { rating, created, rating_avg })
    }

    async fn delete(&self, rating: &Rating) -> Result<f64, AppError> {
        let mut tables = self.tables.write().await;
        let before = tables.ratings.len();
        tables.ratings.retain(|r| r.id != rating.id);
        if tables.ratings.len() == before {
            return Err(AppError::RatingNotFound);
        }
        tables.recompute_average(rating.product_id)
    }

    async fn list_for_product(&self, product_id: Uuid) -> Result<Vec<RatingWithAuthor>, AppError> {
        let tables = self.tables.read().await;
        let mut ratings: Vec<RatingWithAuthor> = tables
            .ratings
            .iter()
            .filter(|r| r.product_id == product_id)
            .map(|r| {
                let author = tables.users.iter().find(|u| u.id == r.user_id);
                RatingWithAuthor {
                    rating: r.clone(),
                    author_name: author.and_then(|u| u.full_name.clone()),
                    author_avatar: author.and_then(|u| u.avatar.clone()),
                }
            })
            .collect();
        ratings.sort_by(|a, b| b.rating.created_at.cmp(&a.rating.created_at));
        Ok(ratings)
    }
}

#[async_trait]
impl ComplaintStore for MemoryStore {
    async fn create(&self, complaint: NewComplaint) -> Result<Complaint, AppError> {
        let mut tables = self.tables.write().await;
        if let Some(product_id) = complaint.product_id {
            tables.stat_entry(product_id)?.complaints += 1;
        }
        let now = tables.tick();
        let created = Complaint {
            id: Uuid::new_v4(),
            user_id: Some(complaint.user_id),
            product_id: complaint.product_id,
            assigned_admin_id: complaint.assigned_admin_id,
            message: complaint.message,
            status: ComplaintStatus::Received,
            created_at: now,
            updated_at: now,
        };
        tables.complaints.push(created.clone());
        Ok(created)
    }

    async fn list(&self, status: Option<ComplaintStatus>) -> Result<Vec<ComplaintDetail>, AppError> {
        let tables = self.tables.read().await;
        let mut complaints: Vec<ComplaintDetail> = tables
            .complaints
            .iter()
            .filter(|c| status.is_none_or(|s| c.status == s))
            .map(|c| {
                let submitter = c.user_id.and_then(|id| tables.users.iter().find(|u| u.id == id));
                let product = c.product_id.and_then(|id| tables.products.iter().find(|p| p.id == id));
                ComplaintDetail {
                    complaint: c.clone(),
                    user_name: submitter.and_then(|u| u.full_name.clone()),
                    user_email: submitter.and_then(|u| u.email.clone()),
                    product_name: product.map(|p| p.name.clone()),
                    product_thumbnail: product.and_then(|p| p.thumbnail.clone()),
                    assigned_admin_name: tables.user_name(Some(c.assigned_admin_id)),
                }
            })
            .collect();
        complaints.sort_by(|a, b| b.complaint.created_at.cmp(&a.complaint.created_at));
        Ok(complaints)
    }

    async fn assign(&self, id: Uuid, admin_id: Uuid) -> Result<bool, AppError> {
        let mut tables = self.tables.write().await;
        let now = tables.tick();
        Ok(tables
            .complaints
            .iter_mut()
            .find(|c| c.id == id)
            .map(|c| {
                c.assigned_admin_id = admin_id;
                c.updated_at = now;
            })
            .is_some())
    }

    async fn set_status(&self, id: Uuid, status: ComplaintStatus) -> Result<bool, AppError> {
        let mut tables = self.tables.write().await;
        let now = tables.tick();
        Ok(tables
            .complaints
            .iter_mut()
            .find(|c| c.id == id)
            .map(|c| {
                c.status = status;
                c.updated_at = now;
            })
            .is_some())
    }

    async fn set_message(&self, id: Uuid, message: &str) -> Result<bool, AppError> {
        let mut tables = self.tables.write().await;
        let now = tables.tick();
        Ok(tables
            .complaints
            .iter_mut()
            .find(|c| c.id == id)
            .map(|c| {
                c.message = message.to_string();
                c.updated_at = now;
            })
            .is_some())
    }

    async fn delete(&self, id: Uuid) -> Result<Option<Complaint>, AppError> {
        let mut tables = self.tables.write().await;
        let Some(index) = tables.complaints.iter().position(|c| c.id == id) else {
            return Ok(None);
        };
        let deleted = tables.complaints.remove(index);

        if let Some(product_id) = deleted.product_id {
            if let Some(stat) = tables.stats.get_mut(&product_id) {
                stat.complaints = (stat.complaints - 1).max(0);
            }
        }
        Ok(Some(deleted))
    }
}

#[async_trait]
impl StatsStore for MemoryStore {
    async fn record_click(&self, product_id: Uuid, ip: Option<&str>) -> Result<ProductStat, AppError> {
        let mut tables = self.tables.write().await;
        let stat = {
            let stat = tables.stat_entry(product_id)?;
            stat.clicks += 1;
            stat.clone()
        };
        let now = tables.tick();
        tables.interactions.push(Interaction {
            id: Uuid::new_v4(),
            product_id,
            user_ip: ip.map(str::to_string),
            created_at: now,
        });
        Ok(stat)
    }

    async fn record_view(&self, product_id: Uuid) -> Result<ProductStat, AppError> {
        let mut tables = self.tables.write().await;
        let stat = tables.stat_entry(product_id)?;
        stat.views += 1;
        Ok(stat.clone())
    }

    async fn find(&self, product_id: Uuid) -> Result<Option<ProductStat>, AppError> {
        let tables = self.tables.read().await;
        Ok(tables.stats.get(&product_id).cloned())
    }
}

#[async_trait]
impl LogStore for MemoryStore {
    async fn append(&self, entry: NewLogEntry) -> Result<(), AppError> {
        if *self.fail_on_log.read().await {
            return Err(AppError::InternalServerError(anyhow::anyhow!("falha simulada no log")));
        }
        let mut tables = self.tables.write().await;
        let now = tables.tick();
        let user_name = tables.user_name(Some(entry.user_id));
        tables.logs.push(LogView {
            id: Uuid::new_v4(),
            user_id: entry.user_id,
            user_name,
            user_role: entry.user_role,
            action: entry.action,
            target: entry.target,
            target_id: entry.target_id,
            ip: entry.ip,
            created_at: now,
        });
        Ok(())
    }

    async fn recent(&self, scope: &LogScope, limit: i64) -> Result<Vec<LogView>, AppError> {
        let tables = self.tables.read().await;
        Ok(tables
            .logs
            .iter()
            .rev()
            .filter(|l| scope.admits(l.user_id, l.target_id))
            .take(limit.max(0) as usize)
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn deleting_a_product_cascades_and_detaches() {
        let store = MemoryStore::new();
        let supplier = store.seed_user(Role::Supplier, "Awa Fournisseur").await;
        let buyer = store.seed_user(Role::User, "Jean Client").await;
        let admin = store.seed_user(Role::Admin, "Paul Admin").await;
        let product = store.seed_product(supplier.id, "Pagne wax").await;

        RatingStore::upsert(&store, buyer.id, product.id, RatingLevel::Feu, None).await.unwrap();
        store.record_click(product.id, Some("10.0.0.1")).await.unwrap();
        ComplaintStore::create(
            &store,
            NewComplaint {
                user_id: buyer.id,
                product_id: Some(product.id),
                assigned_admin_id: admin.id,
                message: "Couleur différente de la photo".into(),
            },
        )
        .await
        .unwrap();

        assert!(ProductStore::delete(&store, product.id).await.unwrap());

        assert_eq!(store.rating_count(product.id).await, 0);
        assert_eq!(store.interaction_count(product.id).await, 0);
        assert!(StatsStore::find(&store, product.id).await.unwrap().is_none());
        let complaints = store.all_complaints().await;
        assert_eq!(complaints.len(), 1);
        assert_eq!(complaints[0].product_id, None);
    }

    #[tokio::test]
    async fn stat_upsert_rejects_unknown_products() {
        let store = MemoryStore::new();
        let err = store.record_view(Uuid::new_v4()).await.unwrap_err();
        assert!(matches!(err, AppError::ProductNotFound));
    }
}
