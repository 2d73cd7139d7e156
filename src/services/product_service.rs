// src/services/product_service.rs

use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::AppError,
    db::{ProductStore, UserStore},
    models::{
        log::{LogAction, LogTarget},
        product::{DashboardSummary, NewProduct, Product, ProductListing, ProductPayload, ProductView},
        user::{Caller, Role, User},
    },
    services::{
        activity_log::ActivityLogger,
        permissions::{authorize, Action},
    },
};

#[derive(Clone)]
pub struct ProductService {
    users: Arc<dyn UserStore>,
    products: Arc<dyn ProductStore>,
    activity: ActivityLogger,
}

impl ProductService {
    pub fn new(users: Arc<dyn UserStore>, products: Arc<dyn ProductStore>, activity: ActivityLogger) -> Self {
        Self { users, products, activity }
    }

    // =========================================================================
    //  VITRINE (leitura pública)
    // =========================================================================

    pub async fn list_products(&self) -> Result<Vec<ProductView>, AppError> {
        let now = Utc::now();
        let listings = self.products.list().await?;
        Ok(listings
            .into_iter()
            .map(|listing| ProductView::from_listing(listing, now))
            .collect())
    }

    pub async fn get_product(&self, id: Uuid) -> Result<ProductView, AppError> {
        let listing = self
            .products
            .find_listing(id)
            .await?
            .ok_or(AppError::ProductNotFound)?;
        Ok(ProductView::from_listing(listing, Utc::now()))
    }

    // =========================================================================
    //  PAINEL (leitura por papel)
    // =========================================================================

    /// Admin vê o catálogo inteiro; fornecedor só o que é dele.
    async fn dashboard_listings(&self, caller: &Caller) -> Result<Vec<ProductListing>, AppError> {
        let user = caller.require()?;
        authorize(user, Action::ViewDashboard)?;

        let mut listings = self.products.list().await?;
        if user.role == Role::Supplier {
            listings.retain(|l| l.product.supplier_id == user.id);
        }
        Ok(listings)
    }

    pub async fn dashboard_summary(&self, caller: &Caller) -> Result<DashboardSummary, AppError> {
        let listings = self.dashboard_listings(caller).await?;
        Ok(DashboardSummary::from_listings(&listings, Utc::now()))
    }

    pub async fn dashboard_products(&self, caller: &Caller) -> Result<Vec<ProductView>, AppError> {
        let now = Utc::now();
        Ok(self
            .dashboard_listings(caller)
            .await?
            .into_iter()
            .map(|listing| ProductView::from_listing(listing, now))
            .collect())
    }

    // =========================================================================
    //  PAINEL (mutações)
    // =========================================================================

    /// Dono do produto: o admin escolhe (fornecedor ou admin), o fornecedor é sempre ele mesmo.
    async fn resolve_owner(&self, actor: &User, requested: Option<Uuid>, current: Option<Uuid>) -> Result<Uuid, AppError> {
        match actor.role {
            Role::Admin => {
                let Some(id) = requested.or(current) else {
                    return Ok(actor.id);
                };
                if id == actor.id {
                    return Ok(id);
                }
                let owner = self.users.find_by_id(id).await?.ok_or(AppError::SupplierNotFound)?;
                match owner.role {
                    Role::Supplier | Role::Admin => Ok(owner.id),
                    Role::User => Err(AppError::SupplierNotFound),
                }
            }
            Role::Supplier => Ok(current.unwrap_or(actor.id)),
            Role::User => Err(AppError::Forbidden),
        }
    }

    pub async fn create_product(&self, caller: &Caller, payload: ProductPayload) -> Result<Product, AppError> {
        let user = caller.require()?;
        authorize(user, Action::CreateProduct)?;
        payload.validate()?;

        let owner = self.resolve_owner(user, payload.supplier_id, None).await?;
        let product = self.products.create(NewProduct::from_payload(payload, owner)).await?;

        self.activity
            .record(user, caller.ip(), LogAction::Create, LogTarget::Product, Some(product.id))
            .await;

        tracing::info!("🛍️ Produto {} criado por {}", product.id, user.id);
        Ok(product)
    }

    pub async fn update_product(
        &self,
        caller: &Caller,
        id: Uuid,
        payload: ProductPayload,
    ) -> Result<Product, AppError> {
        let user = caller.require()?;
        let existing = self.products.find(id).await?.ok_or(AppError::ProductNotFound)?;
        authorize(user, Action::UpdateProduct { supplier_id: existing.supplier_id })?;
        payload.validate()?;

        let owner = self
            .resolve_owner(user, payload.supplier_id, Some(existing.supplier_id))
            .await?;
        let product = self
            .products
            .update(id, NewProduct::from_payload(payload, owner))
            .await?
            .ok_or(AppError::ProductNotFound)?;

        self.activity
            .record(user, caller.ip(), LogAction::Update, LogTarget::Product, Some(id))
            .await;
        Ok(product)
    }

    /// Apaga o produto. Avaliações, interações e stats vão junto; reclamações ficam sem produto.
    pub async fn delete_product(&self, caller: &Caller, id: Uuid) -> Result<(), AppError> {
        let user = caller.require()?;
        authorize(user, Action::DeleteProduct)?;

        if !self.products.delete(id).await? {
            return Err(AppError::ProductNotFound);
        }

        self.activity
            .record(user, caller.ip(), LogAction::Delete, LogTarget::Product, Some(id))
            .await;

        tracing::info!("🗑️ Produto {} apagado por {}", id, user.id);
        Ok(())
    }

    /// Indisponível = estoque zerado.
    pub async fn mark_unavailable(&self, caller: &Caller, id: Uuid) -> Result<Product, AppError> {
        let user = caller.require()?;
        let existing = self.products.find(id).await?.ok_or(AppError::ProductNotFound)?;
        authorize(user, Action::MarkUnavailable { supplier_id: existing.supplier_id })?;

        let product = self
            .products
            .set_stock(id, 0)
            .await?
            .ok_or(AppError::ProductNotFound)?;

        self.activity
            .record(user, caller.ip(), LogAction::Unavailable, LogTarget::Product, Some(id))
            .await;
        Ok(product)
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use super::*;
    use crate::{
        db::{memory::MemoryStore, ComplaintStore, ProductStore, RatingStore, StatsStore},
        models::{
            complaint::NewComplaint,
            rating::RatingLevel,
        },
    };

    fn service(store: &Arc<MemoryStore>) -> ProductService {
        ProductService::new(store.clone(), store.clone(), ActivityLogger::direct(store.clone()))
    }

    fn caller(user: &User) -> Caller {
        Caller::authenticated(user.clone(), None)
    }

    fn payload() -> ProductPayload {
        ProductPayload {
            name_fr: "Robe en pagne".into(),
            name_en: "Wax print dress".into(),
            short_desc_fr: "Robe cousue main".into(),
            short_desc_en: "Hand-sewn dress".into(),
            long_desc_fr: String::new(),
            long_desc_en: String::new(),
            price: 18_000,
            stock: 4,
            city: "Yaoundé".into(),
            thumbnail: None,
            images: vec![" https://cdn.test/1.jpg ".into(), "  ".into()],
            is_new: false,
            supplier_id: None,
        }
    }

    #[tokio::test]
    async fn supplier_owns_what_they_create() {
        let store = Arc::new(MemoryStore::new());
        let supplier = store.seed_user(Role::Supplier, "Awa").await;
        let someone_else = store.seed_user(Role::Supplier, "Binta").await;

        let mut body = payload();
        body.supplier_id = Some(someone_else.id);
        let product = service(&store).create_product(&caller(&supplier), body).await.unwrap();

        assert_eq!(product.supplier_id, supplier.id);
        assert_eq!(product.images, vec!["https://cdn.test/1.jpg".to_string()]);
        assert_eq!(product.display_name("en"), "Wax print dress");

        let logs = store.log_entries().await;
        assert_eq!(logs[0].action, "CREATE");
        assert_eq!(logs[0].target_id, Some(product.id));
    }

    #[tokio::test]
    async fn admin_assigns_a_supplier_but_not_a_customer() {
        let store = Arc::new(MemoryStore::new());
        let admin = store.seed_user(Role::Admin, "Paul").await;
        let supplier = store.seed_user(Role::Supplier, "Awa").await;
        let customer = store.seed_user(Role::User, "Jean").await;
        let service = service(&store);

        let mut body = payload();
        body.supplier_id = Some(supplier.id);
        let product = service.create_product(&caller(&admin), body).await.unwrap();
        assert_eq!(product.supplier_id, supplier.id);

        let mut body = payload();
        body.supplier_id = Some(customer.id);
        let err = service.create_product(&caller(&admin), body).await.unwrap_err();
        assert!(matches!(err, AppError::SupplierNotFound));

        // sem supplierId o admin é o dono
        let own = service.create_product(&caller(&admin), payload()).await.unwrap();
        assert_eq!(own.supplier_id, admin.id);
    }

    #[tokio::test]
    async fn customers_cannot_create_and_bad_payloads_are_rejected() {
        let store = Arc::new(MemoryStore::new());
        let customer = store.seed_user(Role::User, "Jean").await;
        let supplier = store.seed_user(Role::Supplier, "Awa").await;
        let service = service(&store);

        let err = service.create_product(&caller(&customer), payload()).await.unwrap_err();
        assert!(matches!(err, AppError::Forbidden));

        let mut body = payload();
        body.price = 0;
        body.name_en = "   ".into();
        let err = service.create_product(&caller(&supplier), body).await.unwrap_err();
        let AppError::ValidationError(errors) = err else { panic!("esperava erro de validação") };
        let fields = errors.field_errors();
        assert!(fields.contains_key("price"));
        assert!(fields.contains_key("name_en"));
    }

    #[tokio::test]
    async fn suppliers_only_edit_their_own() {
        let store = Arc::new(MemoryStore::new());
        let owner = store.seed_user(Role::Supplier, "Awa").await;
        let intruder = store.seed_user(Role::Supplier, "Binta").await;
        let admin = store.seed_user(Role::Admin, "Paul").await;
        let product = store.seed_product(owner.id, "Sac").await;
        let service = service(&store);

        let err = service.update_product(&caller(&intruder), product.id, payload()).await.unwrap_err();
        assert!(matches!(err, AppError::Forbidden));
        let err = service.mark_unavailable(&caller(&intruder), product.id).await.unwrap_err();
        assert!(matches!(err, AppError::Forbidden));

        let updated = service.update_product(&caller(&owner), product.id, payload()).await.unwrap();
        assert_eq!(updated.supplier_id, owner.id);
        assert_eq!(updated.price, 18_000);

        // admin edita produto alheio sem trocar o dono
        let updated = service.update_product(&caller(&admin), product.id, payload()).await.unwrap();
        assert_eq!(updated.supplier_id, owner.id);

        let gone = service.mark_unavailable(&caller(&owner), product.id).await.unwrap();
        assert_eq!(gone.stock, 0);
        assert!(service.get_product(product.id).await.unwrap().is_out_of_stock);

        let actions: Vec<String> = store.log_entries().await.into_iter().map(|l| l.action).collect();
        assert_eq!(actions, ["UPDATE", "UPDATE", "UNAVAILABLE"]);
    }

    #[tokio::test]
    async fn only_admins_delete_and_the_cascade_policy_holds() {
        let store = Arc::new(MemoryStore::new());
        let admin = store.seed_user(Role::Admin, "Paul").await;
        let supplier = store.seed_user(Role::Supplier, "Awa").await;
        let product = store.seed_product(supplier.id, "Sac").await;
        let service = service(&store);

        // N avaliações, M interações, stats e reclamações ligadas
        for name in ["A", "B", "C"] {
            let u = store.seed_user(Role::User, name).await;
            RatingStore::upsert(&*store, u.id, product.id, RatingLevel::Cool, None).await.unwrap();
            store.record_click(product.id, None).await.unwrap();
            ComplaintStore::create(
                &*store,
                NewComplaint {
                    user_id: u.id,
                    product_id: Some(product.id),
                    assigned_admin_id: admin.id,
                    message: "Article non conforme".into(),
                },
            )
            .await
            .unwrap();
        }
        let unrelated = store.seed_product(supplier.id, "Montre").await;
        store.record_click(unrelated.id, None).await.unwrap();

        let err = service.delete_product(&caller(&supplier), product.id).await.unwrap_err();
        assert!(matches!(err, AppError::Forbidden));

        service.delete_product(&caller(&admin), product.id).await.unwrap();

        assert!(matches!(service.get_product(product.id).await, Err(AppError::ProductNotFound)));
        assert_eq!(store.rating_count(product.id).await, 0);
        assert_eq!(store.interaction_count(product.id).await, 0);
        assert!(StatsStore::find(&*store, product.id).await.unwrap().is_none());
        let complaints = store.all_complaints().await;
        assert_eq!(complaints.len(), 3);
        assert!(complaints.iter().all(|c| c.product_id.is_none()));
        // o resto fica intacto
        assert_eq!(store.interaction_count(unrelated.id).await, 1);

        let err = service.delete_product(&caller(&admin), product.id).await.unwrap_err();
        assert!(matches!(err, AppError::ProductNotFound));
    }

    #[tokio::test]
    async fn listing_puts_flagged_new_first() {
        let store = Arc::new(MemoryStore::new());
        let supplier = store.seed_user(Role::Supplier, "Awa").await;
        let service = service(&store);

        let mut flagged = payload();
        flagged.is_new = true;
        flagged.name_fr = "Nouveauté".into();
        let first = service.create_product(&caller(&supplier), flagged).await.unwrap();
        let second = service.create_product(&caller(&supplier), payload()).await.unwrap();
        let third = service.create_product(&caller(&supplier), payload()).await.unwrap();

        let ids: Vec<Uuid> = service.list_products().await.unwrap().into_iter().map(|v| v.product.id).collect();
        assert_eq!(ids, [first.id, third.id, second.id]);

        let view = service.get_product(second.id).await.unwrap();
        // criado agora: novo pela janela de 14 dias
        assert!(view.is_new);
        assert!(view.is_limited_stock);
        assert!(Utc::now() - view.product.created_at < Duration::days(1));
    }

    #[tokio::test]
    async fn dashboard_is_scoped_to_the_supplier() {
        let store = Arc::new(MemoryStore::new());
        let admin = store.seed_user(Role::Admin, "Paul").await;
        let awa = store.seed_user(Role::Supplier, "Awa").await;
        let binta = store.seed_user(Role::Supplier, "Binta").await;
        let rater = store.seed_user(Role::User, "Jean").await;
        let service = service(&store);

        let sac = store.seed_product(awa.id, "Sac").await;
        let old = store.seed_product(awa.id, "Pagne").await;
        let montre = store.seed_product(binta.id, "Montre").await;
        store.backdate_product(old.id, Duration::days(10)).await;
        ProductStore::set_stock(&*store, old.id, 0).await.unwrap();
        // Légendaire (5) e Cool (3)
        RatingStore::upsert(&*store, rater.id, sac.id, RatingLevel::Legendaire, None).await.unwrap();
        RatingStore::upsert(&*store, rater.id, montre.id, RatingLevel::Cool, None).await.unwrap();
        // stats sem avaliação não puxam a média para baixo
        store.record_click(old.id, None).await.unwrap();

        let own = service.dashboard_summary(&caller(&awa)).await.unwrap();
        assert_eq!(
            own,
            DashboardSummary { total_products: 2, out_of_stock: 1, new_products: 1, avg_rating: 5.0 }
        );
        let ids: Vec<Uuid> = service
            .dashboard_products(&caller(&awa))
            .await
            .unwrap()
            .into_iter()
            .map(|v| v.product.id)
            .collect();
        assert_eq!(ids.len(), 2);
        assert!(ids.contains(&sac.id) && ids.contains(&old.id));

        let everything = service.dashboard_summary(&caller(&admin)).await.unwrap();
        assert_eq!(everything.total_products, 3);
        assert_eq!(everything.out_of_stock, 1);
        assert_eq!(everything.new_products, 2);
        assert_eq!(everything.avg_rating, 4.0);
        assert_eq!(service.dashboard_products(&caller(&admin)).await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn dashboard_is_closed_to_customers_and_visitors() {
        let store = Arc::new(MemoryStore::new());
        let customer = store.seed_user(Role::User, "Jean").await;
        let service = service(&store);

        let err = service.dashboard_summary(&caller(&customer)).await.unwrap_err();
        assert!(matches!(err, AppError::Forbidden));
        let err = service.dashboard_products(&Caller::anonymous(None)).await.unwrap_err();
        assert!(matches!(err, AppError::NotLoggedIn));
    }
}
