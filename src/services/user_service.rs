// src/services/user_service.rs

use std::sync::Arc;

use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::UserStore,
    models::user::{AdminContact, AdminSummary},
};

/// Link do WhatsApp com a mensagem de pedido já preenchida.
/// O telefone perde tudo que não for dígito.
pub fn whatsapp_link(phone: &str, product_name: &str, product_id: Uuid) -> String {
    let digits: String = phone.chars().filter(|c| c.is_ascii_digit()).collect();
    let message = format!(
        "Bonjour ! Je suis intéressé(e) par le produit \"{product_name}\" (Réf: {product_id}). \
         Pouvez-vous me donner plus d'informations ?"
    );
    format!("https://wa.me/{}?text={}", digits, urlencoding::encode(&message))
}

#[derive(Clone)]
pub struct UserService {
    users: Arc<dyn UserStore>,
}

impl UserService {
    pub fn new(users: Arc<dyn UserStore>) -> Self {
        Self { users }
    }

    /// Admins para o formulário de reclamação, o mais antigo primeiro.
    pub async fn list_admins(&self) -> Result<Vec<AdminSummary>, AppError> {
        let admins = self.users.list_admins().await?;
        Ok(admins.iter().map(AdminSummary::from).collect())
    }

    /// Contato dos pedidos: o admin mais antigo que tem telefone.
    pub async fn default_admin(&self) -> Result<AdminContact, AppError> {
        self.users
            .list_admins()
            .await?
            .into_iter()
            .find(|admin| admin.phone.as_deref().is_some_and(|p| !p.trim().is_empty()))
            .map(|admin| AdminContact {
                id: admin.id,
                full_name: admin.full_name,
                phone: admin.phone,
            })
            .ok_or(AppError::AdminNotFound)
    }

    pub async fn contact_link(&self, product_name: &str, product_id: Uuid) -> Result<String, AppError> {
        let admin = self.default_admin().await?;
        let phone = admin.phone.unwrap_or_default();
        Ok(whatsapp_link(&phone, product_name, product_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{db::memory::MemoryStore, models::user::Role};

    #[test]
    fn link_strips_the_phone_and_encodes_the_message() {
        let id = Uuid::nil();
        let link = whatsapp_link("+237 690-00-00-00", "Sac & Co", id);
        assert!(link.starts_with("https://wa.me/237690000000?text="));
        assert!(link.contains("Sac%20%26%20Co"));
        assert!(link.contains("00000000-0000-0000-0000-000000000000"));
        assert!(!link.contains(' '));
    }

    #[tokio::test]
    async fn admins_are_listed_oldest_first_and_the_default_has_a_phone() {
        let store = Arc::new(MemoryStore::new());
        let oldest = store.seed_user(Role::Admin, "Premier").await;
        let second = store.seed_user(Role::Admin, "Second").await;
        store.seed_user(Role::Supplier, "Awa").await;
        let service = UserService::new(store.clone());

        let admins = service.list_admins().await.unwrap();
        let ids: Vec<Uuid> = admins.iter().map(|a| a.id).collect();
        assert_eq!(ids, [oldest.id, second.id]);

        assert!(matches!(service.default_admin().await, Err(AppError::AdminNotFound)));

        store.set_phone(second.id, "+237 677 11 22 33").await;
        assert_eq!(service.default_admin().await.unwrap().id, second.id);
        store.set_phone(oldest.id, "+237 690 00 00 00").await;
        assert_eq!(service.default_admin().await.unwrap().id, oldest.id);

        let link = service.contact_link("Pagne", Uuid::nil()).await.unwrap();
        assert!(link.starts_with("https://wa.me/237690000000?text="));
    }
}
