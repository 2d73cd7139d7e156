// src/models/user.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::common::error::AppError;

// Os três papéis da loja. Enum fechado: todo `match` sobre ele é exaustivo.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "user_role", rename_all = "SCREAMING_SNAKE_CASE")] // Banco
#[serde(rename_all = "SCREAMING_SNAKE_CASE")] // JSON
pub enum Role {
    Admin,
    Supplier,
    User,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "ADMIN",
            Role::Supplier => "SUPPLIER",
            Role::User => "USER",
        }
    }
}

// Representa um usuário vindo do banco de dados
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,

    // Identificador do usuário no provedor de identidade externo
    #[schema(example = "8f6c1f8e-5d0b-4c7a-9a43-6b1f0c2d9e11")]
    pub external_id: Option<String>,

    #[schema(example = "marie@sarenastore.cm")]
    pub email: Option<String>,

    #[schema(example = "Marie Client")]
    pub full_name: Option<String>,

    pub avatar: Option<String>,

    #[schema(example = "+237690000000")]
    pub phone: Option<String>,

    pub role: Role,
    pub email_verified_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

/// Identidade já verificada pelo provedor externo. Nunca é derivada localmente.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExternalIdentity {
    pub subject: String,
    pub email: Option<String>,
    pub full_name: Option<String>,
    pub avatar_url: Option<String>,
    pub email_verified_at: Option<DateTime<Utc>>,
}

/// Quem está chamando a operação: sessão resolvida (ou anônima) + IP de origem.
#[derive(Debug, Clone, Default)]
pub struct Caller {
    pub user: Option<User>,
    pub ip: Option<String>,
}

impl Caller {
    pub fn anonymous(ip: Option<String>) -> Self {
        Self { user: None, ip }
    }

    pub fn authenticated(user: User, ip: Option<String>) -> Self {
        Self { user: Some(user), ip }
    }

    // Toda mutação começa aqui: sem sessão é sempre erro, nunca no-op silencioso.
    pub fn require(&self) -> Result<&User, AppError> {
        self.user.as_ref().ok_or(AppError::NotLoggedIn)
    }

    pub fn ip(&self) -> Option<&str> {
        self.ip.as_deref()
    }
}

// Resposta do getSession
#[derive(Debug, Serialize, ToSchema)]
pub struct SessionResponse {
    pub user: Option<User>,
}

// Administrador exibido no formulário de reclamação
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AdminSummary {
    pub id: Uuid,
    pub full_name: Option<String>,
    pub avatar: Option<String>,
}

impl From<&User> for AdminSummary {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            full_name: user.full_name.clone(),
            avatar: user.avatar.clone(),
        }
    }
}

// Contato padrão para o pedido via WhatsApp
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AdminContact {
    pub id: Uuid,
    pub full_name: Option<String>,
    pub phone: Option<String>,
}
