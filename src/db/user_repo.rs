// src/db/user_repo.rs

use async_trait::async_trait;
use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::store::UserStore,
    models::user::{ExternalIdentity, Role, User},
};

const USER_COLUMNS: &str = "id, external_id, email, full_name, avatar, phone, role, \
     email_verified_at, created_at, updated_at";

// seq é a ordem de inserção; created_at sozinho empata
const ADMIN_ORDER: &str = "ORDER BY created_at ASC, seq ASC";

// O repositório de usuários, responsável por todas as interações com a tabela 'users'
#[derive(Clone)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn find_by_id_with<'e, E>(&self, executor: E, id: Uuid) -> Result<Option<User>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let user = sqlx::query_as::<_, User>(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1"))
            .bind(id)
            .fetch_optional(executor)
            .await?;
        Ok(user)
    }
}

#[async_trait]
impl UserStore for UserRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, AppError> {
        self.find_by_id_with(&self.pool, id).await
    }

    async fn find_by_external_id(&self, external_id: &str) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE external_id = $1"
        ))
        .bind(external_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    async fn create_from_identity(&self, identity: &ExternalIdentity) -> Result<User, AppError> {
        // Duas sessões simultâneas do mesmo usuário novo: a segunda vira refresh.
        // O papel nunca entra no UPDATE.
        let user = sqlx::query_as::<_, User>(&format!(
            r#"
            INSERT INTO users (external_id, email, full_name, avatar, email_verified_at, role)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (external_id) DO UPDATE SET
                email = COALESCE(EXCLUDED.email, users.email),
                full_name = COALESCE(EXCLUDED.full_name, users.full_name),
                avatar = COALESCE(EXCLUDED.avatar, users.avatar),
                email_verified_at = COALESCE(EXCLUDED.email_verified_at, users.email_verified_at),
                updated_at = clock_timestamp()
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(&identity.subject)
        .bind(&identity.email)
        .bind(&identity.full_name)
        .bind(&identity.avatar_url)
        .bind(identity.email_verified_at)
        .bind(Role::User)
        .fetch_one(&self.pool)
        .await?;
        Ok(user)
    }

    async fn refresh_profile(&self, id: Uuid, identity: &ExternalIdentity) -> Result<User, AppError> {
        let user = sqlx::query_as::<_, User>(&format!(
            r#"
            UPDATE users SET
                email = COALESCE($2, email),
                full_name = COALESCE($3, full_name),
                avatar = COALESCE($4, avatar),
                email_verified_at = COALESCE($5, email_verified_at),
                updated_at = clock_timestamp()
            WHERE id = $1
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(&identity.email)
        .bind(&identity.full_name)
        .bind(&identity.avatar_url)
        .bind(identity.email_verified_at)
        .fetch_optional(&self.pool)
        .await?;

        user.ok_or_else(|| AppError::InternalServerError(anyhow::anyhow!("usuário {id} sumiu durante o refresh")))
    }

    async fn list_admins(&self) -> Result<Vec<User>, AppError> {
        let admins = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE role = $1 {ADMIN_ORDER}"
        ))
        .bind(Role::Admin)
        .fetch_all(&self.pool)
        .await?;
        Ok(admins)
    }

    async fn earliest_admin(&self) -> Result<Option<User>, AppError> {
        let admin = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE role = $1 {ADMIN_ORDER} LIMIT 1"
        ))
        .bind(Role::Admin)
        .fetch_optional(&self.pool)
        .await?;
        Ok(admin)
    }
}
