// src/services/identity_service.rs

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::Deserialize;

use crate::{
    common::error::AppError,
    db::UserStore,
    models::user::{Caller, ExternalIdentity, User},
};

/// Provedor externo que autentica o usuário. Aqui só verificamos o que ele assina.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn verify(&self, token: &str) -> Result<ExternalIdentity, AppError>;
}

#[derive(Debug, Clone, Default, Deserialize)]
struct UserMetadata {
    full_name: Option<String>,
    name: Option<String>,
    avatar_url: Option<String>,
    picture: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
struct ProviderClaims {
    sub: String,
    email: Option<String>,
    email_confirmed_at: Option<String>,
    #[serde(default)]
    user_metadata: UserMetadata,
}

impl From<ProviderClaims> for ExternalIdentity {
    fn from(claims: ProviderClaims) -> Self {
        let metadata = claims.user_metadata;
        Self {
            subject: claims.sub,
            email: claims.email.filter(|e| !e.is_empty()),
            full_name: metadata.full_name.or(metadata.name),
            avatar_url: metadata.avatar_url.or(metadata.picture),
            // Data malformada conta como "não verificado", não invalida o token
            email_verified_at: claims
                .email_confirmed_at
                .as_deref()
                .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
                .map(|d| d.with_timezone(&Utc)),
        }
    }
}

/// Tokens HS256 assinados pelo provedor (audience `authenticated`).
pub struct JwtIdentityProvider {
    key: DecodingKey,
    validation: Validation,
}

impl JwtIdentityProvider {
    pub const AUDIENCE: &'static str = "authenticated";

    pub fn new(secret: &str) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_audience(&[Self::AUDIENCE]);
        Self {
            key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
        }
    }
}

#[async_trait]
impl IdentityProvider for JwtIdentityProvider {
    async fn verify(&self, token: &str) -> Result<ExternalIdentity, AppError> {
        let data = decode::<ProviderClaims>(token, &self.key, &self.validation).map_err(|e| {
            tracing::debug!("Token recusado: {}", e);
            AppError::InvalidToken
        })?;
        Ok(data.claims.into())
    }
}

#[derive(Clone)]
pub struct IdentityService {
    users: Arc<dyn UserStore>,
    provider: Arc<dyn IdentityProvider>,
}

impl IdentityService {
    pub fn new(users: Arc<dyn UserStore>, provider: Arc<dyn IdentityProvider>) -> Self {
        Self { users, provider }
    }

    /// Usuário local da identidade: cria no primeiro acesso (papel USER),
    /// senão sincroniza o perfil. O papel nunca muda por aqui.
    pub async fn resolve(&self, identity: &ExternalIdentity) -> Result<User, AppError> {
        match self.users.find_by_external_id(&identity.subject).await? {
            Some(user) => self.users.refresh_profile(user.id, identity).await,
            None => {
                let user = self.users.create_from_identity(identity).await?;
                tracing::info!("👤 Novo usuário criado a partir do provedor: {}", user.id);
                Ok(user)
            }
        }
    }

    pub async fn authenticate(&self, token: &str) -> Result<User, AppError> {
        let identity = self.provider.verify(token).await?;
        self.resolve(&identity).await
    }

    /// getSession: nunca falha. Qualquer erro vira sessão anônima.
    pub async fn session(&self, token: Option<&str>, ip: Option<String>) -> Caller {
        let Some(token) = token else {
            return Caller::anonymous(ip);
        };

        match self.authenticate(token).await {
            Ok(user) => Caller::authenticated(user, ip),
            Err(e) => {
                tracing::warn!("Sessão tratada como anônima: {}", e);
                Caller::anonymous(ip)
            }
        }
    }
}
