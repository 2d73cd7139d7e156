// src/config.rs

use std::{env, sync::Arc, time::Duration};

use anyhow::Context;
use sqlx::{postgres::PgPoolOptions, PgPool};

use crate::{
    db::{
        ComplaintRepository, LogRepository, ProductRepository, RatingRepository, StatsRepository,
        UserRepository,
    },
    services::{
        activity_log::ActivityLogger,
        complaint_service::ComplaintService,
        identity_service::{IdentityService, JwtIdentityProvider},
        interaction_service::InteractionService,
        log_service::LogService,
        media_service::{MediaService, SupabaseStorage},
        product_service::ProductService,
        rating_service::RatingService,
        user_service::UserService,
    },
};

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub database_max_connections: u32,
    pub identity_jwt_secret: String,
    pub storage_url: String,
    pub storage_service_key: String,
    pub storage_bucket: String,
    pub bind_addr: String,
    pub activity_log_buffer: usize,
}

fn required(key: &str) -> anyhow::Result<String> {
    env::var(key).with_context(|| format!("{key} deve ser definida"))
}

fn optional<T: std::str::FromStr>(key: &str, default: T) -> anyhow::Result<T>
where
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("{key} inválida: {raw}")),
        Err(_) => Ok(default),
    }
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        // .env é opcional em produção
        dotenvy::dotenv().ok();

        Ok(Self {
            database_url: required("DATABASE_URL")?,
            database_max_connections: optional("DATABASE_MAX_CONNECTIONS", 5)?,
            identity_jwt_secret: required("IDENTITY_JWT_SECRET")?,
            storage_url: required("STORAGE_URL")?,
            storage_service_key: required("STORAGE_SERVICE_KEY")?,
            storage_bucket: optional("STORAGE_BUCKET", "products".to_string())?,
            bind_addr: optional("BIND_ADDR", "0.0.0.0:3000".to_string())?,
            activity_log_buffer: optional("ACTIVITY_LOG_BUFFER", 1024)?,
        })
    }
}

#[derive(Clone)]
pub struct AppState {
    pub db_pool: PgPool,
    pub activity: ActivityLogger,
    pub identity_service: IdentityService,
    pub product_service: ProductService,
    pub rating_service: RatingService,
    pub complaint_service: ComplaintService,
    pub interaction_service: InteractionService,
    pub log_service: LogService,
    pub media_service: MediaService,
    pub user_service: UserService,
}

impl AppState {
    pub async fn new(config: &Config) -> anyhow::Result<Self> {
        let db_pool = PgPoolOptions::new()
            .max_connections(config.database_max_connections)
            .acquire_timeout(Duration::from_secs(3))
            .connect(&config.database_url)
            .await
            .context("Falha ao conectar ao banco de dados")?;

        tracing::info!("✅ Conexão com o banco de dados estabelecida com sucesso!");

        // --- Monta o gráfico de dependências ---
        let users = Arc::new(UserRepository::new(db_pool.clone()));
        let products = Arc::new(ProductRepository::new(db_pool.clone()));
        let ratings = Arc::new(RatingRepository::new(db_pool.clone()));
        let complaints = Arc::new(ComplaintRepository::new(db_pool.clone()));
        let stats = Arc::new(StatsRepository::new(db_pool.clone()));
        let logs = Arc::new(LogRepository::new(db_pool.clone()));

        let activity = ActivityLogger::spawn(logs.clone(), config.activity_log_buffer);

        let provider = Arc::new(JwtIdentityProvider::new(&config.identity_jwt_secret));
        let storage = SupabaseStorage::new(
            &config.storage_url,
            &config.storage_service_key,
            &config.storage_bucket,
        )
        .context("Falha ao criar o cliente do storage")?;

        Ok(Self {
            identity_service: IdentityService::new(users.clone(), provider),
            product_service: ProductService::new(users.clone(), products.clone(), activity.clone()),
            rating_service: RatingService::new(products.clone(), ratings, activity.clone()),
            complaint_service: ComplaintService::new(
                users.clone(),
                products.clone(),
                complaints,
                activity.clone(),
            ),
            interaction_service: InteractionService::new(stats, activity.clone()),
            log_service: LogService::new(logs, products),
            media_service: MediaService::new(Arc::new(storage)),
            user_service: UserService::new(users),
            activity,
            db_pool,
        })
    }
}
