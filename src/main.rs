//src/main.rs

use anyhow::Context;
use axum::{
    extract::DefaultBodyLimit,
    routing::{get, patch, post, put},
    Router,
};
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

mod common;
mod config;
mod db;
mod docs;
mod handlers;
mod middleware;
mod models;
mod services;

use crate::config::{AppState, Config};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .compact()
        .init();

    // Sem configuração completa a aplicação não sobe.
    let config = Config::from_env()?;
    let app_state = AppState::new(&config).await?;

    sqlx::migrate!()
        .run(&app_state.db_pool)
        .await
        .context("Falha ao rodar as migrações do banco de dados.")?;

    tracing::info!("✅ Migrações do banco de dados executadas com sucesso!");

    // Vitrine e painel de produtos
    let product_routes = Router::new()
        .route(
            "/",
            get(handlers::products::list_products).post(handlers::products::create_product),
        )
        .route(
            "/{id}",
            get(handlers::products::get_product)
                .put(handlers::products::update_product)
                .delete(handlers::products::delete_product),
        )
        .route("/{id}/unavailable", post(handlers::products::mark_unavailable))
        .route("/{id}/contact", get(handlers::products::contact_link))
        .route("/{id}/view", post(handlers::products::record_view))
        .route("/{id}/interaction", post(handlers::products::record_interaction))
        .route(
            "/{id}/ratings",
            get(handlers::ratings::list_ratings).post(handlers::ratings::submit_rating),
        );

    let complaint_routes = Router::new()
        .route(
            "/",
            post(handlers::complaints::submit_complaint).get(handlers::complaints::list_complaints),
        )
        .route("/{id}", axum::routing::delete(handlers::complaints::delete_complaint))
        .route("/{id}/assignee", put(handlers::complaints::reassign_complaint))
        .route("/{id}/status", patch(handlers::complaints::update_status))
        .route("/{id}/message", patch(handlers::complaints::update_message));

    let log_routes = Router::new()
        .route("/", get(handlers::logs::list_logs))
        .route("/export", get(handlers::logs::export_logs));

    let media_routes = Router::new()
        .route(
            "/",
            post(handlers::media::upload_file).delete(handlers::media::delete_file),
        )
        .layer(DefaultBodyLimit::max(handlers::media::UPLOAD_BODY_LIMIT));

    let dashboard_routes = Router::new()
        .route("/", get(handlers::dashboard::summary))
        .route("/products", get(handlers::dashboard::products));

    let admin_routes = Router::new()
        .route("/", get(handlers::admins::list_admins))
        .route("/default", get(handlers::admins::default_admin));

    // Combina tudo no router principal
    let app = Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", docs::ApiDoc::openapi()))
        .route("/api/health", get(handlers::session::health))
        .route("/api/session", get(handlers::session::get_session))
        .route("/api/ratings/{id}", axum::routing::delete(handlers::ratings::delete_rating))
        .nest("/api/products", product_routes)
        .nest("/api/complaints", complaint_routes)
        .nest("/api/logs", log_routes)
        .nest("/api/media", media_routes)
        .nest("/api/admins", admin_routes)
        .nest("/api/dashboard", dashboard_routes)
        .with_state(app_state);

    let listener = TcpListener::bind(&config.bind_addr)
        .await
        .with_context(|| format!("Falha ao iniciar o listener TCP em {}", config.bind_addr))?;
    tracing::info!("🚀 Servidor escutando em {}", listener.local_addr()?);

    axum::serve(listener, app).await.context("Erro no servidor Axum")?;
    Ok(())
}
