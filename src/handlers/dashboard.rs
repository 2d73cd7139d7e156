// src/handlers/dashboard.rs

use axum::{extract::State, response::IntoResponse};

use crate::{
    common::{error::ApiError, response::ActionResponse},
    config::AppState,
    handlers::products::ProductList,
    middleware::i18n::Locale,
    models::{product::DashboardSummary, user::Caller},
};

// GET /api/dashboard
#[utoipa::path(
    get,
    path = "/api/dashboard",
    tag = "Painel",
    responses(
        (status = 200, description = "Totais, sem estoque, novidades da semana e média das avaliações", body = DashboardSummary),
        (status = 401, description = "Sessão ausente"),
        (status = 403, description = "Apenas admin ou fornecedor")
    ),
    security(("api_jwt" = []))
)]
pub async fn summary(
    State(app_state): State<AppState>,
    locale: Locale,
    caller: Caller,
) -> Result<impl IntoResponse, ApiError> {
    let summary = app_state
        .product_service
        .dashboard_summary(&caller)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok(ActionResponse::ok(summary))
}

// GET /api/dashboard/products
#[utoipa::path(
    get,
    path = "/api/dashboard/products",
    tag = "Painel",
    responses(
        (status = 200, description = "Tabela de produtos do painel (o fornecedor vê só os seus)", body = ProductList),
        (status = 403, description = "Apenas admin ou fornecedor")
    ),
    security(("api_jwt" = []))
)]
pub async fn products(
    State(app_state): State<AppState>,
    locale: Locale,
    caller: Caller,
) -> Result<impl IntoResponse, ApiError> {
    let products = app_state
        .product_service
        .dashboard_products(&caller)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok(ActionResponse::ok(ProductList { products }))
}
