// src/handlers/products.rs

use axum::{extract::State, response::IntoResponse};
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    common::{
        error::ApiError,
        response::{ActionResponse, NoPayload},
    },
    config::AppState,
    middleware::{
        extract::{ApiJson, ApiPath},
        i18n::Locale,
    },
    models::{
        product::{ContactLink, Product, ProductPayload, ProductView},
        stats::ProductStat,
        user::Caller,
    },
};

#[derive(Debug, Serialize, ToSchema)]
pub struct ProductList {
    pub products: Vec<ProductView>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ProductDetail {
    pub product: ProductView,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ProductSaved {
    pub product: Product,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct StatsUpdated {
    pub stats: ProductStat,
}

// =============================================================================
//  ÁREA 1: VITRINE (público)
// =============================================================================

// GET /api/products
#[utoipa::path(
    get,
    path = "/api/products",
    tag = "Produtos",
    responses(
        (status = 200, description = "Catálogo: novidades primeiro", body = ProductList)
    )
)]
pub async fn list_products(
    State(app_state): State<AppState>,
    locale: Locale,
) -> Result<impl IntoResponse, ApiError> {
    let products = app_state
        .product_service
        .list_products()
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok(ActionResponse::ok(ProductList { products }))
}

// GET /api/products/{id}
#[utoipa::path(
    get,
    path = "/api/products/{id}",
    tag = "Produtos",
    params(("id" = Uuid, Path, description = "ID do produto")),
    responses(
        (status = 200, description = "Produto com estatísticas", body = ProductDetail),
        (status = 404, description = "Produto não encontrado")
    )
)]
pub async fn get_product(
    State(app_state): State<AppState>,
    locale: Locale,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let product = app_state
        .product_service
        .get_product(id)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok(ActionResponse::ok(ProductDetail { product }))
}

// GET /api/products/{id}/contact
#[utoipa::path(
    get,
    path = "/api/products/{id}/contact",
    tag = "Produtos",
    params(("id" = Uuid, Path, description = "ID do produto")),
    responses(
        (status = 200, description = "Link do WhatsApp do admin padrão", body = ContactLink),
        (status = 404, description = "Produto ou admin com telefone não encontrado")
    )
)]
pub async fn contact_link(
    State(app_state): State<AppState>,
    locale: Locale,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let product = app_state
        .product_service
        .get_product(id)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    let whatsapp_link = app_state
        .user_service
        .contact_link(product.product.display_name(locale.as_str()), id)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok(ActionResponse::ok(ContactLink { whatsapp_link }))
}

// POST /api/products/{id}/view
#[utoipa::path(
    post,
    path = "/api/products/{id}/view",
    tag = "Produtos",
    params(("id" = Uuid, Path, description = "ID do produto")),
    responses(
        (status = 200, description = "Visualização contada", body = StatsUpdated),
        (status = 404, description = "Produto não encontrado")
    )
)]
pub async fn record_view(
    State(app_state): State<AppState>,
    locale: Locale,
    caller: Caller,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let stats = app_state
        .interaction_service
        .record_view(&caller, id)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok(ActionResponse::ok(StatsUpdated { stats }))
}

// POST /api/products/{id}/interaction
#[utoipa::path(
    post,
    path = "/api/products/{id}/interaction",
    tag = "Produtos",
    params(("id" = Uuid, Path, description = "ID do produto")),
    responses(
        (status = 200, description = "Clique no WhatsApp registrado", body = StatsUpdated),
        (status = 404, description = "Produto não encontrado")
    )
)]
pub async fn record_interaction(
    State(app_state): State<AppState>,
    locale: Locale,
    caller: Caller,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let stats = app_state
        .interaction_service
        .record_interaction(&caller, id)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok(ActionResponse::ok(StatsUpdated { stats }))
}

// =============================================================================
//  ÁREA 2: PAINEL (admin / fornecedor)
// =============================================================================

// POST /api/products
#[utoipa::path(
    post,
    path = "/api/products",
    tag = "Produtos",
    request_body = ProductPayload,
    responses(
        (status = 201, description = "Produto criado", body = ProductSaved),
        (status = 400, description = "Dados inválidos"),
        (status = 403, description = "Sem permissão")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_product(
    State(app_state): State<AppState>,
    locale: Locale,
    caller: Caller,
    ApiJson(payload): ApiJson<ProductPayload>,
) -> Result<impl IntoResponse, ApiError> {
    let product = app_state
        .product_service
        .create_product(&caller, payload)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok(ActionResponse::created(ProductSaved { product }))
}

// PUT /api/products/{id}
#[utoipa::path(
    put,
    path = "/api/products/{id}",
    tag = "Produtos",
    request_body = ProductPayload,
    params(("id" = Uuid, Path, description = "ID do produto")),
    responses(
        (status = 200, description = "Produto atualizado", body = ProductSaved),
        (status = 403, description = "Produto de outro fornecedor"),
        (status = 404, description = "Produto não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_product(
    State(app_state): State<AppState>,
    locale: Locale,
    caller: Caller,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(payload): ApiJson<ProductPayload>,
) -> Result<impl IntoResponse, ApiError> {
    let product = app_state
        .product_service
        .update_product(&caller, id, payload)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok(ActionResponse::ok(ProductSaved { product }))
}

// DELETE /api/products/{id}
#[utoipa::path(
    delete,
    path = "/api/products/{id}",
    tag = "Produtos",
    params(("id" = Uuid, Path, description = "ID do produto")),
    responses(
        (status = 200, description = "Produto removido com avaliações e estatísticas", body = NoPayload),
        (status = 403, description = "Apenas admin"),
        (status = 404, description = "Produto não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_product(
    State(app_state): State<AppState>,
    locale: Locale,
    caller: Caller,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    app_state
        .product_service
        .delete_product(&caller, id)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok(ActionResponse::done())
}

// POST /api/products/{id}/unavailable
#[utoipa::path(
    post,
    path = "/api/products/{id}/unavailable",
    tag = "Produtos",
    params(("id" = Uuid, Path, description = "ID do produto")),
    responses(
        (status = 200, description = "Estoque zerado", body = ProductSaved),
        (status = 403, description = "Produto de outro fornecedor"),
        (status = 404, description = "Produto não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn mark_unavailable(
    State(app_state): State<AppState>,
    locale: Locale,
    caller: Caller,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let product = app_state
        .product_service
        .mark_unavailable(&caller, id)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok(ActionResponse::ok(ProductSaved { product }))
}
