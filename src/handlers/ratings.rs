// src/handlers/ratings.rs

use axum::{extract::State, response::IntoResponse};
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    common::{error::ApiError, response::ActionResponse},
    config::AppState,
    middleware::{
        extract::{ApiJson, ApiPath},
        i18n::Locale,
    },
    models::{
        rating::{RatingOutcome, RatingWithAuthor, SubmitRatingPayload},
        user::Caller,
    },
};

#[derive(Debug, Serialize, ToSchema)]
pub struct RatingList {
    pub ratings: Vec<RatingWithAuthor>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RatingRemoved {
    pub rating_avg: f64,
}

// GET /api/products/{id}/ratings
#[utoipa::path(
    get,
    path = "/api/products/{id}/ratings",
    tag = "Avaliações",
    params(("id" = Uuid, Path, description = "ID do produto")),
    responses(
        (status = 200, description = "Avaliações, mais recentes primeiro", body = RatingList)
    )
)]
pub async fn list_ratings(
    State(app_state): State<AppState>,
    locale: Locale,
    ApiPath(product_id): ApiPath<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let ratings = app_state
        .rating_service
        .product_ratings(product_id)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok(ActionResponse::ok(RatingList { ratings }))
}

// POST /api/products/{id}/ratings
#[utoipa::path(
    post,
    path = "/api/products/{id}/ratings",
    tag = "Avaliações",
    request_body = SubmitRatingPayload,
    params(("id" = Uuid, Path, description = "ID do produto")),
    responses(
        (status = 200, description = "Avaliação gravada e média recalculada", body = RatingOutcome),
        (status = 400, description = "Nível inválido"),
        (status = 403, description = "Fornecedor ou dono do produto"),
        (status = 404, description = "Produto não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn submit_rating(
    State(app_state): State<AppState>,
    locale: Locale,
    caller: Caller,
    ApiPath(product_id): ApiPath<Uuid>,
    ApiJson(payload): ApiJson<SubmitRatingPayload>,
) -> Result<impl IntoResponse, ApiError> {
    let outcome = app_state
        .rating_service
        .submit_rating(&caller, product_id, payload)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok(ActionResponse::ok(outcome))
}

// DELETE /api/ratings/{id}
#[utoipa::path(
    delete,
    path = "/api/ratings/{id}",
    tag = "Avaliações",
    params(("id" = Uuid, Path, description = "ID da avaliação")),
    responses(
        (status = 200, description = "Avaliação removida", body = RatingRemoved),
        (status = 403, description = "Avaliação de outro autor"),
        (status = 404, description = "Avaliação não encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_rating(
    State(app_state): State<AppState>,
    locale: Locale,
    caller: Caller,
    ApiPath(rating_id): ApiPath<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let rating_avg = app_state
        .rating_service
        .delete_rating(&caller, rating_id)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok(ActionResponse::ok(RatingRemoved { rating_avg }))
}
