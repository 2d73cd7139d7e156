// src/handlers/complaints.rs

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
        extract::{ApiJson, ApiPath, ApiQuery},
        i18n::Locale,
    },
    models::{
        complaint::{
            ComplaintCreated, ComplaintDetail, ComplaintFilter, ReassignComplaintPayload,
            SubmitComplaintPayload, UpdateComplaintMessagePayload, UpdateComplaintStatusPayload,
        },
        user::Caller,
    },
};

#[derive(Debug, Serialize, ToSchema)]
pub struct ComplaintList {
    pub complaints: Vec<ComplaintDetail>,
}

// POST /api/complaints
#[utoipa::path(
    post,
    path = "/api/complaints",
    tag = "Reclamações",
    request_body = SubmitComplaintPayload,
    responses(
        (status = 201, description = "Reclamação registrada", body = ComplaintCreated),
        (status = 400, description = "Mensagem curta demais ou nenhum admin"),
        (status = 403, description = "Fornecedor não reclama")
    ),
    security(("api_jwt" = []))
)]
pub async fn submit_complaint(
    State(app_state): State<AppState>,
    locale: Locale,
    caller: Caller,
    ApiJson(payload): ApiJson<SubmitComplaintPayload>,
) -> Result<impl IntoResponse, ApiError> {
    let complaint = app_state
        .complaint_service
        .submit_complaint(&caller, payload)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok(ActionResponse::created(ComplaintCreated { complaint_id: complaint.id }))
}

// GET /api/complaints?status=RECEIVED
#[utoipa::path(
    get,
    path = "/api/complaints",
    tag = "Reclamações",
    params(("status" = Option<String>, Query, description = "RECEIVED | IN_PROGRESS | RESOLVED")),
    responses(
        (status = 200, description = "Reclamações, mais recentes primeiro", body = ComplaintList),
        (status = 403, description = "Apenas admin")
    ),
    security(("api_jwt" = []))
)]
pub async fn list_complaints(
    State(app_state): State<AppState>,
    locale: Locale,
    caller: Caller,
    ApiQuery(filter): ApiQuery<ComplaintFilter>,
) -> Result<impl IntoResponse, ApiError> {
    let complaints = app_state
        .complaint_service
        .list_complaints(&caller, filter.status)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok(ActionResponse::ok(ComplaintList { complaints }))
}

// PUT /api/complaints/{id}/assignee
#[utoipa::path(
    put,
    path = "/api/complaints/{id}/assignee",
    tag = "Reclamações",
    request_body = ReassignComplaintPayload,
    params(("id" = Uuid, Path, description = "ID da reclamação")),
    responses(
        (status = 200, description = "Reclamação reatribuída", body = NoPayload),
        (status = 404, description = "Reclamação ou admin não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn reassign_complaint(
    State(app_state): State<AppState>,
    locale: Locale,
    caller: Caller,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(payload): ApiJson<ReassignComplaintPayload>,
) -> Result<impl IntoResponse, ApiError> {
    app_state
        .complaint_service
        .reassign_complaint(&caller, id, payload.admin_id)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok(ActionResponse::done())
}

// PATCH /api/complaints/{id}/status
#[utoipa::path(
    patch,
    path = "/api/complaints/{id}/status",
    tag = "Reclamações",
    request_body = UpdateComplaintStatusPayload,
    params(("id" = Uuid, Path, description = "ID da reclamação")),
    responses(
        (status = 200, description = "Status atualizado", body = NoPayload),
        (status = 404, description = "Reclamação não encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_status(
    State(app_state): State<AppState>,
    locale: Locale,
    caller: Caller,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(payload): ApiJson<UpdateComplaintStatusPayload>,
) -> Result<impl IntoResponse, ApiError> {
    app_state
        .complaint_service
        .update_status(&caller, id, payload.status)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok(ActionResponse::done())
}

// PATCH /api/complaints/{id}/message
#[utoipa::path(
    patch,
    path = "/api/complaints/{id}/message",
    tag = "Reclamações",
    request_body = UpdateComplaintMessagePayload,
    params(("id" = Uuid, Path, description = "ID da reclamação")),
    responses(
        (status = 200, description = "Mensagem corrigida", body = NoPayload),
        (status = 400, description = "Mensagem curta demais"),
        (status = 404, description = "Reclamação não encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_message(
    State(app_state): State<AppState>,
    locale: Locale,
    caller: Caller,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(payload): ApiJson<UpdateComplaintMessagePayload>,
) -> Result<impl IntoResponse, ApiError> {
    app_state
        .complaint_service
        .update_message(&caller, id, &payload.message)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok(ActionResponse::done())
}

// DELETE /api/complaints/{id}
#[utoipa::path(
    delete,
    path = "/api/complaints/{id}",
    tag = "Reclamações",
    params(("id" = Uuid, Path, description = "ID da reclamação")),
    responses(
        (status = 200, description = "Reclamação removida", body = NoPayload),
        (status = 403, description = "Apenas admin"),
        (status = 404, description = "Reclamação não encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_complaint(
    State(app_state): State<AppState>,
    locale: Locale,
    caller: Caller,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    app_state
        .complaint_service
        .delete_complaint(&caller, id)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok(ActionResponse::done())
}
