// src/handlers/admins.rs

use axum::{extract::State, response::IntoResponse};
use serde::Serialize;
use utoipa::ToSchema;

use crate::{
    common::{error::ApiError, response::ActionResponse},
    config::AppState,
    middleware::i18n::Locale,
    models::user::{AdminContact, AdminSummary},
};

#[derive(Debug, Serialize, ToSchema)]
pub struct AdminList {
    pub admins: Vec<AdminSummary>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct DefaultAdmin {
    pub admin: AdminContact,
}

// GET /api/admins
#[utoipa::path(
    get,
    path = "/api/admins",
    tag = "Administradores",
    responses(
        (status = 200, description = "Admins do formulário de reclamação, o mais antigo primeiro", body = AdminList)
    )
)]
pub async fn list_admins(
    State(app_state): State<AppState>,
    locale: Locale,
) -> Result<impl IntoResponse, ApiError> {
    let admins = app_state
        .user_service
        .list_admins()
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok(ActionResponse::ok(AdminList { admins }))
}

// GET /api/admins/default
#[utoipa::path(
    get,
    path = "/api/admins/default",
    tag = "Administradores",
    responses(
        (status = 200, description = "Contato padrão dos pedidos", body = DefaultAdmin),
        (status = 404, description = "Nenhum admin com telefone")
    )
)]
pub async fn default_admin(
    State(app_state): State<AppState>,
    locale: Locale,
) -> Result<impl IntoResponse, ApiError> {
    let admin = app_state
        .user_service
        .default_admin()
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok(ActionResponse::ok(DefaultAdmin { admin }))
}
