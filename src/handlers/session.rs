// src/handlers/session.rs

use axum::{extract::State, response::IntoResponse, Json};
use serde::Serialize;
use utoipa::ToSchema;

use crate::{
    config::AppState,
    models::user::{Caller, SessionResponse},
};

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    #[schema(example = "OK")]
    pub status: String,
    // Escritas de log de atividade perdidas desde o boot
    pub activity_log_failures: u64,
}

// GET /api/session
#[utoipa::path(
    get,
    path = "/api/session",
    tag = "Sessão",
    responses(
        (status = 200, description = "Usuário da sessão, ou null", body = SessionResponse)
    ),
    security((), ("api_jwt" = []))
)]
pub async fn get_session(caller: Caller) -> impl IntoResponse {
    Json(SessionResponse { user: caller.user })
}

// GET /api/health
#[utoipa::path(
    get,
    path = "/api/health",
    tag = "Sessão",
    responses(
        (status = 200, description = "Serviço no ar", body = HealthResponse)
    )
)]
pub async fn health(State(app_state): State<AppState>) -> impl IntoResponse {
    Json(HealthResponse {
        status: "OK".to_string(),
        activity_log_failures: app_state.activity.failure_count(),
    })
}
