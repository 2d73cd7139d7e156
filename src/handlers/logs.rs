// src/handlers/logs.rs

use axum::{extract::State, response::IntoResponse};

use crate::{
    common::{error::ApiError, response::ActionResponse},
    config::AppState,
    middleware::{extract::ApiQuery, i18n::Locale},
    models::{
        log::{ExportQuery, LogExport, LogList, LogQuery},
        user::Caller,
    },
};

// GET /api/logs?limit=100
#[utoipa::path(
    get,
    path = "/api/logs",
    tag = "Logs",
    params(("limit" = Option<i64>, Query, description = "Padrão 100, máximo 1000")),
    responses(
        (status = 200, description = "Logs visíveis ao chamador, mais recentes primeiro", body = LogList),
        (status = 403, description = "Clientes não veem logs")
    ),
    security(("api_jwt" = []))
)]
pub async fn list_logs(
    State(app_state): State<AppState>,
    locale: Locale,
    caller: Caller,
    ApiQuery(query): ApiQuery<LogQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let logs = app_state
        .log_service
        .get_logs(&caller, query.limit)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok(ActionResponse::ok(LogList { logs }))
}

// GET /api/logs/export?format=csv
#[utoipa::path(
    get,
    path = "/api/logs/export",
    tag = "Logs",
    params(("format" = String, Query, description = "json | csv")),
    responses(
        (status = 200, description = "Exportação serializada", body = LogExport),
        (status = 403, description = "Clientes não exportam logs")
    ),
    security(("api_jwt" = []))
)]
pub async fn export_logs(
    State(app_state): State<AppState>,
    locale: Locale,
    caller: Caller,
    ApiQuery(query): ApiQuery<ExportQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let data = app_state
        .log_service
        .export_logs(&caller, query.format)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok(ActionResponse::ok(LogExport { data }))
}
