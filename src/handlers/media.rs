// src/handlers/media.rs

use axum::{
    extract::{multipart::MultipartError, Multipart, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{
    common::{
        error::{ApiError, AppError},
        response::{ActionResponse, NoPayload},
    },
    config::AppState,
    middleware::{
        extract::{ApiJson, ApiMultipart},
        i18n::Locale,
    },
    models::user::Caller,
    services::media_service::{FileUpload, MAX_FILE_SIZE},
};

/// Limite do corpo da rota de upload: o arquivo + folga para o multipart.
pub const UPLOAD_BODY_LIMIT: usize = MAX_FILE_SIZE + 1024 * 1024;

#[derive(Debug, Serialize, ToSchema)]
pub struct FileUploaded {
    #[schema(example = "https://abc.supabase.co/storage/v1/object/public/products/images/1735689600000-3f9a1c2b4d5e6.jpg")]
    pub url: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct DeleteFilePayload {
    pub url: String,
}

// Só para a documentação do formulário
#[allow(dead_code)]
#[derive(ToSchema)]
pub struct UploadForm {
    #[schema(value_type = String, format = Binary)]
    pub file: Vec<u8>,
    #[schema(example = "images")]
    pub folder: Option<String>,
}

fn multipart_error(err: MultipartError) -> AppError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        return AppError::FileTooLarge;
    }
    tracing::warn!("Multipart inválido: {}", err.body_text());
    AppError::MissingFile
}

async fn read_form(multipart: &mut Multipart) -> Result<(Option<FileUpload>, Option<String>), AppError> {
    let mut file = None;
    let mut folder = None;

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        match field.name() {
            Some("file") => {
                let file_name = field.file_name().map(str::to_string);
                let content_type = field
                    .content_type()
                    .unwrap_or("application/octet-stream")
                    .to_string();
                let bytes = field.bytes().await.map_err(multipart_error)?;
                file = Some(FileUpload { file_name, content_type, bytes: bytes.to_vec() });
            }
            Some("folder") => {
                folder = Some(field.text().await.map_err(multipart_error)?);
            }
            _ => {}
        }
    }

    Ok((file, folder))
}

// POST /api/media
#[utoipa::path(
    post,
    path = "/api/media",
    tag = "Mídia",
    request_body(content = UploadForm, content_type = "multipart/form-data"),
    responses(
        (status = 201, description = "Imagem enviada; URL pública", body = FileUploaded),
        (status = 400, description = "Arquivo ausente, tipo não permitido ou acima de 5MB"),
        (status = 403, description = "Apenas admin ou fornecedor")
    ),
    security(("api_jwt" = []))
)]
pub async fn upload_file(
    State(app_state): State<AppState>,
    locale: Locale,
    caller: Caller,
    ApiMultipart(mut multipart): ApiMultipart,
) -> Result<impl IntoResponse, ApiError> {
    // Sessão antes de ler o corpo
    caller.require().map_err(|e| e.to_api_error(&locale))?;

    let (file, folder) = read_form(&mut multipart)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    let url = app_state
        .media_service
        .upload_file(&caller, file, folder.as_deref())
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok(ActionResponse::created(FileUploaded { url }))
}

// DELETE /api/media
#[utoipa::path(
    delete,
    path = "/api/media",
    tag = "Mídia",
    request_body = DeleteFilePayload,
    responses(
        (status = 200, description = "Arquivo removido", body = NoPayload),
        (status = 400, description = "URL inválida"),
        (status = 403, description = "Apenas admin ou fornecedor")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_file(
    State(app_state): State<AppState>,
    locale: Locale,
    caller: Caller,
    ApiJson(payload): ApiJson<DeleteFilePayload>,
) -> Result<impl IntoResponse, ApiError> {
    app_state
        .media_service
        .delete_file(&caller, &payload.url)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok(ActionResponse::done())
}
