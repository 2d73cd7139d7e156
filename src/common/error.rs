use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::json;
use thiserror::Error;

use crate::middleware::i18n::Locale;

// Nosso tipo de erro de domínio. Toda operação devolve Result<_, AppError>
// e a borda HTTP converte para o envelope { success: false, error }.
#[derive(Debug, Error)]
pub enum AppError {
    // --- Autorização ---
    #[error("Sessão ausente")]
    NotLoggedIn,

    #[error("Papel sem permissão para a ação")]
    Forbidden,

    #[error("Fornecedor não pode avaliar produtos")]
    SupplierCannotRate,

    #[error("Fornecedor não pode enviar reclamações")]
    SupplierCannotComplain,

    #[error("Avaliação do próprio produto")]
    CannotRateOwnProduct,

    #[error("Avaliação de outro autor")]
    NotRatingAuthor,

    // --- Validação ---
    #[error("Erro de validação")]
    ValidationError(#[from] validator::ValidationErrors),

    #[error("Nível de avaliação inválido: {0}")]
    InvalidRatingLevel(String),

    #[error("Mensagem curta demais")]
    MessageTooShort,

    #[error("Nenhum administrador disponível")]
    NoAdministrator,

    #[error("Arquivo ausente")]
    MissingFile,

    #[error("Tipo de arquivo não permitido: {0}")]
    InvalidFileType(String),

    #[error("Arquivo grande demais")]
    FileTooLarge,

    #[error("Pasta de destino inválida")]
    InvalidFolder,

    #[error("URL de arquivo inválida")]
    InvalidFileUrl,

    // Corpo, caminho ou query que o axum não conseguiu extrair
    #[error("Requisição malformada: {0}")]
    MalformedRequest(String),

    // --- Não encontrado ---
    #[error("Produto não encontrado")]
    ProductNotFound,

    #[error("Avaliação não encontrada")]
    RatingNotFound,

    #[error("Reclamação não encontrada")]
    ComplaintNotFound,

    #[error("Administrador não encontrado")]
    AdminNotFound,

    #[error("Fornecedor não encontrado")]
    SupplierNotFound,

    // --- Inesperados ---
    #[error("Token inválido")]
    InvalidToken,

    #[error("Erro de banco de dados")]
    DatabaseError(#[from] sqlx::Error),

    #[error("Erro no armazenamento de arquivos: {0}")]
    StorageError(String),

    #[error("Erro interno do servidor")]
    InternalServerError(#[from] anyhow::Error),
}

impl From<reqwest::Error> for AppError {
    fn from(e: reqwest::Error) -> Self {
        AppError::StorageError(e.to_string())
    }
}

/// Erro já traduzido, pronto para virar resposta HTTP.
#[derive(Debug, Clone, Serialize)]
pub struct ApiError {
    #[serde(skip)]
    pub status: StatusCode,
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::NotLoggedIn | AppError::InvalidToken => StatusCode::UNAUTHORIZED,

            AppError::Forbidden
            | AppError::SupplierCannotRate
            | AppError::SupplierCannotComplain
            | AppError::CannotRateOwnProduct
            | AppError::NotRatingAuthor => StatusCode::FORBIDDEN,

            AppError::ValidationError(_)
            | AppError::InvalidRatingLevel(_)
            | AppError::MessageTooShort
            | AppError::MissingFile
            | AppError::InvalidFileType(_)
            | AppError::InvalidFolder
            | AppError::InvalidFileUrl
            | AppError::MalformedRequest(_) => StatusCode::BAD_REQUEST,

            AppError::FileTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            AppError::NoAdministrator => StatusCode::UNPROCESSABLE_ENTITY,

            AppError::ProductNotFound
            | AppError::RatingNotFound
            | AppError::ComplaintNotFound
            | AppError::AdminNotFound
            | AppError::SupplierNotFound => StatusCode::NOT_FOUND,

            AppError::StorageError(_) => StatusCode::BAD_GATEWAY,
            AppError::DatabaseError(_) | AppError::InternalServerError(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Mensagem para o usuário final. Erros inesperados nunca vazam detalhes.
    pub fn message(&self, locale: &Locale) -> String {
        let en = locale.is_english();
        let text = match self {
            AppError::NotLoggedIn if en => "You must be logged in to do this.",
            AppError::NotLoggedIn => "Vous devez être connecté pour effectuer cette action.",
            AppError::Forbidden if en => "Unauthorized.",
            AppError::Forbidden => "Non autorisé.",
            AppError::SupplierCannotRate if en => "Suppliers cannot rate products.",
            AppError::SupplierCannotRate => "Les fournisseurs ne peuvent pas noter les produits.",
            AppError::SupplierCannotComplain if en => "Suppliers cannot submit complaints.",
            AppError::SupplierCannotComplain => "Les fournisseurs ne peuvent pas envoyer de plaintes.",
            AppError::CannotRateOwnProduct if en => "You cannot rate your own products.",
            AppError::CannotRateOwnProduct => "Vous ne pouvez pas noter vos propres produits.",
            AppError::NotRatingAuthor if en => "You can only delete your own reviews.",
            AppError::NotRatingAuthor => "Vous ne pouvez supprimer que vos propres avis.",
            AppError::ValidationError(_) if en => "One or more fields are invalid.",
            AppError::ValidationError(_) => "Un ou plusieurs champs sont invalides.",
            AppError::InvalidRatingLevel(_) if en => "Invalid rating level.",
            AppError::InvalidRatingLevel(_) => "Niveau de note invalide.",
            AppError::MessageTooShort if en => "The message must contain at least 10 characters.",
            AppError::MessageTooShort => "Le message doit contenir au moins 10 caractères.",
            AppError::NoAdministrator if en => "No administrator available.",
            AppError::NoAdministrator => "Aucun administrateur disponible.",
            AppError::MissingFile if en => "No file provided.",
            AppError::MissingFile => "Aucun fichier fourni.",
            AppError::InvalidFileType(_) if en => {
                "File type not allowed. Accepted: image/jpeg, image/jpg, image/png, image/webp, image/gif."
            }
            AppError::InvalidFileType(_) => {
                "Type de fichier non autorisé. Types acceptés : image/jpeg, image/jpg, image/png, image/webp, image/gif."
            }
            AppError::FileTooLarge if en => "File too large. Maximum size: 5MB.",
            AppError::FileTooLarge => "Fichier trop volumineux. Taille maximale : 5MB.",
            AppError::MalformedRequest(_) if en => "Invalid request.",
            AppError::MalformedRequest(_) => "Requête invalide.",
            AppError::InvalidFolder if en => "Invalid destination folder.",
            AppError::InvalidFolder => "Dossier de destination invalide.",
            AppError::InvalidFileUrl if en => "Invalid file URL.",
            AppError::InvalidFileUrl => "URL de fichier invalide.",
            AppError::ProductNotFound if en => "Product not found.",
            AppError::ProductNotFound => "Produit introuvable.",
            AppError::RatingNotFound if en => "Review not found.",
            AppError::RatingNotFound => "Avis introuvable.",
            AppError::ComplaintNotFound if en => "Complaint not found.",
            AppError::ComplaintNotFound => "Plainte introuvable.",
            AppError::AdminNotFound if en => "Administrator not found.",
            AppError::AdminNotFound => "Admin introuvable.",
            AppError::SupplierNotFound if en => "Supplier not found.",
            AppError::SupplierNotFound => "Fournisseur introuvable.",
            AppError::InvalidToken if en => "Invalid or missing authentication token.",
            AppError::InvalidToken => "Jeton d'authentification invalide ou absent.",
            AppError::StorageError(_) if en => "File storage error.",
            AppError::StorageError(_) => "Erreur du stockage de fichiers.",
            AppError::DatabaseError(_) | AppError::InternalServerError(_) if en => {
                "An unexpected error occurred."
            }
            AppError::DatabaseError(_) | AppError::InternalServerError(_) => {
                "Une erreur inattendue est survenue."
            }
        };
        text.to_string()
    }

    pub fn to_api_error(&self, locale: &Locale) -> ApiError {
        let status = self.status();
        if status.is_server_error() {
            // O `tracing` guarda o detalhe que `thiserror` montou; o cliente não vê.
            tracing::error!("Erro Interno do Servidor: {:?}", self);
        }

        // Detalhes por campo para erros do validator
        let details = match self {
            AppError::ValidationError(errors) => {
                let mut details = serde_json::Map::new();
                for (field, field_errors) in errors.field_errors() {
                    let messages: Vec<String> = field_errors
                        .iter()
                        .map(|e| {
                            e.message
                                .as_ref()
                                .map(|m| m.to_string())
                                .unwrap_or_else(|| e.code.to_string())
                        })
                        .collect();
                    details.insert(field.to_string(), json!(messages));
                }
                Some(serde_json::Value::Object(details))
            }
            _ => None,
        };

        ApiError {
            status,
            error: self.message(locale),
            details,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let mut body = json!({
            "success": false,
            "error": self.error,
        });
        if let Some(details) = self.details {
            body["details"] = details;
        }
        (self.status, Json(body)).into_response()
    }
}

// Sem locale disponível (ex.: camadas fora dos handlers), responde em francês.
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        self.to_api_error(&Locale::default()).into_response()
    }
}
