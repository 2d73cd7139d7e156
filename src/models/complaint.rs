// src/models/complaint.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

/// Tamanho mínimo da mensagem, depois do trim.
pub const MIN_COMPLAINT_MESSAGE_CHARS: usize = 10;

// Qualquer status pode ir para qualquer outro (sem máquina de estados)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "complaint_status", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ComplaintStatus {
    Received,
    InProgress,
    Resolved,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Complaint {
    pub id: Uuid,
    pub user_id: Option<Uuid>,
    // Nulo quando é uma reclamação geral ou quando o produto foi apagado
    pub product_id: Option<Uuid>,
    pub assigned_admin_id: Uuid,
    pub message: String,
    pub status: ComplaintStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Mensagem normalizada, ou `None` se curta demais.
pub fn normalize_message(message: &str) -> Option<String> {
    let trimmed = message.trim();
    (trimmed.chars().count() >= MIN_COMPLAINT_MESSAGE_CHARS).then(|| trimmed.to_string())
}

#[derive(Debug, Clone)]
pub struct NewComplaint {
    pub user_id: Uuid,
    pub product_id: Option<Uuid>,
    pub assigned_admin_id: Uuid,
    pub message: String,
}

// Listagem do painel: reclamação + resumos das relações
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ComplaintDetail {
    #[serde(flatten)]
    #[sqlx(flatten)]
    pub complaint: Complaint,
    pub user_name: Option<String>,
    pub user_email: Option<String>,
    #[schema(value_type = Option<Object>)]
    pub product_name: Option<sqlx::types::Json<crate::models::product::LocalizedText>>,
    pub product_thumbnail: Option<String>,
    pub assigned_admin_name: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SubmitComplaintPayload {
    #[schema(example = "Le produit reçu ne correspond pas à la photo.")]
    pub message: String,
    pub product_id: Option<Uuid>,
    pub admin_id: Option<Uuid>,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReassignComplaintPayload {
    pub admin_id: Uuid,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateComplaintStatusPayload {
    pub status: ComplaintStatus,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateComplaintMessagePayload {
    pub message: String,
}

#[derive(Debug, Deserialize)]
pub struct ComplaintFilter {
    pub status: Option<ComplaintStatus>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ComplaintCreated {
    pub complaint_id: Uuid,
}
