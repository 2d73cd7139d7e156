// src/models/log.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::user::Role;

pub const DEFAULT_LOG_LIMIT: i64 = 100;
pub const EXPORT_LOG_LIMIT: i64 = 1000;

// Ações registradas na trilha de auditoria
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogAction {
    Create,
    Update,
    Delete,
    Unavailable,
    Rate,
    DeleteRating,
    Complaint,
    Reassign,
    UpdateStatus,
    View,
    Click,
}

impl LogAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogAction::Create => "CREATE",
            LogAction::Update => "UPDATE",
            LogAction::Delete => "DELETE",
            LogAction::Unavailable => "UNAVAILABLE",
            LogAction::Rate => "RATE",
            LogAction::DeleteRating => "DELETE_RATING",
            LogAction::Complaint => "COMPLAINT",
            LogAction::Reassign => "REASSIGN",
            LogAction::UpdateStatus => "UPDATE_STATUS",
            LogAction::View => "VIEW",
            LogAction::Click => "CLICK",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogTarget {
    Product,
    Rating,
    Complaint,
    General,
}

impl LogTarget {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogTarget::Product => "Product",
            LogTarget::Rating => "Rating",
            LogTarget::Complaint => "Complaint",
            LogTarget::General => "General",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewLogEntry {
    pub user_id: Uuid,
    pub user_role: Role,
    pub action: String,
    pub target: String,
    pub target_id: Option<Uuid>,
    pub ip: Option<String>,
}

// Linha pronta para o painel e para exportação
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LogView {
    pub id: Uuid,
    pub user_id: Uuid,
    pub user_name: Option<String>,
    pub user_role: Role,
    #[schema(example = "RATE")]
    pub action: String,
    #[schema(example = "Product")]
    pub target: String,
    pub target_id: Option<Uuid>,
    pub ip: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Quais linhas de log um papel pode ver.
#[derive(Debug, Clone, PartialEq)]
pub enum LogScope {
    All,
    // União: logs sobre os produtos do fornecedor OU feitos por ele
    Supplier { supplier_id: Uuid, product_ids: Vec<Uuid> },
}

impl LogScope {
    pub fn admits(&self, user_id: Uuid, target_id: Option<Uuid>) -> bool {
        match self {
            LogScope::All => true,
            LogScope::Supplier { supplier_id, product_ids } => {
                user_id == *supplier_id || target_id.is_some_and(|id| product_ids.contains(&id))
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    Json,
    Csv,
}

#[derive(Debug, Deserialize)]
pub struct LogQuery {
    pub limit: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct ExportQuery {
    pub format: ExportFormat,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct LogList {
    pub logs: Vec<LogView>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct LogExport {
    pub data: String,
}
