// src/services/log_service.rs

use std::sync::Arc;

use csv::{QuoteStyle, Terminator, WriterBuilder};

use crate::{
    common::error::AppError,
    db::{LogStore, ProductStore},
    models::{
        log::{ExportFormat, LogScope, LogView, DEFAULT_LOG_LIMIT, EXPORT_LOG_LIMIT},
        user::{Caller, Role, User},
    },
    services::permissions::{authorize, Action},
};

const CSV_HEADERS: [&str; 8] = ["ID", "Date", "User", "Role", "Action", "Target", "TargetId", "IP"];
const ANONYMOUS_NAME: &str = "Anonyme";

#[derive(Clone)]
pub struct LogService {
    logs: Arc<dyn LogStore>,
    products: Arc<dyn ProductStore>,
}

impl LogService {
    pub fn new(logs: Arc<dyn LogStore>, products: Arc<dyn ProductStore>) -> Self {
        Self { logs, products }
    }

    async fn scope_for(&self, user: &User) -> Result<LogScope, AppError> {
        match user.role {
            Role::Admin => Ok(LogScope::All),
            Role::Supplier => Ok(LogScope::Supplier {
                supplier_id: user.id,
                product_ids: self.products.ids_by_supplier(user.id).await?,
            }),
            Role::User => Err(AppError::Forbidden),
        }
    }

    pub async fn get_logs(&self, caller: &Caller, limit: Option<i64>) -> Result<Vec<LogView>, AppError> {
        let user = caller.require()?;
        authorize(user, Action::ViewLogs)?;

        let limit = limit.unwrap_or(DEFAULT_LOG_LIMIT).clamp(1, EXPORT_LOG_LIMIT);
        let scope = self.scope_for(user).await?;
        self.logs.recent(&scope, limit).await
    }

    pub async fn export_logs(&self, caller: &Caller, format: ExportFormat) -> Result<String, AppError> {
        let logs = self.get_logs(caller, Some(EXPORT_LOG_LIMIT)).await?;
        match format {
            ExportFormat::Json => serde_json::to_string_pretty(&logs)
                .map_err(|e| AppError::InternalServerError(e.into())),
            ExportFormat::Csv => to_csv(&logs),
        }
    }
}

// Célula começando com = + - @ vira fórmula na planilha
fn harden(cell: &mut String) {
    if cell.trim_start().starts_with(['=', '+', '-', '@']) {
        cell.insert(0, '\'');
    }
}

/// Cabeçalho fixo, depois uma linha por log com todos os campos entre aspas.
pub fn to_csv(logs: &[LogView]) -> Result<String, AppError> {
    let mut buf = CSV_HEADERS.join(",").into_bytes();
    buf.push(b'\n');

    let mut wtr = WriterBuilder::new()
        .quote_style(QuoteStyle::Always)
        .terminator(Terminator::Any(b'\n'))
        .from_writer(buf);

    for log in logs {
        let mut row = [
            log.id.to_string(),
            log.created_at.to_rfc3339_opts(chrono::SecondsFormat::Millis, true),
            log.user_name.clone().unwrap_or_else(|| ANONYMOUS_NAME.to_string()),
            log.user_role.as_str().to_string(),
            log.action.clone(),
            log.target.clone(),
            log.target_id.map(|id| id.to_string()).unwrap_or_default(),
            log.ip.clone().unwrap_or_default(),
        ];
        row.iter_mut().for_each(harden);
        wtr.write_record(&row).map_err(|e| AppError::InternalServerError(e.into()))?;
    }

    let buf = wtr
        .into_inner()
        .map_err(|e| AppError::InternalServerError(anyhow::anyhow!("CSV: {}", e.error())))?;
    String::from_utf8(buf).map_err(|e| AppError::InternalServerError(e.into()))
}

#[cfg(test)]
mod tests {
    use uuid::Uuid;

    use super::*;
    use crate::{
        db::memory::MemoryStore,
        models::log::{LogAction, LogTarget},
        services::activity_log::ActivityLogger,
    };

    #[test]
    fn csv_quotes_every_cell() {
        let log = LogView {
            id: Uuid::nil(),
            user_id: Uuid::nil(),
            user_name: Some("Jean \"JJ\" Client".into()),
            user_role: Role::User,
            action: "RATE".into(),
            target: "Product".into(),
            target_id: None,
            ip: None,
            created_at: "2025-03-01T12:00:00Z".parse().unwrap(),
        };
        let mut anonymous = log.clone();
        anonymous.user_name = None;

        let csv = to_csv(&[log, anonymous]).unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines[0], "ID,Date,User,Role,Action,Target,TargetId,IP");
        assert_eq!(
            lines[1],
            "\"00000000-0000-0000-0000-000000000000\",\"2025-03-01T12:00:00.000Z\",\"Jean \"\"JJ\"\" Client\",\"USER\",\"RATE\",\"Product\",\"\",\"\""
        );
        assert!(lines[2].contains("\"Anonyme\""));
    }

    #[test]
    fn csv_neutralizes_spreadsheet_formulas() {
        let log = LogView {
            id: Uuid::nil(),
            user_id: Uuid::nil(),
            user_name: Some("=HYPERLINK(\"http://x\")".into()),
            user_role: Role::User,
            action: "VIEW".into(),
            target: "Product".into(),
            target_id: None,
            ip: Some("@evil".into()),
            created_at: "2025-03-01T12:00:00Z".parse().unwrap(),
        };

        let csv = to_csv(&[log]).unwrap();
        let row = csv.lines().nth(1).unwrap();
        assert!(row.contains("\"'=HYPERLINK(\"\"http://x\"\")\""));
        assert!(row.ends_with("\"'@evil\""));
        assert_eq!(csv.lines().count(), 2);
    }

    #[tokio::test]
    async fn supplier_sees_the_union_of_own_actions_and_own_products() {
        let store = Arc::new(MemoryStore::new());
        let admin = store.seed_user(Role::Admin, "Paul").await;
        let supplier = store.seed_user(Role::Supplier, "Awa").await;
        let customer = store.seed_user(Role::User, "Jean").await;
        let own = store.seed_product(supplier.id, "Sac").await;
        let foreign = store.seed_product(admin.id, "Montre").await;
        let activity = ActivityLogger::direct(store.clone());

        activity.record(&customer, None, LogAction::Rate, LogTarget::Product, Some(own.id)).await;
        activity.record(&customer, None, LogAction::Rate, LogTarget::Product, Some(foreign.id)).await;
        activity.record(&supplier, None, LogAction::Update, LogTarget::Product, Some(own.id)).await;
        activity.record(&supplier, None, LogAction::Click, LogTarget::Product, Some(foreign.id)).await;
        activity.record(&admin, None, LogAction::Delete, LogTarget::Complaint, Some(Uuid::new_v4())).await;

        let service = LogService::new(store.clone(), store.clone());

        let seen = service.get_logs(&Caller::authenticated(supplier.clone(), None), None).await.unwrap();
        let actions: Vec<&str> = seen.iter().map(|l| l.action.as_str()).collect();
        // mais recente primeiro
        assert_eq!(actions, ["CLICK", "UPDATE", "RATE"]);
        assert_eq!(seen[2].user_name.as_deref(), Some("Jean"));

        let all = service.get_logs(&Caller::authenticated(admin.clone(), None), Some(2)).await.unwrap();
        assert_eq!(all.len(), 2);

        let err = service
            .get_logs(&Caller::authenticated(customer, None), None)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Forbidden));
        let err = service.get_logs(&Caller::anonymous(None), None).await.unwrap_err();
        assert!(matches!(err, AppError::NotLoggedIn));
    }

    #[tokio::test]
    async fn json_export_is_pretty_printed() {
        let store = Arc::new(MemoryStore::new());
        let admin = store.seed_user(Role::Admin, "Paul").await;
        ActivityLogger::direct(store.clone())
            .record(&admin, Some("10.0.0.1"), LogAction::Create, LogTarget::Product, None)
            .await;

        let service = LogService::new(store.clone(), store.clone());
        let data = service
            .export_logs(&Caller::authenticated(admin, None), ExportFormat::Json)
            .await
            .unwrap();

        assert!(data.contains("\n  "));
        let parsed: serde_json::Value = serde_json::from_str(&data).unwrap();
        assert_eq!(parsed[0]["action"], "CREATE");
        assert_eq!(parsed[0]["ip"], "10.0.0.1");
        assert_eq!(parsed[0]["userName"], "Paul");
    }
}
