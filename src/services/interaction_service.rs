// src/services/interaction_service.rs
//
// Cliques (intenção de compra pelo WhatsApp) e visualizações. Cada chamada é
// um incremento; não há deduplicação. Anônimos contam, mas não geram log.

use std::sync::Arc;

use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::StatsStore,
    models::{
        log::{LogAction, LogTarget},
        stats::ProductStat,
        user::Caller,
    },
    services::activity_log::ActivityLogger,
};

#[derive(Clone)]
pub struct InteractionService {
    stats: Arc<dyn StatsStore>,
    activity: ActivityLogger,
}

impl InteractionService {
    pub fn new(stats: Arc<dyn StatsStore>, activity: ActivityLogger) -> Self {
        Self { stats, activity }
    }

    pub async fn record_interaction(&self, caller: &Caller, product_id: Uuid) -> Result<ProductStat, AppError> {
        let stat = self.stats.record_click(product_id, caller.ip()).await?;

        if let Some(user) = &caller.user {
            self.activity
                .record(user, caller.ip(), LogAction::Click, LogTarget::Product, Some(product_id))
                .await;
        }
        Ok(stat)
    }

    pub async fn record_view(&self, caller: &Caller, product_id: Uuid) -> Result<ProductStat, AppError> {
        let stat = self.stats.record_view(product_id).await?;

        if let Some(user) = &caller.user {
            self.activity
                .record(user, caller.ip(), LogAction::View, LogTarget::Product, Some(product_id))
                .await;
        }
        Ok(stat)
    }
}
