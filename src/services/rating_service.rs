// src/services/rating_service.rs

use std::sync::Arc;

use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{ProductStore, RatingStore},
    models::{
        log::{LogAction, LogTarget},
        rating::{RatingLevel, RatingOutcome, RatingWithAuthor, SubmitRatingPayload},
        user::Caller,
    },
    services::{
        activity_log::ActivityLogger,
        permissions::{authorize, ensure_not_own_product, Action},
    },
};

#[derive(Clone)]
pub struct RatingService {
    products: Arc<dyn ProductStore>,
    ratings: Arc<dyn RatingStore>,
    activity: ActivityLogger,
}

impl RatingService {
    pub fn new(
        products: Arc<dyn ProductStore>,
        ratings: Arc<dyn RatingStore>,
        activity: ActivityLogger,
    ) -> Self {
        Self { products, ratings, activity }
    }

    pub async fn submit_rating(
        &self,
        caller: &Caller,
        product_id: Uuid,
        payload: SubmitRatingPayload,
    ) -> Result<RatingOutcome, AppError> {
        // Ordem importa: a primeira regra violada é a que o usuário vê
        let user = caller.require()?;
        authorize(user, Action::SubmitRating)?;

        let level: RatingLevel = payload
            .level
            .parse()
            .map_err(|_| AppError::InvalidRatingLevel(payload.level.clone()))?;

        let product = self
            .products
            .find(product_id)
            .await?
            .ok_or(AppError::ProductNotFound)?;
        ensure_not_own_product(user, &product)?;

        let comment = payload
            .comment
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty());

        let write = self.ratings.upsert(user.id, product_id, level, comment).await?;

        self.activity
            .record(user, caller.ip(), LogAction::Rate, LogTarget::Product, Some(product_id))
            .await;

        tracing::debug!(
            "Avaliação {} ({}) no produto {}: média {:.2}",
            write.rating.id,
            if write.created { "nova" } else { "atualizada" },
            product_id,
            write.rating_avg
        );

        Ok(RatingOutcome {
            rating_level: RatingLevel::from_average(write.rating_avg),
            rating_avg: write.rating_avg,
            rating: write.rating,
        })
    }

    /// Só o autor apaga a própria avaliação. Devolve a nova média do produto.
    pub async fn delete_rating(&self, caller: &Caller, rating_id: Uuid) -> Result<f64, AppError> {
        let user = caller.require()?;

        let rating = self
            .ratings
            .find(rating_id)
            .await?
            .ok_or(AppError::RatingNotFound)?;
        if rating.user_id != user.id {
            return Err(AppError::NotRatingAuthor);
        }

        let rating_avg = self.ratings.delete(&rating).await?;

        self.activity
            .record(user, caller.ip(), LogAction::DeleteRating, LogTarget::Rating, Some(rating_id))
            .await;

        Ok(rating_avg)
    }

    pub async fn product_ratings(&self, product_id: Uuid) -> Result<Vec<RatingWithAuthor>, AppError> {
        self.ratings.list_for_product(product_id).await
    }
}
