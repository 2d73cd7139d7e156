// src/models/rating.rs

use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

/// Mínimo de avaliações para o tratamento visual "lendário".
pub const LEGENDARY_MIN_RATINGS: i64 = 3;

// Escala "cartoon" de avaliação, ordinal de 1 a 5.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "rating_level", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RatingLevel {
    Caillou,
    Tortue,
    Cool,
    Feu,
    Legendaire,
}

impl RatingLevel {
    pub const ALL: [RatingLevel; 5] = [
        RatingLevel::Caillou,
        RatingLevel::Tortue,
        RatingLevel::Cool,
        RatingLevel::Feu,
        RatingLevel::Legendaire,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            RatingLevel::Caillou => "CAILLOU",
            RatingLevel::Tortue => "TORTUE",
            RatingLevel::Cool => "COOL",
            RatingLevel::Feu => "FEU",
            RatingLevel::Legendaire => "LEGENDAIRE",
        }
    }

    /// Peso numérico do nível (1..=5).
    pub fn weight(&self) -> u8 {
        match self {
            RatingLevel::Caillou => 1,
            RatingLevel::Tortue => 2,
            RatingLevel::Cool => 3,
            RatingLevel::Feu => 4,
            RatingLevel::Legendaire => 5,
        }
    }

    /// Faixa de exibição para uma média. Limites com `<` estrito:
    /// 2.5 cai em COOL, não em TORTUE.
    pub fn from_average(avg: f64) -> Self {
        if avg < 1.5 {
            RatingLevel::Caillou
        } else if avg < 2.5 {
            RatingLevel::Tortue
        } else if avg < 3.5 {
            RatingLevel::Cool
        } else if avg < 4.5 {
            RatingLevel::Feu
        } else {
            RatingLevel::Legendaire
        }
    }

    pub fn label(&self, lang: &str) -> &'static str {
        match (self, lang) {
            (RatingLevel::Caillou, "en") => "Rock",
            (RatingLevel::Caillou, _) => "Caillou",
            (RatingLevel::Tortue, "en") => "Turtle",
            (RatingLevel::Tortue, _) => "Tortue",
            (RatingLevel::Cool, _) => "Cool",
            (RatingLevel::Feu, "en") => "Fire",
            (RatingLevel::Feu, _) => "Feu",
            (RatingLevel::Legendaire, "en") => "Legendary",
            (RatingLevel::Legendaire, _) => "Légendaire",
        }
    }
}

impl FromStr for RatingLevel {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        RatingLevel::ALL
            .into_iter()
            .find(|level| level.as_str() == s)
            .ok_or(())
    }
}

/// Peso de uma tag textual. Tag desconhecida vale 3 (COOL), nunca falha.
pub fn weight_of_tag(tag: &str) -> u8 {
    tag.parse::<RatingLevel>().map(|l| l.weight()).unwrap_or(3)
}

/// Média aritmética dos pesos; zero quando não há avaliações.
pub fn average_weight<I>(weights: I) -> f64
where
    I: IntoIterator<Item = u8>,
{
    let (sum, count) = weights
        .into_iter()
        .fold((0u64, 0u64), |(sum, count), w| (sum + w as u64, count + 1));

    if count == 0 {
        return 0.0;
    }
    sum as f64 / count as f64
}

pub fn is_legendary(avg: f64, total_ratings: i64) -> bool {
    RatingLevel::from_average(avg) == RatingLevel::Legendaire && total_ratings >= LEGENDARY_MIN_RATINGS
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Rating {
    pub id: Uuid,
    pub user_id: Uuid,
    pub product_id: Uuid,
    pub level: RatingLevel,

    #[schema(example = "Super qualité, livraison rapide !")]
    pub comment: Option<String>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// Avaliação listada na página do produto, com o autor
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RatingWithAuthor {
    #[serde(flatten)]
    #[sqlx(flatten)]
    pub rating: Rating,
    pub author_name: Option<String>,
    pub author_avatar: Option<String>,
}

/// Resultado de uma escrita de avaliação: a linha e a média recalculada.
#[derive(Debug, Clone)]
pub struct RatingWrite {
    pub rating: Rating,
    pub created: bool,
    pub rating_avg: f64,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SubmitRatingPayload {
    // Texto livre: a validação do nível acontece no serviço
    #[schema(example = "LEGENDAIRE")]
    pub level: String,

    pub comment: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RatingOutcome {
    pub rating: Rating,
    pub rating_avg: f64,
    pub rating_level: RatingLevel,
}
