// src/models/product.rs

use std::collections::BTreeMap;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{types::Json, FromRow};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::models::{
    rating::{is_legendary, RatingLevel},
    stats::ProductStat,
};

pub const DEFAULT_LANG: &str = "fr";

/// Janela em que um produto recém-criado aparece como "novo".
pub const NEW_PRODUCT_WINDOW_DAYS: i64 = 14;
pub const POPULAR_VIEWS_THRESHOLD: i64 = 100;
pub const LIMITED_STOCK_THRESHOLD: i32 = 5;
/// Janela do contador de novidades do painel.
pub const DASHBOARD_NEW_WINDOW_DAYS: i64 = 7;

// Texto bilíngue: código de idioma -> texto
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LocalizedText(pub BTreeMap<String, String>);

impl LocalizedText {
    pub fn new(fr: impl Into<String>, en: impl Into<String>) -> Self {
        let mut map = BTreeMap::new();
        map.insert("fr".to_string(), fr.into());
        map.insert("en".to_string(), en.into());
        Self(map)
    }

    /// Texto no idioma pedido, com fallback para o francês.
    pub fn get(&self, lang: &str) -> &str {
        self.0
            .get(lang)
            .filter(|s| !s.is_empty())
            .or_else(|| self.0.get(DEFAULT_LANG))
            .map(String::as_str)
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: Uuid,

    #[schema(value_type = HashMap<String, String>, example = json!({"fr": "Casque Audio Sans Fil", "en": "Wireless Headphones"}))]
    pub name: Json<LocalizedText>,

    #[schema(value_type = HashMap<String, String>)]
    pub short_desc: Json<LocalizedText>,

    #[schema(value_type = HashMap<String, String>)]
    pub long_desc: Json<LocalizedText>,

    // Menor unidade da moeda (FCFA)
    #[schema(example = 25000)]
    pub price: i64,

    #[schema(example = 12)]
    pub stock: i32,

    #[schema(example = "Douala")]
    pub city: String,

    pub thumbnail: Option<String>,
    pub images: Vec<String>,
    pub is_new: bool,
    pub supplier_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// "Novo" é derivado: flag explícita OU criado nos últimos 14 dias.
    pub fn is_new_at(&self, now: DateTime<Utc>) -> bool {
        self.is_new || now - self.created_at < Duration::days(NEW_PRODUCT_WINDOW_DAYS)
    }

    pub fn display_name(&self, lang: &str) -> &str {
        self.name.get(lang)
    }
}

/// Produto com os agregados usados pela vitrine.
#[derive(Debug, Clone)]
pub struct ProductListing {
    pub product: Product,
    pub stats: Option<ProductStat>,
    pub rating_count: i64,
}

// O que a vitrine recebe
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProductView {
    #[serde(flatten)]
    pub product: Product,
    pub stats: Option<ProductStat>,
    pub rating_count: i64,
    pub is_new: bool,
    pub rating_level: RatingLevel,
    #[schema(value_type = HashMap<String, String>, example = json!({"fr": "Légendaire", "en": "Legendary"}))]
    pub rating_label: LocalizedText,
    pub is_legendary: bool,
    pub is_popular: bool,
    pub is_limited_stock: bool,
    pub is_out_of_stock: bool,
}

impl ProductView {
    pub fn from_listing(listing: ProductListing, now: DateTime<Utc>) -> Self {
        let avg = listing.stats.as_ref().map(|s| s.rating_avg).unwrap_or(0.0);
        let views = listing.stats.as_ref().map(|s| s.views).unwrap_or(0);
        let stock = listing.product.stock;
        let rating_level = RatingLevel::from_average(avg);

        Self {
            is_new: listing.product.is_new_at(now),
            rating_level,
            rating_label: LocalizedText::new(rating_level.label("fr"), rating_level.label("en")),
            is_legendary: is_legendary(avg, listing.rating_count),
            is_popular: views > POPULAR_VIEWS_THRESHOLD,
            is_limited_stock: stock > 0 && stock <= LIMITED_STOCK_THRESHOLD,
            is_out_of_stock: stock == 0,
            rating_count: listing.rating_count,
            stats: listing.stats,
            product: listing.product,
        }
    }
}

/// Números do painel sobre os produtos visíveis ao chamador.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSummary {
    #[schema(example = 42)]
    pub total_products: i64,
    #[schema(example = 3)]
    pub out_of_stock: i64,
    #[schema(example = 5)]
    pub new_products: i64,
    // Média das médias, só produtos já avaliados
    #[schema(example = 3.5)]
    pub avg_rating: f64,
}

impl DashboardSummary {
    pub fn from_listings(listings: &[ProductListing], now: DateTime<Utc>) -> Self {
        let since = now - Duration::days(DASHBOARD_NEW_WINDOW_DAYS);
        let rated: Vec<f64> = listings
            .iter()
            .filter_map(|l| l.stats.as_ref().map(|s| s.rating_avg))
            .filter(|avg| *avg > 0.0)
            .collect();
        let avg_rating = if rated.is_empty() {
            0.0
        } else {
            rated.iter().sum::<f64>() / rated.len() as f64
        };

        Self {
            total_products: listings.len() as i64,
            out_of_stock: listings.iter().filter(|l| l.product.stock == 0).count() as i64,
            new_products: listings.iter().filter(|l| l.product.created_at >= since).count() as i64,
            avg_rating,
        }
    }
}

// Texto só com espaços conta como vazio
fn validate_not_blank(val: &str) -> Result<(), ValidationError> {
    if val.trim().is_empty() {
        let mut err = ValidationError::new("blank");
        err.message = Some("Ce champ est obligatoire.".into());
        return Err(err);
    }
    Ok(())
}

// Formulário do painel (criação e edição)
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProductPayload {
    #[validate(custom(function = "validate_not_blank"))]
    #[schema(example = "Casque Audio Sans Fil")]
    pub name_fr: String,

    #[validate(custom(function = "validate_not_blank"))]
    #[schema(example = "Wireless Headphones")]
    pub name_en: String,

    #[validate(custom(function = "validate_not_blank"))]
    pub short_desc_fr: String,

    #[validate(custom(function = "validate_not_blank"))]
    pub short_desc_en: String,

    #[serde(default)]
    pub long_desc_fr: String,

    #[serde(default)]
    pub long_desc_en: String,

    #[validate(range(min = 1, message = "Le prix doit être positif."))]
    pub price: i64,

    #[validate(range(min = 0, message = "Le stock ne peut pas être négatif."))]
    pub stock: i32,

    #[validate(custom(function = "validate_not_blank"))]
    pub city: String,

    pub thumbnail: Option<String>,

    #[serde(default)]
    pub images: Vec<String>,

    #[serde(default)]
    pub is_new: bool,

    // Só o admin escolhe o fornecedor; o fornecedor é sempre dono do que cria
    pub supplier_id: Option<Uuid>,
}

/// Linha pronta para gravar (já com o dono resolvido).
#[derive(Debug, Clone)]
pub struct NewProduct {
    pub name: LocalizedText,
    pub short_desc: LocalizedText,
    pub long_desc: LocalizedText,
    pub price: i64,
    pub stock: i32,
    pub city: String,
    pub thumbnail: Option<String>,
    pub images: Vec<String>,
    pub is_new: bool,
    pub supplier_id: Uuid,
}

impl NewProduct {
    pub fn from_payload(payload: ProductPayload, supplier_id: Uuid) -> Self {
        let images = payload
            .images
            .into_iter()
            .map(|url| url.trim().to_string())
            .filter(|url| !url.is_empty())
            .collect();

        Self {
            name: LocalizedText::new(payload.name_fr.trim(), payload.name_en.trim()),
            short_desc: LocalizedText::new(payload.short_desc_fr.trim(), payload.short_desc_en.trim()),
            long_desc: LocalizedText::new(payload.long_desc_fr, payload.long_desc_en),
            price: payload.price,
            stock: payload.stock,
            city: payload.city.trim().to_string(),
            thumbnail: payload.thumbnail.filter(|t| !t.trim().is_empty()),
            images,
            is_new: payload.is_new,
            supplier_id,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ContactLink {
    #[schema(example = "https://wa.me/237690000000?text=Bonjour")]
    pub whatsapp_link: String,
}
