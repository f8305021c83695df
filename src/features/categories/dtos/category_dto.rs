use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::features::categories::models::{Category, Metafield};

/// Request DTO for updating a category
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCategoryDto {
    pub name: String,

    pub display_title: String,

    /// Optional explicit slug; when blank or missing the slug is derived
    /// from `name`
    #[serde(default)]
    pub slug: Option<String>,

    /// Blank or missing values clear the stored URL
    #[serde(default)]
    pub hero_media_url: Option<String>,

    pub is_visible: bool,

    #[serde(default)]
    pub metafields: Option<Vec<MetafieldInputDto>>,

    #[serde(default)]
    pub featured_product_ids: Option<Vec<String>>,
}

/// Metafield as supplied by the caller.
///
/// `value` accepts arbitrary JSON; only entries whose value is a string
/// with non-whitespace content survive sanitization.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct MetafieldInputDto {
    pub key: String,
    pub namespace: String,
    #[serde(default)]
    pub value: serde_json::Value,
}

/// Response DTO for category
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CategoryResponseDto {
    pub id: String,
    pub shop_id: String,
    pub name: String,
    pub display_title: String,
    pub slug: String,
    pub hero_media_url: Option<String>,
    pub is_visible: bool,
    pub metafields: Option<Vec<Metafield>>,
    pub featured_product_ids: Option<Vec<String>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Category> for CategoryResponseDto {
    fn from(c: Category) -> Self {
        Self {
            id: c.id,
            shop_id: c.shop_id,
            name: c.name,
            display_title: c.display_title,
            slug: c.slug,
            hero_media_url: c.hero_media_url,
            is_visible: c.is_visible,
            metafields: c.metafields,
            featured_product_ids: c.featured_product_ids,
            created_at: c.created_at,
            updated_at: c.updated_at,
        }
    }
}
