use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

use crate::shared::validation::SLUG_REGEX;

/// Database model for category
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Category {
    pub id: String,
    pub shop_id: String,
    pub name: String,
    pub display_title: String,
    pub slug: String,
    pub hero_media_url: Option<String>,
    pub is_visible: bool,
    #[sqlx(json(nullable))]
    pub metafields: Option<Vec<Metafield>>,
    pub featured_product_ids: Option<Vec<String>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A namespaced key/value annotation attached to a category
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct Metafield {
    #[validate(length(max = 30, message = "Metafield key must not exceed 30 characters"))]
    pub key: String,

    #[validate(length(max = 20, message = "Metafield namespace must not exceed 20 characters"))]
    pub namespace: String,

    pub value: String,
}

/// The assembled update document applied to a category row.
///
/// Built by the service from caller input (slug resolution, metafield
/// sanitization and hero media normalization already applied) and validated
/// as a whole before any write. `None` on an optional field means the
/// persisted value is explicitly cleared, not left untouched.
#[derive(Debug, Clone, Validate)]
pub struct CategoryPatch {
    #[validate(
        length(min = 1, message = "Slug must not be empty"),
        regex(path = *SLUG_REGEX, message = "Slug must be lowercase alphanumeric with hyphens")
    )]
    pub slug: String,

    #[validate(length(min = 1, max = 255, message = "Name must be 1-255 characters"))]
    pub name: String,

    #[validate(length(min = 1, max = 255, message = "Display title must be 1-255 characters"))]
    pub display_title: String,

    pub hero_media_url: Option<String>,

    pub is_visible: bool,

    #[validate(nested)]
    pub metafields: Option<Vec<Metafield>>,

    pub featured_product_ids: Option<Vec<String>>,
}
