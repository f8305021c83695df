use async_trait::async_trait;
use sqlx::types::Json;
use sqlx::PgPool;

use super::{CategoryStore, StoreError};
use crate::features::categories::models::{Category, CategoryPatch};

/// Unique index guarding per-shop slug uniqueness (see migrations)
const SLUG_UNIQUE_CONSTRAINT: &str = "categories_shop_id_slug_key";

pub struct PgCategoryStore {
    pool: PgPool,
}

impl PgCategoryStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Convert a database error into the store taxonomy.
///
/// Slug unique-index violations are detected by PostgreSQL error code 23505
/// plus the constraint name, not by message content.
fn map_db_error(e: sqlx::Error) -> StoreError {
    if let sqlx::Error::Database(db_err) = &e {
        if db_err.code() == Some(std::borrow::Cow::Borrowed("23505"))
            && db_err.constraint() == Some(SLUG_UNIQUE_CONSTRAINT)
        {
            return StoreError::DuplicateKey { field: "slug" };
        }
    }

    StoreError::Database(e)
}

#[async_trait]
impl CategoryStore for PgCategoryStore {
    async fn update_one(
        &self,
        category_id: &str,
        shop_id: &str,
        patch: &CategoryPatch,
    ) -> Result<u64, StoreError> {
        let result = sqlx::query(
            r#"
            UPDATE categories
            SET slug = $3,
                name = $4,
                display_title = $5,
                hero_media_url = $6,
                is_visible = $7,
                metafields = $8,
                featured_product_ids = $9,
                updated_at = NOW()
            WHERE id = $1 AND shop_id = $2
            "#,
        )
        .bind(category_id)
        .bind(shop_id)
        .bind(&patch.slug)
        .bind(&patch.name)
        .bind(&patch.display_title)
        .bind(&patch.hero_media_url)
        .bind(patch.is_visible)
        .bind(patch.metafields.as_ref().map(Json))
        .bind(&patch.featured_product_ids)
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(result.rows_affected())
    }

    async fn find_one(
        &self,
        category_id: &str,
        shop_id: &str,
    ) -> Result<Option<Category>, StoreError> {
        let category = sqlx::query_as::<_, Category>(
            r#"
            SELECT id, shop_id, name, display_title, slug, hero_media_url,
                   is_visible, metafields, featured_product_ids, created_at, updated_at
            FROM categories
            WHERE id = $1 AND shop_id = $2
            "#,
        )
        .bind(category_id)
        .bind(shop_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(category)
    }

    async fn find_all(&self, shop_id: &str) -> Result<Vec<Category>, StoreError> {
        let categories = sqlx::query_as::<_, Category>(
            r#"
            SELECT id, shop_id, name, display_title, slug, hero_media_url,
                   is_visible, metafields, featured_product_ids, created_at, updated_at
            FROM categories
            WHERE shop_id = $1
            ORDER BY name
            "#,
        )
        .bind(shop_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(categories)
    }
}
