#[cfg(test)]
use std::collections::HashMap;

#[cfg(test)]
use std::sync::atomic::{AtomicUsize, Ordering};

#[cfg(test)]
use std::sync::Mutex;

#[cfg(test)]
use async_trait::async_trait;

#[cfg(test)]
use axum::{extract::Request, middleware::Next, Router};

#[cfg(test)]
use chrono::{Duration, Utc};

#[cfg(test)]
use crate::features::auth::model::AuthenticatedUser;

#[cfg(test)]
use crate::features::categories::models::{Category, CategoryPatch};

#[cfg(test)]
use crate::features::categories::stores::{CategoryStore, StoreError};

#[cfg(test)]
use crate::modules::events::{AppEvent, AppEvents, EventError};

#[cfg(test)]
pub fn sample_category(shop_id: &str, category_id: &str, slug: &str) -> Category {
    // Timestamps in the past so updated_at comparisons are strict
    let then = Utc::now() - Duration::minutes(5);
    Category {
        id: category_id.to_string(),
        shop_id: shop_id.to_string(),
        name: "Shoes".to_string(),
        display_title: "Shoes".to_string(),
        slug: slug.to_string(),
        hero_media_url: None,
        is_visible: true,
        metafields: None,
        featured_product_ids: None,
        created_at: then,
        updated_at: then,
    }
}

#[cfg(test)]
pub fn shop_editor(shop_id: &str) -> AuthenticatedUser {
    AuthenticatedUser {
        account_id: "test-account-id".to_string(),
        sub: "test-sub".to_string(),
        shop_permissions: HashMap::from([(
            shop_id.to_string(),
            vec!["category/edit".to_string()],
        )]),
    }
}

#[cfg(test)]
pub fn user_without_permissions() -> AuthenticatedUser {
    AuthenticatedUser {
        account_id: "test-account-id".to_string(),
        sub: "test-sub".to_string(),
        shop_permissions: HashMap::new(),
    }
}

/// In-memory `CategoryStore` with the same observable contract as the
/// Postgres store: composite-key addressing, per-shop slug uniqueness,
/// server-side `updated_at` stamping and a matched-row count.
#[cfg(test)]
#[derive(Default)]
pub struct InMemoryCategoryStore {
    rows: Mutex<HashMap<(String, String), Category>>,
    writes: AtomicUsize,
}

#[cfg(test)]
impl InMemoryCategoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn seed(&self, category: Category) {
        self.rows.lock().unwrap().insert(
            (category.id.clone(), category.shop_id.clone()),
            category,
        );
    }

    /// Number of update attempts that reached the store
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    pub fn row_count(&self) -> usize {
        self.rows.lock().unwrap().len()
    }

    pub fn get(&self, category_id: &str, shop_id: &str) -> Option<Category> {
        self.rows
            .lock()
            .unwrap()
            .get(&(category_id.to_string(), shop_id.to_string()))
            .cloned()
    }
}

#[cfg(test)]
#[async_trait]
impl CategoryStore for InMemoryCategoryStore {
    async fn update_one(
        &self,
        category_id: &str,
        shop_id: &str,
        patch: &CategoryPatch,
    ) -> Result<u64, StoreError> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        let mut rows = self.rows.lock().unwrap();

        let key = (category_id.to_string(), shop_id.to_string());
        if !rows.contains_key(&key) {
            // A miss never touches the unique index
            return Ok(0);
        }

        let slug_taken = rows
            .values()
            .any(|c| c.shop_id == shop_id && c.slug == patch.slug && c.id != category_id);
        if slug_taken {
            return Err(StoreError::DuplicateKey { field: "slug" });
        }

        let row = rows.get_mut(&key).unwrap();
        row.slug = patch.slug.clone();
        row.name = patch.name.clone();
        row.display_title = patch.display_title.clone();
        row.hero_media_url = patch.hero_media_url.clone();
        row.is_visible = patch.is_visible;
        row.metafields = patch.metafields.clone();
        row.featured_product_ids = patch.featured_product_ids.clone();
        row.updated_at = Utc::now();

        Ok(1)
    }

    async fn find_one(
        &self,
        category_id: &str,
        shop_id: &str,
    ) -> Result<Option<Category>, StoreError> {
        Ok(self.get(category_id, shop_id))
    }

    async fn find_all(&self, shop_id: &str) -> Result<Vec<Category>, StoreError> {
        let mut categories: Vec<Category> = self
            .rows
            .lock()
            .unwrap()
            .values()
            .filter(|c| c.shop_id == shop_id)
            .cloned()
            .collect();
        categories.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(categories)
    }
}

/// Event double that records everything emitted
#[cfg(test)]
#[derive(Default)]
pub struct RecordingEvents {
    events: Mutex<Vec<AppEvent>>,
}

#[cfg(test)]
impl RecordingEvents {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn emitted(&self) -> Vec<AppEvent> {
        self.events.lock().unwrap().clone()
    }
}

#[cfg(test)]
#[async_trait]
impl AppEvents for RecordingEvents {
    async fn emit(&self, event: AppEvent) -> Result<(), EventError> {
        self.events.lock().unwrap().push(event);
        Ok(())
    }
}

/// Event double whose emissions always fail
#[cfg(test)]
pub struct FailingEvents;

#[cfg(test)]
#[async_trait]
impl AppEvents for FailingEvents {
    async fn emit(&self, _event: AppEvent) -> Result<(), EventError> {
        Err(EventError::Dispatch("listener unavailable".to_string()))
    }
}

#[cfg(test)]
pub fn with_auth(router: Router, user: AuthenticatedUser) -> Router {
    router.layer(axum::middleware::from_fn(
        move |mut request: Request, next: Next| {
            let user = user.clone();
            async move {
                request.extensions_mut().insert(user);
                next.run(request).await
            }
        },
    ))
}
