use std::sync::Arc;

use validator::Validate;

use crate::core::error::{AppError, Result};
use crate::features::auth::model::ShopAuthorization;
use crate::features::categories::dtos::{
    CategoryResponseDto, MetafieldInputDto, UpdateCategoryDto,
};
use crate::features::categories::models::{CategoryPatch, Metafield};
use crate::features::categories::stores::{CategoryStore, StoreError};
use crate::modules::events::{AppEvent, AppEvents};
use crate::shared::constants::CATEGORY_MANAGE_PERMISSIONS;
use crate::shared::slug::slugify;

/// Service for category operations
pub struct CategoryService {
    store: Arc<dyn CategoryStore>,
    events: Arc<dyn AppEvents>,
}

impl CategoryService {
    pub fn new(store: Arc<dyn CategoryStore>, events: Arc<dyn AppEvents>) -> Self {
        Self { store, events }
    }

    /// Update the category identified by `(category_id, shop_id)`.
    ///
    /// Authorizes the caller, assembles and validates the update document,
    /// applies it conditionally, re-reads the authoritative row and emits
    /// `CategoryUpdated` with the fresh record before returning it.
    pub async fn update(
        &self,
        caller: &dyn ShopAuthorization,
        shop_id: &str,
        category_id: &str,
        dto: UpdateCategoryDto,
    ) -> Result<CategoryResponseDto> {
        if !caller.has_any_permission(CATEGORY_MANAGE_PERMISSIONS, shop_id) {
            return Err(AppError::Forbidden(
                "User does not have permission".to_string(),
            ));
        }

        let patch = assemble_patch(dto);
        patch
            .validate()
            .map_err(|e| AppError::Validation(e.to_string()))?;

        let matched = self
            .store
            .update_one(category_id, shop_id, &patch)
            .await
            .map_err(|e| map_update_error(e, &patch.slug))?;

        if matched == 0 {
            return Err(AppError::NotFound(format!(
                "Category '{}' not found",
                category_id
            )));
        }

        // Return the authoritative post-update state, not the input echo
        let category = self
            .store
            .find_one(category_id, shop_id)
            .await
            .map_err(AppError::from)?
            .ok_or_else(|| AppError::NotFound(format!("Category '{}' not found", category_id)))?;

        // The write is durable at this point; a failed notification is
        // logged and must not fail the request.
        if let Err(e) = self
            .events
            .emit(AppEvent::CategoryUpdated(category.clone()))
            .await
        {
            tracing::error!(
                category_id = %category.id,
                shop_id = %category.shop_id,
                "Failed to emit afterCategoryUpdate: {}",
                e
            );
        }

        Ok(category.into())
    }

    /// List all categories of a shop
    pub async fn list(&self, shop_id: &str) -> Result<Vec<CategoryResponseDto>> {
        let categories = self.store.find_all(shop_id).await.map_err(AppError::from)?;

        Ok(categories.into_iter().map(|c| c.into()).collect())
    }

    /// Get a category by id
    pub async fn get_by_id(&self, shop_id: &str, category_id: &str) -> Result<CategoryResponseDto> {
        let category = self
            .store
            .find_one(category_id, shop_id)
            .await
            .map_err(AppError::from)?;

        category
            .map(|c| c.into())
            .ok_or_else(|| AppError::NotFound(format!("Category '{}' not found", category_id)))
    }
}

/// Translate store failures from the update path, naming the offending slug
/// on a slug-index violation.
fn map_update_error(e: StoreError, slug: &str) -> AppError {
    match e {
        StoreError::DuplicateKey { field: "slug" } => {
            AppError::Conflict(format!("Slug {} is already in use", slug))
        }
        other => other.into(),
    }
}

/// Build the update document from caller input.
fn assemble_patch(dto: UpdateCategoryDto) -> CategoryPatch {
    let slug = resolve_slug(dto.slug.as_deref(), &dto.name);

    CategoryPatch {
        slug,
        name: dto.name,
        display_title: dto.display_title,
        hero_media_url: normalize_hero_media_url(dto.hero_media_url),
        is_visible: dto.is_visible,
        metafields: sanitize_metafields(dto.metafields),
        featured_product_ids: dto.featured_product_ids,
    }
}

/// Keep only metafields whose value is a string with non-whitespace content,
/// preserving input order. An empty result clears the stored field entirely
/// rather than persisting an empty list.
fn sanitize_metafields(input: Option<Vec<MetafieldInputDto>>) -> Option<Vec<Metafield>> {
    let kept: Vec<Metafield> = input
        .unwrap_or_default()
        .into_iter()
        .filter_map(|field| match field.value {
            serde_json::Value::String(value) if !value.trim().is_empty() => Some(Metafield {
                key: field.key,
                namespace: field.namespace,
                value,
            }),
            _ => None,
        })
        .collect();

    if kept.is_empty() {
        None
    } else {
        Some(kept)
    }
}

/// A non-blank caller-supplied slug wins (trimmed before slugifying);
/// otherwise the slug is derived from the name.
fn resolve_slug(slug: Option<&str>, name: &str) -> String {
    match slug {
        Some(s) if !s.trim().is_empty() => slugify(s.trim()),
        _ => slugify(name),
    }
}

/// Non-empty URLs pass through unchanged; anything else clears the field.
fn normalize_hero_media_url(url: Option<String>) -> Option<String> {
    url.filter(|u| !u.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::events::AppEvent;
    use crate::shared::test_helpers::{
        sample_category, shop_editor, user_without_permissions, FailingEvents,
        InMemoryCategoryStore, RecordingEvents,
    };
    use fake::faker::lorem::en::Words;
    use fake::Fake;
    use serde_json::json;

    fn update_dto() -> UpdateCategoryDto {
        UpdateCategoryDto {
            name: "Summer Sale".to_string(),
            display_title: "Summer Sale".to_string(),
            slug: None,
            hero_media_url: None,
            is_visible: true,
            metafields: None,
            featured_product_ids: None,
        }
    }

    fn metafield(key: &str, namespace: &str, value: serde_json::Value) -> MetafieldInputDto {
        MetafieldInputDto {
            key: key.to_string(),
            namespace: namespace.to_string(),
            value,
        }
    }

    struct Fixture {
        store: Arc<InMemoryCategoryStore>,
        events: Arc<RecordingEvents>,
        service: CategoryService,
    }

    fn fixture() -> Fixture {
        let store = Arc::new(InMemoryCategoryStore::new());
        store.seed(sample_category("shop-1", "cat-1", "shoes"));
        let events = Arc::new(RecordingEvents::new());
        let service = CategoryService::new(store.clone(), events.clone());
        Fixture {
            store,
            events,
            service,
        }
    }

    #[tokio::test]
    async fn test_update_denied_without_permission_and_no_write() {
        let f = fixture();

        let result = f
            .service
            .update(&user_without_permissions(), "shop-1", "cat-1", update_dto())
            .await;

        assert!(matches!(result, Err(AppError::Forbidden(_))));
        assert_eq!(f.store.write_count(), 0);
        assert!(f.events.emitted().is_empty());
    }

    #[tokio::test]
    async fn test_update_denied_when_permission_is_for_other_shop() {
        let f = fixture();

        // Editor of shop-2 must not touch shop-1
        let result = f
            .service
            .update(&shop_editor("shop-2"), "shop-1", "cat-1", update_dto())
            .await;

        assert!(matches!(result, Err(AppError::Forbidden(_))));
        assert_eq!(f.store.write_count(), 0);
    }

    #[tokio::test]
    async fn test_update_derives_slug_from_name_when_missing() {
        let f = fixture();

        let updated = f
            .service
            .update(&shop_editor("shop-1"), "shop-1", "cat-1", update_dto())
            .await
            .unwrap();

        assert_eq!(updated.slug, "summer-sale");
    }

    #[tokio::test]
    async fn test_update_derives_slug_from_name_when_blank() {
        let f = fixture();
        let dto = UpdateCategoryDto {
            slug: Some("   ".to_string()),
            ..update_dto()
        };

        let updated = f
            .service
            .update(&shop_editor("shop-1"), "shop-1", "cat-1", dto)
            .await
            .unwrap();

        assert_eq!(updated.slug, "summer-sale");
    }

    #[tokio::test]
    async fn test_update_prefers_supplied_slug_trimmed() {
        let f = fixture();
        let dto = UpdateCategoryDto {
            slug: Some("  My Slug  ".to_string()),
            ..update_dto()
        };

        let updated = f
            .service
            .update(&shop_editor("shop-1"), "shop-1", "cat-1", dto)
            .await
            .unwrap();

        // The supplied slug wins over the name
        assert_eq!(updated.slug, "my-slug");
    }

    #[tokio::test]
    async fn test_update_slugifies_generated_names() {
        let f = fixture();
        let words: Vec<String> = Words(2..4).fake();
        let name = words.join(" ");
        let dto = UpdateCategoryDto {
            name: name.clone(),
            ..update_dto()
        };

        let updated = f
            .service
            .update(&shop_editor("shop-1"), "shop-1", "cat-1", dto)
            .await
            .unwrap();

        assert_eq!(updated.slug, crate::shared::slug::slugify(&name));
    }

    #[tokio::test]
    async fn test_update_drops_blank_and_non_string_metafields() {
        let f = fixture();
        let dto = UpdateCategoryDto {
            metafields: Some(vec![
                metafield("season", "catalog", json!("summer")),
                metafield("blank", "catalog", json!("   ")),
                metafield("count", "catalog", json!(42)),
                metafield("badge", "catalog", json!("new")),
            ]),
            ..update_dto()
        };

        let updated = f
            .service
            .update(&shop_editor("shop-1"), "shop-1", "cat-1", dto)
            .await
            .unwrap();

        let metafields = updated.metafields.unwrap();
        assert_eq!(metafields.len(), 2);
        // Retained entries keep input order
        assert_eq!(metafields[0].key, "season");
        assert_eq!(metafields[0].value, "summer");
        assert_eq!(metafields[1].key, "badge");
    }

    #[tokio::test]
    async fn test_update_clears_metafields_when_all_dropped() {
        let f = fixture();
        let dto = UpdateCategoryDto {
            metafields: Some(vec![
                metafield("a", "catalog", json!("")),
                metafield("b", "catalog", json!(null)),
            ]),
            ..update_dto()
        };

        f.service
            .update(&shop_editor("shop-1"), "shop-1", "cat-1", dto)
            .await
            .unwrap();

        // Cleared, not persisted as an empty list
        let stored = f.store.get("cat-1", "shop-1").unwrap();
        assert!(stored.metafields.is_none());
    }

    #[tokio::test]
    async fn test_update_clears_blank_hero_media_url() {
        let f = fixture();
        let dto = UpdateCategoryDto {
            hero_media_url: Some("".to_string()),
            ..update_dto()
        };

        let updated = f
            .service
            .update(&shop_editor("shop-1"), "shop-1", "cat-1", dto)
            .await
            .unwrap();

        assert!(updated.hero_media_url.is_none());
    }

    #[tokio::test]
    async fn test_update_keeps_hero_media_url_unchanged() {
        let f = fixture();
        let dto = UpdateCategoryDto {
            hero_media_url: Some("https://cdn.example.com/hero.png".to_string()),
            ..update_dto()
        };

        let updated = f
            .service
            .update(&shop_editor("shop-1"), "shop-1", "cat-1", dto)
            .await
            .unwrap();

        assert_eq!(
            updated.hero_media_url.as_deref(),
            Some("https://cdn.example.com/hero.png")
        );
    }

    #[tokio::test]
    async fn test_update_unknown_category_is_not_found_and_creates_nothing() {
        let f = fixture();

        let result = f
            .service
            .update(&shop_editor("shop-1"), "shop-1", "cat-missing", update_dto())
            .await;

        assert!(matches!(result, Err(AppError::NotFound(_))));
        assert_eq!(f.store.row_count(), 1);
    }

    #[tokio::test]
    async fn test_update_wrong_shop_pairing_is_not_found() {
        let f = fixture();
        let caller = shop_editor("shop-2");

        // cat-1 belongs to shop-1; pairing it with shop-2 matches nothing
        let result = f
            .service
            .update(&caller, "shop-2", "cat-1", update_dto())
            .await;

        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_update_conflicting_slug_names_the_slug() {
        let f = fixture();
        f.store.seed(sample_category("shop-1", "cat-2", "sale"));
        let dto = UpdateCategoryDto {
            slug: Some("shoes".to_string()),
            ..update_dto()
        };

        // cat-2 tries to take cat-1's slug
        let result = f
            .service
            .update(&shop_editor("shop-1"), "shop-1", "cat-2", dto)
            .await;

        match result {
            Err(AppError::Conflict(message)) => {
                assert!(message.contains("shoes"), "message was: {}", message);
            }
            other => panic!("expected Conflict, got {:?}", other.map(|c| c.slug)),
        }
        // The loser's row is untouched
        assert_eq!(f.store.get("cat-2", "shop-1").unwrap().slug, "sale");
    }

    #[tokio::test]
    async fn test_update_returns_fresh_record_and_notifies_once() {
        let f = fixture();
        let before = f.store.get("cat-1", "shop-1").unwrap().updated_at;

        let updated = f
            .service
            .update(&shop_editor("shop-1"), "shop-1", "cat-1", update_dto())
            .await
            .unwrap();

        assert!(updated.updated_at > before);

        let emitted = f.events.emitted();
        assert_eq!(emitted.len(), 1);
        let AppEvent::CategoryUpdated(payload) = &emitted[0];
        assert_eq!(payload.slug, "summer-sale");
        assert_eq!(payload.updated_at, updated.updated_at);
    }

    #[tokio::test]
    async fn test_update_preserves_featured_product_ids_order() {
        let f = fixture();
        let ids = vec![
            "prod-9".to_string(),
            "prod-1".to_string(),
            "prod-9".to_string(),
            "prod-4".to_string(),
        ];
        let dto = UpdateCategoryDto {
            featured_product_ids: Some(ids.clone()),
            ..update_dto()
        };

        let updated = f
            .service
            .update(&shop_editor("shop-1"), "shop-1", "cat-1", dto)
            .await
            .unwrap();

        // Same order, no dedup
        assert_eq!(updated.featured_product_ids, Some(ids));
    }

    #[tokio::test]
    async fn test_update_rejects_oversized_metafield_key_before_write() {
        let f = fixture();
        let dto = UpdateCategoryDto {
            metafields: Some(vec![metafield(
                &"k".repeat(31),
                "catalog",
                json!("value"),
            )]),
            ..update_dto()
        };

        let result = f
            .service
            .update(&shop_editor("shop-1"), "shop-1", "cat-1", dto)
            .await;

        assert!(matches!(result, Err(AppError::Validation(_))));
        assert_eq!(f.store.write_count(), 0);
    }

    #[tokio::test]
    async fn test_update_rejects_unsluggable_name_before_write() {
        let f = fixture();
        let dto = UpdateCategoryDto {
            name: "!!!".to_string(),
            ..update_dto()
        };

        // Slug derivation yields an empty slug, which fails validation
        let result = f
            .service
            .update(&shop_editor("shop-1"), "shop-1", "cat-1", dto)
            .await;

        assert!(matches!(result, Err(AppError::Validation(_))));
        assert_eq!(f.store.write_count(), 0);
    }

    #[tokio::test]
    async fn test_update_succeeds_when_notification_fails() {
        let store = Arc::new(InMemoryCategoryStore::new());
        store.seed(sample_category("shop-1", "cat-1", "shoes"));
        let service = CategoryService::new(store.clone(), Arc::new(FailingEvents));

        let updated = service
            .update(&shop_editor("shop-1"), "shop-1", "cat-1", update_dto())
            .await
            .unwrap();

        // The durable write is returned despite the notifier failing
        assert_eq!(updated.slug, "summer-sale");
        assert_eq!(store.get("cat-1", "shop-1").unwrap().slug, "summer-sale");
    }

    #[tokio::test]
    async fn test_list_is_shop_scoped() {
        let f = fixture();
        f.store.seed(sample_category("shop-2", "cat-9", "other"));

        let categories = f.service.list("shop-1").await.unwrap();

        assert_eq!(categories.len(), 1);
        assert_eq!(categories[0].id, "cat-1");
    }

    #[tokio::test]
    async fn test_get_by_id_not_found_for_wrong_shop() {
        let f = fixture();

        let result = f.service.get_by_id("shop-2", "cat-1").await;

        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[test]
    fn test_sanitize_metafields_none_input() {
        assert!(sanitize_metafields(None).is_none());
    }

    #[test]
    fn test_resolve_slug_prefers_non_blank_input() {
        assert_eq!(resolve_slug(Some("  My Slug  "), "Ignored"), "my-slug");
        assert_eq!(resolve_slug(Some(""), "Summer Sale"), "summer-sale");
        assert_eq!(resolve_slug(None, "Summer Sale"), "summer-sale");
    }

    #[test]
    fn test_normalize_hero_media_url() {
        assert_eq!(normalize_hero_media_url(None), None);
        assert_eq!(normalize_hero_media_url(Some("".to_string())), None);
        assert_eq!(
            normalize_hero_media_url(Some("https://x/y.png".to_string())),
            Some("https://x/y.png".to_string())
        );
    }
}
