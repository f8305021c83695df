use std::sync::Arc;

use axum::{
    extract::{Path, State},
    Json,
};

use crate::core::error::Result;
use crate::core::extractor::AppJson;
use crate::features::auth::model::AuthenticatedUser;
use crate::features::categories::dtos::{CategoryResponseDto, UpdateCategoryDto};
use crate::features::categories::services::CategoryService;
use crate::shared::types::ApiResponse;

/// Update a category
///
/// Requires one of the shop-scoped category management permissions.
#[utoipa::path(
    put,
    path = "/api/shops/{shop_id}/categories/{category_id}",
    params(
        ("shop_id" = String, Path, description = "Shop id"),
        ("category_id" = String, Path, description = "Category id")
    ),
    request_body = UpdateCategoryDto,
    responses(
        (status = 200, description = "Category updated", body = ApiResponse<CategoryResponseDto>),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Not authenticated"),
        (status = 403, description = "Caller lacks category permissions"),
        (status = 404, description = "Category not found"),
        (status = 409, description = "Slug already in use")
    ),
    security(("bearer_auth" = [])),
    tag = "categories"
)]
pub async fn update_category(
    State(service): State<Arc<CategoryService>>,
    user: AuthenticatedUser,
    Path((shop_id, category_id)): Path<(String, String)>,
    AppJson(dto): AppJson<UpdateCategoryDto>,
) -> Result<Json<ApiResponse<CategoryResponseDto>>> {
    let category = service.update(&user, &shop_id, &category_id, dto).await?;
    Ok(Json(ApiResponse::success(Some(category), None, None)))
}

/// List all categories of a shop
#[utoipa::path(
    get,
    path = "/api/shops/{shop_id}/categories",
    params(
        ("shop_id" = String, Path, description = "Shop id")
    ),
    responses(
        (status = 200, description = "List of categories", body = ApiResponse<Vec<CategoryResponseDto>>),
    ),
    tag = "categories"
)]
pub async fn list_categories(
    State(service): State<Arc<CategoryService>>,
    Path(shop_id): Path<String>,
) -> Result<Json<ApiResponse<Vec<CategoryResponseDto>>>> {
    let categories = service.list(&shop_id).await?;
    Ok(Json(ApiResponse::success(Some(categories), None, None)))
}

/// Get a category by id
#[utoipa::path(
    get,
    path = "/api/shops/{shop_id}/categories/{category_id}",
    params(
        ("shop_id" = String, Path, description = "Shop id"),
        ("category_id" = String, Path, description = "Category id")
    ),
    responses(
        (status = 200, description = "Category found", body = ApiResponse<CategoryResponseDto>),
        (status = 404, description = "Category not found")
    ),
    tag = "categories"
)]
pub async fn get_category(
    State(service): State<Arc<CategoryService>>,
    Path((shop_id, category_id)): Path<(String, String)>,
) -> Result<Json<ApiResponse<CategoryResponseDto>>> {
    let category = service.get_by_id(&shop_id, &category_id).await?;
    Ok(Json(ApiResponse::success(Some(category), None, None)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::categories::routes;
    use crate::modules::events::AppEvents;
    use crate::shared::test_helpers::{
        sample_category, shop_editor, user_without_permissions, with_auth, InMemoryCategoryStore,
        RecordingEvents,
    };
    use axum::http::StatusCode;
    use axum::Router;
    use axum_test::TestServer;
    use serde_json::json;

    fn app(user: crate::features::auth::model::AuthenticatedUser) -> (TestServer, Arc<InMemoryCategoryStore>) {
        let store = Arc::new(InMemoryCategoryStore::new());
        store.seed(sample_category("shop-1", "cat-1", "shoes"));
        let events: Arc<dyn AppEvents> = Arc::new(RecordingEvents::new());
        let service = Arc::new(CategoryService::new(store.clone(), events));

        let router: Router = routes::routes(service.clone())
            .merge(with_auth(routes::protected_routes(service), user));

        (TestServer::new(router).unwrap(), store)
    }

    #[tokio::test]
    async fn test_put_category_updates_and_returns_envelope() {
        let (server, store) = app(shop_editor("shop-1"));

        let response = server
            .put("/api/shops/shop-1/categories/cat-1")
            .json(&json!({
                "name": "Summer Sale",
                "displayTitle": "Summer Sale",
                "isVisible": false
            }))
            .await;

        response.assert_status(StatusCode::OK);
        let body: serde_json::Value = response.json();
        assert_eq!(body["success"], json!(true));
        assert_eq!(body["data"]["slug"], json!("summer-sale"));
        assert_eq!(body["data"]["heroMediaUrl"], json!(null));
        assert_eq!(store.get("cat-1", "shop-1").unwrap().name, "Summer Sale");
    }

    #[tokio::test]
    async fn test_put_category_forbidden_without_permission() {
        let (server, store) = app(user_without_permissions());

        let response = server
            .put("/api/shops/shop-1/categories/cat-1")
            .json(&json!({
                "name": "Summer Sale",
                "displayTitle": "Summer Sale",
                "isVisible": true
            }))
            .await;

        response.assert_status(StatusCode::FORBIDDEN);
        assert_eq!(store.write_count(), 0);
    }

    #[tokio::test]
    async fn test_put_unknown_category_is_404() {
        let (server, _store) = app(shop_editor("shop-1"));

        let response = server
            .put("/api/shops/shop-1/categories/cat-missing")
            .json(&json!({
                "name": "Summer Sale",
                "displayTitle": "Summer Sale",
                "isVisible": true
            }))
            .await;

        response.assert_status(StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_get_and_list_are_public() {
        let (server, _store) = app(shop_editor("shop-1"));

        let list = server.get("/api/shops/shop-1/categories").await;
        list.assert_status(StatusCode::OK);
        let body: serde_json::Value = list.json();
        assert_eq!(body["data"].as_array().unwrap().len(), 1);

        let one = server.get("/api/shops/shop-1/categories/cat-1").await;
        one.assert_status(StatusCode::OK);

        let missing = server.get("/api/shops/shop-2/categories/cat-1").await;
        missing.assert_status(StatusCode::NOT_FOUND);
    }
}
