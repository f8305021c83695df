use std::sync::Arc;

use axum::{
    routing::{get, put},
    Router,
};

use crate::features::categories::handlers;
use crate::features::categories::services::CategoryService;

/// Public read routes for the categories feature
pub fn routes(service: Arc<CategoryService>) -> Router {
    Router::new()
        .route(
            "/api/shops/{shop_id}/categories",
            get(handlers::list_categories),
        )
        .route(
            "/api/shops/{shop_id}/categories/{category_id}",
            get(handlers::get_category),
        )
        .with_state(service)
}

/// Mutation routes; mounted behind the authentication middleware
pub fn protected_routes(service: Arc<CategoryService>) -> Router {
    Router::new()
        .route(
            "/api/shops/{shop_id}/categories/{category_id}",
            put(handlers::update_category),
        )
        .with_state(service)
}
