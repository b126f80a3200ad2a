use std::sync::Arc;

use axum::{routing::get, Router};

use crate::features::provinces::handlers;
use crate::features::provinces::services::ProvinceService;

/// Create routes for the provinces feature.
pub fn routes(service: Arc<ProvinceService>) -> Router {
    Router::new()
        .route(
            "/provinces",
            get(handlers::list_provinces).post(handlers::create_province),
        )
        .route("/provinces/search", get(handlers::search_provinces))
        .route(
            "/provinces/{id}",
            get(handlers::get_province)
                .put(handlers::update_put_province)
                .patch(handlers::update_patch_province)
                .delete(handlers::delete_province),
        )
        .with_state(service)
}
