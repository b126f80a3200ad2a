use std::sync::Arc;

use axum::{routing::get, Router};

use crate::features::cities::handlers;
use crate::features::cities::services::CityService;

/// Create routes for the cities feature.
pub fn routes(service: Arc<CityService>) -> Router {
    Router::new()
        .route(
            "/cities",
            get(handlers::list_cities).post(handlers::create_city),
        )
        .route("/cities/search", get(handlers::search_cities))
        .route(
            "/cities/{id}",
            get(handlers::get_city)
                .put(handlers::update_put_city)
                .patch(handlers::update_patch_city)
                .delete(handlers::delete_city),
        )
        .with_state(service)
}
