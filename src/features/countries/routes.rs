use std::sync::Arc;

use axum::{routing::get, Router};

use crate::features::countries::handlers;
use crate::features::countries::services::CountryService;

/// Create routes for the countries feature.
///
/// All routes require authentication; writes additionally require ADMIN
/// (enforced by handler guards).
pub fn routes(service: Arc<CountryService>) -> Router {
    Router::new()
        .route(
            "/countries",
            get(handlers::list_countries).post(handlers::create_country),
        )
        .route("/countries/search", get(handlers::search_countries))
        .route(
            "/countries/{id}",
            get(handlers::get_country)
                .put(handlers::update_put_country)
                .patch(handlers::update_patch_country)
                .delete(handlers::delete_country),
        )
        .with_state(service)
}
