use std::sync::Arc;

use axum::{routing::get, Router};

use crate::features::persons::handlers;
use crate::features::persons::services::PersonService;

/// Create routes for the persons feature.
///
/// All routes require authentication; reads additionally require ADMIN or
/// MODERATOR, writes require ADMIN (enforced by handler guards).
pub fn routes(service: Arc<PersonService>) -> Router {
    Router::new()
        .route(
            "/persons",
            get(handlers::list_persons).post(handlers::create_person),
        )
        .route("/persons/search", get(handlers::search_persons))
        .route(
            "/persons/{id}",
            get(handlers::get_person)
                .put(handlers::update_put_person)
                .patch(handlers::update_patch_person)
                .delete(handlers::delete_person),
        )
        .with_state(service)
}
