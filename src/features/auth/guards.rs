//! Role-based authorization guards.
//!
//! These guards extract the authenticated user from the request extensions
//! (placed there by `auth_middleware`) and verify the required role.
//!
//! Role levels:
//! - ADMIN: all writes, plus everything below
//! - MODERATOR: person reads
//! - USER: authenticated reads of the geographic entities

use crate::core::error::AppError;
use crate::features::auth::model::AuthenticatedUser;
use axum::{extract::FromRequestParts, http::request::Parts};

/// Guard for ADMIN-only routes (all create/update/delete endpoints).
///
/// # Example
/// ```ignore
/// pub async fn handler(RequireAdmin(user): RequireAdmin) { ... }
/// ```
pub struct RequireAdmin(pub AuthenticatedUser);

impl<S> FromRequestParts<S> for RequireAdmin
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user = parts
            .extensions
            .get::<AuthenticatedUser>()
            .ok_or_else(|| AppError::Unauthorized("User not authenticated".to_string()))?;

        if !user.is_admin() {
            return Err(AppError::Forbidden("Admin access required".to_string()));
        }

        Ok(RequireAdmin(user.clone()))
    }
}

/// Guard for staff routes (ADMIN or MODERATOR). Used for person reads.
pub struct RequireStaff(pub AuthenticatedUser);

impl<S> FromRequestParts<S> for RequireStaff
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user = parts
            .extensions
            .get::<AuthenticatedUser>()
            .ok_or_else(|| AppError::Unauthorized("User not authenticated".to_string()))?;

        if !user.is_staff() {
            return Err(AppError::Forbidden(
                "Admin or moderator access required".to_string(),
            ));
        }

        Ok(RequireStaff(user.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::persons::models::PersonRole;
    use crate::shared::test_helpers::{create_user, with_auth};
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use axum::routing::get;
    use axum::Router;
    use tower::ServiceExt;

    async fn admin_only(RequireAdmin(_user): RequireAdmin) -> &'static str {
        "ok"
    }

    async fn staff_only(RequireStaff(_user): RequireStaff) -> &'static str {
        "ok"
    }

    fn app() -> Router {
        Router::new()
            .route("/admin", get(admin_only))
            .route("/staff", get(staff_only))
    }

    async fn status_for(router: Router, path: &str) -> StatusCode {
        let response = router
            .oneshot(Request::builder().uri(path).body(Body::empty()).unwrap())
            .await
            .unwrap();
        response.status()
    }

    #[tokio::test]
    async fn admin_guard_allows_admin() {
        let router = with_auth(app(), create_user(PersonRole::Admin));
        assert_eq!(status_for(router, "/admin").await, StatusCode::OK);
    }

    #[tokio::test]
    async fn admin_guard_rejects_moderator_and_user() {
        for role in [PersonRole::Moderator, PersonRole::User] {
            let router = with_auth(app(), create_user(role));
            assert_eq!(status_for(router, "/admin").await, StatusCode::FORBIDDEN);
        }
    }

    #[tokio::test]
    async fn staff_guard_allows_admin_and_moderator() {
        for role in [PersonRole::Admin, PersonRole::Moderator] {
            let router = with_auth(app(), create_user(role));
            assert_eq!(status_for(router, "/staff").await, StatusCode::OK);
        }
    }

    #[tokio::test]
    async fn staff_guard_rejects_plain_user() {
        let router = with_auth(app(), create_user(PersonRole::User));
        assert_eq!(status_for(router, "/staff").await, StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn guards_reject_unauthenticated_requests() {
        assert_eq!(status_for(app(), "/admin").await, StatusCode::UNAUTHORIZED);
        assert_eq!(status_for(app(), "/staff").await, StatusCode::UNAUTHORIZED);
    }
}
