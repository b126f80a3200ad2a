#[cfg(test)]
use crate::features::auth::model::AuthenticatedUser;
#[cfg(test)]
use crate::features::persons::models::PersonRole;

#[cfg(test)]
use axum::{extract::Request, middleware::Next, response::Response, Router};

#[cfg(test)]
pub fn create_user(role: PersonRole) -> AuthenticatedUser {
    AuthenticatedUser {
        id: 1,
        email: "test@example.com".to_string(),
        role,
    }
}

/// Wrap a router with middleware that injects the given principal, the way
/// `auth_middleware` would after verifying a real token.
#[cfg(test)]
pub fn with_auth(router: Router, user: AuthenticatedUser) -> Router {
    router.layer(axum::middleware::from_fn(
        move |mut request: Request, next: Next| {
            let user = user.clone();
            async move {
                request.extensions_mut().insert(user);
                let response: Response = next.run(request).await;
                response
            }
        },
    ))
}
