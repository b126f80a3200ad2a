use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::features::persons::models::PersonRole;

/// Principal attached to the request after the bearer token is verified.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AuthenticatedUser {
    pub id: i64,
    pub email: String,
    pub role: PersonRole,
}

impl AuthenticatedUser {
    pub fn is_admin(&self) -> bool {
        self.role.is_admin()
    }

    pub fn is_staff(&self) -> bool {
        self.role.is_staff()
    }
}
