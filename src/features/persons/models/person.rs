use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

/// Access level carried in the auth token. Stored as the Postgres enum
/// `person_role`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema,
)]
#[sqlx(type_name = "person_role", rename_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum PersonRole {
    User,
    Moderator,
    Admin,
}

impl PersonRole {
    pub fn is_admin(&self) -> bool {
        matches!(self, PersonRole::Admin)
    }

    /// Staff roles may read person records: ADMIN and MODERATOR.
    pub fn is_staff(&self) -> bool {
        matches!(self, PersonRole::Admin | PersonRole::Moderator)
    }
}

/// Database model for a registered person. The password hash never leaves
/// the persons service; response DTOs are built without it.
#[derive(Debug, Clone, FromRow)]
pub struct Person {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password_hash: String,
    pub birth_date: NaiveDate,
    pub role: PersonRole,
    pub city_id: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_serializes_uppercase() {
        assert_eq!(
            serde_json::to_string(&PersonRole::Moderator).unwrap(),
            "\"MODERATOR\""
        );
        let parsed: PersonRole = serde_json::from_str("\"ADMIN\"").unwrap();
        assert_eq!(parsed, PersonRole::Admin);
    }

    #[test]
    fn staff_covers_admin_and_moderator_only() {
        assert!(PersonRole::Admin.is_staff());
        assert!(PersonRole::Moderator.is_staff());
        assert!(!PersonRole::User.is_staff());

        assert!(PersonRole::Admin.is_admin());
        assert!(!PersonRole::Moderator.is_admin());
    }
}
