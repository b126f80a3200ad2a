use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::features::auth::model::AuthenticatedUser;
use crate::features::persons::dtos::CreatePersonDto;
use crate::features::persons::models::PersonRole;

/// Request DTO for /auth/login
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct LoginRequestDto {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    #[validate(length(min = 1, message = "Password must not be empty"))]
    pub password: String,
}

/// Request DTO for /auth/register. Person fields plus an optional city
/// reference by name. Any `role` supplied here is ignored: self-registration
/// always produces a USER.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequestDto {
    #[validate(length(min = 1, max = 100, message = "First name must be 1-100 characters"))]
    pub first_name: String,

    #[validate(length(min = 1, max = 100, message = "Last name must be 1-100 characters"))]
    pub last_name: String,

    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    #[validate(length(min = 8, max = 128, message = "Password must be 8-128 characters"))]
    pub password: String,

    pub birth_date: NaiveDate,

    /// Accepted but ignored; registration never grants elevated roles.
    pub role: Option<PersonRole>,

    pub city_name: Option<String>,

    pub province_name: Option<String>,
}

impl RegisterRequestDto {
    /// Split the registration payload into a person-create payload. The role
    /// is forced to USER regardless of what the caller supplied; the city id
    /// comes from the resolver, not from the payload.
    pub fn into_create_dto(self, city_id: Option<i64>) -> CreatePersonDto {
        CreatePersonDto {
            first_name: self.first_name,
            last_name: self.last_name,
            email: self.email,
            password: self.password,
            birth_date: self.birth_date,
            role: Some(PersonRole::User),
            city_id,
        }
    }
}

/// Response DTO for a successful login
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TokenResponseDto {
    pub access_token: String,
}

/// Response DTO for a successful registration
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisterResponseDto {
    pub message: String,
    pub user_id: i64,
}

/// Response DTO for /auth/me
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct MeResponseDto {
    pub id: i64,
    pub email: String,
    pub role: PersonRole,
}

impl From<AuthenticatedUser> for MeResponseDto {
    fn from(user: AuthenticatedUser) -> Self {
        Self {
            id: user.id,
            email: user.email,
            role: user.role,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn register_dto(role: Option<PersonRole>) -> RegisterRequestDto {
        RegisterRequestDto {
            first_name: "Eva".to_string(),
            last_name: "Perón".to_string(),
            email: "eva@example.com".to_string(),
            password: "a-long-password".to_string(),
            birth_date: NaiveDate::from_ymd_opt(1919, 5, 7).unwrap(),
            role,
            city_name: Some("La Plata".to_string()),
            province_name: Some("Buenos Aires".to_string()),
        }
    }

    #[test]
    fn registration_forces_role_user_even_when_admin_requested() {
        let create = register_dto(Some(PersonRole::Admin)).into_create_dto(Some(9));
        assert_eq!(create.role, Some(PersonRole::User));
        assert_eq!(create.city_id, Some(9));
    }

    #[test]
    fn registration_without_city_leaves_city_unset() {
        let create = register_dto(None).into_create_dto(None);
        assert_eq!(create.role, Some(PersonRole::User));
        assert_eq!(create.city_id, None);
        assert_eq!(create.email, "eva@example.com");
    }
}
