use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::features::persons::models::{Person, PersonRole};

/// Request DTO for creating a person (admin endpoint; self-registration goes
/// through /auth/register which forces role USER).
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreatePersonDto {
    #[validate(length(min = 1, max = 100, message = "First name must be 1-100 characters"))]
    pub first_name: String,

    #[validate(length(min = 1, max = 100, message = "Last name must be 1-100 characters"))]
    pub last_name: String,

    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    #[validate(length(min = 8, max = 128, message = "Password must be 8-128 characters"))]
    pub password: String,

    pub birth_date: NaiveDate,

    /// Defaults to USER when omitted.
    pub role: Option<PersonRole>,

    pub city_id: Option<i64>,
}

/// Request DTO for PUT (full replace). All fields required; the password is
/// re-hashed on every replace.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePutPersonDto {
    #[validate(length(min = 1, max = 100, message = "First name must be 1-100 characters"))]
    pub first_name: String,

    #[validate(length(min = 1, max = 100, message = "Last name must be 1-100 characters"))]
    pub last_name: String,

    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    #[validate(length(min = 8, max = 128, message = "Password must be 8-128 characters"))]
    pub password: String,

    pub birth_date: NaiveDate,

    pub role: PersonRole,

    pub city_id: Option<i64>,
}

/// Request DTO for PATCH (partial update). Only supplied fields are checked
/// and changed.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePatchPersonDto {
    #[validate(length(min = 1, max = 100, message = "First name must be 1-100 characters"))]
    pub first_name: Option<String>,

    #[validate(length(min = 1, max = 100, message = "Last name must be 1-100 characters"))]
    pub last_name: Option<String>,

    #[validate(email(message = "Invalid email format"))]
    pub email: Option<String>,

    #[validate(length(min = 8, max = 128, message = "Password must be 8-128 characters"))]
    pub password: Option<String>,

    pub birth_date: Option<NaiveDate>,

    pub role: Option<PersonRole>,

    pub city_id: Option<i64>,
}

/// Response DTO for a person. Deliberately has no password field.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PersonResponseDto {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub birth_date: NaiveDate,
    pub role: PersonRole,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city_id: Option<i64>,
}

impl From<Person> for PersonResponseDto {
    fn from(p: Person) -> Self {
        Self {
            id: p.id,
            first_name: p.first_name,
            last_name: p.last_name,
            email: p.email,
            birth_date: p.birth_date,
            role: p.role,
            city_id: p.city_id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Utc};

    fn sample_person() -> Person {
        Person {
            id: 4,
            first_name: "Ada".to_string(),
            last_name: "Lovelace".to_string(),
            email: "ada@example.com".to_string(),
            password_hash: "$argon2id$not-a-real-hash".to_string(),
            birth_date: NaiveDate::from_ymd_opt(1815, 12, 10).unwrap(),
            role: PersonRole::User,
            city_id: Some(2),
            created_at: DateTime::<Utc>::MIN_UTC,
            updated_at: DateTime::<Utc>::MIN_UTC,
        }
    }

    #[test]
    fn response_dto_never_contains_the_password_hash() {
        let dto: PersonResponseDto = sample_person().into();
        let json = serde_json::to_string(&dto).unwrap();
        assert!(!json.contains("password"));
        assert!(!json.contains("argon2"));
        assert!(json.contains("\"email\":\"ada@example.com\""));
    }

    #[test]
    fn create_dto_rejects_short_passwords() {
        use validator::Validate;

        let dto = CreatePersonDto {
            first_name: "Ada".to_string(),
            last_name: "Lovelace".to_string(),
            email: "ada@example.com".to_string(),
            password: "short".to_string(),
            birth_date: NaiveDate::from_ymd_opt(1815, 12, 10).unwrap(),
            role: None,
            city_id: None,
        };
        assert!(dto.validate().is_err());
    }
}
