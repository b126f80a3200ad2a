use std::sync::Arc;

use crate::core::error::{AppError, Result};
use crate::features::auth::dtos::{
    LoginRequestDto, RegisterRequestDto, RegisterResponseDto, TokenResponseDto,
};
use crate::features::auth::services::password;
use crate::features::auth::services::TokenService;
use crate::features::cities::CityService;
use crate::features::persons::dtos::PersonResponseDto;
use crate::features::persons::PersonService;

/// A single uniform message for both unknown-email and wrong-password, so a
/// caller cannot enumerate which emails are registered.
const INVALID_CREDENTIALS: &str = "Invalid credentials.";

/// Login and registration on top of the persons and cities services.
pub struct AuthService {
    persons: Arc<PersonService>,
    cities: Arc<CityService>,
    tokens: Arc<TokenService>,
}

impl AuthService {
    pub fn new(
        persons: Arc<PersonService>,
        cities: Arc<CityService>,
        tokens: Arc<TokenService>,
    ) -> Self {
        Self {
            persons,
            cities,
            tokens,
        }
    }

    pub async fn login(&self, dto: LoginRequestDto) -> Result<TokenResponseDto> {
        tracing::debug!("Processing login for: {}", dto.email);

        let person = self
            .validate_credentials(&dto.email, &dto.password)
            .await?
            .ok_or_else(|| {
                tracing::warn!("Login failed for: {}", dto.email);
                AppError::Unauthorized(INVALID_CREDENTIALS.to_string())
            })?;

        tracing::info!("Login successful for: {}. Issuing token.", person.email);
        let access_token = self.tokens.issue(person.id, &person.email, person.role)?;
        Ok(TokenResponseDto { access_token })
    }

    /// Register a new person. An optional cityName (with optional
    /// provinceName) is resolved to a city id; the role is always USER.
    /// Person-service errors (e.g. duplicate email) propagate unchanged.
    pub async fn register(&self, dto: RegisterRequestDto) -> Result<RegisterResponseDto> {
        tracing::debug!("Registering new person with email: {}", dto.email);

        let city_id = match dto.city_name.as_deref() {
            Some(city_name) => {
                let city = self
                    .cities
                    .find_by_name_and_province_name(city_name, dto.province_name.as_deref())
                    .await?;

                match city {
                    Some(city) => {
                        tracing::info!(
                            "City resolved for registration: ID {}, name: {}",
                            city.id,
                            city.name
                        );
                        Some(city.id)
                    }
                    None => {
                        let in_province = dto
                            .province_name
                            .as_deref()
                            .map(|p| format!(" in province '{}'", p))
                            .unwrap_or_default();
                        tracing::warn!(
                            "Registration failed: city '{}'{} not found.",
                            city_name,
                            in_province
                        );
                        return Err(AppError::BadRequest(format!(
                            "The city '{}'{} was not found. Please check the data or contact \
                             an administrator if you believe it should exist.",
                            city_name, in_province
                        )));
                    }
                }
            }
            None => None,
        };

        let person = self.persons.create(dto.into_create_dto(city_id)).await?;
        tracing::info!("Person registered successfully with ID: {}", person.id);

        Ok(RegisterResponseDto {
            message: "User registered successfully.".to_string(),
            user_id: person.id,
        })
    }

    /// Credential check that returns the stripped person instead of erroring.
    /// Both login and token-principal rehydration build on this.
    pub async fn validate_credentials(
        &self,
        email: &str,
        plain_password: &str,
    ) -> Result<Option<PersonResponseDto>> {
        let Some(person) = self.persons.find_by_email_for_auth(email).await? else {
            return Ok(None);
        };

        if !password::verify_password(plain_password, &person.password_hash) {
            return Ok(None);
        }

        Ok(Some(person.into()))
    }
}
