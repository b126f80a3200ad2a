use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::features::countries::models::Country;
use crate::features::provinces::dtos::ProvinceResponseDto;
use crate::shared::validation::COUNTRY_CODE_REGEX;

/// Request DTO for creating a country
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateCountryDto {
    #[validate(length(min = 1, max = 120, message = "Name must be 1-120 characters"))]
    pub name: String,

    #[validate(regex(
        path = *COUNTRY_CODE_REGEX,
        message = "Code must be 2-3 uppercase letters"
    ))]
    pub code: Option<String>,
}

/// Request DTO for PUT (full replace)
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePutCountryDto {
    #[validate(length(min = 1, max = 120, message = "Name must be 1-120 characters"))]
    pub name: String,

    #[validate(regex(
        path = *COUNTRY_CODE_REGEX,
        message = "Code must be 2-3 uppercase letters"
    ))]
    pub code: Option<String>,
}

/// Request DTO for PATCH (partial update)
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePatchCountryDto {
    #[validate(length(min = 1, max = 120, message = "Name must be 1-120 characters"))]
    pub name: Option<String>,

    #[validate(regex(
        path = *COUNTRY_CODE_REGEX,
        message = "Code must be 2-3 uppercase letters"
    ))]
    pub code: Option<String>,
}

/// Query flags for country reads.
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct ListCountriesQuery {
    /// When true, each country embeds its provinces.
    #[serde(default)]
    pub with_provinces: bool,
}

/// Response DTO for a country. `provinces` is only present when the caller
/// asked for the relation to be loaded.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CountryResponseDto {
    pub id: i64,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(no_recursion)]
    pub provinces: Option<Vec<ProvinceResponseDto>>,
}

impl From<Country> for CountryResponseDto {
    fn from(c: Country) -> Self {
        Self {
            id: c.id,
            name: c.name,
            code: c.code,
            provinces: None,
        }
    }
}

impl CountryResponseDto {
    pub fn with_provinces(mut self, provinces: Vec<ProvinceResponseDto>) -> Self {
        self.provinces = Some(provinces);
        self
    }
}
