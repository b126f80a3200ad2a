use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::features::countries::dtos::CountryResponseDto;
use crate::features::provinces::models::{Province, ProvinceWithCountryRow};

/// Request DTO for creating a province
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateProvinceDto {
    #[validate(length(min = 1, max = 120, message = "Name must be 1-120 characters"))]
    pub name: String,

    #[validate(range(min = -90.0, max = 90.0, message = "Latitude must be between -90 and 90"))]
    pub latitude: f64,

    #[validate(range(
        min = -180.0,
        max = 180.0,
        message = "Longitude must be between -180 and 180"
    ))]
    pub longitude: f64,

    pub country_id: i64,
}

/// Request DTO for PUT (full replace)
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePutProvinceDto {
    #[validate(length(min = 1, max = 120, message = "Name must be 1-120 characters"))]
    pub name: String,

    #[validate(range(min = -90.0, max = 90.0, message = "Latitude must be between -90 and 90"))]
    pub latitude: f64,

    #[validate(range(
        min = -180.0,
        max = 180.0,
        message = "Longitude must be between -180 and 180"
    ))]
    pub longitude: f64,

    pub country_id: i64,
}

/// Request DTO for PATCH (partial update)
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePatchProvinceDto {
    #[validate(length(min = 1, max = 120, message = "Name must be 1-120 characters"))]
    pub name: Option<String>,

    #[validate(range(min = -90.0, max = 90.0, message = "Latitude must be between -90 and 90"))]
    pub latitude: Option<f64>,

    #[validate(range(
        min = -180.0,
        max = 180.0,
        message = "Longitude must be between -180 and 180"
    ))]
    pub longitude: Option<f64>,

    pub country_id: Option<i64>,
}

/// Response DTO for a province. `country` is embedded on reads that join the
/// parent and omitted elsewhere.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProvinceResponseDto {
    pub id: i64,
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    pub country_id: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(no_recursion)]
    pub country: Option<CountryResponseDto>,
}

impl From<Province> for ProvinceResponseDto {
    fn from(p: Province) -> Self {
        Self {
            id: p.id,
            name: p.name,
            latitude: p.latitude,
            longitude: p.longitude,
            country_id: p.country_id,
            country: None,
        }
    }
}

impl From<ProvinceWithCountryRow> for ProvinceResponseDto {
    fn from(row: ProvinceWithCountryRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            latitude: row.latitude,
            longitude: row.longitude,
            country_id: row.country_id,
            country: Some(CountryResponseDto {
                id: row.country_id,
                name: row.country_name,
                code: row.country_code,
                provinces: None,
            }),
        }
    }
}
