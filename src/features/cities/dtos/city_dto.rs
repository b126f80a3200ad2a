use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::features::cities::models::{City, CityWithRelationsRow};
use crate::features::countries::dtos::CountryResponseDto;
use crate::features::provinces::dtos::ProvinceResponseDto;

/// Request DTO for creating a city
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateCityDto {
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

    pub province_id: i64,
}

/// Request DTO for PUT (full replace)
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePutCityDto {
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

    pub province_id: i64,
}

/// Request DTO for PATCH (partial update)
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePatchCityDto {
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

    pub province_id: Option<i64>,
}

/// Response DTO for a city. `province` (with its country) is embedded on
/// reads that join the parents and omitted elsewhere.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CityResponseDto {
    pub id: i64,
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    pub province_id: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(no_recursion)]
    pub province: Option<ProvinceResponseDto>,
}

impl From<City> for CityResponseDto {
    fn from(c: City) -> Self {
        Self {
            id: c.id,
            name: c.name,
            latitude: c.latitude,
            longitude: c.longitude,
            province_id: c.province_id,
            province: None,
        }
    }
}

impl From<CityWithRelationsRow> for CityResponseDto {
    fn from(row: CityWithRelationsRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            latitude: row.latitude,
            longitude: row.longitude,
            province_id: row.province_id,
            province: Some(ProvinceResponseDto {
                id: row.province_id,
                name: row.province_name,
                latitude: row.province_latitude,
                longitude: row.province_longitude,
                country_id: row.country_id,
                country: Some(CountryResponseDto {
                    id: row.country_id,
                    name: row.country_name,
                    code: row.country_code,
                    provinces: None,
                }),
            }),
        }
    }
}
