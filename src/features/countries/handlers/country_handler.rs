use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use validator::Validate;

use crate::core::error::{AppError, Result};
use crate::core::extractor::AppJson;
use crate::features::auth::guards::RequireAdmin;
use crate::features::countries::dtos::{
    CountryResponseDto, CreateCountryDto, ListCountriesQuery, UpdatePatchCountryDto,
    UpdatePutCountryDto,
};
use crate::features::countries::services::CountryService;
use crate::shared::types::{ApiResponse, Meta, PaginationQuery, SearchQuery};

/// Create a country (ADMIN only)
#[utoipa::path(
    post,
    path = "/countries",
    request_body = CreateCountryDto,
    responses(
        (status = 201, description = "Country created", body = ApiResponse<CountryResponseDto>),
        (status = 409, description = "Name or code already taken")
    ),
    security(("bearer_auth" = [])),
    tag = "countries"
)]
pub async fn create_country(
    RequireAdmin(_user): RequireAdmin,
    State(service): State<Arc<CountryService>>,
    AppJson(dto): AppJson<CreateCountryDto>,
) -> Result<(StatusCode, Json<ApiResponse<CountryResponseDto>>)> {
    dto.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let country = service.create(dto).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(Some(country), None, None)),
    ))
}

/// List countries, optionally with their provinces embedded
#[utoipa::path(
    get,
    path = "/countries",
    params(PaginationQuery, ListCountriesQuery),
    responses(
        (status = 200, description = "Paginated list of countries", body = ApiResponse<Vec<CountryResponseDto>>),
    ),
    security(("bearer_auth" = [])),
    tag = "countries"
)]
pub async fn list_countries(
    State(service): State<Arc<CountryService>>,
    Query(pagination): Query<PaginationQuery>,
    Query(flags): Query<ListCountriesQuery>,
) -> Result<Json<ApiResponse<Vec<CountryResponseDto>>>> {
    let (countries, total) = service.find_all(&pagination, flags.with_provinces).await?;
    Ok(Json(ApiResponse::success(
        Some(countries),
        None,
        Some(Meta { total }),
    )))
}

/// Search countries by name
#[utoipa::path(
    get,
    path = "/countries/search",
    params(SearchQuery),
    responses(
        (status = 200, description = "Matching countries", body = ApiResponse<Vec<CountryResponseDto>>),
        (status = 400, description = "Empty search term")
    ),
    security(("bearer_auth" = [])),
    tag = "countries"
)]
pub async fn search_countries(
    State(service): State<Arc<CountryService>>,
    Query(query): Query<SearchQuery>,
) -> Result<Json<ApiResponse<Vec<CountryResponseDto>>>> {
    let countries = service
        .search_by_name(query.name.as_deref().unwrap_or(""))
        .await?;
    Ok(Json(ApiResponse::success(Some(countries), None, None)))
}

/// Get one country by id
#[utoipa::path(
    get,
    path = "/countries/{id}",
    params(("id" = i64, Path, description = "Country id"), ListCountriesQuery),
    responses(
        (status = 200, description = "Country found", body = ApiResponse<CountryResponseDto>),
        (status = 404, description = "Country not found")
    ),
    security(("bearer_auth" = [])),
    tag = "countries"
)]
pub async fn get_country(
    State(service): State<Arc<CountryService>>,
    Path(id): Path<i64>,
    Query(flags): Query<ListCountriesQuery>,
) -> Result<Json<ApiResponse<CountryResponseDto>>> {
    let country = service.find_one(id, flags.with_provinces).await?;
    Ok(Json(ApiResponse::success(Some(country), None, None)))
}

/// Replace a country (full update, ADMIN only)
#[utoipa::path(
    put,
    path = "/countries/{id}",
    params(("id" = i64, Path, description = "Country id")),
    request_body = UpdatePutCountryDto,
    responses(
        (status = 200, description = "Country replaced", body = ApiResponse<CountryResponseDto>),
        (status = 404, description = "Country not found"),
        (status = 409, description = "Name or code already taken")
    ),
    security(("bearer_auth" = [])),
    tag = "countries"
)]
pub async fn update_put_country(
    RequireAdmin(_user): RequireAdmin,
    State(service): State<Arc<CountryService>>,
    Path(id): Path<i64>,
    AppJson(dto): AppJson<UpdatePutCountryDto>,
) -> Result<Json<ApiResponse<CountryResponseDto>>> {
    dto.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let country = service.update_put(id, dto).await?;
    Ok(Json(ApiResponse::success(Some(country), None, None)))
}

/// Partially update a country (ADMIN only)
#[utoipa::path(
    patch,
    path = "/countries/{id}",
    params(("id" = i64, Path, description = "Country id")),
    request_body = UpdatePatchCountryDto,
    responses(
        (status = 200, description = "Country updated", body = ApiResponse<CountryResponseDto>),
        (status = 404, description = "Country not found"),
        (status = 409, description = "Name or code already taken")
    ),
    security(("bearer_auth" = [])),
    tag = "countries"
)]
pub async fn update_patch_country(
    RequireAdmin(_user): RequireAdmin,
    State(service): State<Arc<CountryService>>,
    Path(id): Path<i64>,
    AppJson(dto): AppJson<UpdatePatchCountryDto>,
) -> Result<Json<ApiResponse<CountryResponseDto>>> {
    dto.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let country = service.update_patch(id, dto).await?;
    Ok(Json(ApiResponse::success(Some(country), None, None)))
}

/// Delete a country (ADMIN only; fails while provinces reference it)
#[utoipa::path(
    delete,
    path = "/countries/{id}",
    params(("id" = i64, Path, description = "Country id")),
    responses(
        (status = 200, description = "Country deleted"),
        (status = 404, description = "Country not found"),
        (status = 409, description = "Country still has provinces")
    ),
    security(("bearer_auth" = [])),
    tag = "countries"
)]
pub async fn delete_country(
    RequireAdmin(_user): RequireAdmin,
    State(service): State<Arc<CountryService>>,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<()>>> {
    let message = service.remove(id).await?;
    Ok(Json(ApiResponse::success(None, Some(message), None)))
}
