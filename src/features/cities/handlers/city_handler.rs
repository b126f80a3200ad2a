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
use crate::features::cities::dtos::{
    CityResponseDto, CreateCityDto, UpdatePatchCityDto, UpdatePutCityDto,
};
use crate::features::cities::services::CityService;
use crate::shared::types::{ApiResponse, Meta, PaginationQuery, SearchQuery};

/// Create a city (ADMIN only)
///
/// Creating at already-taken coordinates returns the existing city instead
/// of failing.
#[utoipa::path(
    post,
    path = "/cities",
    request_body = CreateCityDto,
    responses(
        (status = 201, description = "City created (or existing row at the same coordinates)", body = ApiResponse<CityResponseDto>),
        (status = 404, description = "Referenced province not found")
    ),
    security(("bearer_auth" = [])),
    tag = "cities"
)]
pub async fn create_city(
    RequireAdmin(_user): RequireAdmin,
    State(service): State<Arc<CityService>>,
    AppJson(dto): AppJson<CreateCityDto>,
) -> Result<(StatusCode, Json<ApiResponse<CityResponseDto>>)> {
    dto.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let city = service.create(dto).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(Some(city), None, None)),
    ))
}

/// List cities with their province and country embedded
#[utoipa::path(
    get,
    path = "/cities",
    params(PaginationQuery),
    responses(
        (status = 200, description = "Paginated list of cities", body = ApiResponse<Vec<CityResponseDto>>),
    ),
    security(("bearer_auth" = [])),
    tag = "cities"
)]
pub async fn list_cities(
    State(service): State<Arc<CityService>>,
    Query(pagination): Query<PaginationQuery>,
) -> Result<Json<ApiResponse<Vec<CityResponseDto>>>> {
    let (cities, total) = service.find_all(&pagination).await?;
    Ok(Json(ApiResponse::success(
        Some(cities),
        None,
        Some(Meta { total }),
    )))
}

/// Search cities by name
#[utoipa::path(
    get,
    path = "/cities/search",
    params(SearchQuery),
    responses(
        (status = 200, description = "Matching cities", body = ApiResponse<Vec<CityResponseDto>>),
        (status = 400, description = "Empty search term")
    ),
    security(("bearer_auth" = [])),
    tag = "cities"
)]
pub async fn search_cities(
    State(service): State<Arc<CityService>>,
    Query(query): Query<SearchQuery>,
) -> Result<Json<ApiResponse<Vec<CityResponseDto>>>> {
    let cities = service
        .search_by_name(query.name.as_deref().unwrap_or(""))
        .await?;
    Ok(Json(ApiResponse::success(Some(cities), None, None)))
}

/// Get one city by id
#[utoipa::path(
    get,
    path = "/cities/{id}",
    params(("id" = i64, Path, description = "City id")),
    responses(
        (status = 200, description = "City found", body = ApiResponse<CityResponseDto>),
        (status = 404, description = "City not found")
    ),
    security(("bearer_auth" = [])),
    tag = "cities"
)]
pub async fn get_city(
    State(service): State<Arc<CityService>>,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<CityResponseDto>>> {
    let city = service.find_one(id).await?;
    Ok(Json(ApiResponse::success(Some(city), None, None)))
}

/// Replace a city (full update, ADMIN only)
#[utoipa::path(
    put,
    path = "/cities/{id}",
    params(("id" = i64, Path, description = "City id")),
    request_body = UpdatePutCityDto,
    responses(
        (status = 200, description = "City replaced", body = ApiResponse<CityResponseDto>),
        (status = 404, description = "City or province not found"),
        (status = 409, description = "Location or name already taken")
    ),
    security(("bearer_auth" = [])),
    tag = "cities"
)]
pub async fn update_put_city(
    RequireAdmin(_user): RequireAdmin,
    State(service): State<Arc<CityService>>,
    Path(id): Path<i64>,
    AppJson(dto): AppJson<UpdatePutCityDto>,
) -> Result<Json<ApiResponse<CityResponseDto>>> {
    dto.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let city = service.update_put(id, dto).await?;
    Ok(Json(ApiResponse::success(Some(city), None, None)))
}

/// Partially update a city (ADMIN only)
#[utoipa::path(
    patch,
    path = "/cities/{id}",
    params(("id" = i64, Path, description = "City id")),
    request_body = UpdatePatchCityDto,
    responses(
        (status = 200, description = "City updated", body = ApiResponse<CityResponseDto>),
        (status = 404, description = "City or province not found"),
        (status = 409, description = "Location or name already taken")
    ),
    security(("bearer_auth" = [])),
    tag = "cities"
)]
pub async fn update_patch_city(
    RequireAdmin(_user): RequireAdmin,
    State(service): State<Arc<CityService>>,
    Path(id): Path<i64>,
    AppJson(dto): AppJson<UpdatePatchCityDto>,
) -> Result<Json<ApiResponse<CityResponseDto>>> {
    dto.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let city = service.update_patch(id, dto).await?;
    Ok(Json(ApiResponse::success(Some(city), None, None)))
}

/// Delete a city (ADMIN only; fails while persons reference it)
#[utoipa::path(
    delete,
    path = "/cities/{id}",
    params(("id" = i64, Path, description = "City id")),
    responses(
        (status = 200, description = "City deleted"),
        (status = 404, description = "City not found"),
        (status = 409, description = "City still has persons")
    ),
    security(("bearer_auth" = [])),
    tag = "cities"
)]
pub async fn delete_city(
    RequireAdmin(_user): RequireAdmin,
    State(service): State<Arc<CityService>>,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<()>>> {
    let message = service.remove(id).await?;
    Ok(Json(ApiResponse::success(None, Some(message), None)))
}
