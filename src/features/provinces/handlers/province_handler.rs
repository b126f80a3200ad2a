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
use crate::features::provinces::dtos::{
    CreateProvinceDto, ProvinceResponseDto, UpdatePatchProvinceDto, UpdatePutProvinceDto,
};
use crate::features::provinces::services::ProvinceService;
use crate::shared::types::{ApiResponse, Meta, PaginationQuery, SearchQuery};

/// Create a province (ADMIN only)
///
/// Creating at already-taken coordinates returns the existing province
/// instead of failing.
#[utoipa::path(
    post,
    path = "/provinces",
    request_body = CreateProvinceDto,
    responses(
        (status = 201, description = "Province created (or existing row at the same coordinates)", body = ApiResponse<ProvinceResponseDto>),
        (status = 404, description = "Referenced country not found")
    ),
    security(("bearer_auth" = [])),
    tag = "provinces"
)]
pub async fn create_province(
    RequireAdmin(_user): RequireAdmin,
    State(service): State<Arc<ProvinceService>>,
    AppJson(dto): AppJson<CreateProvinceDto>,
) -> Result<(StatusCode, Json<ApiResponse<ProvinceResponseDto>>)> {
    dto.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let province = service.create(dto).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(Some(province), None, None)),
    ))
}

/// List provinces with their country embedded
#[utoipa::path(
    get,
    path = "/provinces",
    params(PaginationQuery),
    responses(
        (status = 200, description = "Paginated list of provinces", body = ApiResponse<Vec<ProvinceResponseDto>>),
    ),
    security(("bearer_auth" = [])),
    tag = "provinces"
)]
pub async fn list_provinces(
    State(service): State<Arc<ProvinceService>>,
    Query(pagination): Query<PaginationQuery>,
) -> Result<Json<ApiResponse<Vec<ProvinceResponseDto>>>> {
    let (provinces, total) = service.find_all(&pagination).await?;
    Ok(Json(ApiResponse::success(
        Some(provinces),
        None,
        Some(Meta { total }),
    )))
}

/// Search provinces by name
#[utoipa::path(
    get,
    path = "/provinces/search",
    params(SearchQuery),
    responses(
        (status = 200, description = "Matching provinces", body = ApiResponse<Vec<ProvinceResponseDto>>),
        (status = 400, description = "Empty search term")
    ),
    security(("bearer_auth" = [])),
    tag = "provinces"
)]
pub async fn search_provinces(
    State(service): State<Arc<ProvinceService>>,
    Query(query): Query<SearchQuery>,
) -> Result<Json<ApiResponse<Vec<ProvinceResponseDto>>>> {
    let provinces = service
        .search_by_name(query.name.as_deref().unwrap_or(""))
        .await?;
    Ok(Json(ApiResponse::success(Some(provinces), None, None)))
}

/// Get one province by id
#[utoipa::path(
    get,
    path = "/provinces/{id}",
    params(("id" = i64, Path, description = "Province id")),
    responses(
        (status = 200, description = "Province found", body = ApiResponse<ProvinceResponseDto>),
        (status = 404, description = "Province not found")
    ),
    security(("bearer_auth" = [])),
    tag = "provinces"
)]
pub async fn get_province(
    State(service): State<Arc<ProvinceService>>,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<ProvinceResponseDto>>> {
    let province = service.find_one(id).await?;
    Ok(Json(ApiResponse::success(Some(province), None, None)))
}

/// Replace a province (full update, ADMIN only)
#[utoipa::path(
    put,
    path = "/provinces/{id}",
    params(("id" = i64, Path, description = "Province id")),
    request_body = UpdatePutProvinceDto,
    responses(
        (status = 200, description = "Province replaced", body = ApiResponse<ProvinceResponseDto>),
        (status = 404, description = "Province or country not found"),
        (status = 409, description = "Location or name already taken")
    ),
    security(("bearer_auth" = [])),
    tag = "provinces"
)]
pub async fn update_put_province(
    RequireAdmin(_user): RequireAdmin,
    State(service): State<Arc<ProvinceService>>,
    Path(id): Path<i64>,
    AppJson(dto): AppJson<UpdatePutProvinceDto>,
) -> Result<Json<ApiResponse<ProvinceResponseDto>>> {
    dto.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let province = service.update_put(id, dto).await?;
    Ok(Json(ApiResponse::success(Some(province), None, None)))
}

/// Partially update a province (ADMIN only)
#[utoipa::path(
    patch,
    path = "/provinces/{id}",
    params(("id" = i64, Path, description = "Province id")),
    request_body = UpdatePatchProvinceDto,
    responses(
        (status = 200, description = "Province updated", body = ApiResponse<ProvinceResponseDto>),
        (status = 404, description = "Province or country not found"),
        (status = 409, description = "Location or name already taken")
    ),
    security(("bearer_auth" = [])),
    tag = "provinces"
)]
pub async fn update_patch_province(
    RequireAdmin(_user): RequireAdmin,
    State(service): State<Arc<ProvinceService>>,
    Path(id): Path<i64>,
    AppJson(dto): AppJson<UpdatePatchProvinceDto>,
) -> Result<Json<ApiResponse<ProvinceResponseDto>>> {
    dto.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let province = service.update_patch(id, dto).await?;
    Ok(Json(ApiResponse::success(Some(province), None, None)))
}

/// Delete a province (ADMIN only; fails while cities reference it)
#[utoipa::path(
    delete,
    path = "/provinces/{id}",
    params(("id" = i64, Path, description = "Province id")),
    responses(
        (status = 200, description = "Province deleted"),
        (status = 404, description = "Province not found"),
        (status = 409, description = "Province still has cities")
    ),
    security(("bearer_auth" = [])),
    tag = "provinces"
)]
pub async fn delete_province(
    RequireAdmin(_user): RequireAdmin,
    State(service): State<Arc<ProvinceService>>,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<()>>> {
    let message = service.remove(id).await?;
    Ok(Json(ApiResponse::success(None, Some(message), None)))
}
