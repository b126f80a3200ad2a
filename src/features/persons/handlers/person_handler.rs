use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use validator::Validate;

use crate::core::error::{AppError, Result};
use crate::core::extractor::AppJson;
use crate::features::auth::guards::{RequireAdmin, RequireStaff};
use crate::features::persons::dtos::{
    CreatePersonDto, PersonResponseDto, UpdatePatchPersonDto, UpdatePutPersonDto,
};
use crate::features::persons::services::PersonService;
use crate::shared::types::{ApiResponse, Meta, PaginationQuery, SearchQuery};

/// Create a person (ADMIN only; this endpoint may assign elevated roles)
#[utoipa::path(
    post,
    path = "/persons",
    request_body = CreatePersonDto,
    responses(
        (status = 201, description = "Person created", body = ApiResponse<PersonResponseDto>),
        (status = 404, description = "Referenced city not found"),
        (status = 409, description = "Email already registered")
    ),
    security(("bearer_auth" = [])),
    tag = "persons"
)]
pub async fn create_person(
    RequireAdmin(_user): RequireAdmin,
    State(service): State<Arc<PersonService>>,
    AppJson(dto): AppJson<CreatePersonDto>,
) -> Result<(StatusCode, Json<ApiResponse<PersonResponseDto>>)> {
    dto.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let person = service.create(dto).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(Some(person), None, None)),
    ))
}

/// List persons (ADMIN or MODERATOR)
#[utoipa::path(
    get,
    path = "/persons",
    params(PaginationQuery),
    responses(
        (status = 200, description = "Paginated list of persons", body = ApiResponse<Vec<PersonResponseDto>>),
    ),
    security(("bearer_auth" = [])),
    tag = "persons"
)]
pub async fn list_persons(
    RequireStaff(_user): RequireStaff,
    State(service): State<Arc<PersonService>>,
    Query(pagination): Query<PaginationQuery>,
) -> Result<Json<ApiResponse<Vec<PersonResponseDto>>>> {
    let (persons, total) = service.find_all(&pagination).await?;
    Ok(Json(ApiResponse::success(
        Some(persons),
        None,
        Some(Meta { total }),
    )))
}

/// Search persons by first or last name (ADMIN or MODERATOR)
#[utoipa::path(
    get,
    path = "/persons/search",
    params(SearchQuery),
    responses(
        (status = 200, description = "Matching persons", body = ApiResponse<Vec<PersonResponseDto>>),
        (status = 400, description = "Empty search term")
    ),
    security(("bearer_auth" = [])),
    tag = "persons"
)]
pub async fn search_persons(
    RequireStaff(_user): RequireStaff,
    State(service): State<Arc<PersonService>>,
    Query(query): Query<SearchQuery>,
) -> Result<Json<ApiResponse<Vec<PersonResponseDto>>>> {
    let persons = service.find_by_name(query.name.as_deref().unwrap_or("")).await?;
    Ok(Json(ApiResponse::success(Some(persons), None, None)))
}

/// Get one person by id (ADMIN or MODERATOR)
#[utoipa::path(
    get,
    path = "/persons/{id}",
    params(("id" = i64, Path, description = "Person id")),
    responses(
        (status = 200, description = "Person found", body = ApiResponse<PersonResponseDto>),
        (status = 404, description = "Person not found")
    ),
    security(("bearer_auth" = [])),
    tag = "persons"
)]
pub async fn get_person(
    RequireStaff(_user): RequireStaff,
    State(service): State<Arc<PersonService>>,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<PersonResponseDto>>> {
    let person = service.find_one(id).await?;
    Ok(Json(ApiResponse::success(Some(person), None, None)))
}

/// Replace a person (full update, ADMIN only)
#[utoipa::path(
    put,
    path = "/persons/{id}",
    params(("id" = i64, Path, description = "Person id")),
    request_body = UpdatePutPersonDto,
    responses(
        (status = 200, description = "Person replaced", body = ApiResponse<PersonResponseDto>),
        (status = 404, description = "Person not found"),
        (status = 409, description = "Email already registered")
    ),
    security(("bearer_auth" = [])),
    tag = "persons"
)]
pub async fn update_put_person(
    RequireAdmin(_user): RequireAdmin,
    State(service): State<Arc<PersonService>>,
    Path(id): Path<i64>,
    AppJson(dto): AppJson<UpdatePutPersonDto>,
) -> Result<Json<ApiResponse<PersonResponseDto>>> {
    dto.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let person = service.update_put(id, dto).await?;
    Ok(Json(ApiResponse::success(Some(person), None, None)))
}

/// Partially update a person (ADMIN only)
#[utoipa::path(
    patch,
    path = "/persons/{id}",
    params(("id" = i64, Path, description = "Person id")),
    request_body = UpdatePatchPersonDto,
    responses(
        (status = 200, description = "Person updated", body = ApiResponse<PersonResponseDto>),
        (status = 404, description = "Person not found"),
        (status = 409, description = "Email already registered")
    ),
    security(("bearer_auth" = [])),
    tag = "persons"
)]
pub async fn update_patch_person(
    RequireAdmin(_user): RequireAdmin,
    State(service): State<Arc<PersonService>>,
    Path(id): Path<i64>,
    AppJson(dto): AppJson<UpdatePatchPersonDto>,
) -> Result<Json<ApiResponse<PersonResponseDto>>> {
    dto.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let person = service.update_patch(id, dto).await?;
    Ok(Json(ApiResponse::success(Some(person), None, None)))
}

/// Delete a person (ADMIN only)
#[utoipa::path(
    delete,
    path = "/persons/{id}",
    params(("id" = i64, Path, description = "Person id")),
    responses(
        (status = 200, description = "Person deleted"),
        (status = 404, description = "Person not found")
    ),
    security(("bearer_auth" = [])),
    tag = "persons"
)]
pub async fn delete_person(
    RequireAdmin(_user): RequireAdmin,
    State(service): State<Arc<PersonService>>,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<()>>> {
    let message = service.remove(id).await?;
    Ok(Json(ApiResponse::success(None, Some(message), None)))
}
