use sqlx::PgPool;

use crate::core::error::{is_unique_violation, AppError, Result};
use crate::features::provinces::dtos::{
    CreateProvinceDto, ProvinceResponseDto, UpdatePatchProvinceDto, UpdatePutProvinceDto,
};
use crate::features::provinces::models::{Province, ProvinceChanges, ProvinceWithCountryRow};
use crate::shared::types::PaginationQuery;
use crate::shared::validation::normalize_search_term;

const PROVINCE_COLUMNS: &str =
    "id, name, latitude, longitude, country_id, created_at, updated_at";

const PROVINCE_WITH_COUNTRY: &str = "p.id, p.name, p.latitude, p.longitude, p.country_id, \
     p.created_at, p.updated_at, c.name AS country_name, c.code AS country_code";

/// Service for province CRUD.
///
/// Coordinates are the natural key: creating at an existing location returns
/// the existing row instead of failing, and a concurrent-insert loser at the
/// same location resolves to the winner.
pub struct ProvinceService {
    pool: PgPool,
}

impl ProvinceService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, dto: CreateProvinceDto) -> Result<ProvinceResponseDto> {
        tracing::debug!("Creating province: {}", dto.name);
        self.ensure_country_exists(dto.country_id).await?;

        if let Some(existing) = self
            .find_by_coordinates(dto.latitude, dto.longitude, None)
            .await?
        {
            tracing::warn!(
                "Province at ({}, {}) already exists (ID {}). Returning the existing row.",
                dto.latitude,
                dto.longitude,
                existing.id
            );
            return self.find_one(existing.id).await;
        }

        // Same name under the same country is allowed on create, only logged.
        if self
            .name_in_country_exists(&dto.name, dto.country_id, None)
            .await?
        {
            tracing::warn!(
                "Province '{}' already exists in country ID {}. Creating a second row anyway.",
                dto.name,
                dto.country_id
            );
        }

        let inserted = sqlx::query_as::<_, Province>(&format!(
            "INSERT INTO provinces (name, latitude, longitude, country_id)
             VALUES ($1, $2, $3, $4) RETURNING {PROVINCE_COLUMNS}"
        ))
        .bind(&dto.name)
        .bind(dto.latitude)
        .bind(dto.longitude)
        .bind(dto.country_id)
        .fetch_one(&self.pool)
        .await;

        match inserted {
            Ok(province) => {
                tracing::info!("Province created ID: {}", province.id);
                self.find_one(province.id).await
            }
            Err(e) if is_unique_violation(&e) => {
                // Lost the insert race; hand back whoever won the location.
                match self
                    .find_by_coordinates(dto.latitude, dto.longitude, None)
                    .await?
                {
                    Some(winner) => {
                        tracing::warn!(
                            "Concurrent insert at ({}, {}); returning province ID {}.",
                            dto.latitude,
                            dto.longitude,
                            winner.id
                        );
                        self.find_one(winner.id).await
                    }
                    None => Err(AppError::Conflict(
                        "The location (latitude/longitude) for this province already exists."
                            .to_string(),
                    )),
                }
            }
            Err(e) => {
                tracing::error!("Failed to create province: {:?}", e);
                Err(AppError::Database(e))
            }
        }
    }

    pub async fn find_all(
        &self,
        pagination: &PaginationQuery,
    ) -> Result<(Vec<ProvinceResponseDto>, i64)> {
        tracing::debug!("Fetching all provinces");

        let total = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM provinces")
            .fetch_one(&self.pool)
            .await
            .map_err(AppError::Database)?;

        let rows = sqlx::query_as::<_, ProvinceWithCountryRow>(&format!(
            "SELECT {PROVINCE_WITH_COUNTRY}
             FROM provinces p JOIN countries c ON c.id = p.country_id
             ORDER BY p.name LIMIT $1 OFFSET $2"
        ))
        .bind(pagination.limit())
        .bind(pagination.offset())
        .fetch_all(&self.pool)
        .await
        .map_err(AppError::Database)?;

        Ok((rows.into_iter().map(Into::into).collect(), total))
    }

    pub async fn find_one(&self, id: i64) -> Result<ProvinceResponseDto> {
        let row = sqlx::query_as::<_, ProvinceWithCountryRow>(&format!(
            "SELECT {PROVINCE_WITH_COUNTRY}
             FROM provinces p JOIN countries c ON c.id = p.country_id
             WHERE p.id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(AppError::Database)?
        .ok_or_else(|| {
            tracing::warn!("Province ID {} not found.", id);
            AppError::NotFound(format!("Province with ID {} not found.", id))
        })?;

        Ok(row.into())
    }

    /// Case-insensitive substring search by name.
    pub async fn search_by_name(&self, term: &str) -> Result<Vec<ProvinceResponseDto>> {
        let term = normalize_search_term(term)
            .ok_or_else(|| AppError::BadRequest("Search term must not be empty.".to_string()))?;

        let pattern = format!("%{}%", term);
        let rows = sqlx::query_as::<_, ProvinceWithCountryRow>(&format!(
            "SELECT {PROVINCE_WITH_COUNTRY}
             FROM provinces p JOIN countries c ON c.id = p.country_id
             WHERE p.name ILIKE $1 ORDER BY p.name"
        ))
        .bind(&pattern)
        .fetch_all(&self.pool)
        .await
        .map_err(AppError::Database)?;

        tracing::info!("Found {} provinces for term '{}'", rows.len(), term);
        Ok(rows.into_iter().map(Into::into).collect())
    }

    pub async fn update_put(
        &self,
        id: i64,
        dto: UpdatePutProvinceDto,
    ) -> Result<ProvinceResponseDto> {
        tracing::debug!("Updating (PUT) province ID: {}", id);
        let current = self.get_row(id).await?;

        let changes = ProvinceChanges {
            name: dto.name != current.name,
            country: dto.country_id != current.country_id,
            coordinates: dto.latitude != current.latitude || dto.longitude != current.longitude,
        };
        if changes.country {
            self.ensure_country_exists(dto.country_id).await?;
        }
        // A full replace re-checks the nominal identity even when the
        // coordinates moved too.
        self.check_conflicts(
            id,
            &dto.name,
            dto.latitude,
            dto.longitude,
            dto.country_id,
            changes.coordinates,
            changes.nominal_identity_changed(),
        )
        .await?;

        let province = self
            .persist(id, &dto.name, dto.latitude, dto.longitude, dto.country_id)
            .await?;
        tracing::info!("Province ID {} updated (PUT).", province.id);
        self.find_one(province.id).await
    }

    pub async fn update_patch(
        &self,
        id: i64,
        dto: UpdatePatchProvinceDto,
    ) -> Result<ProvinceResponseDto> {
        tracing::debug!("Updating (PATCH) province ID: {}", id);
        let mut current = self.get_row(id).await?;

        let changes = current.apply_patch(&dto);
        if changes.country {
            self.ensure_country_exists(current.country_id).await?;
        }
        self.check_conflicts(
            id,
            &current.name,
            current.latitude,
            current.longitude,
            current.country_id,
            changes.needs_coordinate_check(),
            changes.needs_nominal_check(),
        )
        .await?;

        let province = self
            .persist(
                id,
                &current.name,
                current.latitude,
                current.longitude,
                current.country_id,
            )
            .await?;
        tracing::info!("Province ID {} updated (PATCH).", province.id);
        self.find_one(province.id).await
    }

    pub async fn remove(&self, id: i64) -> Result<String> {
        tracing::debug!("Deleting province ID: {}", id);
        let province = self.get_row(id).await?;

        let city_count =
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM cities WHERE province_id = $1")
                .bind(id)
                .fetch_one(&self.pool)
                .await
                .map_err(AppError::Database)?;

        if city_count > 0 {
            tracing::warn!(
                "Cannot delete province ID {}: it has {} associated cities.",
                id,
                city_count
            );
            return Err(AppError::Conflict(format!(
                "Cannot delete province '{}' because it has associated cities.",
                province.name
            )));
        }

        sqlx::query("DELETE FROM provinces WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(AppError::Database)?;

        tracing::info!("Province ID {} deleted.", id);
        Ok(format!("Province with ID {} deleted successfully.", id))
    }

    /// Conflict rules shared by PUT and PATCH; the caller decides which
    /// checks apply. Coordinate moves must land on a free location; nominal
    /// moves must not collide with another province of the same name under
    /// the same country.
    #[allow(clippy::too_many_arguments)]
    async fn check_conflicts(
        &self,
        id: i64,
        name: &str,
        latitude: f64,
        longitude: f64,
        country_id: i64,
        check_coordinates: bool,
        check_nominal: bool,
    ) -> Result<()> {
        if check_coordinates
            && self
                .find_by_coordinates(latitude, longitude, Some(id))
                .await?
                .is_some()
        {
            return Err(AppError::Conflict(
                "The location (latitude/longitude) for this province already exists.".to_string(),
            ));
        }
        if check_nominal
            && self
                .name_in_country_exists(name, country_id, Some(id))
                .await?
        {
            return Err(AppError::Conflict(format!(
                "Province with name '{}' already exists in country ID {}.",
                name, country_id
            )));
        }
        Ok(())
    }

    async fn persist(
        &self,
        id: i64,
        name: &str,
        latitude: f64,
        longitude: f64,
        country_id: i64,
    ) -> Result<Province> {
        sqlx::query_as::<_, Province>(&format!(
            "UPDATE provinces
             SET name = $1, latitude = $2, longitude = $3, country_id = $4, updated_at = NOW()
             WHERE id = $5 RETURNING {PROVINCE_COLUMNS}"
        ))
        .bind(name)
        .bind(latitude)
        .bind(longitude)
        .bind(country_id)
        .bind(id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                return AppError::Conflict(
                    "The location (latitude/longitude) for this province already exists."
                        .to_string(),
                );
            }
            AppError::Database(e)
        })
    }

    async fn get_row(&self, id: i64) -> Result<Province> {
        sqlx::query_as::<_, Province>(&format!(
            "SELECT {PROVINCE_COLUMNS} FROM provinces WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(AppError::Database)?
        .ok_or_else(|| {
            tracing::warn!("Province ID {} not found.", id);
            AppError::NotFound(format!("Province with ID {} not found.", id))
        })
    }

    async fn find_by_coordinates(
        &self,
        latitude: f64,
        longitude: f64,
        exclude_id: Option<i64>,
    ) -> Result<Option<Province>> {
        sqlx::query_as::<_, Province>(&format!(
            "SELECT {PROVINCE_COLUMNS} FROM provinces
             WHERE latitude = $1 AND longitude = $2 AND ($3::BIGINT IS NULL OR id <> $3)"
        ))
        .bind(latitude)
        .bind(longitude)
        .bind(exclude_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(AppError::Database)
    }

    async fn name_in_country_exists(
        &self,
        name: &str,
        country_id: i64,
        exclude_id: Option<i64>,
    ) -> Result<bool> {
        let found = sqlx::query_scalar::<_, i64>(
            "SELECT id FROM provinces
             WHERE name = $1 AND country_id = $2
               AND ($3::BIGINT IS NULL OR id <> $3)",
        )
        .bind(name)
        .bind(country_id)
        .bind(exclude_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(AppError::Database)?;

        Ok(found.is_some())
    }

    async fn ensure_country_exists(&self, country_id: i64) -> Result<()> {
        let found = sqlx::query_scalar::<_, i64>("SELECT id FROM countries WHERE id = $1")
            .bind(country_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::Database)?;

        if found.is_none() {
            tracing::warn!("Country ID {} not found.", country_id);
            return Err(AppError::NotFound(format!(
                "Country with ID {} not found.",
                country_id
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn seed_country(pool: &PgPool, name: &str) -> i64 {
        sqlx::query_scalar("INSERT INTO countries (name) VALUES ($1) RETURNING id")
            .bind(name)
            .fetch_one(pool)
            .await
            .unwrap()
    }

    fn create_dto(name: &str, latitude: f64, longitude: f64, country_id: i64) -> CreateProvinceDto {
        CreateProvinceDto {
            name: name.to_string(),
            latitude,
            longitude,
            country_id,
        }
    }

    #[sqlx::test]
    async fn create_at_taken_coordinates_returns_the_existing_row(pool: PgPool) {
        let country_id = seed_country(&pool, "Argentina").await;
        let service = ProvinceService::new(pool);

        let first = service
            .create(create_dto("Mendoza", -32.9, -68.8, country_id))
            .await
            .unwrap();
        let second = service
            .create(create_dto("Somewhere Else", -32.9, -68.8, country_id))
            .await
            .unwrap();

        assert_eq!(second.id, first.id);
        assert_eq!(second.name, "Mendoza");
    }

    #[sqlx::test]
    async fn put_rechecks_nominal_identity_even_when_coordinates_move(pool: PgPool) {
        let country_id = seed_country(&pool, "Argentina").await;
        let service = ProvinceService::new(pool);

        service
            .create(create_dto("Mendoza", -32.9, -68.8, country_id))
            .await
            .unwrap();
        let other = service
            .create(create_dto("San Juan", -31.5, -68.5, country_id))
            .await
            .unwrap();

        let result = service
            .update_put(
                other.id,
                UpdatePutProvinceDto {
                    name: "Mendoza".to_string(),
                    latitude: -30.0,
                    longitude: -67.0,
                    country_id,
                },
            )
            .await;

        assert!(matches!(result, Err(AppError::Conflict(_))));
    }

    #[sqlx::test]
    async fn nominal_conflict_matches_names_exactly(pool: PgPool) {
        let country_id = seed_country(&pool, "Argentina").await;
        let service = ProvinceService::new(pool);

        service
            .create(create_dto("Mendoza", -32.9, -68.8, country_id))
            .await
            .unwrap();
        let other = service
            .create(create_dto("San Juan", -31.5, -68.5, country_id))
            .await
            .unwrap();

        let renamed = service
            .update_put(
                other.id,
                UpdatePutProvinceDto {
                    name: "mendoza".to_string(),
                    latitude: -30.0,
                    longitude: -67.0,
                    country_id,
                },
            )
            .await
            .unwrap();

        assert_eq!(renamed.name, "mendoza");
    }

    #[sqlx::test]
    async fn remove_rejects_a_province_with_cities(pool: PgPool) {
        let country_id = seed_country(&pool, "Argentina").await;
        let service = ProvinceService::new(pool.clone());

        let province = service
            .create(create_dto("Buenos Aires", -36.6, -60.0, country_id))
            .await
            .unwrap();
        sqlx::query(
            "INSERT INTO cities (name, latitude, longitude, province_id)
             VALUES ('La Plata', -34.9, -57.9, $1)",
        )
        .bind(province.id)
        .execute(&pool)
        .await
        .unwrap();

        assert!(matches!(
            service.remove(province.id).await,
            Err(AppError::Conflict(_))
        ));

        sqlx::query("DELETE FROM cities").execute(&pool).await.unwrap();
        let message = service.remove(province.id).await.unwrap();
        assert!(message.contains("deleted successfully"));
    }
}
