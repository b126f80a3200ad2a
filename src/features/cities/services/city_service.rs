use sqlx::PgPool;

use crate::core::error::{is_unique_violation, AppError, Result};
use crate::features::cities::dtos::{
    CityResponseDto, CreateCityDto, UpdatePatchCityDto, UpdatePutCityDto,
};
use crate::features::cities::models::{City, CityChanges, CityWithRelationsRow};
use crate::shared::types::PaginationQuery;
use crate::shared::validation::normalize_search_term;

const CITY_COLUMNS: &str = "id, name, latitude, longitude, province_id, created_at, updated_at";

const CITY_WITH_RELATIONS: &str = "c.id, c.name, c.latitude, c.longitude, c.province_id, \
     c.created_at, c.updated_at, p.name AS province_name, p.latitude AS province_latitude, \
     p.longitude AS province_longitude, p.country_id, co.name AS country_name, \
     co.code AS country_code";

const CITY_JOIN: &str = "FROM cities c \
     JOIN provinces p ON p.id = c.province_id \
     JOIN countries co ON co.id = p.country_id";

/// Service for city CRUD.
///
/// Mirrors the province rules one level down: coordinates are the natural
/// key, nominal duplicates under a province only warn on create.
pub struct CityService {
    pool: PgPool,
}

impl CityService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, dto: CreateCityDto) -> Result<CityResponseDto> {
        tracing::debug!("Creating city: {}", dto.name);
        self.ensure_province_exists(dto.province_id).await?;

        if let Some(existing) = self
            .find_by_coordinates(dto.latitude, dto.longitude, None)
            .await?
        {
            tracing::warn!(
                "City at ({}, {}) already exists (ID {}). Returning the existing row.",
                dto.latitude,
                dto.longitude,
                existing.id
            );
            return self.find_one(existing.id).await;
        }

        if self
            .name_in_province_exists(&dto.name, dto.province_id, None)
            .await?
        {
            tracing::warn!(
                "City '{}' already exists in province ID {}. Creating a second row anyway.",
                dto.name,
                dto.province_id
            );
        }

        let inserted = sqlx::query_as::<_, City>(&format!(
            "INSERT INTO cities (name, latitude, longitude, province_id)
             VALUES ($1, $2, $3, $4) RETURNING {CITY_COLUMNS}"
        ))
        .bind(&dto.name)
        .bind(dto.latitude)
        .bind(dto.longitude)
        .bind(dto.province_id)
        .fetch_one(&self.pool)
        .await;

        match inserted {
            Ok(city) => {
                tracing::info!("City created ID: {}", city.id);
                self.find_one(city.id).await
            }
            Err(e) if is_unique_violation(&e) => {
                match self
                    .find_by_coordinates(dto.latitude, dto.longitude, None)
                    .await?
                {
                    Some(winner) => {
                        tracing::warn!(
                            "Concurrent insert at ({}, {}); returning city ID {}.",
                            dto.latitude,
                            dto.longitude,
                            winner.id
                        );
                        self.find_one(winner.id).await
                    }
                    None => Err(AppError::Conflict(
                        "The location (latitude/longitude) for this city already exists."
                            .to_string(),
                    )),
                }
            }
            Err(e) => {
                tracing::error!("Failed to create city: {:?}", e);
                Err(AppError::Database(e))
            }
        }
    }

    pub async fn find_all(
        &self,
        pagination: &PaginationQuery,
    ) -> Result<(Vec<CityResponseDto>, i64)> {
        tracing::debug!("Fetching all cities");

        let total = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM cities")
            .fetch_one(&self.pool)
            .await
            .map_err(AppError::Database)?;

        let rows = sqlx::query_as::<_, CityWithRelationsRow>(&format!(
            "SELECT {CITY_WITH_RELATIONS} {CITY_JOIN} ORDER BY c.name LIMIT $1 OFFSET $2"
        ))
        .bind(pagination.limit())
        .bind(pagination.offset())
        .fetch_all(&self.pool)
        .await
        .map_err(AppError::Database)?;

        Ok((rows.into_iter().map(Into::into).collect(), total))
    }

    pub async fn find_one(&self, id: i64) -> Result<CityResponseDto> {
        let row = sqlx::query_as::<_, CityWithRelationsRow>(&format!(
            "SELECT {CITY_WITH_RELATIONS} {CITY_JOIN} WHERE c.id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(AppError::Database)?
        .ok_or_else(|| {
            tracing::warn!("City ID {} not found.", id);
            AppError::NotFound(format!("City with ID {} not found.", id))
        })?;

        Ok(row.into())
    }

    /// Case-insensitive substring search by name.
    pub async fn search_by_name(&self, term: &str) -> Result<Vec<CityResponseDto>> {
        let term = normalize_search_term(term)
            .ok_or_else(|| AppError::BadRequest("Search term must not be empty.".to_string()))?;

        let pattern = format!("%{}%", term);
        let rows = sqlx::query_as::<_, CityWithRelationsRow>(&format!(
            "SELECT {CITY_WITH_RELATIONS} {CITY_JOIN} WHERE c.name ILIKE $1 ORDER BY c.name"
        ))
        .bind(&pattern)
        .fetch_all(&self.pool)
        .await
        .map_err(AppError::Database)?;

        tracing::info!("Found {} cities for term '{}'", rows.len(), term);
        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// Exact-name lookup used by registration. A province name narrows the
    /// match; without one an ambiguous name resolves to the first row and is
    /// logged.
    pub async fn find_by_name_and_province_name(
        &self,
        city_name: &str,
        province_name: Option<&str>,
    ) -> Result<Option<CityResponseDto>> {
        let rows = sqlx::query_as::<_, CityWithRelationsRow>(&format!(
            "SELECT {CITY_WITH_RELATIONS} {CITY_JOIN}
             WHERE LOWER(c.name) = LOWER($1)
               AND ($2::TEXT IS NULL OR LOWER(p.name) = LOWER($2))
             ORDER BY c.id"
        ))
        .bind(city_name)
        .bind(province_name)
        .fetch_all(&self.pool)
        .await
        .map_err(AppError::Database)?;

        if rows.len() > 1 {
            tracing::warn!(
                "City name '{}' is ambiguous ({} matches); using the first.",
                city_name,
                rows.len()
            );
        }

        Ok(rows.into_iter().next().map(Into::into))
    }

    pub async fn update_put(&self, id: i64, dto: UpdatePutCityDto) -> Result<CityResponseDto> {
        tracing::debug!("Updating (PUT) city ID: {}", id);
        let current = self.get_row(id).await?;

        let changes = CityChanges {
            name: dto.name != current.name,
            province: dto.province_id != current.province_id,
            coordinates: dto.latitude != current.latitude || dto.longitude != current.longitude,
        };
        if changes.province {
            self.ensure_province_exists(dto.province_id).await?;
        }
        // A full replace re-checks the nominal identity even when the
        // coordinates moved too.
        self.check_conflicts(
            id,
            &dto.name,
            dto.latitude,
            dto.longitude,
            dto.province_id,
            changes.coordinates,
            changes.nominal_identity_changed(),
        )
        .await?;

        let city = self
            .persist(id, &dto.name, dto.latitude, dto.longitude, dto.province_id)
            .await?;
        tracing::info!("City ID {} updated (PUT).", city.id);
        self.find_one(city.id).await
    }

    pub async fn update_patch(
        &self,
        id: i64,
        dto: UpdatePatchCityDto,
    ) -> Result<CityResponseDto> {
        tracing::debug!("Updating (PATCH) city ID: {}", id);
        let mut current = self.get_row(id).await?;

        let changes = current.apply_patch(&dto);
        if changes.province {
            self.ensure_province_exists(current.province_id).await?;
        }
        self.check_conflicts(
            id,
            &current.name,
            current.latitude,
            current.longitude,
            current.province_id,
            changes.needs_coordinate_check(),
            changes.needs_nominal_check(),
        )
        .await?;

        let city = self
            .persist(
                id,
                &current.name,
                current.latitude,
                current.longitude,
                current.province_id,
            )
            .await?;
        tracing::info!("City ID {} updated (PATCH).", city.id);
        self.find_one(city.id).await
    }

    pub async fn remove(&self, id: i64) -> Result<String> {
        tracing::debug!("Deleting city ID: {}", id);
        let city = self.get_row(id).await?;

        let person_count =
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM persons WHERE city_id = $1")
                .bind(id)
                .fetch_one(&self.pool)
                .await
                .map_err(AppError::Database)?;

        if person_count > 0 {
            tracing::warn!(
                "Cannot delete city ID {}: it has {} associated persons.",
                id,
                person_count
            );
            return Err(AppError::Conflict(format!(
                "Cannot delete city '{}' because it has associated persons.",
                city.name
            )));
        }

        sqlx::query("DELETE FROM cities WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(AppError::Database)?;

        tracing::info!("City ID {} deleted.", id);
        Ok(format!("City with ID {} deleted successfully.", id))
    }

    #[allow(clippy::too_many_arguments)]
    async fn check_conflicts(
        &self,
        id: i64,
        name: &str,
        latitude: f64,
        longitude: f64,
        province_id: i64,
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
                "The location (latitude/longitude) for this city already exists.".to_string(),
            ));
        }
        if check_nominal
            && self
                .name_in_province_exists(name, province_id, Some(id))
                .await?
        {
            return Err(AppError::Conflict(format!(
                "City with name '{}' already exists in province ID {}.",
                name, province_id
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
        province_id: i64,
    ) -> Result<City> {
        sqlx::query_as::<_, City>(&format!(
            "UPDATE cities
             SET name = $1, latitude = $2, longitude = $3, province_id = $4, updated_at = NOW()
             WHERE id = $5 RETURNING {CITY_COLUMNS}"
        ))
        .bind(name)
        .bind(latitude)
        .bind(longitude)
        .bind(province_id)
        .bind(id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                return AppError::Conflict(
                    "The location (latitude/longitude) for this city already exists.".to_string(),
                );
            }
            AppError::Database(e)
        })
    }

    async fn get_row(&self, id: i64) -> Result<City> {
        sqlx::query_as::<_, City>(&format!("SELECT {CITY_COLUMNS} FROM cities WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::Database)?
            .ok_or_else(|| {
                tracing::warn!("City ID {} not found.", id);
                AppError::NotFound(format!("City with ID {} not found.", id))
            })
    }

    async fn find_by_coordinates(
        &self,
        latitude: f64,
        longitude: f64,
        exclude_id: Option<i64>,
    ) -> Result<Option<City>> {
        sqlx::query_as::<_, City>(&format!(
            "SELECT {CITY_COLUMNS} FROM cities
             WHERE latitude = $1 AND longitude = $2 AND ($3::BIGINT IS NULL OR id <> $3)"
        ))
        .bind(latitude)
        .bind(longitude)
        .bind(exclude_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(AppError::Database)
    }

    async fn name_in_province_exists(
        &self,
        name: &str,
        province_id: i64,
        exclude_id: Option<i64>,
    ) -> Result<bool> {
        let found = sqlx::query_scalar::<_, i64>(
            "SELECT id FROM cities
             WHERE name = $1 AND province_id = $2
               AND ($3::BIGINT IS NULL OR id <> $3)",
        )
        .bind(name)
        .bind(province_id)
        .bind(exclude_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(AppError::Database)?;

        Ok(found.is_some())
    }

    async fn ensure_province_exists(&self, province_id: i64) -> Result<()> {
        let found = sqlx::query_scalar::<_, i64>("SELECT id FROM provinces WHERE id = $1")
            .bind(province_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::Database)?;

        if found.is_none() {
            tracing::warn!("Province ID {} not found.", province_id);
            return Err(AppError::NotFound(format!(
                "Province with ID {} not found.",
                province_id
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn seed_province(pool: &PgPool, name: &str, latitude: f64, longitude: f64) -> i64 {
        let country_id: i64 = sqlx::query_scalar(
            "INSERT INTO countries (name) VALUES ('Argentina')
             ON CONFLICT (name) DO UPDATE SET updated_at = NOW() RETURNING id",
        )
        .fetch_one(pool)
        .await
        .unwrap();

        sqlx::query_scalar(
            "INSERT INTO provinces (name, latitude, longitude, country_id)
             VALUES ($1, $2, $3, $4) RETURNING id",
        )
        .bind(name)
        .bind(latitude)
        .bind(longitude)
        .bind(country_id)
        .fetch_one(pool)
        .await
        .unwrap()
    }

    fn create_dto(name: &str, latitude: f64, longitude: f64, province_id: i64) -> CreateCityDto {
        CreateCityDto {
            name: name.to_string(),
            latitude,
            longitude,
            province_id,
        }
    }

    #[sqlx::test]
    async fn registration_resolver_narrows_by_province_name(pool: PgPool) {
        let buenos_aires = seed_province(&pool, "Buenos Aires", -36.6, -60.0).await;
        let mendoza = seed_province(&pool, "Mendoza", -34.6, -68.3).await;
        let service = CityService::new(pool);

        service
            .create(create_dto("San Martín", -33.1, -68.5, mendoza))
            .await
            .unwrap();
        let in_buenos_aires = service
            .create(create_dto("San Martín", -34.6, -58.5, buenos_aires))
            .await
            .unwrap();

        let resolved = service
            .find_by_name_and_province_name("san martín", Some("buenos aires"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(resolved.id, in_buenos_aires.id);

        let unknown = service
            .find_by_name_and_province_name("San Martín", Some("Córdoba"))
            .await
            .unwrap();
        assert!(unknown.is_none());
    }

    #[sqlx::test]
    async fn remove_rejects_a_city_with_persons(pool: PgPool) {
        let province_id = seed_province(&pool, "Buenos Aires", -36.6, -60.0).await;
        let service = CityService::new(pool.clone());

        let city = service
            .create(create_dto("La Plata", -34.9, -57.9, province_id))
            .await
            .unwrap();
        sqlx::query(
            "INSERT INTO persons (first_name, last_name, email, password_hash, birth_date, city_id)
             VALUES ('Eva', 'Perón', 'eva@example.com', 'x', '1919-05-07', $1)",
        )
        .bind(city.id)
        .execute(&pool)
        .await
        .unwrap();

        assert!(matches!(
            service.remove(city.id).await,
            Err(AppError::Conflict(_))
        ));

        sqlx::query("DELETE FROM persons").execute(&pool).await.unwrap();
        let message = service.remove(city.id).await.unwrap();
        assert!(message.contains("deleted successfully"));
    }
}
