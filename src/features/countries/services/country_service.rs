use std::collections::HashMap;

use sqlx::PgPool;

use crate::core::error::{is_unique_violation, AppError, Result};
use crate::features::countries::dtos::{
    CountryResponseDto, CreateCountryDto, UpdatePatchCountryDto, UpdatePutCountryDto,
};
use crate::features::countries::models::Country;
use crate::features::provinces::models::Province;
use crate::shared::types::PaginationQuery;
use crate::shared::validation::normalize_search_term;

const COUNTRY_COLUMNS: &str = "id, name, code, created_at, updated_at";
const PROVINCE_COLUMNS: &str =
    "id, name, latitude, longitude, country_id, created_at, updated_at";

/// Service for country CRUD and name/code uniqueness.
pub struct CountryService {
    pool: PgPool,
}

impl CountryService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, dto: CreateCountryDto) -> Result<CountryResponseDto> {
        tracing::debug!("Creating country: {}", dto.name);

        if self.name_exists(&dto.name, None).await? {
            tracing::warn!("Country with name '{}' already exists.", dto.name);
            return Err(AppError::Conflict(format!(
                "Country with name '{}' already exists.",
                dto.name
            )));
        }
        if let Some(code) = dto.code.as_deref().filter(|c| !c.is_empty()) {
            if self.code_exists(code, None).await? {
                tracing::warn!("Country with code '{}' already exists.", code);
                return Err(AppError::Conflict(format!(
                    "Country with code '{}' already exists.",
                    code
                )));
            }
        }

        let country = sqlx::query_as::<_, Country>(&format!(
            "INSERT INTO countries (name, code) VALUES ($1, $2) RETURNING {COUNTRY_COLUMNS}"
        ))
        .bind(&dto.name)
        .bind(&dto.code)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            // A concurrent insert can still win the name/code race.
            if is_unique_violation(&e) {
                return AppError::Conflict(format!(
                    "Country with name '{}' or its code already exists.",
                    dto.name
                ));
            }
            tracing::error!("Failed to create country: {:?}", e);
            AppError::Database(e)
        })?;

        tracing::info!("Country created ID: {}", country.id);
        Ok(country.into())
    }

    pub async fn find_all(
        &self,
        pagination: &PaginationQuery,
        with_provinces: bool,
    ) -> Result<(Vec<CountryResponseDto>, i64)> {
        tracing::debug!("Fetching all countries (with_provinces={})", with_provinces);

        let total = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM countries")
            .fetch_one(&self.pool)
            .await
            .map_err(AppError::Database)?;

        let countries = sqlx::query_as::<_, Country>(&format!(
            "SELECT {COUNTRY_COLUMNS} FROM countries ORDER BY name LIMIT $1 OFFSET $2"
        ))
        .bind(pagination.limit())
        .bind(pagination.offset())
        .fetch_all(&self.pool)
        .await
        .map_err(AppError::Database)?;

        if !with_provinces {
            return Ok((countries.into_iter().map(Into::into).collect(), total));
        }

        let ids: Vec<i64> = countries.iter().map(|c| c.id).collect();
        let mut grouped = self.provinces_by_country(&ids).await?;

        let dtos = countries
            .into_iter()
            .map(|c| {
                let provinces = grouped.remove(&c.id).unwrap_or_default();
                CountryResponseDto::from(c).with_provinces(provinces)
            })
            .collect();

        Ok((dtos, total))
    }

    pub async fn find_one(&self, id: i64, with_provinces: bool) -> Result<CountryResponseDto> {
        let country = self.get_row(id).await?;
        if !with_provinces {
            return Ok(country.into());
        }

        let mut grouped = self.provinces_by_country(&[id]).await?;
        let provinces = grouped.remove(&id).unwrap_or_default();
        Ok(CountryResponseDto::from(country).with_provinces(provinces))
    }

    pub async fn find_by_name(&self, name: &str) -> Result<Option<CountryResponseDto>> {
        tracing::debug!("Fetching country by name: {}", name);
        let country = sqlx::query_as::<_, Country>(&format!(
            "SELECT {COUNTRY_COLUMNS} FROM countries WHERE name = $1"
        ))
        .bind(name)
        .fetch_optional(&self.pool)
        .await
        .map_err(AppError::Database)?;

        Ok(country.map(Into::into))
    }

    /// Case-insensitive substring search by name.
    pub async fn search_by_name(&self, term: &str) -> Result<Vec<CountryResponseDto>> {
        let term = normalize_search_term(term)
            .ok_or_else(|| AppError::BadRequest("Search term must not be empty.".to_string()))?;

        let pattern = format!("%{}%", term);
        let countries = sqlx::query_as::<_, Country>(&format!(
            "SELECT {COUNTRY_COLUMNS} FROM countries WHERE name ILIKE $1 ORDER BY name"
        ))
        .bind(&pattern)
        .fetch_all(&self.pool)
        .await
        .map_err(AppError::Database)?;

        tracing::info!("Found {} countries for term '{}'", countries.len(), term);
        Ok(countries.into_iter().map(Into::into).collect())
    }

    /// PUT semantics: full replace. A None code keeps the stored one, so a
    /// replace cannot silently drop the code.
    pub async fn update_put(&self, id: i64, dto: UpdatePutCountryDto) -> Result<CountryResponseDto> {
        tracing::debug!("Updating (PUT) country ID: {}", id);
        let current = self.get_row(id).await?;

        if dto.name != current.name && self.name_exists(&dto.name, Some(id)).await? {
            return Err(AppError::Conflict(format!(
                "Country with name '{}' already exists.",
                dto.name
            )));
        }
        let new_code = dto.code.or(current.code);
        if let Some(code) = new_code.as_deref().filter(|c| !c.is_empty()) {
            if self.code_exists(code, Some(id)).await? {
                return Err(AppError::Conflict(format!(
                    "Country with code '{}' already exists.",
                    code
                )));
            }
        }

        let country = self.persist(id, &dto.name, new_code.as_deref()).await?;
        tracing::info!("Country ID {} updated (PUT).", country.id);
        Ok(country.into())
    }

    pub async fn update_patch(
        &self,
        id: i64,
        dto: UpdatePatchCountryDto,
    ) -> Result<CountryResponseDto> {
        tracing::debug!("Updating (PATCH) country ID: {}", id);
        let mut current = self.get_row(id).await?;

        if let Some(name) = dto.name {
            if name != current.name && self.name_exists(&name, Some(id)).await? {
                return Err(AppError::Conflict(format!(
                    "Country with name '{}' already exists.",
                    name
                )));
            }
            current.name = name;
        }
        if let Some(code) = dto.code {
            if !code.is_empty()
                && current.code.as_deref() != Some(code.as_str())
                && self.code_exists(&code, Some(id)).await?
            {
                return Err(AppError::Conflict(format!(
                    "Country with code '{}' already exists.",
                    code
                )));
            }
            current.code = Some(code);
        }

        let country = self
            .persist(id, &current.name, current.code.as_deref())
            .await?;
        tracing::info!("Country ID {} updated (PATCH).", country.id);
        Ok(country.into())
    }

    pub async fn remove(&self, id: i64) -> Result<String> {
        tracing::debug!("Deleting country ID: {}", id);
        let country = self.get_row(id).await?;

        let province_count =
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM provinces WHERE country_id = $1")
                .bind(id)
                .fetch_one(&self.pool)
                .await
                .map_err(AppError::Database)?;

        if province_count > 0 {
            tracing::warn!(
                "Cannot delete country ID {}: it has {} associated provinces.",
                id,
                province_count
            );
            return Err(AppError::Conflict(format!(
                "Cannot delete country '{}' because it has associated provinces.",
                country.name
            )));
        }

        sqlx::query("DELETE FROM countries WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(AppError::Database)?;

        tracing::info!("Country ID {} deleted.", id);
        Ok(format!("Country with ID {} deleted successfully.", id))
    }

    async fn persist(&self, id: i64, name: &str, code: Option<&str>) -> Result<Country> {
        sqlx::query_as::<_, Country>(&format!(
            "UPDATE countries SET name = $1, code = $2, updated_at = NOW()
             WHERE id = $3 RETURNING {COUNTRY_COLUMNS}"
        ))
        .bind(name)
        .bind(code)
        .bind(id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                return AppError::Conflict(format!(
                    "Country with name '{}' or its code already exists.",
                    name
                ));
            }
            AppError::Database(e)
        })
    }

    async fn get_row(&self, id: i64) -> Result<Country> {
        sqlx::query_as::<_, Country>(&format!(
            "SELECT {COUNTRY_COLUMNS} FROM countries WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(AppError::Database)?
        .ok_or_else(|| {
            tracing::warn!("Country ID {} not found.", id);
            AppError::NotFound(format!("Country with ID {} not found.", id))
        })
    }

    async fn name_exists(&self, name: &str, exclude_id: Option<i64>) -> Result<bool> {
        let found = sqlx::query_scalar::<_, i64>(
            "SELECT id FROM countries WHERE name = $1 AND ($2::BIGINT IS NULL OR id <> $2)",
        )
        .bind(name)
        .bind(exclude_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(AppError::Database)?;

        Ok(found.is_some())
    }

    async fn code_exists(&self, code: &str, exclude_id: Option<i64>) -> Result<bool> {
        let found = sqlx::query_scalar::<_, i64>(
            "SELECT id FROM countries WHERE code = $1 AND ($2::BIGINT IS NULL OR id <> $2)",
        )
        .bind(code)
        .bind(exclude_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(AppError::Database)?;

        Ok(found.is_some())
    }

    async fn provinces_by_country(
        &self,
        country_ids: &[i64],
    ) -> Result<HashMap<i64, Vec<crate::features::provinces::dtos::ProvinceResponseDto>>> {
        let provinces = sqlx::query_as::<_, Province>(&format!(
            "SELECT {PROVINCE_COLUMNS} FROM provinces WHERE country_id = ANY($1) ORDER BY name"
        ))
        .bind(country_ids)
        .fetch_all(&self.pool)
        .await
        .map_err(AppError::Database)?;

        let mut grouped: HashMap<i64, Vec<_>> = HashMap::new();
        for province in provinces {
            grouped
                .entry(province.country_id)
                .or_default()
                .push(province.into());
        }
        Ok(grouped)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dto(name: &str, code: Option<&str>) -> CreateCountryDto {
        CreateCountryDto {
            name: name.to_string(),
            code: code.map(str::to_string),
        }
    }

    #[sqlx::test]
    async fn create_rejects_duplicate_names(pool: PgPool) {
        let service = CountryService::new(pool);
        service.create(dto("Argentina", Some("AR"))).await.unwrap();

        let result = service.create(dto("Argentina", None)).await;
        assert!(matches!(result, Err(AppError::Conflict(_))));
    }

    #[sqlx::test]
    async fn find_by_name_is_an_exact_lookup(pool: PgPool) {
        let service = CountryService::new(pool);
        service.create(dto("Argentina", Some("AR"))).await.unwrap();

        let found = service.find_by_name("Argentina").await.unwrap().unwrap();
        assert_eq!(found.code.as_deref(), Some("AR"));
        assert!(service.find_by_name("argentina").await.unwrap().is_none());
        assert!(service.find_by_name("Chile").await.unwrap().is_none());
    }

    #[sqlx::test]
    async fn remove_rejects_a_country_with_provinces(pool: PgPool) {
        let service = CountryService::new(pool.clone());
        let country = service.create(dto("Argentina", None)).await.unwrap();

        sqlx::query(
            "INSERT INTO provinces (name, latitude, longitude, country_id)
             VALUES ('Mendoza', -32.9, -68.8, $1)",
        )
        .bind(country.id)
        .execute(&pool)
        .await
        .unwrap();

        assert!(matches!(
            service.remove(country.id).await,
            Err(AppError::Conflict(_))
        ));
    }
}
