use sqlx::PgPool;

use crate::core::error::{is_unique_violation, AppError, Result};
use crate::features::auth::services::password;
use crate::features::persons::dtos::{
    CreatePersonDto, PersonResponseDto, UpdatePatchPersonDto, UpdatePutPersonDto,
};
use crate::features::persons::models::{Person, PersonRole};
use crate::shared::types::PaginationQuery;
use crate::shared::validation::normalize_search_term;

const PERSON_COLUMNS: &str = "id, first_name, last_name, email, password_hash, birth_date, \
                              role, city_id, created_at, updated_at";

/// Service for person CRUD. The Auth service builds on top of this for
/// registration and credential checks.
pub struct PersonService {
    pool: PgPool,
}

impl PersonService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create a person. The caller controls the role: the admin endpoint may
    /// set MODERATOR/ADMIN, while registration always passes USER.
    pub async fn create(&self, dto: CreatePersonDto) -> Result<PersonResponseDto> {
        tracing::debug!("Creating person: {}", dto.email);

        if self.email_exists(&dto.email, None).await? {
            tracing::warn!("Person with email '{}' already exists.", dto.email);
            return Err(AppError::Conflict(format!(
                "A person with email '{}' already exists.",
                dto.email
            )));
        }

        if let Some(city_id) = dto.city_id {
            self.ensure_city_exists(city_id).await?;
        }

        let password_hash = password::hash_password(&dto.password)?;
        let role = dto.role.unwrap_or(PersonRole::User);

        let person = sqlx::query_as::<_, Person>(&format!(
            "INSERT INTO persons (first_name, last_name, email, password_hash, birth_date, role, city_id)
             VALUES ($1, $2, $3, $4, $5, $6, $7)
             RETURNING {PERSON_COLUMNS}"
        ))
        .bind(&dto.first_name)
        .bind(&dto.last_name)
        .bind(&dto.email)
        .bind(&password_hash)
        .bind(dto.birth_date)
        .bind(role)
        .bind(dto.city_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            // Losing an email race is still a Conflict for the caller.
            if is_unique_violation(&e) {
                return AppError::Conflict(format!(
                    "A person with email '{}' already exists.",
                    dto.email
                ));
            }
            tracing::error!("Failed to create person: {:?}", e);
            AppError::Database(e)
        })?;

        tracing::info!("Person created ID: {}, email: {}", person.id, person.email);
        Ok(person.into())
    }

    pub async fn find_all(
        &self,
        pagination: &PaginationQuery,
    ) -> Result<(Vec<PersonResponseDto>, i64)> {
        tracing::debug!("Fetching all persons");
        let total = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM persons")
            .fetch_one(&self.pool)
            .await
            .map_err(AppError::Database)?;

        let persons = sqlx::query_as::<_, Person>(&format!(
            "SELECT {PERSON_COLUMNS} FROM persons ORDER BY last_name, first_name LIMIT $1 OFFSET $2"
        ))
        .bind(pagination.limit())
        .bind(pagination.offset())
        .fetch_all(&self.pool)
        .await
        .map_err(AppError::Database)?;

        Ok((persons.into_iter().map(Into::into).collect(), total))
    }

    pub async fn find_one(&self, id: i64) -> Result<PersonResponseDto> {
        Ok(self.get_row(id).await?.into())
    }

    /// Case-insensitive substring search against first and last name.
    pub async fn find_by_name(&self, term: &str) -> Result<Vec<PersonResponseDto>> {
        let term = normalize_search_term(term)
            .ok_or_else(|| AppError::BadRequest("Search term must not be empty.".to_string()))?;

        let pattern = format!("%{}%", term);
        let persons = sqlx::query_as::<_, Person>(&format!(
            "SELECT {PERSON_COLUMNS} FROM persons
             WHERE first_name ILIKE $1 OR last_name ILIKE $1
             ORDER BY last_name, first_name"
        ))
        .bind(&pattern)
        .fetch_all(&self.pool)
        .await
        .map_err(AppError::Database)?;

        tracing::info!("Found {} persons for term '{}'", persons.len(), term);
        Ok(persons.into_iter().map(Into::into).collect())
    }

    /// Lookup used by the Auth service. Returns the full row including the
    /// password hash; never expose the result directly in a response.
    pub async fn find_by_email_for_auth(&self, email: &str) -> Result<Option<Person>> {
        let person = sqlx::query_as::<_, Person>(&format!(
            "SELECT {PERSON_COLUMNS} FROM persons WHERE email = $1"
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(AppError::Database)?;

        Ok(person)
    }

    /// PUT semantics: full replace. Every field is taken from the payload
    /// and the password is re-hashed.
    pub async fn update_put(&self, id: i64, dto: UpdatePutPersonDto) -> Result<PersonResponseDto> {
        tracing::debug!("Updating (PUT) person ID: {}", id);
        let current = self.get_row(id).await?;

        if dto.email != current.email && self.email_exists(&dto.email, Some(id)).await? {
            return Err(AppError::Conflict(format!(
                "A person with email '{}' already exists.",
                dto.email
            )));
        }
        if let Some(city_id) = dto.city_id {
            self.ensure_city_exists(city_id).await?;
        }

        let password_hash = password::hash_password(&dto.password)?;

        let person = sqlx::query_as::<_, Person>(&format!(
            "UPDATE persons
             SET first_name = $1, last_name = $2, email = $3, password_hash = $4,
                 birth_date = $5, role = $6, city_id = $7, updated_at = NOW()
             WHERE id = $8
             RETURNING {PERSON_COLUMNS}"
        ))
        .bind(&dto.first_name)
        .bind(&dto.last_name)
        .bind(&dto.email)
        .bind(&password_hash)
        .bind(dto.birth_date)
        .bind(dto.role)
        .bind(dto.city_id)
        .bind(id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                return AppError::Conflict(format!(
                    "A person with email '{}' already exists.",
                    dto.email
                ));
            }
            AppError::Database(e)
        })?;

        tracing::info!("Person ID {} updated (PUT).", person.id);
        Ok(person.into())
    }

    /// PATCH semantics: only supplied fields are checked and changed.
    pub async fn update_patch(
        &self,
        id: i64,
        dto: UpdatePatchPersonDto,
    ) -> Result<PersonResponseDto> {
        tracing::debug!("Updating (PATCH) person ID: {}", id);
        let mut current = self.get_row(id).await?;

        if let Some(email) = dto.email {
            if email != current.email && self.email_exists(&email, Some(id)).await? {
                return Err(AppError::Conflict(format!(
                    "A person with email '{}' already exists.",
                    email
                )));
            }
            current.email = email;
        }
        if let Some(first_name) = dto.first_name {
            current.first_name = first_name;
        }
        if let Some(last_name) = dto.last_name {
            current.last_name = last_name;
        }
        if let Some(birth_date) = dto.birth_date {
            current.birth_date = birth_date;
        }
        if let Some(role) = dto.role {
            current.role = role;
        }
        if let Some(city_id) = dto.city_id {
            self.ensure_city_exists(city_id).await?;
            current.city_id = Some(city_id);
        }
        if let Some(ref plain) = dto.password {
            current.password_hash = password::hash_password(plain)?;
        }

        let person = sqlx::query_as::<_, Person>(&format!(
            "UPDATE persons
             SET first_name = $1, last_name = $2, email = $3, password_hash = $4,
                 birth_date = $5, role = $6, city_id = $7, updated_at = NOW()
             WHERE id = $8
             RETURNING {PERSON_COLUMNS}"
        ))
        .bind(&current.first_name)
        .bind(&current.last_name)
        .bind(&current.email)
        .bind(&current.password_hash)
        .bind(current.birth_date)
        .bind(current.role)
        .bind(current.city_id)
        .bind(id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                return AppError::Conflict(format!(
                    "A person with email '{}' already exists.",
                    current.email
                ));
            }
            AppError::Database(e)
        })?;

        tracing::info!("Person ID {} updated (PATCH).", person.id);
        Ok(person.into())
    }

    pub async fn remove(&self, id: i64) -> Result<String> {
        tracing::debug!("Deleting person ID: {}", id);
        self.get_row(id).await?;

        sqlx::query("DELETE FROM persons WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(AppError::Database)?;

        tracing::info!("Person ID {} deleted.", id);
        Ok(format!("Person with ID {} deleted successfully.", id))
    }

    async fn get_row(&self, id: i64) -> Result<Person> {
        sqlx::query_as::<_, Person>(&format!(
            "SELECT {PERSON_COLUMNS} FROM persons WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(AppError::Database)?
        .ok_or_else(|| {
            tracing::warn!("Person ID {} not found.", id);
            AppError::NotFound(format!("Person with ID {} not found.", id))
        })
    }

    async fn email_exists(&self, email: &str, exclude_id: Option<i64>) -> Result<bool> {
        let existing = sqlx::query_scalar::<_, i64>(
            "SELECT id FROM persons WHERE email = $1 AND ($2::BIGINT IS NULL OR id <> $2)",
        )
        .bind(email)
        .bind(exclude_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(AppError::Database)?;

        Ok(existing.is_some())
    }

    async fn ensure_city_exists(&self, city_id: i64) -> Result<()> {
        let found = sqlx::query_scalar::<_, i64>("SELECT id FROM cities WHERE id = $1")
            .bind(city_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::Database)?;

        if found.is_none() {
            tracing::warn!("City ID {} not found.", city_id);
            return Err(AppError::NotFound(format!(
                "City with ID {} not found.",
                city_id
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn create_dto(email: &str) -> CreatePersonDto {
        CreatePersonDto {
            first_name: "Ada".to_string(),
            last_name: "Lovelace".to_string(),
            email: email.to_string(),
            password: "a-long-password".to_string(),
            birth_date: NaiveDate::from_ymd_opt(1815, 12, 10).unwrap(),
            role: None,
            city_id: None,
        }
    }

    #[sqlx::test]
    async fn create_rejects_duplicate_emails(pool: PgPool) {
        let service = PersonService::new(pool);
        let first = service.create(create_dto("ada@example.com")).await.unwrap();
        assert_eq!(first.role, PersonRole::User);

        let result = service.create(create_dto("ada@example.com")).await;
        assert!(matches!(result, Err(AppError::Conflict(_))));
    }
}
