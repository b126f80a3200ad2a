use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// Database model for a country. `name` and `code` are unique; `code` is
/// optional (ISO 3166 style, 2-3 uppercase letters).
#[derive(Debug, Clone, FromRow)]
pub struct Country {
    pub id: i64,
    pub name: String,
    pub code: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
