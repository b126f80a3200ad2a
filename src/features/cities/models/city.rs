use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::features::cities::dtos::UpdatePatchCityDto;

/// Database row for a city.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct City {
    pub id: i64,
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    pub province_id: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Which parts of a city a partial update actually touched.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CityChanges {
    pub name: bool,
    pub province: bool,
    pub coordinates: bool,
}

impl CityChanges {
    /// True when the name or the parent province moved. Full replaces must
    /// re-check name+province uniqueness whenever this holds.
    pub fn nominal_identity_changed(&self) -> bool {
        self.name || self.province
    }

    /// Same rule as for provinces: partial updates only run the
    /// name+province duplicate check when the nominal identity moved but
    /// the coordinates stayed put.
    pub fn needs_nominal_check(&self) -> bool {
        self.nominal_identity_changed() && !self.coordinates
    }

    pub fn needs_coordinate_check(&self) -> bool {
        self.coordinates
    }
}

impl City {
    /// Merge a PATCH body into the row, flagging only fields whose value
    /// actually changed.
    pub fn apply_patch(&mut self, dto: &UpdatePatchCityDto) -> CityChanges {
        let mut changes = CityChanges::default();

        if let Some(name) = &dto.name {
            if *name != self.name {
                self.name = name.clone();
                changes.name = true;
            }
        }
        if let Some(province_id) = dto.province_id {
            if province_id != self.province_id {
                self.province_id = province_id;
                changes.province = true;
            }
        }
        if let Some(latitude) = dto.latitude {
            if latitude != self.latitude {
                self.latitude = latitude;
                changes.coordinates = true;
            }
        }
        if let Some(longitude) = dto.longitude {
            if longitude != self.longitude {
                self.longitude = longitude;
                changes.coordinates = true;
            }
        }

        changes
    }
}

/// City joined with its province and the province's country, as returned by
/// the read queries.
#[derive(Debug, Clone, FromRow)]
pub struct CityWithRelationsRow {
    pub id: i64,
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    pub province_id: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub province_name: String,
    pub province_latitude: f64,
    pub province_longitude: f64,
    pub country_id: i64,
    pub country_name: String,
    pub country_code: Option<String>,
}
