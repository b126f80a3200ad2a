use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::features::provinces::dtos::UpdatePatchProvinceDto;

/// Database row for a province.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Province {
    pub id: i64,
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    pub country_id: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Which parts of a province a partial update actually touched.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProvinceChanges {
    pub name: bool,
    pub country: bool,
    pub coordinates: bool,
}

impl ProvinceChanges {
    /// True when the name or the parent country moved. Full replaces must
    /// re-check name+country uniqueness whenever this holds.
    pub fn nominal_identity_changed(&self) -> bool {
        self.name || self.country
    }

    /// Partial updates only run the name+country duplicate check when the
    /// nominal identity moved but the coordinates stayed put. A coordinate
    /// change makes the row a different location, so the check is skipped.
    pub fn needs_nominal_check(&self) -> bool {
        self.nominal_identity_changed() && !self.coordinates
    }

    pub fn needs_coordinate_check(&self) -> bool {
        self.coordinates
    }
}

impl Province {
    /// Merge a PATCH body into the row, flagging only fields whose value
    /// actually changed.
    pub fn apply_patch(&mut self, dto: &UpdatePatchProvinceDto) -> ProvinceChanges {
        let mut changes = ProvinceChanges::default();

        if let Some(name) = &dto.name {
            if *name != self.name {
                self.name = name.clone();
                changes.name = true;
            }
        }
        if let Some(country_id) = dto.country_id {
            if country_id != self.country_id {
                self.country_id = country_id;
                changes.country = true;
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

/// Province joined with its country, as returned by the read queries.
#[derive(Debug, Clone, FromRow)]
pub struct ProvinceWithCountryRow {
    pub id: i64,
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    pub country_id: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub country_name: String,
    pub country_code: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn province() -> Province {
        Province {
            id: 7,
            name: "Jawa Barat".to_string(),
            latitude: -6.9,
            longitude: 107.6,
            country_id: 1,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn patch_with_same_values_flags_nothing() {
        let mut row = province();
        let dto = UpdatePatchProvinceDto {
            name: Some("Jawa Barat".to_string()),
            latitude: Some(-6.9),
            longitude: Some(107.6),
            country_id: Some(1),
        };

        let changes = row.apply_patch(&dto);
        assert_eq!(changes, ProvinceChanges::default());
        assert!(!changes.needs_nominal_check());
        assert!(!changes.needs_coordinate_check());
    }

    #[test]
    fn renaming_without_moving_needs_nominal_check() {
        let mut row = province();
        let dto = UpdatePatchProvinceDto {
            name: Some("Jawa Tengah".to_string()),
            ..Default::default()
        };

        let changes = row.apply_patch(&dto);
        assert!(changes.name);
        assert!(changes.needs_nominal_check());
        assert!(!changes.needs_coordinate_check());
        assert_eq!(row.name, "Jawa Tengah");
    }

    #[test]
    fn moving_coordinates_suppresses_nominal_check() {
        let mut row = province();
        let dto = UpdatePatchProvinceDto {
            name: Some("Jawa Tengah".to_string()),
            latitude: Some(-7.2),
            ..Default::default()
        };

        let changes = row.apply_patch(&dto);
        assert!(changes.name);
        assert!(changes.coordinates);
        assert!(!changes.needs_nominal_check());
        assert!(changes.needs_coordinate_check());
    }

    #[test]
    fn nominal_identity_change_survives_a_coordinate_move() {
        let changes = ProvinceChanges {
            name: true,
            country: false,
            coordinates: true,
        };
        assert!(changes.nominal_identity_changed());
        assert!(!changes.needs_nominal_check());

        let changes = ProvinceChanges {
            name: false,
            country: true,
            coordinates: true,
        };
        assert!(changes.nominal_identity_changed());
    }

    #[test]
    fn reparenting_needs_nominal_check() {
        let mut row = province();
        let dto = UpdatePatchProvinceDto {
            country_id: Some(2),
            ..Default::default()
        };

        let changes = row.apply_patch(&dto);
        assert!(changes.country);
        assert!(changes.needs_nominal_check());
        assert_eq!(row.country_id, 2);
    }
}
