//! Portfolio domain types

use chrono::NaiveDate;
use serde::Serialize;

use crate::types::{GardenError, Result};

/// Wire format for every date the API accepts or returns
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Registered user
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: String,
    pub username: String,
    /// Argon2 PHC string
    pub password_hash: String,
    pub zip_code: Option<String>,
    pub zone: Option<String>,
}

#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub password_hash: String,
}

/// Canonical plant species record, shared across users
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlantCatalogEntry {
    pub id: String,
    pub name: String,
    pub species: Option<String>,
    pub sunlight: Option<String>,
    pub watering: Option<String>,
    pub growth_days: Option<i64>,
}

#[derive(Debug, Clone, Default)]
pub struct NewCatalogEntry {
    pub name: String,
    pub species: Option<String>,
    pub sunlight: Option<String>,
    pub watering: Option<String>,
    pub growth_days: Option<i64>,
}

impl NewCatalogEntry {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }
}

/// One user's planting of a catalog entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserPlantInstance {
    pub id: String,
    pub user_id: String,
    pub plant_id: String,
    pub nickname: String,
    pub date_planted: Option<NaiveDate>,
    pub notes: String,
}

#[derive(Debug, Clone)]
pub struct NewUserPlant {
    pub user_id: String,
    pub plant_id: String,
    pub nickname: String,
    pub date_planted: NaiveDate,
    pub notes: String,
}

/// Store-level patch; `None` leaves a field untouched
#[derive(Debug, Clone, Default)]
pub struct UserPlantChanges {
    pub plant_id: Option<String>,
    pub date_planted: Option<NaiveDate>,
    pub notes: Option<String>,
}

impl UserPlantChanges {
    pub fn is_empty(&self) -> bool {
        self.plant_id.is_none() && self.date_planted.is_none() && self.notes.is_none()
    }
}

/// How a caller names the plant they are adding
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlantRef {
    /// Existing catalog entry
    ById(String),
    /// Free-text name; a catalog entry is created if none matches
    ByName(String),
}

impl PlantRef {
    /// Build from the two optional wire fields. Exactly one must be set.
    pub fn from_fields(plant_id: Option<String>, plant_name: Option<String>) -> Result<Self> {
        let plant_id = plant_id.filter(|id| !id.trim().is_empty());
        let plant_name = plant_name.filter(|name| !name.trim().is_empty());

        match (plant_id, plant_name) {
            (Some(id), None) => Ok(PlantRef::ById(id)),
            (None, Some(name)) => Ok(PlantRef::ByName(name)),
            (Some(_), Some(_)) => Err(GardenError::InvalidInput(
                "Provide either plant_id or plant_name, not both".into(),
            )),
            (None, None) => Err(GardenError::InvalidInput(
                "Missing required field: plant_id or plant_name".into(),
            )),
        }
    }
}

/// Add-to-portfolio request after wire validation
#[derive(Debug, Clone)]
pub struct AddPlantRequest {
    pub plant: PlantRef,
    pub date_planted: NaiveDate,
    pub notes: Option<String>,
}

/// Partial update request after wire validation
#[derive(Debug, Clone, Default)]
pub struct UpdatePlantRequest {
    pub notes: Option<String>,
    pub date_planted: Option<NaiveDate>,
    pub plant_name: Option<String>,
}

/// Nickname for a new instance given how many the user already has of
/// the same catalog entry
pub fn batch_nickname(name: &str, existing: u64) -> String {
    if existing == 0 {
        name.to_string()
    } else {
        format!("{} (Batch {})", name, existing + 1)
    }
}

/// Parse a `YYYY-MM-DD` date
pub fn parse_date(raw: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), DATE_FORMAT).map_err(|_| {
        GardenError::InvalidInput(format!("Invalid date '{}', expected YYYY-MM-DD", raw))
    })
}
