//! Planting calendar dataset
//!
//! Static lookup of planting windows: plant name → zone label → {start, end}.
//! Loaded once at startup from a bundled JSON file and shared read-only.
//!
//! ```json
//! {
//!   "Tomato": {
//!     "avg_days": 75,
//!     "7a": { "start": "April", "end": "June" },
//!     "8b": { "start": "March", "end": "May" }
//!   }
//! }
//! ```
//!
//! Zone order inside a plant follows the document; the zone fallback in
//! `planting` relies on it.

use serde::Serialize;
use serde_json::{Map, Value};
use std::path::Path;
use tracing::info;

use crate::types::{GardenError, Result};

/// Reserved key in a plant object holding the dataset's average growth days
pub const AVG_DAYS_KEY: &str = "avg_days";

/// Upper bound on `avg_days`, roughly a century
pub const MAX_AVG_DAYS: i64 = 36_500;

/// Planting window for one plant in one zone
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlantingWindow {
    pub start: String,
    pub end: String,
}

/// All calendar data for one plant
#[derive(Debug, Clone, Default)]
pub struct PlantCalendar {
    /// Zone label → window, in document order
    zones: Vec<(String, PlantingWindow)>,
    /// Average days to harvest, when the dataset carries one
    avg_days: Option<i64>,
}

impl PlantCalendar {
    /// Zones in document order
    pub fn zones(&self) -> impl Iterator<Item = (&str, &PlantingWindow)> {
        self.zones.iter().map(|(zone, window)| (zone.as_str(), window))
    }

    /// Zone whose label matches `zone` ignoring case
    pub fn find_zone(&self, zone: &str) -> Option<(&str, &PlantingWindow)> {
        self.zones()
            .find(|(label, _)| label.to_lowercase() == zone.to_lowercase())
    }

    /// First zone in document order
    pub fn first_zone(&self) -> Option<(&str, &PlantingWindow)> {
        self.zones().next()
    }

    pub fn avg_days(&self) -> Option<i64> {
        self.avg_days
    }
}

/// The whole planting calendar
#[derive(Debug, Clone, Default)]
pub struct CalendarDataset {
    plants: Vec<(String, PlantCalendar)>,
}

impl CalendarDataset {
    /// Load and validate the dataset from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|e| {
            GardenError::InvalidDataset(format!("cannot read {}: {}", path.display(), e))
        })?;

        let dataset = Self::from_json(&raw)?;
        info!(
            path = %path.display(),
            plants = dataset.plant_count(),
            "Planting calendar loaded"
        );
        Ok(dataset)
    }

    /// Parse and validate a JSON document
    pub fn from_json(raw: &str) -> Result<Self> {
        let root: Value = serde_json::from_str(raw)
            .map_err(|e| GardenError::InvalidDataset(format!("not valid JSON: {}", e)))?;

        let Value::Object(plants) = root else {
            return Err(GardenError::InvalidDataset(
                "top level must be an object of plant names".into(),
            ));
        };

        let plants = plants
            .into_iter()
            .map(|(name, value)| parse_plant(&name, value).map(|calendar| (name, calendar)))
            .collect::<Result<Vec<_>>>()?;

        Ok(Self { plants })
    }

    /// Calendar for a plant, matched on the exact key
    pub fn plant(&self, name: &str) -> Option<&PlantCalendar> {
        self.plants
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, calendar)| calendar)
    }

    /// Plant names in document order
    pub fn plant_names(&self) -> impl Iterator<Item = &str> {
        self.plants.iter().map(|(name, _)| name.as_str())
    }

    pub fn plant_count(&self) -> usize {
        self.plants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.plants.is_empty()
    }
}

fn parse_plant(name: &str, value: Value) -> Result<PlantCalendar> {
    let Value::Object(entries) = value else {
        return Err(GardenError::InvalidDataset(format!(
            "plant '{}' must map zone labels to windows",
            name
        )));
    };

    let mut calendar = PlantCalendar::default();
    for (key, value) in entries {
        if key == AVG_DAYS_KEY {
            calendar.avg_days = Some(parse_avg_days(name, &value)?);
            continue;
        }
        let window = parse_window(name, &key, value)?;
        calendar.zones.push((key, window));
    }
    Ok(calendar)
}

fn parse_avg_days(name: &str, value: &Value) -> Result<i64> {
    value
        .as_i64()
        .filter(|days| (0..=MAX_AVG_DAYS).contains(days))
        .ok_or_else(|| {
            GardenError::InvalidDataset(format!(
                "plant '{}': {} must be an integer between 0 and {}",
                name, AVG_DAYS_KEY, MAX_AVG_DAYS
            ))
        })
}

fn parse_window(name: &str, zone: &str, value: Value) -> Result<PlantingWindow> {
    let Value::Object(fields) = value else {
        return Err(GardenError::InvalidDataset(format!(
            "plant '{}' zone '{}': expected {{\"start\", \"end\"}}",
            name, zone
        )));
    };

    Ok(PlantingWindow {
        start: month_field(&fields, "start", name, zone)?,
        end: month_field(&fields, "end", name, zone)?,
    })
}

fn month_field(fields: &Map<String, Value>, key: &str, name: &str, zone: &str) -> Result<String> {
    fields
        .get(key)
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| {
            GardenError::InvalidDataset(format!(
                "plant '{}' zone '{}': missing string field '{}'",
                name, zone, key
            ))
        })
}
