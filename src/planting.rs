//! Planting-info resolution
//!
//! Matches a plant name and zone against the planting calendar. Plant names
//! are normalized to title case and zones to lowercase, so lookups tolerate
//! client formatting. When the requested zone is missing for a plant, the
//! first zone listed for that plant is used instead and the result is
//! flagged with `zone_fallback`.

use serde::Serialize;

use crate::calendar::CalendarDataset;
use crate::types::{GardenError, Result};

/// Resolved planting timeline for one plant
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlantingInfo {
    /// Normalized plant name
    pub plant: String,
    /// Zone key that supplied the window
    pub zone: String,
    /// Zone as requested, normalized
    pub requested_zone: String,
    pub start_month: String,
    pub end_month: String,
    pub growth_duration_days: Option<i64>,
    /// True when `zone` is not the requested zone
    pub zone_fallback: bool,
}

/// Title-case a plant name: "sweet   CORN " → "Sweet Corn"
pub fn normalize_plant_name(name: &str) -> String {
    name.split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first
                    .to_uppercase()
                    .chain(chars.flat_map(char::to_lowercase))
                    .collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Lowercase and trim a zone label: " 7A" → "7a"
pub fn normalize_zone(zone: &str) -> String {
    zone.trim().to_lowercase()
}

/// Resolve the planting window for `plant_name` in `zone`.
///
/// `catalog_lookup` receives the normalized plant name and returns the
/// catalog's stored growth duration. A catalog value wins over the dataset's
/// `avg_days`.
pub fn resolve_planting_info<F>(
    dataset: &CalendarDataset,
    plant_name: &str,
    zone: &str,
    catalog_lookup: F,
) -> Result<PlantingInfo>
where
    F: Fn(&str) -> Option<i64>,
{
    let plant = normalize_plant_name(plant_name);
    let requested_zone = normalize_zone(zone);

    let calendar = dataset
        .plant(&plant)
        .ok_or_else(|| GardenError::NotFound(format!("No data for plant '{}'", plant)))?;

    let (matched, zone_fallback) = match calendar.find_zone(&requested_zone) {
        Some(found) => (found, false),
        None => {
            let first = calendar.first_zone().ok_or_else(|| {
                GardenError::NotFound(format!("No timeline for plant '{}'", plant))
            })?;
            (first, true)
        }
    };
    let (zone_key, window) = matched;

    let growth_duration_days = catalog_lookup(&plant).or(calendar.avg_days());

    Ok(PlantingInfo {
        zone: zone_key.to_string(),
        requested_zone,
        start_month: window.start.clone(),
        end_month: window.end.clone(),
        growth_duration_days,
        zone_fallback,
        plant,
    })
}
