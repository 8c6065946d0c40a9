//! Harvest projection
//!
//! Pure date arithmetic over a planting date and a growth duration. The
//! current date is always supplied by the caller.

use chrono::{Duration, NaiveDate};
use serde::Serialize;

/// Projection for one planting. All fields are absent when either the
/// planting date or the growth duration is unknown.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct HarvestProjection {
    /// Days since planting; negative for future planting dates
    pub days_elapsed: Option<i64>,
    /// Days until harvest; negative once overdue
    pub days_remaining: Option<i64>,
    pub expected_harvest: Option<NaiveDate>,
}

/// Project the harvest for a planting as of `today`
///
/// Durations too large for date arithmetic leave the affected fields
/// absent instead of overflowing.
pub fn project_harvest(
    planted_on: Option<NaiveDate>,
    growth_duration_days: Option<i64>,
    today: NaiveDate,
) -> HarvestProjection {
    let (Some(planted_on), Some(growth_days)) = (planted_on, growth_duration_days) else {
        return HarvestProjection::default();
    };

    let days_elapsed = (today - planted_on).num_days();
    let expected_harvest = Duration::try_days(growth_days)
        .and_then(|growth| planted_on.checked_add_signed(growth));

    HarvestProjection {
        days_elapsed: Some(days_elapsed),
        days_remaining: growth_days.checked_sub(days_elapsed),
        expected_harvest,
    }
}
