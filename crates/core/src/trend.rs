//! Deterministic weekly occupancy trend for a location at a time of day.
//!
//! There is no stored history; the series is synthesised from the location id
//! and the requested time so the same inputs always chart the same curve.

use serde::Serialize;

use crate::error::CoreError;

pub const DAYS_OF_WEEK: [&str; 7] = ["Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun"];

const MIN_TREND_PCT: f64 = 10.0;
const MAX_TREND_PCT: f64 = 100.0;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendPoint {
    pub day: &'static str,
    /// Occupancy percentage, rounded, within `[10, 100]`.
    pub occupancy: u32,
}

/// Parse an `HH:MM` time of day and return the hour.
pub fn parse_hour(time: &str) -> Result<u32, CoreError> {
    let invalid = || CoreError::Validation(format!("Invalid time '{time}'. Expected HH:MM"));

    let (hh, mm) = time.split_once(':').ok_or_else(invalid)?;
    let hour: u32 = hh.parse().map_err(|_| invalid())?;
    let minute: u32 = mm.parse().map_err(|_| invalid())?;
    if hour > 23 || minute > 59 {
        return Err(invalid());
    }
    Ok(hour)
}

/// Build the seven-day series for `location_id` at `time` (`HH:MM`).
pub fn weekly_trend(location_id: &str, time: &str) -> Result<Vec<TrendPoint>, CoreError> {
    let hour = parse_hour(time)?;
    let seed: u64 = location_id
        .chars()
        .chain(time.chars())
        .map(|c| u64::from(u32::from(c)))
        .sum();

    let time_factor = f64::from(hour) / 24.0;

    let points = DAYS_OF_WEEK
        .iter()
        .enumerate()
        .map(|(index, &day)| {
            let day_factor = if matches!(day, "Sat" | "Sun") { 1.2 } else { 0.9 };
            let spread = (seed.wrapping_mul(index as u64 + 1) % 100) as f64 / 100.0;
            let raw = (time_factor * 0.5 + day_factor * 0.3 + spread * 0.2) * 100.0;
            TrendPoint {
                day,
                occupancy: raw.clamp(MIN_TREND_PCT, MAX_TREND_PCT).round() as u32,
            }
        })
        .collect();

    Ok(points)
}
