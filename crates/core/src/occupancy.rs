//! Occupancy arithmetic for parking locations.
//!
//! Every write to a location's `occupied_spots` goes through [`clamp_occupancy`]
//! (or an equivalent clamped statement at the storage layer), which keeps the
//! invariant `0 <= occupied_spots <= total_spots`.

use serde::Serialize;

// ---------------------------------------------------------------------------
// Level thresholds
// ---------------------------------------------------------------------------

/// Occupancy percentage above which a location is reported as `moderate`.
pub const MODERATE_THRESHOLD_PCT: f64 = 70.0;

/// Occupancy percentage above which a location is reported as `high`.
pub const HIGH_THRESHOLD_PCT: f64 = 90.0;

// ---------------------------------------------------------------------------
// Clamp
// ---------------------------------------------------------------------------

/// Clamp a requested occupancy into `[0, total_spots]`.
///
/// The requested value is taken as `i64` so that callers can pass
/// `occupied + delta` or raw user input without overflow concerns.
pub fn clamp_occupancy(requested: i64, total_spots: i32) -> i32 {
    let upper = i64::from(total_spots.max(0));
    // The clamped value fits in `i32` because `upper` came from one.
    requested.clamp(0, upper) as i32
}

/// Apply a signed delta to the current occupancy, clamped.
pub fn shift_occupancy(occupied: i32, delta: i64, total_spots: i32) -> i32 {
    clamp_occupancy(i64::from(occupied) + delta, total_spots)
}

/// Spots still free at a location (never negative).
pub fn available_spots(total_spots: i32, occupied_spots: i32) -> i32 {
    (total_spots - occupied_spots).max(0)
}

/// Whether a reservation can claim a spot right now.
pub fn has_capacity(total_spots: i32, occupied_spots: i32) -> bool {
    occupied_spots < total_spots
}

// ---------------------------------------------------------------------------
// Percentage and level
// ---------------------------------------------------------------------------

/// Occupancy as a percentage in `[0, 100]`. A location with zero spots is 0 %.
pub fn occupancy_percentage(total_spots: i32, occupied_spots: i32) -> f64 {
    if total_spots <= 0 {
        return 0.0;
    }
    (f64::from(occupied_spots) / f64::from(total_spots) * 100.0).clamp(0.0, 100.0)
}

/// Coarse occupancy bucket shown next to each location.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OccupancyLevel {
    Low,
    Moderate,
    High,
}

impl OccupancyLevel {
    pub fn from_percentage(pct: f64) -> Self {
        if pct > HIGH_THRESHOLD_PCT {
            Self::High
        } else if pct > MODERATE_THRESHOLD_PCT {
            Self::Moderate
        } else {
            Self::Low
        }
    }
}

/// Derived occupancy figures for a single location.
#[derive(Debug, Clone, Serialize)]
pub struct OccupancySummary {
    pub total_spots: i32,
    pub occupied_spots: i32,
    pub available_spots: i32,
    pub percentage: f64,
    pub level: OccupancyLevel,
}

impl OccupancySummary {
    pub fn new(total_spots: i32, occupied_spots: i32) -> Self {
        let percentage = occupancy_percentage(total_spots, occupied_spots);
        Self {
            total_spots,
            occupied_spots,
            available_spots: available_spots(total_spots, occupied_spots),
            percentage,
            level: OccupancyLevel::from_percentage(percentage),
        }
    }
}

// ---------------------------------------------------------------------------
// Spot map
// ---------------------------------------------------------------------------

/// One cell of the spot visualizer grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SpotStatus {
    /// 1-based spot number.
    pub number: i32,
    pub occupied: bool,
}

/// Lay out spots `1..=total`; the first `occupied` spots are marked taken.
///
/// Occupancy is tracked as a count, not per spot, so the map is positional.
pub fn spot_map(total_spots: i32, occupied_spots: i32) -> Vec<SpotStatus> {
    let occupied = clamp_occupancy(i64::from(occupied_spots), total_spots);
    (1..=total_spots.max(0))
        .map(|number| SpotStatus {
            number,
            occupied: number <= occupied,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clamp_negative_to_zero() {
        assert_eq!(clamp_occupancy(-5, 100), 0);
    }

    #[test]
    fn clamp_above_total_to_total() {
        assert_eq!(clamp_occupancy(200, 100), 100);
    }

    #[test]
    fn clamp_in_range_is_identity() {
        assert_eq!(clamp_occupancy(42, 100), 42);
        assert_eq!(clamp_occupancy(0, 100), 0);
        assert_eq!(clamp_occupancy(100, 100), 100);
    }

    #[test]
    fn clamp_handles_extreme_requests() {
        assert_eq!(clamp_occupancy(i64::MIN, 10), 0);
        assert_eq!(clamp_occupancy(i64::MAX, 10), 10);
    }

    #[test]
    fn shift_floors_at_zero() {
        assert_eq!(shift_occupancy(0, -1, 10), 0);
        assert_eq!(shift_occupancy(3, -1, 10), 2);
    }

    #[test]
    fn shift_caps_at_total() {
        assert_eq!(shift_occupancy(10, 1, 10), 10);
        assert_eq!(shift_occupancy(9, 1, 10), 10);
    }

    #[test]
    fn capacity_check() {
        assert!(has_capacity(100, 99));
        assert!(!has_capacity(100, 100));
        assert_eq!(available_spots(100, 99), 1);
        assert_eq!(available_spots(100, 100), 0);
    }

    #[test]
    fn percentage_and_level() {
        assert_eq!(occupancy_percentage(200, 50), 25.0);
        assert_eq!(occupancy_percentage(0, 0), 0.0);
        assert_eq!(OccupancyLevel::from_percentage(25.0), OccupancyLevel::Low);
        assert_eq!(OccupancyLevel::from_percentage(70.0), OccupancyLevel::Low);
        assert_eq!(OccupancyLevel::from_percentage(75.0), OccupancyLevel::Moderate);
        assert_eq!(OccupancyLevel::from_percentage(90.5), OccupancyLevel::High);
    }

    #[test]
    fn summary_for_full_location() {
        let summary = OccupancySummary::new(100, 100);
        assert_eq!(summary.available_spots, 0);
        assert_eq!(summary.percentage, 100.0);
        assert_eq!(summary.level, OccupancyLevel::High);
    }

    #[test]
    fn spot_map_marks_leading_spots() {
        let map = spot_map(5, 2);
        assert_eq!(map.len(), 5);
        assert!(map[0].occupied && map[1].occupied);
        assert!(!map[2].occupied);
        assert_eq!(map[4].number, 5);
    }
}
