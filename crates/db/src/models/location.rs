//! Parking location entity model and DTOs.

use parkspot_core::occupancy::OccupancySummary;
use parkspot_core::types::{EntityId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// A row from the `parking_locations` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ParkingLocation {
    pub id: EntityId,
    pub name: String,
    pub address: String,
    pub total_spots: i32,
    pub occupied_spots: i32,
    /// Fee per hour.
    pub current_fee: f64,
    pub image_url: Option<String>,
    /// Owning user reference, opaque to this service.
    pub owner_id: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl ParkingLocation {
    pub fn occupancy(&self) -> OccupancySummary {
        OccupancySummary::new(self.total_spots, self.occupied_spots)
    }
}

/// DTO for creating a new location. Occupancy always starts at zero.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateLocation {
    #[validate(length(min = 3, max = 200, message = "Name must be at least 3 characters"))]
    pub name: String,
    #[validate(length(min = 5, max = 500, message = "Address must be at least 5 characters"))]
    pub address: String,
    #[validate(range(min = 1, max = 10_000, message = "Total spots must be between 1 and 10000"))]
    pub total_spots: i32,
    #[validate(range(min = 0.0, message = "Fee must be a non-negative number"))]
    pub current_fee: f64,
    pub image_url: Option<String>,
    #[validate(length(max = 128, message = "Owner id must be at most 128 characters"))]
    pub owner_id: Option<String>,
}

/// DTO for a manual occupancy edit. Any integer is accepted; it is clamped.
#[derive(Debug, Deserialize)]
pub struct UpdateOccupancy {
    pub occupied_spots: i64,
}

/// DTO for changing a location's hourly fee.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateFee {
    #[validate(range(min = 0.0, message = "Fee must be a non-negative number"))]
    pub current_fee: f64,
}

/// A location together with its derived occupancy figures.
#[derive(Debug, Serialize)]
pub struct LocationOverview {
    #[serde(flatten)]
    pub location: ParkingLocation,
    pub occupancy: OccupancySummary,
}

impl From<ParkingLocation> for LocationOverview {
    fn from(location: ParkingLocation) -> Self {
        let occupancy = location.occupancy();
        Self {
            location,
            occupancy,
        }
    }
}
