//! Parked vehicle (check-in ledger) entity model and DTOs.

use parkspot_core::types::{EntityId, Timestamp};
use parkspot_core::vehicle::VehicleType;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// A row from the `parked_vehicles` table. Append-only.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ParkedVehicle {
    pub id: EntityId,
    pub location_id: EntityId,
    pub location_name: String,
    pub vehicle_number: String,
    pub vehicle_type: String,
    pub check_in_time: Timestamp,
    pub duration_hours: i32,
    /// `duration_hours × current_fee` at check-in.
    pub charges_paid: f64,
    pub mobile_number: Option<String>,
}

/// DTO for a manual vehicle entry at the management desk.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateParkedVehicle {
    pub location_id: EntityId,
    pub vehicle_number: String,
    pub vehicle_type: VehicleType,
    #[validate(range(min = 1, message = "Duration must be at least 1 hour"))]
    pub duration_hours: i32,
    pub mobile_number: Option<String>,
}

/// Query parameters for listing the ledger.
#[derive(Debug, Default, Deserialize)]
pub struct ParkedVehicleListParams {
    pub location_id: Option<EntityId>,
}
