//! Reservation (booking) entity model and DTOs.

use parkspot_core::types::{EntityId, SessionKey, Timestamp};
use parkspot_core::vehicle::VehicleType;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `reservations` table.
///
/// Rows exist only while the reservation is active; cancel and expiry
/// delete them.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize)]
pub struct Reservation {
    pub id: EntityId,
    pub session_id: SessionKey,
    pub location_id: EntityId,
    pub location_name: String,
    pub vehicle_number: String,
    /// One of `2w`, `4w`, `auto`.
    pub vehicle_type: String,
    pub duration_hours: i32,
    /// `duration_hours × current_fee` at confirm time.
    pub final_fee: f64,
    pub booked_at: Timestamp,
    pub expires_at: Timestamp,
}

/// Request body for confirming a booking.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateReservation {
    pub location_id: EntityId,
    pub vehicle_number: String,
    pub vehicle_type: VehicleType,
    /// Hours; defaults to one when omitted.
    pub duration_hours: Option<i32>,
}

/// Request body for cancelling the session's booking at a location.
#[derive(Debug, Deserialize)]
pub struct CancelReservation {
    pub location_id: EntityId,
    /// Suppress the user-facing cancellation notice.
    #[serde(default)]
    pub silent: bool,
}
