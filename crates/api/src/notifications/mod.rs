//! Live-feed delivery of parking events.
//!
//! [`NotificationRouter`] subscribes to the event bus and pushes each event
//! to WebSocket clients. The helpers below build the events published by
//! handlers and the reservation engine.

mod router;

pub use router::NotificationRouter;

use parkspot_db::models::location::ParkingLocation;
use parkspot_db::models::parked_vehicle::ParkedVehicle;
use parkspot_events::bus::{LOCATION_OCCUPANCY_CHANGED, VEHICLE_CHECKED_IN};
use parkspot_events::ParkingEvent;
use serde_json::json;

/// Public event carrying a location's current occupancy figures.
pub fn occupancy_changed(location: &ParkingLocation) -> ParkingEvent {
    let summary = location.occupancy();
    ParkingEvent::new(LOCATION_OCCUPANCY_CHANGED)
        .for_location(location.id)
        .with_payload(json!({
            "total_spots": summary.total_spots,
            "occupied_spots": summary.occupied_spots,
            "available_spots": summary.available_spots,
            "percentage": summary.percentage,
            "level": summary.level,
        }))
}

pub fn vehicle_checked_in(vehicle: &ParkedVehicle) -> ParkingEvent {
    ParkingEvent::new(VEHICLE_CHECKED_IN)
        .for_location(vehicle.location_id)
        .with_payload(json!({
            "vehicle_id": vehicle.id,
            "vehicle_number": vehicle.vehicle_number,
            "vehicle_type": vehicle.vehicle_type,
            "charges_paid": vehicle.charges_paid,
        }))
}
