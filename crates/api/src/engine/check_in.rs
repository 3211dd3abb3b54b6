//! Manual vehicle check-in.

use std::sync::Arc;

use chrono::Utc;
use parkspot_core::error::CoreError;
use parkspot_core::fees::{compute_charges, validate_duration};
use parkspot_core::occupancy::OccupancySummary;
use parkspot_core::types::new_id;
use parkspot_core::vehicle::{
    validate_mobile_number, validate_vehicle_number, MIN_CHECK_IN_VEHICLE_NUMBER_LEN,
};
use parkspot_db::models::parked_vehicle::{CreateParkedVehicle, ParkedVehicle};
use parkspot_db::store::{ParkingStore, SpotClaim};
use parkspot_events::EventBus;
use serde::Serialize;
use validator::Validate;

use super::run_to_completion;
use crate::error::AppResult;
use crate::notifications::{occupancy_changed, vehicle_checked_in};

/// Result of a check-in: the ledger entry and the location's new occupancy.
#[derive(Debug, Serialize)]
pub struct CheckInReceipt {
    pub vehicle: ParkedVehicle,
    pub occupancy: OccupancySummary,
}

/// Record a vehicle entering a lot and count it against the occupancy.
///
/// Charges are `duration × current fee`. A full lot still records the
/// vehicle; its occupancy stays at capacity. If the ledger write fails the
/// occupancy change is undone. Once started, the check-in finishes even if
/// the caller stops waiting for it.
pub async fn check_in(
    store: Arc<dyn ParkingStore>,
    events: Arc<EventBus>,
    input: CreateParkedVehicle,
) -> AppResult<CheckInReceipt> {
    run_to_completion(async move { record(store.as_ref(), &events, &input).await }).await
}

async fn record(
    store: &dyn ParkingStore,
    events: &EventBus,
    input: &CreateParkedVehicle,
) -> AppResult<CheckInReceipt> {
    input.validate()?;
    validate_vehicle_number(&input.vehicle_number, MIN_CHECK_IN_VEHICLE_NUMBER_LEN)?;
    validate_duration(input.duration_hours)?;

    let mobile_number = input
        .mobile_number
        .as_deref()
        .map(str::trim)
        .filter(|m| !m.is_empty())
        .map(|m| validate_mobile_number(m).map(|()| m.to_string()))
        .transpose()?;

    let (location, counted) = match store.claim_spot(input.location_id).await? {
        SpotClaim::Claimed(location) => (location, true),
        SpotClaim::Full(location) => {
            tracing::warn!(
                location_id = %location.id,
                total_spots = location.total_spots,
                "Check-in at a full location, occupancy stays at capacity"
            );
            (location, false)
        }
        SpotClaim::NotFound => {
            return Err(CoreError::not_found("ParkingLocation", input.location_id).into());
        }
    };

    let vehicle = ParkedVehicle {
        id: new_id(),
        location_id: location.id,
        location_name: location.name.clone(),
        vehicle_number: input.vehicle_number.trim().to_string(),
        vehicle_type: input.vehicle_type.as_str().to_string(),
        check_in_time: Utc::now(),
        duration_hours: input.duration_hours,
        charges_paid: compute_charges(input.duration_hours, location.current_fee),
        mobile_number,
    };

    let vehicle = match store.append_vehicle(&vehicle).await {
        Ok(stored) => stored,
        Err(e) => {
            if counted {
                if let Err(revert) = store.shift_occupancy(location.id, -1).await {
                    tracing::error!(
                        error = %revert,
                        location_id = %location.id,
                        "Failed to undo occupancy after ledger error"
                    );
                }
            }
            return Err(e.into());
        }
    };

    tracing::info!(
        vehicle_id = %vehicle.id,
        location_id = %location.id,
        charges_paid = vehicle.charges_paid,
        "Vehicle checked in"
    );

    events.publish(vehicle_checked_in(&vehicle));
    events.publish(occupancy_changed(&location));

    Ok(CheckInReceipt {
        vehicle,
        occupancy: location.occupancy(),
    })
}
