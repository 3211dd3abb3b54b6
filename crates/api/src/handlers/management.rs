//! Handlers for the lot-manager desk (`/management`).

use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use parkspot_core::error::CoreError;
use parkspot_core::occupancy::{spot_map, OccupancySummary, SpotStatus};
use parkspot_core::types::EntityId;
use parkspot_db::models::location::{CreateLocation, LocationOverview, UpdateOccupancy};
use parkspot_db::models::parked_vehicle::{CreateParkedVehicle, ParkedVehicleListParams};
use parkspot_events::bus::LOCATION_CREATED;
use parkspot_events::ParkingEvent;
use serde::Serialize;
use serde_json::json;
use validator::Validate;

use crate::engine;
use crate::error::AppResult;
use crate::notifications::occupancy_changed;
use crate::response::DataResponse;
use crate::state::AppState;

/// Response for `GET /management/locations/{id}/spots`.
#[derive(Debug, Serialize)]
pub struct SpotMap {
    pub location_id: EntityId,
    pub occupancy: OccupancySummary,
    pub spots: Vec<SpotStatus>,
}

// ---------------------------------------------------------------------------
// POST /management/locations
// ---------------------------------------------------------------------------

/// Add a location. Occupancy starts at zero.
pub async fn create_location(
    State(state): State<AppState>,
    Json(input): Json<CreateLocation>,
) -> AppResult<impl IntoResponse> {
    input.validate()?;

    let location = state.store.create_location(&input).await?;

    tracing::info!(
        location_id = %location.id,
        total_spots = location.total_spots,
        "Parking location created"
    );

    state.event_bus.publish(
        ParkingEvent::new(LOCATION_CREATED)
            .for_location(location.id)
            .with_payload(json!({
                "name": location.name,
                "total_spots": location.total_spots,
                "current_fee": location.current_fee,
            })),
    );

    Ok((
        StatusCode::CREATED,
        Json(DataResponse {
            data: LocationOverview::from(location),
        }),
    ))
}

// ---------------------------------------------------------------------------
// PUT /management/locations/{id}/occupancy
// ---------------------------------------------------------------------------

/// Overwrite the occupied count. Out-of-range values are clamped to
/// `[0, total_spots]`.
pub async fn update_occupancy(
    State(state): State<AppState>,
    Path(id): Path<EntityId>,
    Json(input): Json<UpdateOccupancy>,
) -> AppResult<impl IntoResponse> {
    let location = state
        .store
        .set_occupancy(id, input.occupied_spots)
        .await?
        .ok_or_else(|| CoreError::not_found("ParkingLocation", id))?;

    tracing::info!(
        location_id = %id,
        requested = input.occupied_spots,
        applied = location.occupied_spots,
        "Occupancy updated"
    );

    state.event_bus.publish(occupancy_changed(&location));

    Ok(Json(DataResponse {
        data: LocationOverview::from(location),
    }))
}

// ---------------------------------------------------------------------------
// GET /management/locations/{id}/spots
// ---------------------------------------------------------------------------

pub async fn get_spot_map(
    State(state): State<AppState>,
    Path(id): Path<EntityId>,
) -> AppResult<impl IntoResponse> {
    let location = state
        .store
        .find_location(id)
        .await?
        .ok_or_else(|| CoreError::not_found("ParkingLocation", id))?;

    Ok(Json(DataResponse {
        data: SpotMap {
            location_id: location.id,
            occupancy: location.occupancy(),
            spots: spot_map(location.total_spots, location.occupied_spots),
        },
    }))
}

// ---------------------------------------------------------------------------
// POST /management/vehicles
// ---------------------------------------------------------------------------

/// Record a vehicle entering a lot.
pub async fn check_in_vehicle(
    State(state): State<AppState>,
    Json(input): Json<CreateParkedVehicle>,
) -> AppResult<impl IntoResponse> {
    let receipt =
        engine::check_in(Arc::clone(&state.store), Arc::clone(&state.event_bus), input).await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: receipt })))
}

// ---------------------------------------------------------------------------
// GET /management/vehicles
// ---------------------------------------------------------------------------

/// Check-in ledger, newest first, optionally for one location.
pub async fn list_vehicles(
    State(state): State<AppState>,
    Query(params): Query<ParkedVehicleListParams>,
) -> AppResult<impl IntoResponse> {
    let vehicles = state.store.list_vehicles(params.location_id).await?;
    Ok(Json(DataResponse { data: vehicles }))
}
