//! Handlers for the public `/locations` resource.

use axum::extract::{Path, Query, State};
use axum::response::IntoResponse;
use axum::Json;
use parkspot_core::error::CoreError;
use parkspot_core::trend::weekly_trend;
use parkspot_core::types::EntityId;
use parkspot_db::models::location::LocationOverview;
use serde::Deserialize;

use crate::error::AppResult;
use crate::response::DataResponse;
use crate::state::AppState;

/// Query parameters for `GET /locations/{id}/trend`.
#[derive(Debug, Deserialize)]
pub struct TrendParams {
    /// Time of day as `HH:MM`; defaults to the current UTC time.
    pub time: Option<String>,
}

// ---------------------------------------------------------------------------
// GET /locations
// ---------------------------------------------------------------------------

/// List every location with its occupancy figures.
pub async fn list_locations(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let locations: Vec<LocationOverview> = state
        .store
        .list_locations()
        .await?
        .into_iter()
        .map(LocationOverview::from)
        .collect();

    Ok(Json(DataResponse { data: locations }))
}

// ---------------------------------------------------------------------------
// GET /locations/{id}
// ---------------------------------------------------------------------------

pub async fn get_location(
    State(state): State<AppState>,
    Path(id): Path<EntityId>,
) -> AppResult<impl IntoResponse> {
    let location = state
        .store
        .find_location(id)
        .await?
        .ok_or_else(|| CoreError::not_found("ParkingLocation", id))?;

    Ok(Json(DataResponse {
        data: LocationOverview::from(location),
    }))
}

// ---------------------------------------------------------------------------
// GET /locations/{id}/trend
// ---------------------------------------------------------------------------

/// Seven-day occupancy trend for a location at a time of day.
pub async fn get_trend(
    State(state): State<AppState>,
    Path(id): Path<EntityId>,
    Query(params): Query<TrendParams>,
) -> AppResult<impl IntoResponse> {
    if state.store.find_location(id).await?.is_none() {
        return Err(CoreError::not_found("ParkingLocation", id).into());
    }

    let time = params
        .time
        .unwrap_or_else(|| chrono::Utc::now().format("%H:%M").to_string());
    let points = weekly_trend(&id.to_string(), time.trim())?;

    Ok(Json(DataResponse { data: points }))
}
