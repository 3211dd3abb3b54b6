//! Handlers for the `/admin` resource: pricing and predictions.
//!
//! Prediction endpoints proxy the external advisor. When it is not
//! configured or fails, they answer 503 `FEATURE_UNAVAILABLE` and the rest
//! of the dashboard is unaffected.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::Json;
use parkspot_advisor::{
    AdvisorClient, AdvisorError, FeeRecommendationRequest, OccupancyPredictionRequest,
};
use parkspot_core::error::CoreError;
use parkspot_core::fees::validate_fee;
use parkspot_core::occupancy::OccupancySummary;
use parkspot_core::types::EntityId;
use parkspot_db::models::location::{LocationOverview, ParkingLocation, UpdateFee};
use parkspot_events::bus::LOCATION_FEE_CHANGED;
use parkspot_events::ParkingEvent;
use serde::{Deserialize, Serialize};
use serde_json::json;
use validator::Validate;

use crate::error::AppResult;
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Response for `GET /admin/locations`.
#[derive(Debug, Serialize)]
pub struct AdminOverview {
    pub locations: Vec<LocationOverview>,
    /// Figures summed over every location.
    pub totals: OccupancySummary,
}

/// Request body for `POST /admin/predictions/occupancy`.
#[derive(Debug, Deserialize)]
pub struct PredictOccupancyRequest {
    pub location_id: EntityId,
    /// ISO-8601 date and time; defaults to now.
    pub date_time: Option<String>,
}

/// Request body for `POST /admin/predictions/fee`.
#[derive(Debug, Deserialize)]
pub struct RecommendFeeRequest {
    pub location_id: EntityId,
    /// Fraction in `[0, 1]`; defaults to the current occupancy.
    pub predicted_occupancy: Option<f64>,
}

// ---------------------------------------------------------------------------
// GET /admin/locations
// ---------------------------------------------------------------------------

/// Every location with occupancy, plus network-wide totals.
pub async fn list_overview(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let locations = state.store.list_locations().await?;

    let (total, occupied) = locations.iter().fold((0i32, 0i32), |(t, o), l| {
        (t.saturating_add(l.total_spots), o.saturating_add(l.occupied_spots))
    });

    Ok(Json(DataResponse {
        data: AdminOverview {
            locations: locations.into_iter().map(LocationOverview::from).collect(),
            totals: OccupancySummary::new(total, occupied),
        },
    }))
}

// ---------------------------------------------------------------------------
// PUT /admin/locations/{id}/fee
// ---------------------------------------------------------------------------

pub async fn update_fee(
    State(state): State<AppState>,
    Path(id): Path<EntityId>,
    Json(input): Json<UpdateFee>,
) -> AppResult<impl IntoResponse> {
    input.validate()?;
    validate_fee(input.current_fee)?;

    let location = state
        .store
        .update_fee(id, input.current_fee)
        .await?
        .ok_or_else(|| CoreError::not_found("ParkingLocation", id))?;

    tracing::info!(location_id = %id, current_fee = location.current_fee, "Fee updated");

    state.event_bus.publish(
        ParkingEvent::new(LOCATION_FEE_CHANGED)
            .for_location(id)
            .with_payload(json!({ "current_fee": location.current_fee })),
    );

    Ok(Json(DataResponse {
        data: LocationOverview::from(location),
    }))
}

// ---------------------------------------------------------------------------
// POST /admin/predictions/occupancy
// ---------------------------------------------------------------------------

pub async fn predict_occupancy(
    State(state): State<AppState>,
    Json(input): Json<PredictOccupancyRequest>,
) -> AppResult<impl IntoResponse> {
    let advisor = require_advisor(&state)?;
    let location = find_location(&state, input.location_id).await?;

    let date_time = input
        .date_time
        .filter(|d| !d.trim().is_empty())
        .unwrap_or_else(|| chrono::Utc::now().to_rfc3339());

    let prediction = advisor
        .predict_occupancy(&OccupancyPredictionRequest {
            parking_location: location.name,
            date_time,
        })
        .await?;

    Ok(Json(DataResponse { data: prediction }))
}

// ---------------------------------------------------------------------------
// POST /admin/predictions/fee
// ---------------------------------------------------------------------------

pub async fn recommend_fee(
    State(state): State<AppState>,
    Json(input): Json<RecommendFeeRequest>,
) -> AppResult<impl IntoResponse> {
    let advisor = require_advisor(&state)?;
    let location = find_location(&state, input.location_id).await?;

    let predicted_occupancy = input
        .predicted_occupancy
        .unwrap_or_else(|| location.occupancy().percentage / 100.0);

    let recommendation = advisor
        .recommend_fee(&FeeRecommendationRequest {
            parking_location: location.name,
            current_fee: location.current_fee,
            predicted_occupancy,
        })
        .await?;

    Ok(Json(DataResponse {
        data: recommendation,
    }))
}

// ---- private helpers ----

fn require_advisor(state: &AppState) -> Result<Arc<AdvisorClient>, AdvisorError> {
    state.advisor.clone().ok_or(AdvisorError::NotConfigured)
}

async fn find_location(state: &AppState, id: EntityId) -> AppResult<ParkingLocation> {
    let location = state
        .store
        .find_location(id)
        .await?
        .ok_or_else(|| CoreError::not_found("ParkingLocation", id))?;
    Ok(location)
}
