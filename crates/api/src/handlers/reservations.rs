//! Handlers for the session-scoped `/reservations` resource.
//!
//! The session is identified by the `x-session-id` header via [`SessionId`].

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use parkspot_core::fees::DEFAULT_DURATION_HOURS;
use parkspot_db::models::reservation::{CancelReservation, CreateReservation};

use crate::engine::BookingDetails;
use crate::error::AppResult;
use crate::middleware::session::SessionId;
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// POST /reservations
// ---------------------------------------------------------------------------

/// Book a spot. Replaces the session's previous reservation, if any.
pub async fn confirm_reservation(
    SessionId(session): SessionId,
    State(state): State<AppState>,
    Json(input): Json<CreateReservation>,
) -> AppResult<impl IntoResponse> {
    let booking = BookingDetails {
        vehicle_number: input.vehicle_number,
        vehicle_type: input.vehicle_type,
        duration_hours: input.duration_hours.unwrap_or(DEFAULT_DURATION_HOURS),
    };

    let reservation = state
        .reservations
        .confirm(&session, input.location_id, booking)
        .await?;

    Ok((StatusCode::CREATED, Json(DataResponse { data: reservation })))
}

// ---------------------------------------------------------------------------
// GET /reservations/current
// ---------------------------------------------------------------------------

/// The session's reservation with its remaining hold time, or `null`.
pub async fn current_reservation(
    SessionId(session): SessionId,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    let current = state.reservations.current(&session).await;
    Ok(Json(DataResponse { data: current }))
}

// ---------------------------------------------------------------------------
// POST /reservations/cancel
// ---------------------------------------------------------------------------

/// Cancel the session's reservation at a location.
///
/// Returns the released reservation, or `null` when there was nothing to
/// cancel.
pub async fn cancel_reservation(
    SessionId(session): SessionId,
    State(state): State<AppState>,
    Json(input): Json<CancelReservation>,
) -> AppResult<impl IntoResponse> {
    let released = state
        .reservations
        .cancel(&session, input.location_id, input.silent)
        .await?;

    if released.is_none() {
        tracing::debug!(location_id = %input.location_id, "Nothing to cancel");
    }

    Ok(Json(DataResponse { data: released }))
}
