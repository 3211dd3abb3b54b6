//! Route definitions for the `/reservations` resource.
//!
//! Every route requires the `x-session-id` header.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::reservations;
use crate::state::AppState;

/// Routes mounted at `/reservations`.
///
/// ```text
/// POST   /                 -> confirm_reservation
/// GET    /current          -> current_reservation
/// POST   /cancel           -> cancel_reservation
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(reservations::confirm_reservation))
        .route("/current", get(reservations::current_reservation))
        .route("/cancel", post(reservations::cancel_reservation))
}
