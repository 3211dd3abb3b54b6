//! Route definitions for the `/locations` resource.

use axum::routing::get;
use axum::Router;

use crate::handlers::locations;
use crate::state::AppState;

/// Routes mounted at `/locations`.
///
/// ```text
/// GET    /                 -> list_locations
/// GET    /{id}             -> get_location
/// GET    /{id}/trend       -> get_trend
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(locations::list_locations))
        .route("/{id}", get(locations::get_location))
        .route("/{id}/trend", get(locations::get_trend))
}
