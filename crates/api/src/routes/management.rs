//! Route definitions for the lot-manager desk.

use axum::routing::{get, post, put};
use axum::Router;

use crate::handlers::management;
use crate::state::AppState;

/// Routes mounted at `/management`.
///
/// ```text
/// POST   /locations                  -> create_location
/// PUT    /locations/{id}/occupancy   -> update_occupancy
/// GET    /locations/{id}/spots       -> get_spot_map
/// POST   /vehicles                   -> check_in_vehicle
/// GET    /vehicles                   -> list_vehicles
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/locations", post(management::create_location))
        .route("/locations/{id}/occupancy", put(management::update_occupancy))
        .route("/locations/{id}/spots", get(management::get_spot_map))
        .route(
            "/vehicles",
            get(management::list_vehicles).post(management::check_in_vehicle),
        )
}
