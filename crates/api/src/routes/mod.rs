pub mod admin;
pub mod health;
pub mod locations;
pub mod management;
pub mod reservations;

use axum::routing::get;
use axum::Router;

use crate::state::AppState;
use crate::ws;

/// Build the `/api/v1` route tree.
///
/// Route groups stand in for the three roles of the dashboard: drivers
/// browse and book, lot managers run the desk, admins set prices.
///
/// ```text
/// /ws                                          live occupancy feed
///
/// /locations                                   list with occupancy
/// /locations/{id}                              one location
/// /locations/{id}/trend?time=HH:MM             weekly trend
///
/// /reservations                                confirm (POST)
/// /reservations/current                        session's booking
/// /reservations/cancel                         cancel (POST)
///
/// /management/locations                        create (POST)
/// /management/locations/{id}/occupancy         manual edit (PUT)
/// /management/locations/{id}/spots             spot map
/// /management/vehicles                         check in (POST), ledger (GET)
///
/// /admin/locations                             overview with occupancy
/// /admin/locations/{id}/fee                    set fee (PUT)
/// /admin/predictions/occupancy                 forecast (POST)
/// /admin/predictions/fee                       fee suggestion (POST)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/ws", get(ws::ws_handler))
        .nest("/locations", locations::router())
        .nest("/reservations", reservations::router())
        .nest("/management", management::router())
        .nest("/admin", admin::router())
}
