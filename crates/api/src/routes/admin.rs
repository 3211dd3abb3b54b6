//! Route definitions for the `/admin` resource.

use axum::routing::{get, post, put};
use axum::Router;

use crate::handlers::admin;
use crate::state::AppState;

/// Routes mounted at `/admin`.
///
/// ```text
/// GET    /locations                 -> list_overview
/// PUT    /locations/{id}/fee        -> update_fee
/// POST   /predictions/occupancy     -> predict_occupancy
/// POST   /predictions/fee           -> recommend_fee
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/locations", get(admin::list_overview))
        .route("/locations/{id}/fee", put(admin::update_fee))
        .route("/predictions/occupancy", post(admin::predict_occupancy))
        .route("/predictions/fee", post(admin::recommend_fee))
}
