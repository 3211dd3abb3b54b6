//! Session identification extractor for Axum handlers.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use parkspot_core::error::CoreError;
use parkspot_core::types::SessionKey;

use crate::error::AppError;
use crate::state::AppState;

/// Header carrying the client-generated session id.
pub const SESSION_HEADER: &str = "x-session-id";

/// Longest session id accepted.
pub const MAX_SESSION_ID_LEN: usize = 128;

/// Session id taken from the `x-session-id` header.
///
/// ```ignore
/// async fn current(SessionId(session): SessionId) -> AppResult<Json<()>> {
///     tracing::info!(%session, "handling request");
///     Ok(Json(()))
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionId(pub SessionKey);

impl FromRequestParts<AppState> for SessionId {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        _state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let value = parts
            .headers
            .get(SESSION_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .ok_or_else(|| {
                AppError::Core(CoreError::Validation(format!(
                    "Missing {SESSION_HEADER} header"
                )))
            })?;

        if value.len() > MAX_SESSION_ID_LEN {
            return Err(AppError::Core(CoreError::Validation(format!(
                "{SESSION_HEADER} must be at most {MAX_SESSION_ID_LEN} characters"
            ))));
        }

        Ok(SessionId(value.to_string()))
    }
}
