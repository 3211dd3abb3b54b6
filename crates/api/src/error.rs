use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use parkspot_advisor::AdvisorError;
use parkspot_core::error::CoreError;
use parkspot_db::store::StoreError;
use serde_json::json;

/// Application-level error type for HTTP handlers and the reservation engine.
///
/// Wraps [`CoreError`] for domain errors plus storage and advisor failures.
/// Implements [`IntoResponse`] to produce consistent JSON error responses.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// A domain-level error from `parkspot_core`.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// A storage backend failure (persistence-write failure).
    #[error(transparent)]
    Store(#[from] StoreError),

    /// The external advisor is disabled, unreachable or misbehaving.
    #[error(transparent)]
    Advisor(#[from] AdvisorError),
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        AppError::Core(CoreError::Validation(errors.to_string()))
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            // --- CoreError variants ---
            AppError::Core(core) => match core {
                CoreError::NotFound { entity, id } => (
                    StatusCode::NOT_FOUND,
                    "NOT_FOUND",
                    format!("{entity} with id {id} not found"),
                ),
                CoreError::CapacityExhausted { .. } => (
                    StatusCode::CONFLICT,
                    "CAPACITY_EXHAUSTED",
                    core.to_string(),
                ),
                CoreError::Validation(msg) => {
                    (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone())
                }
                CoreError::Internal(msg) => {
                    tracing::error!(error = %msg, "Internal core error");
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "INTERNAL_ERROR",
                        "An internal error occurred".to_string(),
                    )
                }
            },

            // --- Storage errors ---
            AppError::Store(err) => classify_store_error(err),

            // --- Advisor errors ---
            AppError::Advisor(err) => classify_advisor_error(err),
        };

        let body = json!({
            "error": message,
            "code": code,
        });

        (status, axum::Json(body)).into_response()
    }
}

/// Classify a storage error into an HTTP status, error code, and message.
///
/// - `RowNotFound` maps to 404.
/// - Everything else is a failed write or read and maps to 500 with a
///   sanitized message; the caller has already rolled back local state.
fn classify_store_error(err: &StoreError) -> (StatusCode, &'static str, String) {
    match err {
        StoreError::Database(sqlx::Error::RowNotFound) => (
            StatusCode::NOT_FOUND,
            "NOT_FOUND",
            "Resource not found".to_string(),
        ),
        other => {
            tracing::error!(error = %other, "Storage error");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "PERSISTENCE_ERROR",
                "The change could not be saved; nothing was modified".to_string(),
            )
        }
    }
}

/// Advisor failures never break the dashboard: they surface as a
/// disabled-feature notice, except for caller mistakes.
fn classify_advisor_error(err: &AdvisorError) -> (StatusCode, &'static str, String) {
    match err {
        AdvisorError::InvalidRequest(msg) => {
            (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone())
        }
        AdvisorError::NotConfigured => (
            StatusCode::SERVICE_UNAVAILABLE,
            "FEATURE_UNAVAILABLE",
            "The prediction feature is not configured".to_string(),
        ),
        other => {
            tracing::warn!(error = %other, "Advisor call failed");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                "FEATURE_UNAVAILABLE",
                "The prediction feature is temporarily unavailable".to_string(),
            )
        }
    }
}
