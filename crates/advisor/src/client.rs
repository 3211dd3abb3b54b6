//! REST client for the external occupancy / fee advisor.
//!
//! The advisor is an opaque, best-effort service. Two endpoints are used:
//!
//! - `POST {base}/predict-occupancy` for an occupancy forecast at a given
//!   time, with a suggested fee.
//! - `POST {base}/recommend-fee` for a fee suggestion given a predicted
//!   occupancy fraction.
//!
//! Replies are range-checked before they are handed to callers.

use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// Default request timeout for advisor calls.
pub const DEFAULT_TIMEOUT_SECS: u64 = 20;

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

/// Request for an occupancy forecast.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OccupancyPredictionRequest {
    /// Name or id of the parking location.
    pub parking_location: String,
    /// ISO-8601 date and time to forecast.
    pub date_time: String,
}

/// Forecast returned by the advisor.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OccupancyPrediction {
    /// Percentage in `[0, 100]`.
    pub predicted_occupancy_rate: f64,
    pub recommended_parking_fee: f64,
    pub reasoning: String,
}

/// Request for a fee recommendation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeeRecommendationRequest {
    pub parking_location: String,
    pub current_fee: f64,
    /// Fraction in `[0, 1]` (0.75 for 75 %).
    pub predicted_occupancy: f64,
}

/// Fee recommendation returned by the advisor.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeeRecommendation {
    pub recommended_fee: f64,
    pub reasoning: String,
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors from the advisor client.
#[derive(Debug, thiserror::Error)]
pub enum AdvisorError {
    /// No advisor base URL is configured; the feature is disabled.
    #[error("Advisor service is not configured")]
    NotConfigured,

    /// The HTTP request itself failed (network, DNS, TLS, timeout).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The advisor returned a non-2xx status code.
    #[error("Advisor API error ({status}): {body}")]
    ApiError { status: u16, body: String },

    /// The advisor replied with values outside the agreed ranges.
    #[error("Advisor returned an invalid response: {0}")]
    InvalidResponse(String),

    /// The caller sent values outside the agreed ranges.
    #[error("Invalid advisor request: {0}")]
    InvalidRequest(String),
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

/// HTTP client for one advisor deployment.
pub struct AdvisorClient {
    client: reqwest::Client,
    base_url: String,
}

impl AdvisorClient {
    /// Create a client for `base_url` with the given request timeout.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, AdvisorError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self::with_client(client, base_url))
    }

    /// Create a client reusing an existing [`reqwest::Client`].
    pub fn with_client(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { client, base_url }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Forecast occupancy for a location at a point in time.
    pub async fn predict_occupancy(
        &self,
        request: &OccupancyPredictionRequest,
    ) -> Result<OccupancyPrediction, AdvisorError> {
        if request.parking_location.trim().is_empty() {
            return Err(AdvisorError::InvalidRequest("parking location is required".into()));
        }

        let prediction: OccupancyPrediction = self.post("predict-occupancy", request).await?;

        if !(0.0..=100.0).contains(&prediction.predicted_occupancy_rate) {
            return Err(AdvisorError::InvalidResponse(format!(
                "predicted occupancy rate {} is outside 0-100",
                prediction.predicted_occupancy_rate
            )));
        }
        check_fee("recommended parking fee", prediction.recommended_parking_fee)?;
        Ok(prediction)
    }

    /// Recommend a fee for a location given its predicted occupancy.
    pub async fn recommend_fee(
        &self,
        request: &FeeRecommendationRequest,
    ) -> Result<FeeRecommendation, AdvisorError> {
        if !(0.0..=1.0).contains(&request.predicted_occupancy) {
            return Err(AdvisorError::InvalidRequest(format!(
                "predicted occupancy {} is outside 0-1",
                request.predicted_occupancy
            )));
        }
        if !request.current_fee.is_finite() || request.current_fee < 0.0 {
            return Err(AdvisorError::InvalidRequest(format!(
                "current fee {} must be non-negative",
                request.current_fee
            )));
        }

        let recommendation: FeeRecommendation = self.post("recommend-fee", request).await?;
        check_fee("recommended fee", recommendation.recommended_fee)?;
        Ok(recommendation)
    }

    // ---- private helpers ----

    async fn post<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, AdvisorError> {
        let url = format!("{}/{path}", self.base_url);
        tracing::debug!(%url, "Calling advisor");

        let response = self.client.post(url).json(body).send().await?;
        let response = Self::ensure_success(response).await?;
        Ok(response.json::<T>().await?)
    }

    /// Map non-2xx responses to [`AdvisorError::ApiError`] with the body text.
    async fn ensure_success(
        response: reqwest::Response,
    ) -> Result<reqwest::Response, AdvisorError> {
        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(AdvisorError::ApiError {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response)
    }
}

fn check_fee(what: &str, fee: f64) -> Result<(), AdvisorError> {
    if fee.is_finite() && fee >= 0.0 {
        Ok(())
    } else {
        Err(AdvisorError::InvalidResponse(format!(
            "{what} {fee} must be non-negative"
        )))
    }
}
