//! Client for the optional external prediction service that suggests
//! occupancy forecasts and parking fees.

pub mod client;

pub use client::{
    AdvisorClient, AdvisorError, FeeRecommendation, FeeRecommendationRequest,
    OccupancyPrediction, OccupancyPredictionRequest,
};
