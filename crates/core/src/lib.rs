//! Parkspot domain logic.
//!
//! Pure functions and value types shared by the storage and API layers.
//! This crate has no internal dependencies.

pub mod error;
pub mod fees;
pub mod occupancy;
pub mod reservation;
pub mod trend;
pub mod types;
pub mod vehicle;
