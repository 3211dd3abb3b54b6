//! Parkspot event bus.
//!
//! - [`EventBus`]: in-process publish/subscribe hub backed by
//!   `tokio::sync::broadcast`.
//! - [`ParkingEvent`]: the domain event envelope pushed to live subscribers.

pub mod bus;

pub use bus::{EventBus, ParkingEvent};
