//! Request handlers, one module per route group.
//!
//! Handlers validate input, delegate to the store or the reservation
//! engine, publish events, and map errors via [`AppError`](crate::error::AppError).

pub mod admin;
pub mod locations;
pub mod management;
pub mod reservations;
