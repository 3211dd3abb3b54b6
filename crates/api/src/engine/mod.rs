//! Stateful operations that coordinate the store, the event bus and
//! in-memory session state.
//!
//! - [`ReservationManager`] -- one timed reservation per session.
//! - [`check_in`] -- manual vehicle entry at the management desk.
//!
//! Operations that make more than one store write run on their own task
//! through [`run_to_completion`], so a request that is dropped half way
//! (timeout, client disconnect) cannot stop them between two writes.

mod check_in;
mod reservations;

use std::future::Future;

use parkspot_core::error::CoreError;

use crate::error::AppResult;

pub use check_in::{check_in, CheckInReceipt};
pub use reservations::{ActiveReservation, BookingDetails, ReservationManager, EXPIRY_RETRY_SECS};

/// Spawn `operation` and wait for it. The operation keeps running if the
/// caller's future is dropped.
async fn run_to_completion<T, F>(operation: F) -> AppResult<T>
where
    F: Future<Output = AppResult<T>> + Send + 'static,
    T: Send + 'static,
{
    tokio::spawn(operation)
        .await
        .map_err(|e| CoreError::Internal(format!("Engine task failed: {e}")))?
}
