//! Storage backend abstraction.
//!
//! [`ParkingStore`] is the seam between the reservation engine / handlers and
//! persistence. [`PgStore`] delegates to the sqlx repositories; [`MemoryStore`]
//! keeps everything in process for development and tests. Both implement the
//! occupancy operations atomically, so the `0 <= occupied <= total` invariant
//! holds under concurrent requests.

mod memory;
mod postgres;

use async_trait::async_trait;
use parkspot_core::types::EntityId;

use crate::models::location::{CreateLocation, ParkingLocation};
use crate::models::parked_vehicle::ParkedVehicle;
use crate::models::reservation::Reservation;

pub use memory::MemoryStore;
pub use postgres::PgStore;

/// Errors surfaced by a storage backend.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// A database error from sqlx.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// The backend refused or failed the write for a non-database reason.
    #[error("Storage unavailable: {0}")]
    Unavailable(String),
}

/// Outcome of trying to take one spot at a location.
#[derive(Debug, Clone)]
pub enum SpotClaim {
    /// A spot was taken; carries the updated location.
    Claimed(ParkingLocation),
    /// The location has no free spots; carries the unchanged location.
    Full(ParkingLocation),
    /// No location with that id.
    NotFound,
}

/// Persistence operations needed by the service.
#[async_trait]
pub trait ParkingStore: Send + Sync {
    /// Short backend name for logs and health output.
    fn backend(&self) -> &'static str;

    async fn health_check(&self) -> Result<(), StoreError>;

    // -- Locations --

    async fn list_locations(&self) -> Result<Vec<ParkingLocation>, StoreError>;

    async fn find_location(&self, id: EntityId) -> Result<Option<ParkingLocation>, StoreError>;

    /// Create a location with zero occupancy.
    async fn create_location(
        &self,
        input: &CreateLocation,
    ) -> Result<ParkingLocation, StoreError>;

    /// Atomically take one spot if `occupied < total`.
    async fn claim_spot(&self, id: EntityId) -> Result<SpotClaim, StoreError>;

    /// Atomically add `delta` to the occupancy, clamped to `[0, total]`.
    /// `None` if the location is unknown.
    async fn shift_occupancy(
        &self,
        id: EntityId,
        delta: i64,
    ) -> Result<Option<ParkingLocation>, StoreError>;

    /// Overwrite the occupancy with `clamp(requested, 0, total)`.
    /// `None` if the location is unknown.
    async fn set_occupancy(
        &self,
        id: EntityId,
        requested: i64,
    ) -> Result<Option<ParkingLocation>, StoreError>;

    async fn update_fee(
        &self,
        id: EntityId,
        fee: f64,
    ) -> Result<Option<ParkingLocation>, StoreError>;

    // -- Reservations --

    async fn insert_reservation(&self, reservation: &Reservation) -> Result<(), StoreError>;

    /// Returns `true` if a reservation was removed.
    async fn delete_reservation(&self, id: EntityId) -> Result<bool, StoreError>;

    async fn list_reservations(&self) -> Result<Vec<Reservation>, StoreError>;

    // -- Check-in ledger --

    async fn append_vehicle(&self, vehicle: &ParkedVehicle) -> Result<ParkedVehicle, StoreError>;

    async fn list_vehicles(
        &self,
        location_id: Option<EntityId>,
    ) -> Result<Vec<ParkedVehicle>, StoreError>;
}
