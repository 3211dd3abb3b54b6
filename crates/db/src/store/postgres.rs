use async_trait::async_trait;
use parkspot_core::types::{new_id, EntityId};
use sqlx::PgPool;

use super::{ParkingStore, SpotClaim, StoreError};
use crate::models::location::{CreateLocation, ParkingLocation};
use crate::models::parked_vehicle::ParkedVehicle;
use crate::models::reservation::Reservation;
use crate::repositories::{LocationRepo, ParkedVehicleRepo, ReservationRepo};

/// Postgres-backed store delegating to the repository layer.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ParkingStore for PgStore {
    fn backend(&self) -> &'static str {
        "postgres"
    }

    async fn health_check(&self) -> Result<(), StoreError> {
        crate::health_check(&self.pool).await?;
        Ok(())
    }

    async fn list_locations(&self) -> Result<Vec<ParkingLocation>, StoreError> {
        Ok(LocationRepo::list(&self.pool).await?)
    }

    async fn find_location(&self, id: EntityId) -> Result<Option<ParkingLocation>, StoreError> {
        Ok(LocationRepo::find_by_id(&self.pool, id).await?)
    }

    async fn create_location(
        &self,
        input: &CreateLocation,
    ) -> Result<ParkingLocation, StoreError> {
        Ok(LocationRepo::create(&self.pool, new_id(), input).await?)
    }

    async fn claim_spot(&self, id: EntityId) -> Result<SpotClaim, StoreError> {
        if let Some(location) = LocationRepo::claim_spot(&self.pool, id).await? {
            return Ok(SpotClaim::Claimed(location));
        }
        // The conditional update matched nothing: unknown or full.
        Ok(match LocationRepo::find_by_id(&self.pool, id).await? {
            Some(location) => SpotClaim::Full(location),
            None => SpotClaim::NotFound,
        })
    }

    async fn shift_occupancy(
        &self,
        id: EntityId,
        delta: i64,
    ) -> Result<Option<ParkingLocation>, StoreError> {
        Ok(LocationRepo::shift_occupancy(&self.pool, id, delta).await?)
    }

    async fn set_occupancy(
        &self,
        id: EntityId,
        requested: i64,
    ) -> Result<Option<ParkingLocation>, StoreError> {
        Ok(LocationRepo::set_occupancy(&self.pool, id, requested).await?)
    }

    async fn update_fee(
        &self,
        id: EntityId,
        fee: f64,
    ) -> Result<Option<ParkingLocation>, StoreError> {
        Ok(LocationRepo::update_fee(&self.pool, id, fee).await?)
    }

    async fn insert_reservation(&self, reservation: &Reservation) -> Result<(), StoreError> {
        Ok(ReservationRepo::insert(&self.pool, reservation).await?)
    }

    async fn delete_reservation(&self, id: EntityId) -> Result<bool, StoreError> {
        Ok(ReservationRepo::delete(&self.pool, id).await?)
    }

    async fn list_reservations(&self) -> Result<Vec<Reservation>, StoreError> {
        Ok(ReservationRepo::list(&self.pool).await?)
    }

    async fn append_vehicle(&self, vehicle: &ParkedVehicle) -> Result<ParkedVehicle, StoreError> {
        Ok(ParkedVehicleRepo::insert(&self.pool, vehicle).await?)
    }

    async fn list_vehicles(
        &self,
        location_id: Option<EntityId>,
    ) -> Result<Vec<ParkedVehicle>, StoreError> {
        Ok(ParkedVehicleRepo::list(&self.pool, location_id).await?)
    }
}
