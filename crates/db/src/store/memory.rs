use async_trait::async_trait;
use chrono::Utc;
use parkspot_core::occupancy::{clamp_occupancy, has_capacity, shift_occupancy};
use parkspot_core::types::{new_id, EntityId};
use tokio::sync::RwLock;

use super::{ParkingStore, SpotClaim, StoreError};
use crate::models::location::{CreateLocation, ParkingLocation};
use crate::models::parked_vehicle::ParkedVehicle;
use crate::models::reservation::Reservation;

#[derive(Default)]
struct Collections {
    locations: Vec<ParkingLocation>,
    reservations: Vec<Reservation>,
    vehicles: Vec<ParkedVehicle>,
}

impl Collections {
    fn location_mut(&mut self, id: EntityId) -> Option<&mut ParkingLocation> {
        self.locations.iter_mut().find(|l| l.id == id)
    }
}

/// In-process store. Every operation runs under one write lock, which makes
/// the read-modify-write occupancy updates atomic.
#[derive(Default)]
pub struct MemoryStore {
    inner: RwLock<Collections>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store pre-populated with the given locations.
    pub async fn with_locations(inputs: &[CreateLocation]) -> Result<Self, StoreError> {
        let store = Self::new();
        for input in inputs {
            store.create_location(input).await?;
        }
        Ok(store)
    }
}

fn update_occupancy(location: &mut ParkingLocation, occupied: i32) -> ParkingLocation {
    location.occupied_spots = occupied;
    location.updated_at = Utc::now();
    location.clone()
}

#[async_trait]
impl ParkingStore for MemoryStore {
    fn backend(&self) -> &'static str {
        "memory"
    }

    async fn health_check(&self) -> Result<(), StoreError> {
        Ok(())
    }

    async fn list_locations(&self) -> Result<Vec<ParkingLocation>, StoreError> {
        Ok(self.inner.read().await.locations.clone())
    }

    async fn find_location(&self, id: EntityId) -> Result<Option<ParkingLocation>, StoreError> {
        Ok(self
            .inner
            .read()
            .await
            .locations
            .iter()
            .find(|l| l.id == id)
            .cloned())
    }

    async fn create_location(
        &self,
        input: &CreateLocation,
    ) -> Result<ParkingLocation, StoreError> {
        let now = Utc::now();
        let location = ParkingLocation {
            id: new_id(),
            name: input.name.clone(),
            address: input.address.clone(),
            total_spots: input.total_spots,
            occupied_spots: 0,
            current_fee: input.current_fee,
            image_url: input.image_url.clone(),
            owner_id: input.owner_id.clone(),
            created_at: now,
            updated_at: now,
        };
        self.inner.write().await.locations.push(location.clone());
        Ok(location)
    }

    async fn claim_spot(&self, id: EntityId) -> Result<SpotClaim, StoreError> {
        let mut inner = self.inner.write().await;
        let Some(location) = inner.location_mut(id) else {
            return Ok(SpotClaim::NotFound);
        };
        if !has_capacity(location.total_spots, location.occupied_spots) {
            return Ok(SpotClaim::Full(location.clone()));
        }
        let occupied = location.occupied_spots + 1;
        Ok(SpotClaim::Claimed(update_occupancy(location, occupied)))
    }

    async fn shift_occupancy(
        &self,
        id: EntityId,
        delta: i64,
    ) -> Result<Option<ParkingLocation>, StoreError> {
        let mut inner = self.inner.write().await;
        Ok(inner.location_mut(id).map(|location| {
            let occupied = shift_occupancy(location.occupied_spots, delta, location.total_spots);
            update_occupancy(location, occupied)
        }))
    }

    async fn set_occupancy(
        &self,
        id: EntityId,
        requested: i64,
    ) -> Result<Option<ParkingLocation>, StoreError> {
        let mut inner = self.inner.write().await;
        Ok(inner.location_mut(id).map(|location| {
            let occupied = clamp_occupancy(requested, location.total_spots);
            update_occupancy(location, occupied)
        }))
    }

    async fn update_fee(
        &self,
        id: EntityId,
        fee: f64,
    ) -> Result<Option<ParkingLocation>, StoreError> {
        let mut inner = self.inner.write().await;
        Ok(inner.location_mut(id).map(|location| {
            location.current_fee = fee;
            location.updated_at = Utc::now();
            location.clone()
        }))
    }

    async fn insert_reservation(&self, reservation: &Reservation) -> Result<(), StoreError> {
        self.inner.write().await.reservations.push(reservation.clone());
        Ok(())
    }

    async fn delete_reservation(&self, id: EntityId) -> Result<bool, StoreError> {
        let mut inner = self.inner.write().await;
        let before = inner.reservations.len();
        inner.reservations.retain(|r| r.id != id);
        Ok(inner.reservations.len() < before)
    }

    async fn list_reservations(&self) -> Result<Vec<Reservation>, StoreError> {
        Ok(self.inner.read().await.reservations.clone())
    }

    async fn append_vehicle(&self, vehicle: &ParkedVehicle) -> Result<ParkedVehicle, StoreError> {
        self.inner.write().await.vehicles.push(vehicle.clone());
        Ok(vehicle.clone())
    }

    async fn list_vehicles(
        &self,
        location_id: Option<EntityId>,
    ) -> Result<Vec<ParkedVehicle>, StoreError> {
        let inner = self.inner.read().await;
        Ok(inner
            .vehicles
            .iter()
            .rev()
            .filter(|v| location_id.map_or(true, |id| v.location_id == id))
            .cloned()
            .collect())
    }
}
