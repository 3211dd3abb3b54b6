//! Repository for the `parking_locations` table.
//!
//! All occupancy writes are single statements so that concurrent requests
//! cannot lose updates: claims are conditional increments and every other
//! change is clamped to `[0, total_spots]` inside the `UPDATE`.

use parkspot_core::types::EntityId;
use sqlx::PgPool;

use crate::models::location::{CreateLocation, ParkingLocation};

/// Column list for `parking_locations` queries.
const COLUMNS: &str = "\
    id, name, address, total_spots, occupied_spots, current_fee, \
    image_url, owner_id, created_at, updated_at";

/// Provides CRUD and occupancy operations for parking locations.
pub struct LocationRepo;

impl LocationRepo {
    /// Insert a new location with zero occupancy, returning the full row.
    pub async fn create(
        pool: &PgPool,
        id: EntityId,
        input: &CreateLocation,
    ) -> Result<ParkingLocation, sqlx::Error> {
        let query = format!(
            "INSERT INTO parking_locations \
                (id, name, address, total_spots, occupied_spots, current_fee, image_url, owner_id) \
             VALUES ($1, $2, $3, $4, 0, $5, $6, $7) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ParkingLocation>(&query)
            .bind(id)
            .bind(&input.name)
            .bind(&input.address)
            .bind(input.total_spots)
            .bind(input.current_fee)
            .bind(&input.image_url)
            .bind(&input.owner_id)
            .fetch_one(pool)
            .await
    }

    /// Find a location by ID.
    pub async fn find_by_id(
        pool: &PgPool,
        id: EntityId,
    ) -> Result<Option<ParkingLocation>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM parking_locations WHERE id = $1");
        sqlx::query_as::<_, ParkingLocation>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List all locations in creation order.
    pub async fn list(pool: &PgPool) -> Result<Vec<ParkingLocation>, sqlx::Error> {
        let query =
            format!("SELECT {COLUMNS} FROM parking_locations ORDER BY created_at ASC, id ASC");
        sqlx::query_as::<_, ParkingLocation>(&query)
            .fetch_all(pool)
            .await
    }

    /// Take one spot if any is free.
    ///
    /// Returns `None` when the location is unknown *or* full; callers tell the
    /// two apart with [`find_by_id`](Self::find_by_id).
    pub async fn claim_spot(
        pool: &PgPool,
        id: EntityId,
    ) -> Result<Option<ParkingLocation>, sqlx::Error> {
        let query = format!(
            "UPDATE parking_locations \
             SET occupied_spots = occupied_spots + 1, updated_at = NOW() \
             WHERE id = $1 AND occupied_spots < total_spots \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ParkingLocation>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Add `delta` to the occupancy, clamped to `[0, total_spots]`.
    pub async fn shift_occupancy(
        pool: &PgPool,
        id: EntityId,
        delta: i64,
    ) -> Result<Option<ParkingLocation>, sqlx::Error> {
        let query = format!(
            "UPDATE parking_locations \
             SET occupied_spots = \
                     LEAST(GREATEST(occupied_spots::BIGINT + $2, 0), total_spots)::INT, \
                 updated_at = NOW() \
             WHERE id = $1 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ParkingLocation>(&query)
            .bind(id)
            .bind(delta)
            .fetch_optional(pool)
            .await
    }

    /// Overwrite the occupancy with `requested`, clamped to `[0, total_spots]`.
    pub async fn set_occupancy(
        pool: &PgPool,
        id: EntityId,
        requested: i64,
    ) -> Result<Option<ParkingLocation>, sqlx::Error> {
        let query = format!(
            "UPDATE parking_locations \
             SET occupied_spots = LEAST(GREATEST($2::BIGINT, 0), total_spots)::INT, \
                 updated_at = NOW() \
             WHERE id = $1 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ParkingLocation>(&query)
            .bind(id)
            .bind(requested)
            .fetch_optional(pool)
            .await
    }

    /// Change the hourly fee. Returns the updated row if found.
    pub async fn update_fee(
        pool: &PgPool,
        id: EntityId,
        fee: f64,
    ) -> Result<Option<ParkingLocation>, sqlx::Error> {
        let query = format!(
            "UPDATE parking_locations SET current_fee = $2, updated_at = NOW() \
             WHERE id = $1 RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ParkingLocation>(&query)
            .bind(id)
            .bind(fee)
            .fetch_optional(pool)
            .await
    }
}
