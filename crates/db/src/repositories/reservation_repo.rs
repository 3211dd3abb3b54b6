//! Repository for the `reservations` table (active holds only).

use parkspot_core::types::EntityId;
use sqlx::PgPool;

use crate::models::reservation::Reservation;

const COLUMNS: &str = "\
    id, session_id, location_id, location_name, vehicle_number, vehicle_type, \
    duration_hours, final_fee, booked_at, expires_at";

pub struct ReservationRepo;

impl ReservationRepo {
    /// Persist a freshly confirmed reservation.
    pub async fn insert(pool: &PgPool, reservation: &Reservation) -> Result<(), sqlx::Error> {
        sqlx::query(
            "INSERT INTO reservations \
                (id, session_id, location_id, location_name, vehicle_number, vehicle_type, \
                 duration_hours, final_fee, booked_at, expires_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)",
        )
        .bind(reservation.id)
        .bind(&reservation.session_id)
        .bind(reservation.location_id)
        .bind(&reservation.location_name)
        .bind(&reservation.vehicle_number)
        .bind(&reservation.vehicle_type)
        .bind(reservation.duration_hours)
        .bind(reservation.final_fee)
        .bind(reservation.booked_at)
        .bind(reservation.expires_at)
        .execute(pool)
        .await?;
        Ok(())
    }

    /// Delete a reservation. Returns `true` if a row was removed.
    pub async fn delete(pool: &PgPool, id: EntityId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM reservations WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// All persisted reservations, oldest first.
    pub async fn list(pool: &PgPool) -> Result<Vec<Reservation>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM reservations ORDER BY booked_at ASC");
        sqlx::query_as::<_, Reservation>(&query)
            .fetch_all(pool)
            .await
    }
}
