//! Repository for the `parked_vehicles` ledger. Insert and read only.

use parkspot_core::types::EntityId;
use sqlx::PgPool;

use crate::models::parked_vehicle::ParkedVehicle;

const COLUMNS: &str = "\
    id, location_id, location_name, vehicle_number, vehicle_type, \
    check_in_time, duration_hours, charges_paid, mobile_number";

pub struct ParkedVehicleRepo;

impl ParkedVehicleRepo {
    /// Append a check-in record, returning the stored row.
    pub async fn insert(
        pool: &PgPool,
        vehicle: &ParkedVehicle,
    ) -> Result<ParkedVehicle, sqlx::Error> {
        let query = format!(
            "INSERT INTO parked_vehicles \
                (id, location_id, location_name, vehicle_number, vehicle_type, \
                 check_in_time, duration_hours, charges_paid, mobile_number) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ParkedVehicle>(&query)
            .bind(vehicle.id)
            .bind(vehicle.location_id)
            .bind(&vehicle.location_name)
            .bind(&vehicle.vehicle_number)
            .bind(&vehicle.vehicle_type)
            .bind(vehicle.check_in_time)
            .bind(vehicle.duration_hours)
            .bind(vehicle.charges_paid)
            .bind(&vehicle.mobile_number)
            .fetch_one(pool)
            .await
    }

    /// List the ledger, newest first, optionally for one location.
    pub async fn list(
        pool: &PgPool,
        location_id: Option<EntityId>,
    ) -> Result<Vec<ParkedVehicle>, sqlx::Error> {
        match location_id {
            Some(location_id) => {
                let query = format!(
                    "SELECT {COLUMNS} FROM parked_vehicles WHERE location_id = $1 \
                     ORDER BY check_in_time DESC"
                );
                sqlx::query_as::<_, ParkedVehicle>(&query)
                    .bind(location_id)
                    .fetch_all(pool)
                    .await
            }
            None => {
                let query =
                    format!("SELECT {COLUMNS} FROM parked_vehicles ORDER BY check_in_time DESC");
                sqlx::query_as::<_, ParkedVehicle>(&query)
                    .fetch_all(pool)
                    .await
            }
        }
    }
}
