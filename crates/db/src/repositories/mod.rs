//! Repository layer: one zero-sized struct per table with async
//! associated functions taking a `&PgPool`.

pub mod location_repo;
pub mod parked_vehicle_repo;
pub mod reservation_repo;

pub use location_repo::LocationRepo;
pub use parked_vehicle_repo::ParkedVehicleRepo;
pub use reservation_repo::ReservationRepo;
