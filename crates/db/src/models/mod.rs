pub mod location;
pub mod parked_vehicle;
pub mod reservation;
