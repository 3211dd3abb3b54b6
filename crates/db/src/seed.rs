//! Sample locations used to populate an empty development store.

use crate::models::location::CreateLocation;

/// Three sample lots with their hourly fees.
pub fn sample_locations() -> Vec<CreateLocation> {
    [
        ("Connaught Place Parking", "Inner Circle, New Delhi", 500, 150.0),
        ("Indiranagar Metro Lot", "CMH Road, Bangalore", 200, 100.0),
        (
            "Mumbai Airport Parking",
            "Chhatrapati Shivaji Maharaj Int'l",
            1500,
            250.0,
        ),
    ]
    .into_iter()
    .map(|(name, address, total_spots, current_fee)| CreateLocation {
        name: name.to_string(),
        address: address.to_string(),
        total_spots,
        current_fee,
        image_url: None,
        owner_id: None,
    })
    .collect()
}

#[cfg(test)]
mod tests {
    use validator::Validate;

    use super::*;

    #[test]
    fn samples_pass_validation() {
        for location in sample_locations() {
            assert!(location.validate().is_ok(), "{} should validate", location.name);
        }
    }
}
