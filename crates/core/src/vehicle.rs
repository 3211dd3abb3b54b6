//! Vehicle types and input validation for bookings and manual check-ins.

use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Minimum vehicle number length accepted at the manual entry desk.
pub const MIN_CHECK_IN_VEHICLE_NUMBER_LEN: usize = 3;

/// Maximum stored vehicle number length.
pub const MAX_VEHICLE_NUMBER_LEN: usize = 32;

static MOBILE_NUMBER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{10}$").expect("valid regex"));

static VEHICLE_NUMBER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9][A-Za-z0-9 \-]*$").expect("valid regex"));

/// Kind of vehicle occupying a spot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VehicleType {
    #[serde(rename = "2w")]
    TwoWheeler,
    #[serde(rename = "4w")]
    FourWheeler,
    #[serde(rename = "auto")]
    Auto,
}

impl VehicleType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::TwoWheeler => "2w",
            Self::FourWheeler => "4w",
            Self::Auto => "auto",
        }
    }
}

impl fmt::Display for VehicleType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for VehicleType {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "2w" => Ok(Self::TwoWheeler),
            "4w" => Ok(Self::FourWheeler),
            "auto" => Ok(Self::Auto),
            other => Err(CoreError::Validation(format!(
                "Unknown vehicle type '{other}'. Expected one of: 2w, 4w, auto"
            ))),
        }
    }
}

/// Validate a vehicle registration number with a minimum length.
///
/// Bookings accept any non-empty number (`min_len = 1`); the manual entry
/// desk requires at least [`MIN_CHECK_IN_VEHICLE_NUMBER_LEN`] characters.
pub fn validate_vehicle_number(number: &str, min_len: usize) -> Result<(), CoreError> {
    let trimmed = number.trim();
    if trimmed.chars().count() < min_len.max(1) {
        return Err(CoreError::Validation(format!(
            "Vehicle number must be at least {} character(s)",
            min_len.max(1)
        )));
    }
    if trimmed.chars().count() > MAX_VEHICLE_NUMBER_LEN {
        return Err(CoreError::Validation(format!(
            "Vehicle number must be at most {MAX_VEHICLE_NUMBER_LEN} characters"
        )));
    }
    if !VEHICLE_NUMBER_RE.is_match(trimmed) {
        return Err(CoreError::Validation(
            "Vehicle number may only contain letters, digits, spaces and dashes".into(),
        ));
    }
    Ok(())
}

/// Validate an optional contact number: exactly ten digits.
pub fn validate_mobile_number(number: &str) -> Result<(), CoreError> {
    if MOBILE_NUMBER_RE.is_match(number) {
        Ok(())
    } else {
        Err(CoreError::Validation(
            "Please enter a valid 10-digit mobile number".into(),
        ))
    }
}
