//! Fee arithmetic. Fees are per hour; charges are `duration × fee`.

use crate::error::CoreError;

/// Minimum bookable / chargeable duration in hours.
pub const MIN_DURATION_HOURS: i32 = 1;

/// Duration used when a reservation request omits one.
pub const DEFAULT_DURATION_HOURS: i32 = 1;

/// Charges for parking `duration_hours` at `fee_per_hour`.
pub fn compute_charges(duration_hours: i32, fee_per_hour: f64) -> f64 {
    f64::from(duration_hours) * fee_per_hour
}

pub fn validate_duration(duration_hours: i32) -> Result<(), CoreError> {
    if duration_hours < MIN_DURATION_HOURS {
        return Err(CoreError::Validation(format!(
            "Duration must be at least {MIN_DURATION_HOURS} hour(s), got {duration_hours}"
        )));
    }
    Ok(())
}

pub fn validate_fee(fee: f64) -> Result<(), CoreError> {
    if !fee.is_finite() || fee < 0.0 {
        return Err(CoreError::Validation(format!(
            "Fee must be a non-negative number, got {fee}"
        )));
    }
    Ok(())
}
