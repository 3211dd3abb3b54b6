//! Reservation hold constants, countdown, and release reasons.
//!
//! A session moves `Idle -> Reserved -> Idle`; the way back to `Idle` is
//! either an explicit cancel, a replacement by a newer booking, or expiry of
//! the countdown. Only explicit cancels notify the user.

use std::time::Duration;

use serde::Serialize;

use crate::types::Timestamp;

/// How long a confirmed reservation holds its spot (15 minutes).
pub const DEFAULT_HOLD_SECS: u64 = 15 * 60;

/// Granularity of the countdown.
pub const TICK: Duration = Duration::from_secs(1);

// ---------------------------------------------------------------------------
// Release reasons
// ---------------------------------------------------------------------------

/// Why a reservation left the `Reserved` state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReleaseReason {
    /// The user cancelled the booking.
    Cancelled,
    /// A newer booking in the same session took its place.
    Replaced,
    /// The countdown reached zero.
    Expired,
}

impl ReleaseReason {
    /// Silent releases do not produce a user-facing notice.
    pub fn is_silent(self) -> bool {
        !matches!(self, Self::Cancelled)
    }
}

// ---------------------------------------------------------------------------
// Countdown
// ---------------------------------------------------------------------------

/// Result of advancing a [`Countdown`] by one tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CountdownTick {
    /// Seconds still remaining after this tick.
    Running(u64),
    /// The countdown has reached zero.
    Expired,
}

/// Per-second countdown for a reservation hold.
///
/// Ticking an expired countdown keeps returning [`CountdownTick::Expired`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Countdown {
    remaining_secs: u64,
}

impl Countdown {
    pub fn new(remaining_secs: u64) -> Self {
        Self { remaining_secs }
    }

    pub fn remaining_secs(&self) -> u64 {
        self.remaining_secs
    }

    pub fn is_expired(&self) -> bool {
        self.remaining_secs == 0
    }

    /// Advance by one second.
    pub fn tick(&mut self) -> CountdownTick {
        self.remaining_secs = self.remaining_secs.saturating_sub(1);
        if self.remaining_secs == 0 {
            CountdownTick::Expired
        } else {
            CountdownTick::Running(self.remaining_secs)
        }
    }
}

/// Format seconds as zero-padded `MM:SS` (minutes may exceed 59).
pub fn format_mm_ss(secs: u64) -> String {
    format!("{:02}:{:02}", secs / 60, secs % 60)
}

/// Deadline of a hold started at `booked_at`.
pub fn expires_at(booked_at: Timestamp, hold_secs: u64) -> Timestamp {
    let hold = i64::try_from(hold_secs).unwrap_or(i64::MAX);
    booked_at + chrono::Duration::seconds(hold)
}

/// Whole seconds left until `expires_at`, zero once it has passed.
pub fn remaining_until(expires_at: Timestamp, now: Timestamp) -> u64 {
    let secs = (expires_at - now).num_seconds();
    u64::try_from(secs).unwrap_or(0)
}
