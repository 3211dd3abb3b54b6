//! Session reservation lifecycle.
//!
//! [`ReservationManager`] keeps at most one active reservation per session.
//! Each reservation holds a spot for a fixed time and is released by an
//! explicit cancel, by a newer booking in the same session, or by its
//! countdown reaching zero, whichever happens first. Every release returns
//! exactly one spot to the location.
//!
//! All mutations run on a task of their own under one async mutex and
//! follow the same pattern: write to the store, and only once the store has
//! accepted the change update the in-memory session map. A failed write
//! undoes any earlier write of the same operation, so callers observe
//! either the whole change or none of it.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::Utc;
use parkspot_core::error::CoreError;
use parkspot_core::fees::{compute_charges, validate_duration};
use parkspot_core::reservation::{
    expires_at, format_mm_ss, remaining_until, Countdown, CountdownTick, ReleaseReason, TICK,
};
use parkspot_core::types::{new_id, EntityId, SessionKey};
use parkspot_core::vehicle::{validate_vehicle_number, VehicleType};
use parkspot_db::models::location::ParkingLocation;
use parkspot_db::models::reservation::Reservation;
use parkspot_db::store::{ParkingStore, SpotClaim};
use parkspot_events::bus::{RESERVATION_CANCELLED, RESERVATION_CONFIRMED, RESERVATION_EXPIRED};
use parkspot_events::{EventBus, ParkingEvent};
use serde::Serialize;
use serde_json::json;
use tokio::sync::Mutex;
use tokio::time::{interval_at, Instant};
use tokio_util::sync::CancellationToken;

use super::run_to_completion;
use crate::error::AppResult;
use crate::notifications::occupancy_changed;

/// Delay before retrying an expiry whose store write failed.
pub const EXPIRY_RETRY_SECS: u64 = 30;

/// Vehicle details supplied with a booking.
#[derive(Debug, Clone)]
pub struct BookingDetails {
    pub vehicle_number: String,
    pub vehicle_type: VehicleType,
    pub duration_hours: i32,
}

/// A session's current reservation with its live countdown.
#[derive(Debug, Clone, Serialize)]
pub struct ActiveReservation {
    #[serde(flatten)]
    pub reservation: Reservation,
    pub remaining_secs: u64,
    /// `MM:SS` rendering of `remaining_secs`.
    pub remaining_display: String,
}

/// In-memory state of one held reservation.
struct ActiveHold {
    reservation: Reservation,
    remaining: Arc<AtomicU64>,
    cancel: CancellationToken,
}

impl ActiveHold {
    fn snapshot(&self) -> ActiveReservation {
        let remaining_secs = self.remaining.load(Ordering::Relaxed);
        ActiveReservation {
            reservation: self.reservation.clone(),
            remaining_secs,
            remaining_display: format_mm_ss(remaining_secs),
        }
    }
}

/// Owns every active reservation and its countdown task.
pub struct ReservationManager {
    store: Arc<dyn ParkingStore>,
    events: Arc<EventBus>,
    hold_secs: u64,
    sessions: Mutex<HashMap<SessionKey, ActiveHold>>,
    /// Parent of every countdown token.
    shutdown: CancellationToken,
}

impl ReservationManager {
    pub fn new(store: Arc<dyn ParkingStore>, events: Arc<EventBus>, hold_secs: u64) -> Self {
        Self {
            store,
            events,
            hold_secs,
            sessions: Mutex::new(HashMap::new()),
            shutdown: CancellationToken::new(),
        }
    }

    // ---- confirm ----

    /// Book a spot at `location_id` for `session`.
    ///
    /// Takes the new spot first. If the session already holds a reservation
    /// it is then released silently; if that release fails, the new booking
    /// is undone and the previous one stays in place. The booking finishes
    /// even if the caller stops waiting for it.
    pub async fn confirm(
        self: &Arc<Self>,
        session: &str,
        location_id: EntityId,
        booking: BookingDetails,
    ) -> AppResult<Reservation> {
        let manager = Arc::clone(self);
        let session = session.to_string();
        run_to_completion(async move { manager.book(&session, location_id, booking).await }).await
    }

    async fn book(
        self: &Arc<Self>,
        session: &str,
        location_id: EntityId,
        booking: BookingDetails,
    ) -> AppResult<Reservation> {
        validate_vehicle_number(&booking.vehicle_number, 1)?;
        validate_duration(booking.duration_hours)?;

        let mut sessions = self.sessions.lock().await;

        let mut location = match self.store.claim_spot(location_id).await? {
            SpotClaim::Claimed(location) => location,
            SpotClaim::Full(location) => {
                tracing::info!(
                    location_id = %location_id,
                    total_spots = location.total_spots,
                    "Booking refused, location full"
                );
                return Err(CoreError::CapacityExhausted {
                    location: location.name,
                }
                .into());
            }
            SpotClaim::NotFound => {
                return Err(CoreError::not_found("ParkingLocation", location_id).into());
            }
        };

        let booked_at = Utc::now();
        let reservation = Reservation {
            id: new_id(),
            session_id: session.to_string(),
            location_id,
            location_name: location.name.clone(),
            vehicle_number: booking.vehicle_number.trim().to_string(),
            vehicle_type: booking.vehicle_type.as_str().to_string(),
            duration_hours: booking.duration_hours,
            final_fee: compute_charges(booking.duration_hours, location.current_fee),
            booked_at,
            expires_at: expires_at(booked_at, self.hold_secs),
        };

        if let Err(e) = self.store.insert_reservation(&reservation).await {
            self.return_spot(location_id).await;
            return Err(e.into());
        }

        if let Some(prior) = sessions.get(session) {
            let prior = prior.reservation.clone();
            match self.release_in_store(&prior).await {
                Ok(prior_location) => {
                    if let Some(hold) = sessions.remove(session) {
                        hold.cancel.cancel();
                    }
                    // Rebooking the same lot: the release is the later write.
                    if let Some(same) = prior_location.as_ref().filter(|l| l.id == location_id) {
                        location = same.clone();
                    }
                    let reason = ReleaseReason::Replaced;
                    self.publish_released(&prior, reason, reason.is_silent(), prior_location);
                }
                Err(e) => {
                    self.discard_unconfirmed(&reservation).await;
                    return Err(e);
                }
            }
        }

        let hold = self.start_countdown(reservation.clone(), self.hold_secs);
        sessions.insert(session.to_string(), hold);

        tracing::info!(
            reservation_id = %reservation.id,
            location_id = %location_id,
            final_fee = reservation.final_fee,
            "Reservation confirmed"
        );

        self.events.publish(
            ParkingEvent::new(RESERVATION_CONFIRMED)
                .for_location(location_id)
                .for_session(session)
                .with_payload(json!({
                    "reservation_id": reservation.id,
                    "location_name": reservation.location_name,
                    "final_fee": reservation.final_fee,
                    "expires_at": reservation.expires_at,
                    "notify": true,
                })),
        );
        self.events.publish(occupancy_changed(&location));

        Ok(reservation)
    }

    // ---- cancel ----

    /// Release the session's reservation at `location_id`.
    ///
    /// Returns `None` when the session holds nothing at that location.
    /// `silent` suppresses the user-facing notice. Like [`confirm`](Self::confirm)
    /// the release finishes even if the caller stops waiting for it.
    pub async fn cancel(
        self: &Arc<Self>,
        session: &str,
        location_id: EntityId,
        silent: bool,
    ) -> AppResult<Option<Reservation>> {
        let manager = Arc::clone(self);
        let session = session.to_string();
        run_to_completion(async move { manager.release(&session, location_id, silent).await })
            .await
    }

    async fn release(
        &self,
        session: &str,
        location_id: EntityId,
        silent: bool,
    ) -> AppResult<Option<Reservation>> {
        let mut sessions = self.sessions.lock().await;

        let reservation = match sessions.get(session) {
            Some(hold) if hold.reservation.location_id == location_id => {
                hold.reservation.clone()
            }
            _ => return Ok(None),
        };

        let location = self.release_in_store(&reservation).await?;
        if let Some(hold) = sessions.remove(session) {
            hold.cancel.cancel();
        }

        tracing::info!(
            reservation_id = %reservation.id,
            location_id = %location_id,
            silent,
            "Reservation cancelled"
        );
        self.publish_released(&reservation, ReleaseReason::Cancelled, silent, location);

        Ok(Some(reservation))
    }

    // ---- queries ----

    /// The session's reservation, if any, with its remaining time.
    pub async fn current(&self, session: &str) -> Option<ActiveReservation> {
        self.sessions.lock().await.get(session).map(ActiveHold::snapshot)
    }

    pub async fn active_count(&self) -> usize {
        self.sessions.lock().await.len()
    }

    // ---- startup / shutdown ----

    /// Rebuild the session map from persisted reservations.
    ///
    /// Reservations whose deadline has passed are released; if a session
    /// somehow has more than one, only the newest is kept. Returns the
    /// number of reservations restored.
    pub async fn restore(self: &Arc<Self>) -> AppResult<usize> {
        let mut persisted = self.store.list_reservations().await?;
        persisted.sort_by(|a, b| b.booked_at.cmp(&a.booked_at));

        let now = Utc::now();
        let mut sessions = self.sessions.lock().await;
        let mut restored = 0;

        for reservation in persisted {
            let remaining = remaining_until(reservation.expires_at, now);
            let reason = if remaining == 0 {
                ReleaseReason::Expired
            } else if sessions.contains_key(&reservation.session_id) {
                ReleaseReason::Replaced
            } else {
                let hold = self.start_countdown(reservation.clone(), remaining);
                sessions.insert(reservation.session_id.clone(), hold);
                restored += 1;
                continue;
            };

            match self.release_in_store(&reservation).await {
                Ok(location) => {
                    self.publish_released(&reservation, reason, reason.is_silent(), location)
                }
                Err(e) => tracing::error!(
                    error = %e,
                    reservation_id = %reservation.id,
                    "Failed to release stale reservation"
                ),
            }
        }

        tracing::info!(restored, "Reservations restored");
        Ok(restored)
    }

    /// Stop every countdown. Persisted reservations are left for
    /// [`restore`](Self::restore) on the next start.
    pub fn shutdown(&self) {
        self.shutdown.cancel();
    }

    // ---- expiry ----

    /// Called by a countdown task when it reaches zero.
    ///
    /// A no-op unless `reservation_id` is still the session's reservation,
    /// so a cancel or replacement racing the last tick wins.
    async fn expire(self: &Arc<Self>, session: &str, reservation_id: EntityId) {
        let mut sessions = self.sessions.lock().await;

        let reservation = match sessions.get(session) {
            Some(hold) if hold.reservation.id == reservation_id => hold.reservation.clone(),
            _ => return,
        };

        match self.release_in_store(&reservation).await {
            Ok(location) => {
                sessions.remove(session);
                tracing::info!(reservation_id = %reservation_id, "Reservation expired");
                let reason = ReleaseReason::Expired;
                self.publish_released(&reservation, reason, reason.is_silent(), location);
            }
            Err(e) => {
                tracing::error!(
                    error = %e,
                    reservation_id = %reservation_id,
                    retry_secs = EXPIRY_RETRY_SECS,
                    "Failed to release expired reservation, will retry"
                );
                let hold = self.start_countdown(reservation, EXPIRY_RETRY_SECS);
                sessions.insert(session.to_string(), hold);
            }
        }
    }

    /// Spawn the per-second countdown for `reservation`.
    fn start_countdown(self: &Arc<Self>, reservation: Reservation, secs: u64) -> ActiveHold {
        let cancel = self.shutdown.child_token();
        let remaining = Arc::new(AtomicU64::new(secs));

        let manager = Arc::clone(self);
        let token = cancel.clone();
        let counter = Arc::clone(&remaining);
        let session = reservation.session_id.clone();
        let reservation_id = reservation.id;

        tokio::spawn(async move {
            let mut countdown = Countdown::new(secs);
            let mut ticker = interval_at(Instant::now() + TICK, TICK);

            while !countdown.is_expired() {
                tokio::select! {
                    biased;
                    _ = token.cancelled() => return,
                    _ = ticker.tick() => {
                        if let CountdownTick::Running(left) = countdown.tick() {
                            counter.store(left, Ordering::Relaxed);
                        }
                    }
                }
            }

            counter.store(0, Ordering::Relaxed);
            manager.expire(&session, reservation_id).await;
        });

        ActiveHold {
            reservation,
            remaining,
            cancel,
        }
    }

    // ---- store helpers ----

    /// Delete the reservation record and return its spot.
    ///
    /// If returning the spot fails the record is written back.
    async fn release_in_store(
        &self,
        reservation: &Reservation,
    ) -> AppResult<Option<ParkingLocation>> {
        self.store.delete_reservation(reservation.id).await?;

        match self.store.shift_occupancy(reservation.location_id, -1).await {
            Ok(location) => Ok(location),
            Err(e) => {
                if let Err(restore_err) = self.store.insert_reservation(reservation).await {
                    tracing::error!(
                        error = %restore_err,
                        reservation_id = %reservation.id,
                        "Failed to restore reservation record after release error"
                    );
                }
                Err(e.into())
            }
        }
    }

    /// Undo a confirmed-in-store booking that could not be activated.
    async fn discard_unconfirmed(&self, reservation: &Reservation) {
        if let Err(e) = self.store.delete_reservation(reservation.id).await {
            tracing::error!(
                error = %e,
                reservation_id = %reservation.id,
                "Failed to discard reservation record"
            );
        }
        self.return_spot(reservation.location_id).await;
    }

    async fn return_spot(&self, location_id: EntityId) {
        if let Err(e) = self.store.shift_occupancy(location_id, -1).await {
            tracing::error!(
                error = %e,
                location_id = %location_id,
                "Failed to return claimed spot"
            );
        }
    }

    fn publish_released(
        &self,
        reservation: &Reservation,
        reason: ReleaseReason,
        silent: bool,
        location: Option<ParkingLocation>,
    ) {
        let event_type = match reason {
            ReleaseReason::Expired => RESERVATION_EXPIRED,
            ReleaseReason::Cancelled | ReleaseReason::Replaced => RESERVATION_CANCELLED,
        };

        self.events.publish(
            ParkingEvent::new(event_type)
                .for_location(reservation.location_id)
                .for_session(reservation.session_id.clone())
                .with_payload(json!({
                    "reservation_id": reservation.id,
                    "location_name": reservation.location_name,
                    "reason": reason,
                    "notify": !silent,
                })),
        );

        if let Some(location) = location {
            self.events.publish(occupancy_changed(&location));
        }
    }
}
