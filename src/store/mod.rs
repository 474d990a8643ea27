use async_trait::async_trait;
use sqlx::prelude::FromRow;
use time::OffsetDateTime;

use crate::models::booking::{Booking, BookingStatus};
use crate::models::timeslot::Timeslot;
use crate::models::user::{NewUser, User};
use crate::utils::errorhandler::AppError;

#[cfg(test)]
pub mod memory;
pub mod postgres;

#[cfg(test)]
pub use memory::InMemoryStore;
pub use postgres::PgStore;

/// Per-slot usage as reported by the availability query. Slots that were
/// never created simply do not appear; callers treat absence as zero.
#[derive(Debug, Clone, FromRow)]
pub struct SlotUsage {
    pub start_time: OffsetDateTime,
    pub booking_count: i64,
}

/// Persistence seam for the booking core. The production implementation is
/// [`PgStore`]; [`InMemoryStore`] backs the orchestrator tests.
///
/// `create_booking` is the one compound write and must be atomic: either the
/// resolved user, every get-or-create'd slot, the booking row and all join
/// rows land together, or none of them do.
#[async_trait]
pub trait BookingStore: Send + Sync {
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, AppError>;

    /// Start instants of every slot attached to the user's BOOKED bookings.
    async fn active_slot_starts(&self, user_id: i64) -> Result<Vec<OffsetDateTime>, AppError>;

    /// Timeslot registry: returns the existing row for this instant unchanged,
    /// or inserts one. Repeated calls never create a second row.
    async fn get_or_create_timeslot(&self, start: OffsetDateTime) -> Result<Timeslot, AppError>;

    /// Atomically upserts the user, re-checks that none of the requested
    /// instants collide with the user's BOOKED slots (the caller's validation
    /// ran against a pre-transaction snapshot), then get-or-creates each slot
    /// in input order and creates the booking with all slots attached.
    /// Returns `OverlappingBooking` when the re-check fails.
    async fn create_booking(
        &self,
        user: &NewUser,
        starts: &[OffsetDateTime],
    ) -> Result<(User, Booking), AppError>;

    async fn booking(&self, id: i64) -> Result<Option<Booking>, AppError>;

    async fn update_booking_status(
        &self,
        id: i64,
        status: BookingStatus,
    ) -> Result<(), AppError>;

    /// Usage counts for slots whose start instant falls inside the inclusive
    /// range, ordered by start instant.
    async fn availability(
        &self,
        from: OffsetDateTime,
        to: OffsetDateTime,
    ) -> Result<Vec<SlotUsage>, AppError>;
}
