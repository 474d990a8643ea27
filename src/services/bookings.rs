use std::sync::Arc;

use time::OffsetDateTime;
use tracing::info;

use crate::models::booking::{Booking, CreateBookingReq};
use crate::models::user::{NewUser, User};
use crate::services::validation::check_timeslots_valid;
use crate::store::{BookingStore, SlotUsage};
use crate::utils::errorhandler::AppError;

/// Transactional booking use-cases. Composes user resolution, the validation
/// rules and the timeslot registry; all writes happen through the store's
/// atomic `create_booking`, so a failure anywhere leaves no partial rows.
pub struct BookingService<S: BookingStore> {
    store: Arc<S>,
}

impl<S: BookingStore> Clone for BookingService<S> {
    fn clone(&self) -> Self {
        BookingService {
            store: Arc::clone(&self.store),
        }
    }
}

impl<S: BookingStore> BookingService<S> {
    pub fn new(store: Arc<S>) -> Self {
        BookingService { store }
    }

    pub async fn create_booking(
        &self,
        payload: CreateBookingReq,
    ) -> Result<(User, Booking), AppError> {
        let user_payload = payload.user.ok_or(AppError::MissingUser)?;
        let requested = payload.timeslots.ok_or(AppError::MissingTimeslots)?;
        if requested.is_empty() {
            return Err(AppError::MissingTimeslots);
        }

        let new_user = NewUser::from_payload(&user_payload)?;

        // Overlap is judged against the user's booked slots only; a brand new
        // email has nothing to collide with.
        let active_starts = match self.store.find_user_by_email(&new_user.email).await? {
            Some(user) => self.store.active_slot_starts(user.id).await?,
            None => Vec::new(),
        };

        let starts =
            check_timeslots_valid(&active_starts, &requested, OffsetDateTime::now_utc())?;

        let (user, booking) = self.store.create_booking(&new_user, &starts).await?;
        info!(
            booking_id = booking.id,
            user_id = user.id,
            slots = starts.len(),
            "booking created"
        );
        Ok((user, booking))
    }

    pub async fn cancel_booking(&self, id: i64) -> Result<Booking, AppError> {
        let mut booking = self
            .store
            .booking(id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("booking {id}")))?;
        booking.cancel()?;
        self.store.update_booking_status(id, booking.status).await?;
        info!(booking_id = id, "booking cancelled");
        Ok(booking)
    }

    pub async fn complete_booking(&self, id: i64) -> Result<Booking, AppError> {
        let mut booking = self
            .store
            .booking(id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("booking {id}")))?;
        booking.complete()?;
        self.store.update_booking_status(id, booking.status).await?;
        info!(booking_id = id, "booking completed");
        Ok(booking)
    }

    pub async fn availability(
        &self,
        from: OffsetDateTime,
        to: OffsetDateTime,
    ) -> Result<Vec<SlotUsage>, AppError> {
        self.store.availability(from, to).await
    }
}
