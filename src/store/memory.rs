use std::sync::Mutex;

use async_trait::async_trait;
use time::{OffsetDateTime, UtcOffset};

use crate::models::booking::{Booking, BookingStatus};
use crate::models::timeslot::Timeslot;
use crate::models::user::{NewUser, User};
use crate::store::{BookingStore, SlotUsage};
use crate::utils::errorhandler::AppError;

/// In-memory store used by the orchestrator unit tests. Mirrors the relational
/// layout (users, timeslots, bookings, join rows) and the same atomicity
/// contract: `create_booking` stages every write locally and merges into the
/// shared state only once the whole request has succeeded.
#[derive(Default)]
pub struct InMemoryStore {
    inner: Mutex<Inner>,
    /// When set, `create_booking` fails right before attaching the n-th slot.
    #[cfg(test)]
    pub fail_attach_at: Mutex<Option<usize>>,
}

#[derive(Default)]
struct Inner {
    users: Vec<User>,
    timeslots: Vec<Timeslot>,
    bookings: Vec<BookingRecord>,
    joins: Vec<(i64, i64)>,
    next_user_id: i64,
    next_timeslot_id: i64,
    next_booking_id: i64,
}

#[derive(Clone)]
struct BookingRecord {
    id: i64,
    user_id: i64,
    status: BookingStatus,
    created_at: OffsetDateTime,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Inner>, AppError> {
        self.inner
            .lock()
            .map_err(|_| AppError::PersistenceFailure("store lock poisoned".into()))
    }

    pub fn user_count(&self) -> usize {
        self.inner.lock().map(|i| i.users.len()).unwrap_or(0)
    }

    pub fn timeslot_count(&self) -> usize {
        self.inner.lock().map(|i| i.timeslots.len()).unwrap_or(0)
    }

    pub fn booking_count(&self) -> usize {
        self.inner.lock().map(|i| i.bookings.len()).unwrap_or(0)
    }
}

impl Inner {
    fn assemble(&self, record: &BookingRecord) -> Booking {
        let slots = self
            .joins
            .iter()
            .filter(|(booking_id, _)| *booking_id == record.id)
            .filter_map(|(_, slot_id)| {
                self.timeslots.iter().find(|ts| ts.id == *slot_id).cloned()
            })
            .collect();
        Booking::with_timeslots(
            record.id,
            record.user_id,
            record.status,
            record.created_at,
            slots,
        )
    }
}

#[async_trait]
impl BookingStore for InMemoryStore {
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        let inner = self.lock()?;
        Ok(inner.users.iter().find(|u| u.email == email).cloned())
    }

    async fn active_slot_starts(&self, user_id: i64) -> Result<Vec<OffsetDateTime>, AppError> {
        let inner = self.lock()?;
        let mut starts = Vec::new();
        for record in inner.bookings.iter().filter(|b| b.user_id == user_id) {
            let booking = inner.assemble(record);
            if !booking.is_active() {
                continue;
            }
            for slot in booking.timeslots() {
                starts.push(slot.start_time);
            }
        }
        Ok(starts)
    }

    async fn get_or_create_timeslot(&self, start: OffsetDateTime) -> Result<Timeslot, AppError> {
        let start = start.to_offset(UtcOffset::UTC);
        let mut inner = self.lock()?;
        if let Some(slot) = inner.timeslots.iter().find(|ts| ts.start_time == start) {
            return Ok(slot.clone());
        }
        inner.next_timeslot_id += 1;
        let slot = Timeslot {
            id: inner.next_timeslot_id,
            start_time: start,
        };
        inner.timeslots.push(slot.clone());
        Ok(slot)
    }

    async fn create_booking(
        &self,
        user: &NewUser,
        starts: &[OffsetDateTime],
    ) -> Result<(User, Booking), AppError> {
        let mut inner = self.lock()?;

        // Stage everything; nothing touches `inner` until the end.
        let existing = inner.users.iter().find(|u| u.email == user.email).cloned();
        let user_row = match &existing {
            Some(found) => {
                let mut row = found.clone();
                row.full_name = user.full_name.clone();
                row
            }
            None => User {
                id: inner.next_user_id + 1,
                email: user.email.clone(),
                full_name: user.full_name.clone(),
                created_at: OffsetDateTime::now_utc(),
            },
        };

        // Same re-check the production store performs under its user row
        // lock: the caller's validation ran against a pre-transaction
        // snapshot that may be stale by now.
        if let Some(found) = &existing {
            let mut active = Vec::new();
            for record in inner.bookings.iter().filter(|b| b.user_id == found.id) {
                let booking = inner.assemble(record);
                if !booking.is_active() {
                    continue;
                }
                for slot in booking.timeslots() {
                    active.push(slot.start_time);
                }
            }
            if starts
                .iter()
                .any(|s| active.contains(&s.to_offset(UtcOffset::UTC)))
            {
                return Err(AppError::OverlappingBooking);
            }
        }

        let booking_record = BookingRecord {
            id: inner.next_booking_id + 1,
            user_id: user_row.id,
            status: BookingStatus::Booked,
            created_at: OffsetDateTime::now_utc(),
        };

        let mut new_slots: Vec<Timeslot> = Vec::new();
        let mut attached: Vec<Timeslot> = Vec::new();
        for (index, start) in starts.iter().enumerate() {
            #[cfg(test)]
            {
                let fail_at = self
                    .fail_attach_at
                    .lock()
                    .map_err(|_| AppError::PersistenceFailure("store lock poisoned".into()))?;
                if *fail_at == Some(index) {
                    return Err(AppError::PersistenceFailure(
                        "injected attach failure".into(),
                    ));
                }
            }

            let start = start.to_offset(UtcOffset::UTC);
            let found = inner
                .timeslots
                .iter()
                .chain(new_slots.iter())
                .find(|ts| ts.start_time == start)
                .cloned();
            let slot = match found {
                Some(slot) => slot,
                None => {
                    let slot = Timeslot {
                        id: inner.next_timeslot_id + new_slots.len() as i64 + 1,
                        start_time: start,
                    };
                    new_slots.push(slot.clone());
                    slot
                }
            };
            attached.push(slot);
        }

        // Commit point.
        if existing.is_none() {
            inner.next_user_id += 1;
            inner.users.push(user_row.clone());
        } else if let Some(row) = inner.users.iter_mut().find(|u| u.id == user_row.id) {
            row.full_name = user_row.full_name.clone();
        }
        inner.next_timeslot_id += new_slots.len() as i64;
        inner.timeslots.extend(new_slots);
        inner.next_booking_id += 1;
        for slot in &attached {
            inner.joins.push((booking_record.id, slot.id));
        }
        inner.bookings.push(booking_record.clone());

        let booking = inner.assemble(&booking_record);
        Ok((user_row, booking))
    }

    async fn booking(&self, id: i64) -> Result<Option<Booking>, AppError> {
        let inner = self.lock()?;
        Ok(inner
            .bookings
            .iter()
            .find(|b| b.id == id)
            .map(|record| inner.assemble(record)))
    }

    async fn update_booking_status(
        &self,
        id: i64,
        status: BookingStatus,
    ) -> Result<(), AppError> {
        let mut inner = self.lock()?;
        let record = inner
            .bookings
            .iter_mut()
            .find(|b| b.id == id)
            .ok_or_else(|| AppError::not_found(format!("booking {id}")))?;
        record.status = status;
        Ok(())
    }

    async fn availability(
        &self,
        from: OffsetDateTime,
        to: OffsetDateTime,
    ) -> Result<Vec<SlotUsage>, AppError> {
        let inner = self.lock()?;
        let mut usage: Vec<SlotUsage> = inner
            .timeslots
            .iter()
            .filter(|ts| ts.start_time >= from && ts.start_time <= to)
            .map(|ts| SlotUsage {
                start_time: ts.start_time,
                booking_count: inner
                    .joins
                    .iter()
                    .filter(|(_, slot_id)| *slot_id == ts.id)
                    .count() as i64,
            })
            .collect();
        usage.sort_by_key(|u| u.start_time);
        Ok(usage)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    #[tokio::test]
    async fn get_or_create_is_idempotent() {
        let store = InMemoryStore::new();
        let start = datetime!(2030-06-01 13:00 UTC);

        let first = store.get_or_create_timeslot(start).await.unwrap();
        let second = store.get_or_create_timeslot(start).await.unwrap();

        assert_eq!(first.id, second.id);
        assert_eq!(store.timeslot_count(), 1);
    }

    #[tokio::test]
    async fn get_or_create_normalizes_offsets() {
        let store = InMemoryStore::new();
        let utc = datetime!(2030-06-01 13:00 UTC);
        let offset = datetime!(2030-06-01 15:00 +2);

        let first = store.get_or_create_timeslot(utc).await.unwrap();
        let second = store.get_or_create_timeslot(offset).await.unwrap();

        assert_eq!(first.id, second.id);
        assert_eq!(store.timeslot_count(), 1);
    }

    #[tokio::test]
    async fn shared_slot_is_counted_once_per_booking() {
        let store = InMemoryStore::new();
        let start = datetime!(2030-06-01 13:00 UTC);
        let ada = NewUser {
            email: "ada@example.com".into(),
            full_name: "Ada Lovelace".into(),
        };
        let grace = NewUser {
            email: "grace@example.com".into(),
            full_name: "Grace Hopper".into(),
        };

        store.create_booking(&ada, &[start]).await.unwrap();
        store.create_booking(&grace, &[start]).await.unwrap();

        assert_eq!(store.timeslot_count(), 1);
        let usage = store
            .availability(start, start)
            .await
            .unwrap();
        assert_eq!(usage.len(), 1);
        assert_eq!(usage[0].booking_count, 2);
    }

    #[tokio::test]
    async fn availability_omits_slots_outside_range_and_never_created() {
        let store = InMemoryStore::new();
        store
            .get_or_create_timeslot(datetime!(2030-06-01 13:00 UTC))
            .await
            .unwrap();
        store
            .get_or_create_timeslot(datetime!(2030-06-02 13:00 UTC))
            .await
            .unwrap();

        let usage = store
            .availability(
                datetime!(2030-06-01 00:00 UTC),
                datetime!(2030-06-01 23:00 UTC),
            )
            .await
            .unwrap();

        // One slot in range with no bookings yet; the rest are simply absent.
        assert_eq!(usage.len(), 1);
        assert_eq!(usage[0].start_time, datetime!(2030-06-01 13:00 UTC));
        assert_eq!(usage[0].booking_count, 0);
    }

    #[tokio::test]
    async fn create_rechecks_overlap_inside_the_transaction() {
        let store = InMemoryStore::new();
        let one = datetime!(2030-06-01 13:00 UTC);
        let two = datetime!(2030-06-01 14:00 UTC);
        let ada = NewUser {
            email: "ada@example.com".into(),
            full_name: "Ada Lovelace".into(),
        };

        // Two requests that both validated against an empty active set; the
        // store itself must still refuse the second one.
        store.create_booking(&ada, &[one]).await.unwrap();
        let err = store.create_booking(&ada, &[one, two]).await.unwrap_err();
        assert!(matches!(err, AppError::OverlappingBooking));

        assert_eq!(store.booking_count(), 1);
        assert_eq!(store.timeslot_count(), 1);
    }

    #[tokio::test]
    async fn overlap_recheck_ignores_cancelled_bookings() {
        let store = InMemoryStore::new();
        let start = datetime!(2030-06-01 13:00 UTC);
        let ada = NewUser {
            email: "ada@example.com".into(),
            full_name: "Ada Lovelace".into(),
        };

        let (_, booking) = store.create_booking(&ada, &[start]).await.unwrap();
        store
            .update_booking_status(booking.id, BookingStatus::Cancelled)
            .await
            .unwrap();

        assert!(store.create_booking(&ada, &[start]).await.is_ok());
    }

    #[tokio::test]
    async fn repeat_booking_refreshes_user_name() {
        let store = InMemoryStore::new();
        let start_a = datetime!(2030-06-01 13:00 UTC);
        let start_b = datetime!(2030-06-02 13:00 UTC);

        let (user, _) = store
            .create_booking(
                &NewUser {
                    email: "ada@example.com".into(),
                    full_name: "Ada".into(),
                },
                &[start_a],
            )
            .await
            .unwrap();
        let (renamed, _) = store
            .create_booking(
                &NewUser {
                    email: "ada@example.com".into(),
                    full_name: "Ada Lovelace".into(),
                },
                &[start_b],
            )
            .await
            .unwrap();

        assert_eq!(user.id, renamed.id);
        assert_eq!(renamed.full_name, "Ada Lovelace");
        assert_eq!(store.user_count(), 1);
    }
}
