use async_trait::async_trait;
use sqlx::prelude::FromRow;
use sqlx::{PgPool, Postgres, Transaction};
use time::{OffsetDateTime, UtcOffset};

use crate::models::booking::{Booking, BookingStatus};
use crate::models::timeslot::Timeslot;
use crate::models::user::{NewUser, User};
use crate::store::{BookingStore, SlotUsage};
use crate::utils::errorhandler::AppError;

/// Postgres-backed store. Timeslot uniqueness rides on the unique index over
/// `timeslots.start_time`: get-or-create inserts with `ON CONFLICT DO
/// NOTHING` and falls back to a lookup when the insert hit the conflict, so a
/// lost race between two transactions degrades to a lookup instead of a
/// duplicate row.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

#[derive(FromRow)]
struct BookingRow {
    id: i64,
    user_id: i64,
    status: String,
    created_at: OffsetDateTime,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        PgStore { pool }
    }

    async fn get_or_create_slot_tx(
        tx: &mut Transaction<'_, Postgres>,
        start: OffsetDateTime,
    ) -> Result<Timeslot, AppError> {
        let start = start.to_offset(UtcOffset::UTC);

        let inserted: Option<Timeslot> = sqlx::query_as(
            "INSERT INTO timeslots (start_time) VALUES ($1)
             ON CONFLICT (start_time) DO NOTHING
             RETURNING id, start_time",
        )
        .bind(start)
        .fetch_optional(&mut **tx)
        .await?;

        if let Some(slot) = inserted {
            return Ok(slot);
        }

        let slot = sqlx::query_as("SELECT id, start_time FROM timeslots WHERE start_time = $1")
            .bind(start)
            .fetch_one(&mut **tx)
            .await?;
        Ok(slot)
    }

    async fn booking_slots(&self, booking_id: i64) -> Result<Vec<Timeslot>, AppError> {
        let slots = sqlx::query_as(
            "SELECT ts.id, ts.start_time FROM timeslots ts
             JOIN booking_timeslots bt ON bt.timeslot_id = ts.id
             WHERE bt.booking_id = $1
             ORDER BY ts.start_time",
        )
        .bind(booking_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(slots)
    }
}

#[async_trait]
impl BookingStore for PgStore {
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as(
            "SELECT id, email, full_name, created_at FROM users WHERE email = $1",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    async fn active_slot_starts(&self, user_id: i64) -> Result<Vec<OffsetDateTime>, AppError> {
        let starts = sqlx::query_scalar(
            "SELECT ts.start_time FROM timeslots ts
             JOIN booking_timeslots bt ON bt.timeslot_id = ts.id
             JOIN bookings b ON b.id = bt.booking_id
             WHERE b.user_id = $1 AND b.status = 'booked'",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(starts)
    }

    async fn get_or_create_timeslot(&self, start: OffsetDateTime) -> Result<Timeslot, AppError> {
        let mut tx = self.pool.begin().await?;
        let slot = Self::get_or_create_slot_tx(&mut tx, start).await?;
        tx.commit().await?;
        Ok(slot)
    }

    async fn create_booking(
        &self,
        user: &NewUser,
        starts: &[OffsetDateTime],
    ) -> Result<(User, Booking), AppError> {
        let starts: Vec<OffsetDateTime> = starts
            .iter()
            .map(|s| s.to_offset(UtcOffset::UTC))
            .collect();

        let mut tx = self.pool.begin().await?;

        // Repeat requests for a known email refresh the stored name. The
        // upsert also takes a row lock on the user, so concurrent requests
        // for the same email serialize here until commit.
        let user_row: User = sqlx::query_as(
            "INSERT INTO users (email, full_name) VALUES ($1, $2)
             ON CONFLICT (email) DO UPDATE SET full_name = EXCLUDED.full_name
             RETURNING id, email, full_name, created_at",
        )
        .bind(&user.email)
        .bind(&user.full_name)
        .fetch_one(&mut *tx)
        .await?;

        // Re-check overlap under the lock. The orchestrator already validated
        // against a pre-transaction snapshot; a concurrent booking may have
        // committed since that read.
        let conflict: bool = sqlx::query_scalar(
            "SELECT EXISTS(
                SELECT 1 FROM timeslots ts
                JOIN booking_timeslots bt ON bt.timeslot_id = ts.id
                JOIN bookings b ON b.id = bt.booking_id
                WHERE b.user_id = $1 AND b.status = 'booked'
                  AND ts.start_time = ANY($2)
            )",
        )
        .bind(user_row.id)
        .bind(&starts)
        .fetch_one(&mut *tx)
        .await?;
        if conflict {
            return Err(AppError::OverlappingBooking);
        }

        let booking_row: BookingRow = sqlx::query_as(
            "INSERT INTO bookings (user_id, status) VALUES ($1, 'booked')
             RETURNING id, user_id, status, created_at",
        )
        .bind(user_row.id)
        .fetch_one(&mut *tx)
        .await?;

        let mut booking =
            Booking::new(booking_row.id, booking_row.user_id, booking_row.created_at);
        for start in &starts {
            let slot = Self::get_or_create_slot_tx(&mut tx, *start).await?;
            sqlx::query(
                "INSERT INTO booking_timeslots (booking_id, timeslot_id) VALUES ($1, $2)",
            )
            .bind(booking_row.id)
            .bind(slot.id)
            .execute(&mut *tx)
            .await?;
            booking.attach_timeslot(slot);
        }

        tx.commit().await?;
        Ok((user_row, booking))
    }

    async fn booking(&self, id: i64) -> Result<Option<Booking>, AppError> {
        let row: Option<BookingRow> = sqlx::query_as(
            "SELECT id, user_id, status, created_at FROM bookings WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let slots = self.booking_slots(row.id).await?;
        Ok(Some(Booking::with_timeslots(
            row.id,
            row.user_id,
            BookingStatus::parse(&row.status)?,
            row.created_at,
            slots,
        )))
    }

    async fn update_booking_status(
        &self,
        id: i64,
        status: BookingStatus,
    ) -> Result<(), AppError> {
        let result = sqlx::query("UPDATE bookings SET status = $1 WHERE id = $2")
            .bind(status.as_str())
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::not_found(format!("booking {id}")));
        }
        Ok(())
    }

    async fn availability(
        &self,
        from: OffsetDateTime,
        to: OffsetDateTime,
    ) -> Result<Vec<SlotUsage>, AppError> {
        let usage = sqlx::query_as(
            "SELECT t.start_time, COUNT(DISTINCT bt.booking_id) AS booking_count
             FROM timeslots t
             LEFT JOIN booking_timeslots bt ON bt.timeslot_id = t.id
             WHERE t.start_time >= $1 AND t.start_time <= $2
             GROUP BY t.start_time
             ORDER BY t.start_time",
        )
        .bind(from.to_offset(UtcOffset::UTC))
        .bind(to.to_offset(UtcOffset::UTC))
        .fetch_all(&self.pool)
        .await?;
        Ok(usage)
    }
}
