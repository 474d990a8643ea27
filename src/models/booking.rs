use serde::{Deserialize, Serialize};
use time::{Date, OffsetDateTime, UtcOffset};

use crate::models::timeslot::{Timeslot, TimeslotPayload, TimeslotView};
use crate::models::user::UserPayload;
use crate::utils::errorhandler::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BookingStatus {
    Booked,
    Cancelled,
    Completed,
}

impl BookingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Booked => "booked",
            BookingStatus::Cancelled => "cancelled",
            BookingStatus::Completed => "completed",
        }
    }

    /// Strict parse; unknown strings are rejected rather than defaulted.
    pub fn parse(s: &str) -> Result<Self, AppError> {
        match s {
            "booked" => Ok(BookingStatus::Booked),
            "cancelled" => Ok(BookingStatus::Cancelled),
            "completed" => Ok(BookingStatus::Completed),
            other => Err(AppError::invalid_user_data(format!(
                "unknown booking status: {other}"
            ))),
        }
    }
}

/// Wall-clock span of a booking, formatted as HH:MM in UTC.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeRange {
    pub start: String,
    pub end: String,
}

/// A user's reservation over one or more consecutive one-hour slots.
///
/// The slot collection is kept sorted ascending by start instant no matter the
/// attach order; consecutiveness is enforced by the validation engine at
/// creation time, not retroactively here.
#[derive(Debug, Clone)]
pub struct Booking {
    pub id: i64,
    pub user_id: i64,
    pub status: BookingStatus,
    pub created_at: OffsetDateTime,
    timeslots: Vec<Timeslot>,
}

impl Booking {
    pub fn new(id: i64, user_id: i64, created_at: OffsetDateTime) -> Self {
        Booking {
            id,
            user_id,
            status: BookingStatus::Booked,
            created_at,
            timeslots: Vec::new(),
        }
    }

    pub fn with_timeslots(
        id: i64,
        user_id: i64,
        status: BookingStatus,
        created_at: OffsetDateTime,
        mut timeslots: Vec<Timeslot>,
    ) -> Self {
        timeslots.sort_by_key(|ts| ts.start_time);
        Booking {
            id,
            user_id,
            status,
            created_at,
            timeslots,
        }
    }

    pub fn attach_timeslot(&mut self, slot: Timeslot) {
        self.timeslots.push(slot);
        self.timeslots.sort_by_key(|ts| ts.start_time);
    }

    /// Slots in ascending start order.
    pub fn timeslots(&self) -> &[Timeslot] {
        &self.timeslots
    }

    pub fn is_active(&self) -> bool {
        self.status == BookingStatus::Booked
    }

    /// UTC calendar date of the earliest slot; None when no slots are attached.
    pub fn date(&self) -> Option<Date> {
        self.timeslots
            .first()
            .map(|ts| ts.start_time.to_offset(UtcOffset::UTC).date())
    }

    /// HH:MM span from the earliest slot's start to the latest slot's end;
    /// None when no slots are attached.
    pub fn time_range(&self) -> Option<TimeRange> {
        let first = self.timeslots.first()?;
        let last = self.timeslots.last()?;
        Some(TimeRange {
            start: format_hhmm(first.start_time),
            end: format_hhmm(last.end_time()),
        })
    }

    /// Cancelling a cancelled booking is a no-op; cancelling a completed one
    /// is rejected (no transition out of a terminal state).
    pub fn cancel(&mut self) -> Result<(), AppError> {
        match self.status {
            BookingStatus::Booked | BookingStatus::Cancelled => {
                self.status = BookingStatus::Cancelled;
                Ok(())
            }
            BookingStatus::Completed => Err(AppError::invalid_request(
                "cannot cancel a completed booking",
            )),
        }
    }

    /// Mirror of `cancel`: idempotent from Completed, rejected from Cancelled.
    pub fn complete(&mut self) -> Result<(), AppError> {
        match self.status {
            BookingStatus::Booked | BookingStatus::Completed => {
                self.status = BookingStatus::Completed;
                Ok(())
            }
            BookingStatus::Cancelled => Err(AppError::invalid_request(
                "cannot complete a cancelled booking",
            )),
        }
    }

    pub fn to_view(&self) -> BookingView {
        BookingView {
            id: self.id,
            user_id: self.user_id,
            date: self.date().map(format_iso_date),
            status: self.status,
            created_at: self.created_at,
            time_range: self.time_range(),
            timeslots: self.timeslots.iter().map(Timeslot::to_view).collect(),
        }
    }
}

/// Serialized booking as returned to API clients.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookingView {
    pub id: i64,
    pub user_id: i64,
    pub date: Option<String>,
    pub status: BookingStatus,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    pub time_range: Option<TimeRange>,
    pub timeslots: Vec<TimeslotView>,
}

pub fn format_iso_date(date: Date) -> String {
    format!(
        "{:04}-{:02}-{:02}",
        date.year(),
        u8::from(date.month()),
        date.day()
    )
}

fn format_hhmm(instant: OffsetDateTime) -> String {
    let t = instant.to_offset(UtcOffset::UTC).time();
    format!("{:02}:{:02}", t.hour(), t.minute())
}

/// Inbound payload of the booking creation endpoint. Both sections are
/// optional at the serde level so that their absence can be reported with the
/// specific MissingUser / MissingTimeslots codes instead of a decode failure.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateBookingReq {
    pub user: Option<UserPayload>,
    pub timeslots: Option<Vec<TimeslotPayload>>,
}
