use serde::{Deserialize, Serialize};
use sqlx::prelude::FromRow;
use time::{Duration, OffsetDateTime};

/// A canonical one-hour slot. Only the start instant is stored; the end is
/// always start + 1 hour. `start_time` is unique across all rows.
#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct Timeslot {
    pub id: i64,
    pub start_time: OffsetDateTime,
}

pub const SLOT_LENGTH: Duration = Duration::HOUR;

impl Timeslot {
    pub fn end_time(&self) -> OffsetDateTime {
        self.start_time + SLOT_LENGTH
    }

    pub fn to_view(&self) -> TimeslotView {
        TimeslotView {
            id: self.id,
            start_time: self.start_time,
            end_time: self.end_time(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimeslotView {
    pub id: i64,
    #[serde(with = "time::serde::rfc3339")]
    pub start_time: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub end_time: OffsetDateTime,
}

/// Caller-supplied slot section of a booking request; the raw string is kept
/// so that format errors can name the offending value.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimeslotPayload {
    #[serde(default)]
    pub start_time: String,
}
