//! Pure booking-rule checks. No storage access happens here: the caller
//! supplies the user's currently booked instants and the clock value, which
//! keeps every rule independently testable.

use time::{OffsetDateTime, UtcOffset};
use time::format_description::well_known::Rfc3339;

use crate::models::timeslot::{SLOT_LENGTH, TimeslotPayload};
use crate::utils::errorhandler::AppError;

/// Checks a requested slot list against the booking rules and returns the
/// parsed instants in input order.
///
/// The rules run in a fixed order so the same bad input always yields the
/// same error: format, non-empty, duplicates, past, user overlap, same day,
/// consecutive. `now` is evaluated once by the caller for the whole request,
/// so a list that straddles the current instant is judged consistently.
///
/// `active_starts` are the start instants of every slot attached to the
/// user's BOOKED bookings; cancelled and completed bookings must not be
/// included, which is what lets a user rebook a slot they have given up.
pub fn check_timeslots_valid(
    active_starts: &[OffsetDateTime],
    requested: &[TimeslotPayload],
    now: OffsetDateTime,
) -> Result<Vec<OffsetDateTime>, AppError> {
    let starts = parse_start_times(requested)?;

    if starts.is_empty() {
        return Err(AppError::NoTimeslotsProvided);
    }

    let mut sorted = starts.clone();
    sorted.sort();
    sorted.dedup();
    if sorted.len() != starts.len() {
        return Err(AppError::DuplicateTimeslots);
    }

    if starts.iter().any(|start| *start < now) {
        return Err(AppError::PastTimeslot);
    }

    if starts.iter().any(|start| active_starts.contains(start)) {
        return Err(AppError::OverlappingBooking);
    }

    let first_day = sorted[0].date();
    if sorted.iter().any(|start| start.date() != first_day) {
        return Err(AppError::MultiDayBooking);
    }

    if sorted.windows(2).any(|pair| pair[1] - pair[0] != SLOT_LENGTH) {
        return Err(AppError::NonConsecutiveTimeslots);
    }

    Ok(starts)
}

/// Parses every raw start time as RFC 3339 and normalizes it to UTC, so the
/// uniqueness and same-day rules hold no matter what offset the caller sent.
pub fn parse_start_times(
    requested: &[TimeslotPayload],
) -> Result<Vec<OffsetDateTime>, AppError> {
    requested
        .iter()
        .map(|ts| {
            OffsetDateTime::parse(&ts.start_time, &Rfc3339)
                .map(|dt| dt.to_offset(UtcOffset::UTC))
                .map_err(|_| AppError::InvalidTimeslotFormat(ts.start_time.clone()))
        })
        .collect()
}
