use axum::{
    Json,
    extract::{Query, State},
};
use serde::Deserialize;
use serde_json::{Value, json};
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

use crate::config::MAX_BOOKINGS_PER_TIMESLOT;
use crate::route::AppState;
use crate::utils::errorhandler::AppError;

#[derive(Deserialize)]
pub struct AvailabilityParams {
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

/// Maps each existing slot's start instant to its booking count for the
/// inclusive range. Slots that were never created are absent from the map;
/// callers treat absence as zero.
pub async fn get_availability(
    State(state): State<AppState>,
    Query(params): Query<AvailabilityParams>,
) -> Result<Json<Value>, AppError> {
    let (Some(start), Some(end)) = (params.start_date, params.end_date) else {
        return Err(AppError::invalid_request("Start and end date required"));
    };

    let from = parse_instant(&start)?;
    let to = parse_instant(&end)?;

    let usage = state.bookings.availability(from, to).await?;

    let mut counts = serde_json::Map::new();
    for slot in usage {
        let key = slot
            .start_time
            .format(&Rfc3339)
            .map_err(|e| AppError::Unexpected(e.to_string()))?;
        counts.insert(key, json!(slot.booking_count));
    }

    Ok(Json(json!({
        "status": "success",
        "data": counts,
        "max_per_slot": MAX_BOOKINGS_PER_TIMESLOT
    })))
}

fn parse_instant(raw: &str) -> Result<OffsetDateTime, AppError> {
    OffsetDateTime::parse(raw, &Rfc3339)
        .map_err(|_| AppError::InvalidTimeslotFormat(raw.to_string()))
}
