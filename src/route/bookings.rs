use axum::{
    Json,
    extract::{Path, State},
    extract::rejection::JsonRejection,
    http::StatusCode,
};
use serde_json::{Value, json};
use tracing::error;

use crate::models::booking::CreateBookingReq;
use crate::route::AppState;
use crate::utils::errorhandler::AppError;

pub async fn create_booking(
    State(state): State<AppState>,
    payload: Result<Json<CreateBookingReq>, JsonRejection>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    let Json(payload) =
        payload.map_err(|_| AppError::invalid_request("Missing or malformed request body"))?;

    let (user, booking) = state.bookings.create_booking(payload).await?;

    // The booking is committed at this point; a mailer failure is reported
    // next to the success payload, never as a rollback.
    let mut warning = None;
    if let (Some(date), Some(range)) = (booking.date(), booking.time_range()) {
        if let Err(err) = state.mailer.send_confirmation(&user.email, date, &range).await {
            error!(booking_id = booking.id, error = %err, "confirmation email failed");
            warning = Some(err);
        }
    }

    let mut body = json!({
        "status": "success",
        "data": booking.to_view()
    });
    if let Some(err) = warning {
        body["warning"] = json!({
            "code": err.code(),
            "message": err.to_string()
        });
    }

    Ok((StatusCode::CREATED, Json(body)))
}

pub async fn cancel_booking(
    State(state): State<AppState>,
    Path(booking_id): Path<i64>,
) -> Result<Json<Value>, AppError> {
    let booking = state.bookings.cancel_booking(booking_id).await?;
    Ok(Json(json!({
        "status": "success",
        "data": booking.to_view()
    })))
}

pub async fn complete_booking(
    State(state): State<AppState>,
    Path(booking_id): Path<i64>,
) -> Result<Json<Value>, AppError> {
    let booking = state.bookings.complete_booking(booking_id).await?;
    Ok(Json(json!({
        "status": "success",
        "data": booking.to_view()
    })))
}
