use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response}
};

use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {

    #[error("Bad request: {0}")]
    InvalidRequest(String),

    #[error("User information is required")]
    MissingUser,

    #[error("Timeslot selection is required")]
    MissingTimeslots,

    #[error("Email is required")]
    EmailRequired,

    #[error("Invalid user data: {0}")]
    InvalidUserData(String),

    #[error("Invalid timeslot format: {0}")]
    InvalidTimeslotFormat(String),

    #[error("No timeslots provided")]
    NoTimeslotsProvided,

    #[error("Duplicate timeslots provided")]
    DuplicateTimeslots,

    #[error("Cannot book timeslots in the past")]
    PastTimeslot,

    #[error("User already has a booking during selected time slots")]
    OverlappingBooking,

    #[error("Timeslots must all fall on the same day")]
    MultiDayBooking,

    #[error("Timeslots must be consecutive")]
    NonConsecutiveTimeslots,

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Could not send confirmation email: {0}")]
    EmailDeliveryFailure(String),

    #[error("Storage error: {0}")]
    PersistenceFailure(String),

    #[error("Unexpected server error: {0}")]
    Unexpected(String),
}

impl AppError {

    pub fn invalid_request<T: Into<String>>(msg: T) -> Self {
        AppError::InvalidRequest(msg.into())
    }

    pub fn invalid_user_data<T: Into<String>>(msg: T) -> Self {
        AppError::InvalidUserData(msg.into())
    }

    pub fn not_found<T: Into<String>>(msg: T) -> Self {
        AppError::NotFound(msg.into())
    }

    /// Machine-readable code used in error bodies and warnings.
    pub fn code(&self) -> &'static str {
        match self {
            AppError::InvalidRequest(_) => "INVALID_REQUEST",
            AppError::MissingUser => "MISSING_USER",
            AppError::MissingTimeslots => "MISSING_TIMESLOTS",
            AppError::EmailRequired => "EMAIL_REQUIRED",
            AppError::InvalidUserData(_) => "INVALID_USER_DATA",
            AppError::InvalidTimeslotFormat(_) => "INVALID_TIMESLOT_FORMAT",
            AppError::NoTimeslotsProvided => "NO_TIMESLOTS_PROVIDED",
            AppError::DuplicateTimeslots => "DUPLICATE_TIMESLOTS",
            AppError::PastTimeslot => "PAST_TIMESLOT",
            AppError::OverlappingBooking => "OVERLAPPING_BOOKING",
            AppError::MultiDayBooking => "MULTI_DAY_BOOKING",
            AppError::NonConsecutiveTimeslots => "NON_CONSECUTIVE_TIMESLOTS",
            AppError::NotFound(_) => "NOT_FOUND",
            AppError::EmailDeliveryFailure(_) => "EMAIL_DELIVERY_FAILURE",
            AppError::PersistenceFailure(_) => "PERSISTENCE_FAILURE",
            AppError::Unexpected(_) => "SERVER_ERROR",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::EmailDeliveryFailure(_)
            | AppError::PersistenceFailure(_)
            | AppError::Unexpected(_) => StatusCode::INTERNAL_SERVER_ERROR,
            _ => StatusCode::BAD_REQUEST,
        }
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        AppError::PersistenceFailure(err.to_string())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = Json(json!({
            "status": "error",
            "code": self.code(),
            "message": self.to_string()
        }));

        (self.status(), body).into_response()
    }
}
