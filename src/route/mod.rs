use std::sync::Arc;

use crate::email::ConfirmationMailer;
use crate::services::bookings::BookingService;
use crate::store::PgStore;

pub mod bookings;
pub mod timeslots;
pub mod videos;

#[derive(Clone)]
pub struct AppState {
    pub bookings: BookingService<PgStore>,
    pub mailer: Arc<dyn ConfirmationMailer>,
}
