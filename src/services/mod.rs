pub mod bookings;
pub mod validation;
