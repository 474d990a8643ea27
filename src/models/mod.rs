pub mod booking;
pub mod timeslot;
pub mod user;
