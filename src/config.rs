use std::env;

pub const LOCATION: &str =
    "Royal Docks Centre for Sustainability, University of East London \
     Docklands Campus, 4-6 University Way, London E16 2RD";

pub const ORGANIZER_NAME: &str = "Dialogue Cafe";

/// Advisory per-slot cap surfaced to clients alongside availability counts.
/// Not enforced as a storage constraint.
pub const MAX_BOOKINGS_PER_TIMESLOT: i64 = 5;

#[derive(Clone)]
pub struct Config {
    pub database_url: String,
    pub server_address: String,
    pub sender_email: String,
}

impl Config {
    pub fn from_env() -> Self {
        Config {
            database_url: env::var("DATABASE_URL").expect("DATABASE_URL is missing in env"),
            server_address: env::var("SERVER_ADDRESS")
                .unwrap_or_else(|_| "127.0.0.1:7870".to_string()),
            sender_email: env::var("SENDER_EMAIL")
                .unwrap_or_else(|_| "bookings@dialoguecafe.org.uk".to_string()),
        }
    }
}
