use serde::{Deserialize, Serialize};
use sqlx::prelude::FromRow;
use time::OffsetDateTime;

use crate::utils::errorhandler::AppError;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: i64,
    pub email: String,
    pub full_name: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

/// Caller-supplied user section of a booking request, before validation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserPayload {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub full_name: String,
}

/// A validated, normalized user ready to be persisted (or matched by email).
#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub full_name: String,
}

impl NewUser {
    /// Trims both fields and applies the field rules: email is required and
    /// must contain '@', full name is required and 2-100 characters long.
    pub fn from_payload(payload: &UserPayload) -> Result<Self, AppError> {
        let email = payload.email.trim().to_string();
        let full_name = payload.full_name.trim().to_string();

        if email.is_empty() {
            return Err(AppError::EmailRequired);
        }
        if !email.contains('@') {
            return Err(AppError::invalid_user_data("invalid email format"));
        }
        if full_name.is_empty() {
            return Err(AppError::invalid_user_data("full name is required"));
        }
        let name_len = full_name.chars().count();
        if !(2..=100).contains(&name_len) {
            return Err(AppError::invalid_user_data(
                "full name must be between 2 and 100 characters",
            ));
        }

        Ok(NewUser { email, full_name })
    }
}
