use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::{Validate, ValidationError};

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Attendee {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub phone_number: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub is_admin: bool,
    pub created_at: DateTime<Utc>,
}

/// Registration form. The password never leaves this struct unhashed.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct RegisterAttendee {
    #[validate(length(min = 1, max = 50, message = "Name is required."))]
    pub name: String,
    #[validate(email(message = "Invalid email address."))]
    pub email: String,
    #[validate(length(min = 1, message = "Password is required."))]
    pub password: String,
    #[validate(must_match(other = "password", message = "Passwords must match."))]
    pub password_confirmation: String,
    #[validate(custom(function = "validate_phone_number"))]
    pub phone_number: String,
}

/// Row to insert once the password has been hashed.
#[derive(Debug, Clone)]
pub struct NewAttendee {
    pub name: String,
    pub email: String,
    pub phone_number: String,
    pub password_hash: String,
    pub is_admin: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub remember_me: bool,
}

fn validate_phone_number(phone_number: &str) -> Result<(), ValidationError> {
    if phone_number.len() == 10 && phone_number.bytes().all(|b| b.is_ascii_digit()) {
        Ok(())
    } else {
        Err(ValidationError::new("phone_number")
            .with_message("Phone number must be exactly 10 digits.".into()))
    }
}
