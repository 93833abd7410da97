use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "event_category", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Sports,
    Entertainment,
    Music,
}

/// A scheduled event hosted in one room.
///
/// `remaining_seats` starts at the room's capacity and only ever goes down,
/// through a successful booking.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Event {
    pub id: Uuid,
    pub room_id: Uuid,
    pub name: String,
    pub category: Category,
    pub ticket_price: i32,
    pub date: NaiveDate,
    pub remaining_seats: i32,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateEvent {
    #[validate(length(min = 1, max = 100, message = "Event name must be 1 to 100 characters."))]
    pub name: String,
    pub category: Category,
    #[validate(range(min = 0, message = "Ticket price cannot be negative."))]
    pub ticket_price: i32,
    pub date: NaiveDate,
    pub room_id: Uuid,
}
