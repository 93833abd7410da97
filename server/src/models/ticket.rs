use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;
use uuid::Uuid;

/// A booking of one or more seats for an event. Immutable once written.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Ticket {
    pub id: Uuid,
    pub event_id: Uuid,
    pub attendee_id: Uuid,
    pub number_of_tickets: i32,
    pub created_at: DateTime<Utc>,
}

/// Kept loosely typed so that malformed quantities reach the booking
/// operation and come back as an `InvalidInput` rejection.
#[derive(Debug, Clone, Deserialize)]
pub struct BookTicketRequest {
    #[serde(default)]
    pub number_of_tickets: Value,
}
