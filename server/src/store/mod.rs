//! Storage seams.
//!
//! Each concern gets its own trait so that callers can ask for exactly what
//! they touch. [`Store`] bundles them for the application state. Two
//! backends ship: [`PgStore`] for PostgreSQL and [`MemoryStore`] for tests
//! and local runs without a database.

use axum::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::models::{Attendee, CreateEvent, CreateRoom, Event, NewAttendee, Room, Ticket};

pub mod memory;
pub mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{0} is already in use")]
    Duplicate(&'static str),

    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("database error: {0}")]
    Database(sqlx::Error),

    #[error("storage unavailable: {0}")]
    Unavailable(String),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_err) = &err {
            if db_err.is_unique_violation() {
                return StoreError::Duplicate(unique_field(db_err.constraint()));
            }
        }
        StoreError::Database(err)
    }
}

/// Maps a unique constraint name from the schema to the field a user would
/// recognise.
fn unique_field(constraint: Option<&str>) -> &'static str {
    match constraint {
        Some("rooms_address_key") => "address",
        Some("events_name_key") => "event name",
        Some("attendees_email_key") => "email",
        Some("attendees_phone_number_key") => "phone number",
        _ => "value",
    }
}

#[async_trait]
pub trait RoomStore: Send + Sync {
    async fn create_room(&self, input: CreateRoom) -> Result<Room, StoreError>;

    async fn list_rooms(&self) -> Result<Vec<Room>, StoreError>;

    /// Deletes the room together with its events and their tickets.
    async fn delete_room(&self, room_id: Uuid) -> Result<(), StoreError>;
}

#[async_trait]
pub trait EventStore: Send + Sync {
    /// Creates the event with `remaining_seats` set to the room's capacity.
    async fn create_event(&self, input: CreateEvent) -> Result<Event, StoreError>;

    async fn list_events(&self) -> Result<Vec<Event>, StoreError>;

    async fn get_event(&self, event_id: Uuid) -> Result<Option<Event>, StoreError>;
}

#[async_trait]
pub trait AttendeeStore: Send + Sync {
    async fn create_attendee(&self, attendee: NewAttendee) -> Result<Attendee, StoreError>;

    async fn find_attendee_by_email(&self, email: &str) -> Result<Option<Attendee>, StoreError>;

    async fn get_attendee(&self, attendee_id: Uuid) -> Result<Option<Attendee>, StoreError>;

    async fn list_attendees(&self) -> Result<Vec<Attendee>, StoreError>;

    /// Newest first.
    async fn list_tickets_for_attendee(&self, attendee_id: Uuid)
        -> Result<Vec<Ticket>, StoreError>;
}

/// Seat inventory. `remaining_seats` is written only through
/// [`InventoryStore::try_decrement_and_record`].
#[async_trait]
pub trait InventoryStore: Send + Sync {
    /// `None` when the event does not exist.
    async fn get_remaining(&self, event_id: Uuid) -> Result<Option<i32>, StoreError>;

    /// Decrements the event's remaining seats by `quantity` and records the
    /// ticket as one indivisible step.
    ///
    /// Returns `Ok(None)` when fewer than `quantity` seats remain at the
    /// moment of the attempt (or the event is gone). Infrastructure failures
    /// are `Err` and leave neither the decrement nor the ticket behind.
    async fn try_decrement_and_record(
        &self,
        event_id: Uuid,
        attendee_id: Uuid,
        quantity: i32,
    ) -> Result<Option<Ticket>, StoreError>;
}

pub trait Store: RoomStore + EventStore + AttendeeStore + InventoryStore {}

impl<T> Store for T where T: RoomStore + EventStore + AttendeeStore + InventoryStore {}
