use axum::async_trait;
use sqlx::PgPool;
use tracing::debug;
use uuid::Uuid;

use super::{AttendeeStore, EventStore, InventoryStore, RoomStore, StoreError};
use crate::models::{Attendee, CreateEvent, CreateRoom, Event, NewAttendee, Room, Ticket};

const ROOM_COLUMNS: &str = "id, address, capacity, created_at";
const EVENT_COLUMNS: &str =
    "id, room_id, name, category, ticket_price, date, remaining_seats, created_at";
const ATTENDEE_COLUMNS: &str =
    "id, name, email, phone_number, password_hash, is_admin, created_at";
const TICKET_COLUMNS: &str = "id, event_id, attendee_id, number_of_tickets, created_at";

#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl RoomStore for PgStore {
    async fn create_room(&self, input: CreateRoom) -> Result<Room, StoreError> {
        let room = sqlx::query_as::<_, Room>(&format!(
            "INSERT INTO rooms (id, address, capacity) VALUES ($1, $2, $3) RETURNING {ROOM_COLUMNS}"
        ))
        .bind(Uuid::new_v4())
        .bind(&input.address)
        .bind(input.capacity)
        .fetch_one(&self.pool)
        .await?;

        Ok(room)
    }

    async fn list_rooms(&self) -> Result<Vec<Room>, StoreError> {
        let rooms = sqlx::query_as::<_, Room>(&format!(
            "SELECT {ROOM_COLUMNS} FROM rooms ORDER BY address"
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(rooms)
    }

    async fn delete_room(&self, room_id: Uuid) -> Result<(), StoreError> {
        // events and tickets go with it through ON DELETE CASCADE
        let result = sqlx::query("DELETE FROM rooms WHERE id = $1")
            .bind(room_id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound("room"));
        }
        Ok(())
    }
}

#[async_trait]
impl EventStore for PgStore {
    async fn create_event(&self, input: CreateEvent) -> Result<Event, StoreError> {
        let event = sqlx::query_as::<_, Event>(&format!(
            "INSERT INTO events (id, room_id, name, category, ticket_price, date, remaining_seats) \
             SELECT $1, r.id, $2, $3, $4, $5, r.capacity FROM rooms r WHERE r.id = $6 \
             RETURNING {EVENT_COLUMNS}"
        ))
        .bind(Uuid::new_v4())
        .bind(&input.name)
        .bind(input.category)
        .bind(input.ticket_price)
        .bind(input.date)
        .bind(input.room_id)
        .fetch_optional(&self.pool)
        .await?;

        event.ok_or(StoreError::NotFound("room"))
    }

    async fn list_events(&self) -> Result<Vec<Event>, StoreError> {
        let events = sqlx::query_as::<_, Event>(&format!(
            "SELECT {EVENT_COLUMNS} FROM events ORDER BY date, name"
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(events)
    }

    async fn get_event(&self, event_id: Uuid) -> Result<Option<Event>, StoreError> {
        let event = sqlx::query_as::<_, Event>(&format!(
            "SELECT {EVENT_COLUMNS} FROM events WHERE id = $1"
        ))
        .bind(event_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(event)
    }
}

#[async_trait]
impl AttendeeStore for PgStore {
    async fn create_attendee(&self, attendee: NewAttendee) -> Result<Attendee, StoreError> {
        let attendee = sqlx::query_as::<_, Attendee>(&format!(
            "INSERT INTO attendees (id, name, email, phone_number, password_hash, is_admin) \
             VALUES ($1, $2, $3, $4, $5, $6) RETURNING {ATTENDEE_COLUMNS}"
        ))
        .bind(Uuid::new_v4())
        .bind(&attendee.name)
        .bind(&attendee.email)
        .bind(&attendee.phone_number)
        .bind(&attendee.password_hash)
        .bind(attendee.is_admin)
        .fetch_one(&self.pool)
        .await?;

        Ok(attendee)
    }

    async fn find_attendee_by_email(&self, email: &str) -> Result<Option<Attendee>, StoreError> {
        let attendee = sqlx::query_as::<_, Attendee>(&format!(
            "SELECT {ATTENDEE_COLUMNS} FROM attendees WHERE email = $1"
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(attendee)
    }

    async fn get_attendee(&self, attendee_id: Uuid) -> Result<Option<Attendee>, StoreError> {
        let attendee = sqlx::query_as::<_, Attendee>(&format!(
            "SELECT {ATTENDEE_COLUMNS} FROM attendees WHERE id = $1"
        ))
        .bind(attendee_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(attendee)
    }

    async fn list_attendees(&self) -> Result<Vec<Attendee>, StoreError> {
        let attendees = sqlx::query_as::<_, Attendee>(&format!(
            "SELECT {ATTENDEE_COLUMNS} FROM attendees ORDER BY created_at"
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(attendees)
    }

    async fn list_tickets_for_attendee(
        &self,
        attendee_id: Uuid,
    ) -> Result<Vec<Ticket>, StoreError> {
        let tickets = sqlx::query_as::<_, Ticket>(&format!(
            "SELECT {TICKET_COLUMNS} FROM tickets WHERE attendee_id = $1 ORDER BY created_at DESC"
        ))
        .bind(attendee_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(tickets)
    }
}

#[async_trait]
impl InventoryStore for PgStore {
    async fn get_remaining(&self, event_id: Uuid) -> Result<Option<i32>, StoreError> {
        let remaining =
            sqlx::query_scalar::<_, i32>("SELECT remaining_seats FROM events WHERE id = $1")
                .bind(event_id)
                .fetch_optional(&self.pool)
                .await?;

        Ok(remaining)
    }

    async fn try_decrement_and_record(
        &self,
        event_id: Uuid,
        attendee_id: Uuid,
        quantity: i32,
    ) -> Result<Option<Ticket>, StoreError> {
        let mut tx = self.pool.begin().await?;

        // The row lock taken by this UPDATE serializes bookings per event;
        // the WHERE clause is the seat check.
        let remaining = sqlx::query_scalar::<_, i32>(
            "UPDATE events SET remaining_seats = remaining_seats - $2 \
             WHERE id = $1 AND remaining_seats >= $2 \
             RETURNING remaining_seats",
        )
        .bind(event_id)
        .bind(quantity)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(remaining) = remaining else {
            tx.rollback().await?;
            return Ok(None);
        };

        let ticket = sqlx::query_as::<_, Ticket>(&format!(
            "INSERT INTO tickets (id, event_id, attendee_id, number_of_tickets) \
             VALUES ($1, $2, $3, $4) RETURNING {TICKET_COLUMNS}"
        ))
        .bind(Uuid::new_v4())
        .bind(event_id)
        .bind(attendee_id)
        .bind(quantity)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        debug!(%event_id, %attendee_id, quantity, remaining, "Seats decremented");
        Ok(Some(ticket))
    }
}
