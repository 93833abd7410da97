use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use axum::async_trait;
use chrono::Utc;
use uuid::Uuid;

use super::{AttendeeStore, EventStore, InventoryStore, RoomStore, StoreError};
use crate::models::{Attendee, CreateEvent, CreateRoom, Event, NewAttendee, Room, Ticket};

#[derive(Default)]
struct Tables {
    rooms: HashMap<Uuid, Room>,
    events: HashMap<Uuid, Event>,
    attendees: HashMap<Uuid, Attendee>,
    tickets: HashMap<Uuid, Ticket>,
}

/// Process-local store. A single lock guards every table, so each trait
/// method is one atomic step, and cascades are applied by hand.
#[derive(Clone, Default)]
pub struct MemoryStore {
    tables: Arc<Mutex<Tables>>,
    fail_ticket_writes: Arc<AtomicBool>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every ticket write fail after the seat decrement has been
    /// staged, to observe that nothing partial is committed.
    pub fn fail_ticket_writes(&self, fail: bool) {
        self.fail_ticket_writes.store(fail, Ordering::SeqCst);
    }

    pub fn tickets_for_event(&self, event_id: Uuid) -> Result<Vec<Ticket>, StoreError> {
        let tables = self.lock()?;
        Ok(tables
            .tickets
            .values()
            .filter(|ticket| ticket.event_id == event_id)
            .cloned()
            .collect())
    }

    fn lock(&self) -> Result<MutexGuard<'_, Tables>, StoreError> {
        self.tables
            .lock()
            .map_err(|_| StoreError::Unavailable("in-memory store lock poisoned".to_string()))
    }
}

#[async_trait]
impl RoomStore for MemoryStore {
    async fn create_room(&self, input: CreateRoom) -> Result<Room, StoreError> {
        let mut tables = self.lock()?;
        if tables.rooms.values().any(|room| room.address == input.address) {
            return Err(StoreError::Duplicate("address"));
        }

        let room = Room {
            id: Uuid::new_v4(),
            address: input.address,
            capacity: input.capacity,
            created_at: Utc::now(),
        };
        tables.rooms.insert(room.id, room.clone());
        Ok(room)
    }

    async fn list_rooms(&self) -> Result<Vec<Room>, StoreError> {
        let tables = self.lock()?;
        let mut rooms: Vec<Room> = tables.rooms.values().cloned().collect();
        rooms.sort_by(|a, b| a.address.cmp(&b.address));
        Ok(rooms)
    }

    async fn delete_room(&self, room_id: Uuid) -> Result<(), StoreError> {
        let mut tables = self.lock()?;
        if tables.rooms.remove(&room_id).is_none() {
            return Err(StoreError::NotFound("room"));
        }

        let event_ids: Vec<Uuid> = tables
            .events
            .values()
            .filter(|event| event.room_id == room_id)
            .map(|event| event.id)
            .collect();
        for event_id in &event_ids {
            tables.events.remove(event_id);
        }
        tables
            .tickets
            .retain(|_, ticket| !event_ids.contains(&ticket.event_id));
        Ok(())
    }
}

#[async_trait]
impl EventStore for MemoryStore {
    async fn create_event(&self, input: CreateEvent) -> Result<Event, StoreError> {
        let mut tables = self.lock()?;
        let capacity = tables
            .rooms
            .get(&input.room_id)
            .map(|room| room.capacity)
            .ok_or(StoreError::NotFound("room"))?;
        if tables.events.values().any(|event| event.name == input.name) {
            return Err(StoreError::Duplicate("event name"));
        }

        let event = Event {
            id: Uuid::new_v4(),
            room_id: input.room_id,
            name: input.name,
            category: input.category,
            ticket_price: input.ticket_price,
            date: input.date,
            remaining_seats: capacity,
            created_at: Utc::now(),
        };
        tables.events.insert(event.id, event.clone());
        Ok(event)
    }

    async fn list_events(&self) -> Result<Vec<Event>, StoreError> {
        let tables = self.lock()?;
        let mut events: Vec<Event> = tables.events.values().cloned().collect();
        events.sort_by(|a, b| a.date.cmp(&b.date).then_with(|| a.name.cmp(&b.name)));
        Ok(events)
    }

    async fn get_event(&self, event_id: Uuid) -> Result<Option<Event>, StoreError> {
        Ok(self.lock()?.events.get(&event_id).cloned())
    }
}

#[async_trait]
impl AttendeeStore for MemoryStore {
    async fn create_attendee(&self, attendee: NewAttendee) -> Result<Attendee, StoreError> {
        let mut tables = self.lock()?;
        if tables.attendees.values().any(|a| a.email == attendee.email) {
            return Err(StoreError::Duplicate("email"));
        }
        if tables
            .attendees
            .values()
            .any(|a| a.phone_number == attendee.phone_number)
        {
            return Err(StoreError::Duplicate("phone number"));
        }

        let attendee = Attendee {
            id: Uuid::new_v4(),
            name: attendee.name,
            email: attendee.email,
            phone_number: attendee.phone_number,
            password_hash: attendee.password_hash,
            is_admin: attendee.is_admin,
            created_at: Utc::now(),
        };
        tables.attendees.insert(attendee.id, attendee.clone());
        Ok(attendee)
    }

    async fn find_attendee_by_email(&self, email: &str) -> Result<Option<Attendee>, StoreError> {
        let tables = self.lock()?;
        Ok(tables
            .attendees
            .values()
            .find(|attendee| attendee.email == email)
            .cloned())
    }

    async fn get_attendee(&self, attendee_id: Uuid) -> Result<Option<Attendee>, StoreError> {
        Ok(self.lock()?.attendees.get(&attendee_id).cloned())
    }

    async fn list_attendees(&self) -> Result<Vec<Attendee>, StoreError> {
        let tables = self.lock()?;
        let mut attendees: Vec<Attendee> = tables.attendees.values().cloned().collect();
        attendees.sort_by_key(|attendee| attendee.created_at);
        Ok(attendees)
    }

    async fn list_tickets_for_attendee(
        &self,
        attendee_id: Uuid,
    ) -> Result<Vec<Ticket>, StoreError> {
        let tables = self.lock()?;
        let mut tickets: Vec<Ticket> = tables
            .tickets
            .values()
            .filter(|ticket| ticket.attendee_id == attendee_id)
            .cloned()
            .collect();
        tickets.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(tickets)
    }
}

#[async_trait]
impl InventoryStore for MemoryStore {
    async fn get_remaining(&self, event_id: Uuid) -> Result<Option<i32>, StoreError> {
        Ok(self
            .lock()?
            .events
            .get(&event_id)
            .map(|event| event.remaining_seats))
    }

    async fn try_decrement_and_record(
        &self,
        event_id: Uuid,
        attendee_id: Uuid,
        quantity: i32,
    ) -> Result<Option<Ticket>, StoreError> {
        let mut tables = self.lock()?;

        let remaining = match tables.events.get(&event_id) {
            Some(event) if event.remaining_seats >= quantity => event.remaining_seats - quantity,
            _ => return Ok(None),
        };
        if !tables.attendees.contains_key(&attendee_id) {
            return Err(StoreError::NotFound("attendee"));
        }

        let ticket = Ticket {
            id: Uuid::new_v4(),
            event_id,
            attendee_id,
            number_of_tickets: quantity,
            created_at: Utc::now(),
        };
        if self.fail_ticket_writes.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("ticket write failed".to_string()));
        }

        // Nothing below can fail: commit both effects.
        if let Some(event) = tables.events.get_mut(&event_id) {
            event.remaining_seats = remaining;
        }
        tables.tickets.insert(ticket.id, ticket.clone());
        Ok(Some(ticket))
    }
}
