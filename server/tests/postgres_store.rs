//! PostgreSQL store tests. They need a reachable database:
//!
//! ```sh
//! DATABASE_URL=postgres://localhost/wolfevents_test cargo test --test postgres_store -- --ignored
//! ```

use std::env;

use chrono::NaiveDate;
use sqlx::postgres::PgPoolOptions;
use uuid::Uuid;

use wolfevents_server::booking::{book, BookingOutcome, Rejection};
use wolfevents_server::models::{Category, CreateEvent, CreateRoom, NewAttendee};
use wolfevents_server::store::{
    AttendeeStore, EventStore, InventoryStore, PgStore, RoomStore, StoreError,
};

async fn connect() -> PgStore {
    let url = env::var("DATABASE_URL").expect("DATABASE_URL must be set for postgres tests");
    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(&url)
        .await
        .expect("Failed to connect to database");
    sqlx::migrate!()
        .run(&pool)
        .await
        .expect("Failed to run migrations");
    PgStore::new(pool)
}

/// Unique names keep reruns against the same database independent.
fn unique(prefix: &str) -> String {
    format!("{prefix}-{}", Uuid::new_v4().simple())
}

fn unique_phone() -> String {
    let digits: String = Uuid::new_v4()
        .as_u128()
        .to_string()
        .chars()
        .take(10)
        .collect();
    format!("{digits:0>10}")
}

async fn seed(store: &PgStore, capacity: i32, attendees: usize) -> (Uuid, Uuid, Vec<Uuid>) {
    let room = store
        .create_room(CreateRoom {
            address: unique("room"),
            capacity,
        })
        .await
        .unwrap();
    let event = store
        .create_event(CreateEvent {
            name: unique("event"),
            category: Category::Entertainment,
            ticket_price: 10,
            date: NaiveDate::from_ymd_opt(2025, 12, 1).unwrap(),
            room_id: room.id,
        })
        .await
        .unwrap();

    let mut ids = Vec::new();
    for _ in 0..attendees {
        let attendee = store
            .create_attendee(NewAttendee {
                name: "Postgres Fan".to_string(),
                email: format!("{}@ncsu.edu", unique("fan")),
                phone_number: unique_phone(),
                password_hash: "hash".to_string(),
                is_admin: false,
            })
            .await
            .unwrap();
        ids.push(attendee.id);
    }
    (room.id, event.id, ids)
}

async fn booked_seats(store: &PgStore, event_id: Uuid) -> i64 {
    sqlx::query_scalar::<_, Option<i64>>(
        "SELECT SUM(number_of_tickets)::BIGINT FROM tickets WHERE event_id = $1",
    )
    .bind(event_id)
    .fetch_one(store.pool())
    .await
    .unwrap()
    .unwrap_or(0)
}

#[tokio::test]
#[ignore = "requires DATABASE_URL"]
async fn test_conditional_decrement() {
    let store = connect().await;
    let (_, event_id, attendees) = seed(&store, 3, 1).await;

    assert_eq!(store.get_remaining(event_id).await.unwrap(), Some(3));
    let short = store
        .try_decrement_and_record(event_id, attendees[0], 4)
        .await
        .unwrap();
    assert!(short.is_none());
    assert_eq!(store.get_remaining(event_id).await.unwrap(), Some(3));

    let ticket = store
        .try_decrement_and_record(event_id, attendees[0], 3)
        .await
        .unwrap()
        .expect("exact fit should succeed");
    assert_eq!(ticket.number_of_tickets, 3);
    assert_eq!(store.get_remaining(event_id).await.unwrap(), Some(0));
}

#[tokio::test]
#[ignore = "requires DATABASE_URL"]
async fn test_failed_ticket_insert_rolls_back_decrement() {
    let store = connect().await;
    let (_, event_id, _) = seed(&store, 5, 0).await;

    // Unknown attendee: the foreign key fails the insert after the UPDATE ran.
    let result = store
        .try_decrement_and_record(event_id, Uuid::new_v4(), 2)
        .await;

    assert!(matches!(result, Err(StoreError::Database(_))));
    assert_eq!(store.get_remaining(event_id).await.unwrap(), Some(5));
    assert_eq!(booked_seats(&store, event_id).await, 0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
#[ignore = "requires DATABASE_URL"]
async fn test_concurrent_bookings_never_oversell() {
    let store = connect().await;
    let (_, event_id, attendees) = seed(&store, 20, 16).await;

    let mut handles = Vec::new();
    for attendee in attendees {
        let store = store.clone();
        handles.push(tokio::spawn(async move {
            book(&store, event_id, attendee, 3).await
        }));
    }

    let mut granted = 0i64;
    for handle in handles {
        match handle.await.unwrap().unwrap() {
            BookingOutcome::Booked(ticket) => granted += i64::from(ticket.number_of_tickets),
            BookingOutcome::Rejected(Rejection::InsufficientSeats { .. }) => {}
            other => panic!("unexpected outcome {:?}", other),
        }
    }

    let remaining = i64::from(store.get_remaining(event_id).await.unwrap().unwrap());
    assert_eq!(granted, 18);
    assert_eq!(remaining, 2);
    assert_eq!(booked_seats(&store, event_id).await + remaining, 20);
}

#[tokio::test]
#[ignore = "requires DATABASE_URL"]
async fn test_delete_room_cascades() {
    let store = connect().await;
    let (room_id, event_id, attendees) = seed(&store, 4, 1).await;
    store
        .try_decrement_and_record(event_id, attendees[0], 1)
        .await
        .unwrap()
        .unwrap();

    store.delete_room(room_id).await.unwrap();

    assert!(store.get_event(event_id).await.unwrap().is_none());
    assert_eq!(booked_seats(&store, event_id).await, 0);
    assert!(matches!(
        store.delete_room(room_id).await,
        Err(StoreError::NotFound("room"))
    ));
}

#[tokio::test]
#[ignore = "requires DATABASE_URL"]
async fn test_unique_violations_name_the_field() {
    let store = connect().await;
    let address = unique("room");
    store
        .create_room(CreateRoom {
            address: address.clone(),
            capacity: 1,
        })
        .await
        .unwrap();

    let again = store.create_room(CreateRoom { address, capacity: 2 }).await;
    assert!(matches!(again, Err(StoreError::Duplicate("address"))));
}
