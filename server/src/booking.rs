//! Ticket booking against per-event seat inventory.
//!
//! The seat check and the decrement never happen as two separate storage
//! calls with a decision in between: the early read in [`book`] only short
//! circuits hopeless requests, and the authoritative check is the
//! conditional decrement inside [`InventoryStore::try_decrement_and_record`].

use serde_json::Value;
use thiserror::Error;
use tracing::{debug, info};
use uuid::Uuid;

use crate::models::Ticket;
use crate::store::{InventoryStore, StoreError};

/// A booking that was refused for a business reason. None of these mutate
/// anything.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Rejection {
    #[error("{0}")]
    InvalidInput(String),

    #[error("Event '{0}' was not found")]
    NotFound(Uuid),

    #[error("Not enough seats available.")]
    InsufficientSeats { requested: i32, remaining: i32 },
}

#[derive(Debug, Clone)]
pub enum BookingOutcome {
    Booked(Ticket),
    Rejected(Rejection),
}

/// Reads a requested quantity as submitted by a client. Integers and strings
/// of digits are accepted; anything else is `InvalidInput`.
pub fn parse_quantity(raw: &Value) -> Result<i64, Rejection> {
    let parsed = match raw {
        Value::Number(number) => number.as_i64(),
        Value::String(text) => text.trim().parse::<i64>().ok(),
        _ => None,
    };
    parsed.ok_or_else(|| {
        Rejection::InvalidInput("Number of tickets must be a whole number.".to_string())
    })
}

/// Books `requested_quantity` seats of `event_id` for `attendee_id`.
///
/// The attendee is expected to be authenticated already. Rejections come
/// back as [`BookingOutcome::Rejected`]; only storage failures are `Err`,
/// and a storage failure leaves no partial booking behind.
pub async fn book<S>(
    store: &S,
    event_id: Uuid,
    attendee_id: Uuid,
    requested_quantity: i64,
) -> Result<BookingOutcome, StoreError>
where
    S: InventoryStore + ?Sized,
{
    let quantity = match i32::try_from(requested_quantity) {
        Ok(quantity) if quantity > 0 => quantity,
        Ok(_) => {
            return Ok(BookingOutcome::Rejected(Rejection::InvalidInput(
                "Number of tickets must be at least 1.".to_string(),
            )))
        }
        Err(_) => {
            return Ok(BookingOutcome::Rejected(Rejection::InvalidInput(
                "Number of tickets is too large.".to_string(),
            )))
        }
    };

    let Some(remaining) = store.get_remaining(event_id).await? else {
        return Ok(BookingOutcome::Rejected(Rejection::NotFound(event_id)));
    };
    if quantity > remaining {
        debug!(%event_id, %attendee_id, quantity, remaining, "Booking rejected: not enough seats");
        return Ok(BookingOutcome::Rejected(Rejection::InsufficientSeats {
            requested: quantity,
            remaining,
        }));
    }

    match store
        .try_decrement_and_record(event_id, attendee_id, quantity)
        .await?
    {
        Some(ticket) => {
            info!(%event_id, %attendee_id, ticket_id = %ticket.id, quantity, "Tickets booked");
            Ok(BookingOutcome::Booked(ticket))
        }
        // Lost a race since the read above, or the event was deleted meanwhile.
        None => match store.get_remaining(event_id).await? {
            Some(remaining) => {
                debug!(%event_id, %attendee_id, quantity, remaining, "Booking lost race for seats");
                Ok(BookingOutcome::Rejected(Rejection::InsufficientSeats {
                    requested: quantity,
                    remaining,
                }))
            }
            None => Ok(BookingOutcome::Rejected(Rejection::NotFound(event_id))),
        },
    }
}
