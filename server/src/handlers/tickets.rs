use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Response,
    Json,
};
use serde_json::json;
use uuid::Uuid;

use crate::auth::CurrentAttendee;
use crate::booking::{book, parse_quantity, BookingOutcome, Rejection};
use crate::models::BookTicketRequest;
use crate::state::AppState;
use crate::utils::error::AppError;
use crate::utils::response::{created, error as error_response};

pub async fn book_ticket(
    CurrentAttendee(attendee): CurrentAttendee,
    State(state): State<AppState>,
    Path(event_id): Path<Uuid>,
    Json(input): Json<BookTicketRequest>,
) -> Result<Response, AppError> {
    let outcome = match parse_quantity(&input.number_of_tickets) {
        Ok(quantity) => book(state.store.as_ref(), event_id, attendee.id, quantity).await?,
        Err(rejection) => BookingOutcome::Rejected(rejection),
    };

    match outcome {
        BookingOutcome::Booked(ticket) => Ok(created(ticket, "Tickets booked successfully!")),
        BookingOutcome::Rejected(Rejection::InvalidInput(message)) => {
            Err(AppError::ValidationError(message))
        }
        BookingOutcome::Rejected(rejection @ Rejection::NotFound(_)) => {
            Err(AppError::NotFound(rejection.to_string()))
        }
        // An ordinary outcome: the attendee may retry with fewer seats.
        BookingOutcome::Rejected(
            rejection @ Rejection::InsufficientSeats {
                requested,
                remaining,
            },
        ) => Ok(error_response(
            "INSUFFICIENT_SEATS",
            rejection.to_string(),
            Some(json!({ "requested": requested, "remaining": remaining })),
            StatusCode::CONFLICT,
        )),
    }
}
