use axum::{extract::State, response::Response};

use crate::auth::{AdminAttendee, CurrentAttendee};
use crate::state::AppState;
use crate::store::AttendeeStore;
use crate::utils::error::AppError;
use crate::utils::response::success;

pub async fn list_attendees(
    _admin: AdminAttendee,
    State(state): State<AppState>,
) -> Result<Response, AppError> {
    let attendees = state.store.list_attendees().await?;
    Ok(success(attendees, "Attendees retrieved"))
}

pub async fn list_my_tickets(
    CurrentAttendee(attendee): CurrentAttendee,
    State(state): State<AppState>,
) -> Result<Response, AppError> {
    let tickets = state.store.list_tickets_for_attendee(attendee.id).await?;
    Ok(success(tickets, "Tickets retrieved"))
}
