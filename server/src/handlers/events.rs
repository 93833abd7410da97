use axum::{
    extract::{Path, State},
    response::Response,
    Json,
};
use tracing::info;
use uuid::Uuid;
use validator::Validate;

use crate::auth::{AdminAttendee, CurrentAttendee};
use crate::models::CreateEvent;
use crate::state::AppState;
use crate::store::EventStore;
use crate::utils::error::AppError;
use crate::utils::response::{created, success};

pub async fn list_events(
    _attendee: CurrentAttendee,
    State(state): State<AppState>,
) -> Result<Response, AppError> {
    let events = state.store.list_events().await?;
    Ok(success(events, "Events retrieved"))
}

pub async fn get_event(
    _attendee: CurrentAttendee,
    State(state): State<AppState>,
    Path(event_id): Path<Uuid>,
) -> Result<Response, AppError> {
    let event = state
        .store
        .get_event(event_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Event '{}' was not found", event_id)))?;
    Ok(success(event, "Event retrieved"))
}

pub async fn create_event(
    AdminAttendee(admin): AdminAttendee,
    State(state): State<AppState>,
    Json(mut input): Json<CreateEvent>,
) -> Result<Response, AppError> {
    input.name = input.name.trim().to_string();
    input.validate()?;

    let event = state.store.create_event(input).await?;
    info!(
        event_id = %event.id,
        room_id = %event.room_id,
        admin_id = %admin.id,
        seats = event.remaining_seats,
        "Event created"
    );
    Ok(created(event, "Successfully created a new event!"))
}
