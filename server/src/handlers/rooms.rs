use axum::{
    extract::{Path, State},
    response::Response,
    Json,
};
use tracing::info;
use uuid::Uuid;
use validator::Validate;

use crate::auth::AdminAttendee;
use crate::models::CreateRoom;
use crate::state::AppState;
use crate::store::RoomStore;
use crate::utils::error::AppError;
use crate::utils::response::{created, empty_success, success};

pub async fn list_rooms(
    _admin: AdminAttendee,
    State(state): State<AppState>,
) -> Result<Response, AppError> {
    let rooms = state.store.list_rooms().await?;
    Ok(success(rooms, "Rooms retrieved"))
}

pub async fn create_room(
    AdminAttendee(admin): AdminAttendee,
    State(state): State<AppState>,
    Json(mut input): Json<CreateRoom>,
) -> Result<Response, AppError> {
    input.address = input.address.trim().to_string();
    input.validate()?;

    let room = state.store.create_room(input).await?;
    info!(room_id = %room.id, admin_id = %admin.id, capacity = room.capacity, "Room created");
    Ok(created(room, "Successfully created a new room!"))
}

/// Removes the room and, with it, its events and their tickets.
pub async fn delete_room(
    AdminAttendee(admin): AdminAttendee,
    State(state): State<AppState>,
    Path(room_id): Path<Uuid>,
) -> Result<Response, AppError> {
    state.store.delete_room(room_id).await?;
    info!(%room_id, admin_id = %admin.id, "Room deleted");
    Ok(empty_success("Room deleted successfully!"))
}
