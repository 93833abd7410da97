use axum::{
    routing::{delete, get, post},
    Router,
};
use tower_http::trace::TraceLayer;

use crate::config::{create_cors_layer, with_security_headers};
use crate::handlers::{
    book_ticket, create_event, create_room, delete_room, get_event, health_check, list_attendees,
    list_events, list_my_tickets, list_rooms, login, logout, register,
};
use crate::state::AppState;

pub fn create_routes(state: AppState) -> Router {
    let include_hsts = state.config.production;
    let cors = create_cors_layer(&state.config.cors_allowed_origins);

    let router = Router::new()
        .route("/health", get(health_check))
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/logout", post(logout))
        .route("/me/tickets", get(list_my_tickets))
        .route("/rooms", get(list_rooms).post(create_room))
        .route("/rooms/:room_id", delete(delete_room))
        .route("/events", get(list_events).post(create_event))
        .route("/events/:event_id", get(get_event))
        .route("/events/:event_id/tickets", post(book_ticket))
        .route("/attendees", get(list_attendees))
        .with_state(state);

    with_security_headers(router, include_hsts)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}
