pub mod attendees;
pub mod auth;
pub mod events;
pub mod health;
pub mod rooms;
pub mod tickets;

pub use attendees::{list_attendees, list_my_tickets};
pub use auth::{login, logout, register};
pub use events::{create_event, get_event, list_events};
pub use health::health_check;
pub use rooms::{create_room, delete_room, list_rooms};
pub use tickets::book_ticket;
