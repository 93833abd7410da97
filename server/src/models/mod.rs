pub mod attendee;
pub mod event;
pub mod room;
pub mod ticket;

pub use attendee::{Attendee, LoginRequest, NewAttendee, RegisterAttendee};
pub use event::{Category, CreateEvent, Event};
pub use room::{CreateRoom, Room};
pub use ticket::{BookTicketRequest, Ticket};
