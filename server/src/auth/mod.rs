//! Credentials, sessions and the extractors that turn a session into the
//! caller's identity.

pub mod extractors;
pub mod password;
pub mod session;

pub use extractors::{AdminAttendee, CurrentAttendee};
pub use session::{Session, SessionStore, SESSION_COOKIE};
