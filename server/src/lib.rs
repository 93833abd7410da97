//! WolfEvents: rooms, events, attendees and seat-safe ticket booking over
//! a JSON API.

pub mod auth;
pub mod booking;
pub mod config;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod state;
pub mod store;
pub mod utils;
