use axum::{
    extract::State,
    http::{header, HeaderMap},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use tracing::info;
use validator::Validate;

use crate::auth::password::{hash_password, verify_password};
use crate::auth::session::{clamp_ttl, clear_session_cookie, session_cookie, tokens_from_headers};
use crate::models::{Attendee, LoginRequest, NewAttendee, RegisterAttendee};
use crate::state::AppState;
use crate::store::AttendeeStore;
use crate::utils::error::AppError;
use crate::utils::response::{created, empty_success, success};

const INVALID_CREDENTIALS: &str = "Invalid email or password!";

#[derive(Serialize)]
struct LoginPayload {
    attendee: Attendee,
    token: String,
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

pub async fn register(
    State(state): State<AppState>,
    Json(mut input): Json<RegisterAttendee>,
) -> Result<Response, AppError> {
    input.name = input.name.trim().to_string();
    input.email = normalize_email(&input.email);
    input.validate()?;

    let email = input.email;
    if state.store.find_attendee_by_email(&email).await?.is_some() {
        return Err(AppError::Conflict(
            "Please use a different email address.".to_string(),
        ));
    }

    // Argon2 is deliberately slow; keep it off the async workers.
    let password = input.password;
    let password_hash = tokio::task::spawn_blocking(move || hash_password(&password))
        .await
        .map_err(|e| AppError::InternalServerError(format!("hashing task failed: {e}")))?
        .map_err(|e| AppError::InternalServerError(format!("password hashing failed: {e}")))?;

    let is_admin = state.config.is_admin_email(&email);
    let attendee = state
        .store
        .create_attendee(NewAttendee {
            name: input.name,
            email,
            phone_number: input.phone_number,
            password_hash,
            is_admin,
        })
        .await?;

    info!(attendee_id = %attendee.id, is_admin, "Attendee registered");
    Ok(created(attendee, "Congrats! You are now a registered user!"))
}

pub async fn login(
    State(state): State<AppState>,
    Json(input): Json<LoginRequest>,
) -> Result<Response, AppError> {
    let email = normalize_email(&input.email);
    let Some(attendee) = state.store.find_attendee_by_email(&email).await? else {
        return Err(AppError::AuthError(INVALID_CREDENTIALS.to_string()));
    };

    let password = input.password;
    let stored_hash = attendee.password_hash.clone();
    let verified = tokio::task::spawn_blocking(move || verify_password(&password, &stored_hash))
        .await
        .map_err(|e| AppError::InternalServerError(format!("verification task failed: {e}")))?;
    if !verified {
        return Err(AppError::AuthError(INVALID_CREDENTIALS.to_string()));
    }

    let ttl_secs = clamp_ttl(if input.remember_me {
        state.config.remember_me_ttl_secs
    } else {
        state.config.session_ttl_secs
    });
    let (token, _) = state.sessions.create(attendee.id, ttl_secs).await;
    let cookie = session_cookie(
        &token,
        input.remember_me.then_some(ttl_secs),
        state.config.production,
    );

    info!(attendee_id = %attendee.id, remember_me = input.remember_me, "Attendee logged in");
    Ok((
        [(header::SET_COOKIE, cookie)],
        success(LoginPayload { attendee, token }, "Logged in successfully"),
    )
        .into_response())
}

/// Always succeeds, with or without a live session.
pub async fn logout(State(state): State<AppState>, headers: HeaderMap) -> Response {
    for token in tokens_from_headers(&headers) {
        if state.sessions.remove(&token).await {
            info!("Attendee logged out");
        }
    }

    (
        [(header::SET_COOKIE, clear_session_cookie(state.config.production))],
        empty_success("You have been logged out."),
    )
        .into_response()
}
