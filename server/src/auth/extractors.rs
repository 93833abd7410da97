use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use tracing::debug;

use crate::auth::session::tokens_from_headers;
use crate::models::Attendee;
use crate::state::AppState;
use crate::store::AttendeeStore;
use crate::utils::error::AppError;

/// The attendee behind the request's session. Rejects with 401 when there
/// is no live session.
#[derive(Debug, Clone)]
pub struct CurrentAttendee(pub Attendee);

/// Like [`CurrentAttendee`], but also rejects non-admins with 403.
#[derive(Debug, Clone)]
pub struct AdminAttendee(pub Attendee);

#[async_trait]
impl FromRequestParts<AppState> for CurrentAttendee {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let tokens = tokens_from_headers(&parts.headers);
        if tokens.is_empty() {
            return Err(AppError::AuthError(
                "Please log in to access this page.".to_string(),
            ));
        }

        // A stale cookie must not hide a live bearer token.
        let mut live = None;
        for token in &tokens {
            if let Some(session) = state.sessions.get(token).await {
                live = Some(session);
                break;
            }
        }
        let session = live.ok_or_else(|| {
            AppError::AuthError("Your session has expired. Please log in again.".to_string())
        })?;

        let attendee = state
            .store
            .get_attendee(session.attendee_id)
            .await?
            .ok_or_else(|| {
                debug!(attendee_id = %session.attendee_id, "Session refers to a missing attendee");
                AppError::AuthError("Please log in to access this page.".to_string())
            })?;

        Ok(Self(attendee))
    }
}

#[async_trait]
impl FromRequestParts<AppState> for AdminAttendee {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let CurrentAttendee(attendee) = CurrentAttendee::from_request_parts(parts, state).await?;
        if !attendee.is_admin {
            return Err(AppError::Forbidden(
                "You are not authorized to access this page".to_string(),
            ));
        }
        Ok(Self(attendee))
    }
}
