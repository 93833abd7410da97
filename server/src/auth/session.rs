use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration as StdDuration;

use axum::http::{header, HeaderMap};
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use chrono::{DateTime, Duration, Utc};
use rand::RngCore;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tracing::debug;
use uuid::Uuid;

pub const SESSION_COOKIE: &str = "wolfevents_session";

/// Upper bound on any session lifetime: one year.
pub const MAX_SESSION_TTL_SECS: i64 = 60 * 60 * 24 * 365;

const TOKEN_BYTES: usize = 32;

#[derive(Debug, Clone)]
pub struct Session {
    pub attendee_id: Uuid,
    pub expires_at: DateTime<Utc>,
}

impl Session {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}

/// Server-side sessions keyed by an opaque random token.
#[derive(Clone, Default)]
pub struct SessionStore {
    sessions: Arc<RwLock<HashMap<String, Session>>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// `ttl_secs` is clamped to `0..=MAX_SESSION_TTL_SECS`.
    pub async fn create(&self, attendee_id: Uuid, ttl_secs: i64) -> (String, Session) {
        let token = generate_token();
        let now = Utc::now();
        let expires_at = Duration::try_seconds(clamp_ttl(ttl_secs))
            .and_then(|ttl| now.checked_add_signed(ttl))
            .unwrap_or(now);
        let session = Session {
            attendee_id,
            expires_at,
        };
        self.sessions
            .write()
            .await
            .insert(token.clone(), session.clone());
        (token, session)
    }

    /// Live session for `token`. Expired sessions are dropped on sight.
    pub async fn get(&self, token: &str) -> Option<Session> {
        let session = self.sessions.read().await.get(token).cloned()?;
        if session.is_expired(Utc::now()) {
            self.sessions.write().await.remove(token);
            return None;
        }
        Some(session)
    }

    pub async fn remove(&self, token: &str) -> bool {
        self.sessions.write().await.remove(token).is_some()
    }

    pub async fn purge_expired(&self) -> usize {
        let now = Utc::now();
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, session| !session.is_expired(now));
        before - sessions.len()
    }

    pub fn spawn_purge_task(&self, every: StdDuration) -> JoinHandle<()> {
        let store = self.clone();
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(every);
            loop {
                interval.tick().await;
                let purged = store.purge_expired().await;
                if purged > 0 {
                    debug!(purged, "Expired sessions purged");
                }
            }
        })
    }
}

pub fn clamp_ttl(ttl_secs: i64) -> i64 {
    ttl_secs.clamp(0, MAX_SESSION_TTL_SECS)
}

pub fn generate_token() -> String {
    let mut bytes = [0u8; TOKEN_BYTES];
    rand::thread_rng().fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}

/// `Set-Cookie` value for a new session. Without `max_age` the cookie lasts
/// for the browser session only.
pub fn session_cookie(token: &str, max_age: Option<i64>, secure: bool) -> String {
    let mut cookie = format!("{SESSION_COOKIE}={token}; Path=/; HttpOnly; SameSite=Lax");
    if let Some(max_age) = max_age {
        cookie.push_str(&format!("; Max-Age={max_age}"));
    }
    if secure {
        cookie.push_str("; Secure");
    }
    cookie
}

pub fn clear_session_cookie(secure: bool) -> String {
    session_cookie("", Some(0), secure)
}

fn cookie_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == SESSION_COOKIE)
        .map(|(_, token)| token.to_string())
        .filter(|token| !token.is_empty())
}

fn bearer_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(|token| token.trim().to_string())
        .filter(|token| !token.is_empty())
}

/// Every session token the request carries: the session cookie first, then
/// `Authorization: Bearer <token>`.
pub fn tokens_from_headers(headers: &HeaderMap) -> Vec<String> {
    let mut tokens: Vec<String> = cookie_token(headers).into_iter().collect();
    if let Some(bearer) = bearer_token(headers) {
        if !tokens.contains(&bearer) {
            tokens.push(bearer);
        }
    }
    tokens
}
