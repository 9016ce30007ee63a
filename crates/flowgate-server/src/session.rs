//! Server-side sessions.
//!
//! A [`Session`] is created only after a bearer token verifies, and its id
//! travels back and forth in the HttpOnly `flowgate_sid` cookie. Protected
//! handlers take an [`AuthenticatedSession`] argument, which rejects the
//! request with 401 unless the cookie names a live authenticated session.

use std::str::FromStr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::extract::FromRequestParts;
use axum::http::header::COOKIE;
use axum::http::request::Parts;
use axum::http::HeaderMap;
use dashmap::DashMap;
use uuid::Uuid;

use crate::auth::UserIdentity;
use crate::error::ApiError;
use crate::state::AppState;

/// Name of the session cookie.
pub const COOKIE_NAME: &str = "flowgate_sid";

/// Unique session identifier (UUID v4 newtype).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SessionId(pub Uuid);

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for SessionId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(SessionId)
    }
}

#[derive(Debug, Clone)]
pub struct Session {
    pub id: SessionId,
    pub authenticated: bool,
    pub user: Option<UserIdentity>,
    pub created_at: Instant,
    pub last_active: Instant,
}

/// Registry of live sessions.
///
/// Backed by `DashMap` for concurrent lock-free access from multiple
/// async handler tasks.
pub struct SessionStore {
    sessions: DashMap<SessionId, Session>,
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionStore {
    pub fn new() -> Self {
        SessionStore {
            sessions: DashMap::new(),
        }
    }

    /// Opens an authenticated session for `user`.
    pub fn create(&self, user: UserIdentity) -> SessionId {
        let id = SessionId(Uuid::new_v4());
        let now = Instant::now();
        self.sessions.insert(
            id,
            Session {
                id,
                authenticated: true,
                user: Some(user),
                created_at: now,
                last_active: now,
            },
        );
        id
    }

    pub fn get(&self, id: &SessionId) -> Option<Session> {
        self.sessions.get(id).map(|entry| entry.clone())
    }

    /// Removes a session. Returns `true` if it existed.
    pub fn destroy(&self, id: &SessionId) -> bool {
        self.sessions.remove(id).is_some()
    }

    /// Updates the `last_active` timestamp for a session.
    pub fn touch(&self, id: &SessionId) {
        if let Some(mut entry) = self.sessions.get_mut(id) {
            entry.last_active = Instant::now();
        }
    }

    /// Removes sessions that have been inactive longer than `timeout`.
    ///
    /// Returns the number of sessions removed.
    pub fn sweep_inactive(&self, timeout: Duration) -> usize {
        let now = Instant::now();
        let mut removed = 0;
        self.sessions.retain(|_, session| {
            let active = now.duration_since(session.last_active) <= timeout;
            if !active {
                removed += 1;
            }
            active
        });
        removed
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    /// Spawns a background tokio task that periodically sweeps idle sessions.
    pub fn start_idle_sweep(self: &Arc<Self>, interval: Duration, idle: Duration) {
        let store = Arc::clone(self);
        tokio::spawn(async move {
            let mut tick = tokio::time::interval(interval);
            loop {
                tick.tick().await;
                let removed = store.sweep_inactive(idle);
                if removed > 0 {
                    tracing::info!("Swept {} idle session(s)", removed);
                }
            }
        });
    }
}

/// `Set-Cookie` value carrying `id`.
pub fn session_cookie(id: SessionId, secure: bool) -> String {
    let mut cookie = format!("{}={}; Path=/; HttpOnly; SameSite=Lax", COOKIE_NAME, id);
    if secure {
        cookie.push_str("; Secure");
    }
    cookie
}

/// `Set-Cookie` value that removes the session cookie.
pub fn clear_cookie(secure: bool) -> String {
    let mut cookie = format!("{}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0", COOKIE_NAME);
    if secure {
        cookie.push_str("; Secure");
    }
    cookie
}

/// Reads the session id from the request's `Cookie` headers.
///
/// Returns `None` if the cookie is absent or does not hold a UUID.
pub fn session_id_from_headers(headers: &HeaderMap) -> Option<SessionId> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == COOKIE_NAME)
        .and_then(|(_, value)| value.trim().parse().ok())
}

/// The authenticated session behind a request.
#[derive(Debug, Clone)]
pub struct AuthenticatedSession {
    pub id: SessionId,
    pub user: UserIdentity,
}

impl FromRequestParts<AppState> for AuthenticatedSession {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let unauthorized = || ApiError::Unauthorized("Not authenticated".to_string());

        let id = session_id_from_headers(&parts.headers).ok_or_else(unauthorized)?;
        let session = state.sessions.get(&id).ok_or_else(unauthorized)?;
        if !session.authenticated {
            return Err(unauthorized());
        }
        let user = session.user.ok_or_else(unauthorized)?;

        state.sessions.touch(&id);
        Ok(AuthenticatedSession { id, user })
    }
}
