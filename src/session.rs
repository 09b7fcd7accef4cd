//! In-memory, cookie-keyed session state.
//!
//! Sessions live only in process memory and vanish on restart. The cookie just
//! carries an opaque id; the user record itself never leaves the server.

use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::{header, request::Parts, HeaderName, HeaderValue},
};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use std::time::{Duration, Instant};
use uuid::Uuid;

use crate::error::ApiError;
use crate::users::UserRecord;

struct Entry {
    user: UserRecord,
    last_seen: Instant,
}

#[derive(Clone)]
pub struct SessionStore {
    cookie_name: Arc<str>,
    ttl: Duration,
    sessions: Arc<RwLock<HashMap<String, Entry>>>,
}

impl SessionStore {
    pub fn new(cookie_name: &str, ttl: Duration) -> Self {
        Self {
            cookie_name: Arc::from(cookie_name),
            ttl,
            sessions: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    pub fn cookie_name(&self) -> &str {
        &self.cookie_name
    }

    fn is_live(&self, entry: &Entry, now: Instant) -> bool {
        now.duration_since(entry.last_seen) <= self.ttl
    }

    /// Mark `id` as seen now. Returns false when the session is unknown or
    /// has been idle past the TTL.
    pub fn touch(&self, id: &str) -> Result<bool, ApiError> {
        let mut sessions = self.sessions.write().map_err(|_| poisoned())?;
        let now = Instant::now();
        match sessions.get_mut(id) {
            Some(entry) if self.is_live(entry, now) => {
                entry.last_seen = now;
                Ok(true)
            }
            Some(_) => {
                sessions.remove(id);
                Ok(false)
            }
            None => Ok(false),
        }
    }

    pub fn get(&self, id: &str) -> Result<Option<UserRecord>, ApiError> {
        let sessions = self.sessions.read().map_err(|_| poisoned())?;
        let now = Instant::now();
        Ok(sessions
            .get(id)
            .filter(|entry| self.is_live(entry, now))
            .map(|entry| entry.user.clone()))
    }

    /// Store `user` under `id`, dropping every idle session on the way.
    pub fn insert(&self, id: &str, user: UserRecord) -> Result<(), ApiError> {
        let mut sessions = self.sessions.write().map_err(|_| poisoned())?;
        let now = Instant::now();

        let before = sessions.len();
        sessions.retain(|_, entry| self.is_live(entry, now));
        let pruned = before - sessions.len();

        sessions.insert(
            id.to_string(),
            Entry {
                user,
                last_seen: now,
            },
        );
        tracing::debug!(active_sessions = sessions.len(), pruned, "Session stored");
        Ok(())
    }

    pub fn remove(&self, id: &str) -> Result<Option<UserRecord>, ApiError> {
        let mut sessions = self.sessions.write().map_err(|_| poisoned())?;
        Ok(sessions.remove(id).map(|entry| entry.user))
    }
}

fn poisoned() -> ApiError {
    ApiError::Internal("Session store lock poisoned".to_string())
}

/// Pull the value of cookie `name` out of the request's `Cookie` headers.
fn read_cookie(parts: &Parts, name: &str) -> Option<String> {
    parts
        .headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value.to_string())
}

/// The caller's session. Unknown or missing cookies get a fresh id, which is
/// only handed back to the client once something is stored under it.
pub struct Session {
    id: String,
    is_new: bool,
    store: SessionStore,
    set_cookie: Option<String>,
}

impl Session {
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn is_new(&self) -> bool {
        self.is_new
    }

    pub fn user(&self) -> Result<Option<UserRecord>, ApiError> {
        self.store.get(&self.id)
    }

    /// Store `user`, replacing whatever the session held before.
    pub fn set_user(&mut self, user: UserRecord) -> Result<(), ApiError> {
        self.store.insert(&self.id, user)?;
        if self.is_new {
            self.set_cookie = Some(format!(
                "{}={}; Path=/; HttpOnly; SameSite=Lax",
                self.store.cookie_name(),
                self.id
            ));
        }
        Ok(())
    }

    /// Drop the session entirely and expire the client's cookie.
    pub fn clear(&mut self) -> Result<(), ApiError> {
        self.store.remove(&self.id)?;
        if !self.is_new {
            self.set_cookie = Some(format!(
                "{}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0",
                self.store.cookie_name()
            ));
        }
        Ok(())
    }

    /// `Set-Cookie` header to attach to the response, if the client's cookie
    /// needs to change.
    pub fn cookie_header(&self) -> Option<(HeaderName, HeaderValue)> {
        let cookie = self.set_cookie.as_deref()?;
        HeaderValue::from_str(cookie)
            .ok()
            .map(|value| (header::SET_COOKIE, value))
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for Session
where
    SessionStore: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let store = SessionStore::from_ref(state);

        let existing = match read_cookie(parts, store.cookie_name()) {
            Some(id) if store.touch(&id)? => Some(id),
            _ => None,
        };

        let session = match existing {
            Some(id) => Session {
                id,
                is_new: false,
                store,
                set_cookie: None,
            },
            None => Session {
                id: Uuid::new_v4().to_string(),
                is_new: true,
                store,
                set_cookie: None,
            },
        };

        Ok(session)
    }
}
