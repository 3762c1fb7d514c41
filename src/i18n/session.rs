//! Session storage seen by the `session` detection method.

use crate::i18n::cookie::find_cookie;
use anyhow::Result;
use futures::future::BoxFuture;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::RwLock;

/// Session data resolved from a request's cookies.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Session {
    id: Option<String>,
    data: HashMap<String, Value>,
}

impl Session {
    pub fn new(id: Option<String>, data: HashMap<String, Value>) -> Self {
        Self { id, data }
    }

    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.data.get(key)
    }

    pub fn set(&mut self, key: impl Into<String>, value: Value) {
        self.data.insert(key.into(), value);
    }
}

/// Loads sessions from a raw `Cookie` header.
pub trait SessionStorage: Send + Sync {
    /// Always returns a session; an unknown or missing id yields an empty one.
    fn get_session<'a>(&'a self, cookie_header: Option<&'a str>) -> BoxFuture<'a, Result<Session>>;
}

/// Sessions kept in process memory, addressed by an id cookie.
pub struct MemorySessionStorage {
    cookie_name: String,
    sessions: RwLock<HashMap<String, HashMap<String, Value>>>,
    next_id: AtomicU64,
}

impl MemorySessionStorage {
    pub const DEFAULT_COOKIE: &'static str = "__session";

    pub fn new(cookie_name: impl Into<String>) -> Self {
        Self {
            cookie_name: cookie_name.into(),
            sessions: RwLock::new(HashMap::new()),
            next_id: AtomicU64::new(1),
        }
    }

    pub fn cookie_name(&self) -> &str {
        &self.cookie_name
    }

    /// Persist `session` and return the id to put in the session cookie.
    pub async fn commit_session(&self, session: &Session) -> String {
        let id = match session.id() {
            Some(id) => id.to_string(),
            None => format!("s{}", self.next_id.fetch_add(1, Ordering::Relaxed)),
        };
        self.sessions
            .write()
            .await
            .insert(id.clone(), session.data.clone());
        id
    }
}

impl Default for MemorySessionStorage {
    fn default() -> Self {
        Self::new(Self::DEFAULT_COOKIE)
    }
}

impl SessionStorage for MemorySessionStorage {
    fn get_session<'a>(&'a self, cookie_header: Option<&'a str>) -> BoxFuture<'a, Result<Session>> {
        Box::pin(async move {
            let Some(id) = cookie_header.and_then(|header| find_cookie(header, &self.cookie_name))
            else {
                return Ok(Session::default());
            };

            let sessions = self.sessions.read().await;
            Ok(match sessions.get(id) {
                Some(data) => Session::new(Some(id.to_string()), data.clone()),
                None => Session::default(),
            })
        })
    }
}
