//! In-memory session token store.
//!
//! Maps an opaque session id (carried in a cookie) to the [`AuthToken`]
//! obtained at sign-in. Lookups never touch the network.

use std::sync::Arc;
use std::time::{Duration, Instant};

use base64::Engine;
use dashmap::DashMap;
use rand::RngCore;
use tracing::debug;

use crate::models::auth::AuthToken;

/// How long a session stays valid after sign-in.
pub const SESSION_TTL: Duration = Duration::from_secs(12 * 60 * 60);

/// Generate an unguessable session id (32 random bytes, URL-safe base64).
pub fn generate_session_id() -> String {
    let mut bytes = [0u8; 32];
    rand::rng().fill_bytes(&mut bytes);
    base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(bytes)
}

#[derive(Debug, Clone)]
struct SessionEntry {
    token: AuthToken,
    created_at: Instant,
}

/// Session id → token bundle. Entries older than the TTL are treated as absent.
#[derive(Debug)]
pub struct SessionStore {
    sessions: DashMap<String, SessionEntry>,
    ttl: Duration,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::with_ttl(SESSION_TTL)
    }

    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            sessions: DashMap::new(),
            ttl,
        }
    }

    /// Store `token` under a fresh session id and return the id.
    pub fn insert(&self, token: AuthToken) -> String {
        let id = generate_session_id();
        self.sessions.insert(
            id.clone(),
            SessionEntry {
                token,
                created_at: Instant::now(),
            },
        );
        id
    }

    /// Token for `session_id`, if any. Expired sessions are dropped.
    pub fn get_session_token(&self, session_id: &str) -> Option<AuthToken> {
        {
            let entry = self.sessions.get(session_id)?;
            if entry.created_at.elapsed() <= self.ttl {
                return Some(entry.token.clone());
            }
        }
        // Read guard must be dropped before remove.
        debug!("session expired");
        self.sessions.remove(session_id);
        None
    }

    /// Token for `session_id`, only if it carries an access token.
    pub fn get_access_token(&self, session_id: &str) -> Option<AuthToken> {
        self.get_session_token(session_id)
            .filter(|t| t.access_token().is_some())
    }

    /// Drop a session. Unknown ids are ignored.
    pub fn remove(&self, session_id: &str) {
        self.sessions.remove(session_id);
    }

    /// Evict expired sessions.
    pub fn cleanup(&self) {
        let ttl = self.ttl;
        self.sessions.retain(|_, e| e.created_at.elapsed() <= ttl);
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    /// Spawn a task that evicts expired sessions every minute.
    pub fn spawn_cleanup_task(self: &Arc<Self>) -> tokio::task::JoinHandle<()> {
        let store = Arc::clone(self);
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(Duration::from_secs(60));
            loop {
                interval.tick().await;
                store.cleanup();
            }
        })
    }
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new()
    }
}
