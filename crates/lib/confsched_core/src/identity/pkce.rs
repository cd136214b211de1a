//! PKCE helpers and the pending-login store.
//!
//! A login is "pending" between the redirect to the authorize endpoint and the
//! callback that carries the authorization code back.

use std::sync::Arc;
use std::time::{Duration, Instant};

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use dashmap::DashMap;
use rand::RngCore;
use sha2::{Digest, Sha256};
use tracing::debug;

/// How long a pending login stays valid (10 minutes).
pub const PENDING_LOGIN_TTL: Duration = Duration::from_secs(600);

/// Generate a PKCE code verifier (43 URL-safe chars).
pub fn generate_code_verifier() -> String {
    let mut bytes = [0u8; 32];
    rand::rng().fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}

/// S256 code challenge for `verifier`.
pub fn compute_code_challenge(verifier: &str) -> String {
    URL_SAFE_NO_PAD.encode(Sha256::digest(verifier.as_bytes()))
}

/// Generate the CSRF `state` parameter.
pub fn generate_state() -> String {
    let mut bytes = [0u8; 24];
    rand::rng().fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}

/// What the callback needs to finish a login.
#[derive(Debug, Clone)]
pub struct PendingLogin {
    pub code_verifier: String,
    pub created_at: Instant,
}

impl PendingLogin {
    pub fn new(code_verifier: String) -> Self {
        Self {
            code_verifier,
            created_at: Instant::now(),
        }
    }
}

/// Pending logins keyed by `state`.
#[derive(Debug)]
pub struct PendingLoginStore {
    logins: DashMap<String, PendingLogin>,
    ttl: Duration,
}

impl PendingLoginStore {
    pub fn new() -> Self {
        Self::with_ttl(PENDING_LOGIN_TTL)
    }

    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            logins: DashMap::new(),
            ttl,
        }
    }

    pub fn insert(&self, state: String, pending: PendingLogin) {
        self.logins.insert(state, pending);
    }

    /// Remove and return the pending login for `state`.
    /// Returns `None` if unknown or expired.
    pub fn take(&self, state: &str) -> Option<PendingLogin> {
        let (_, pending) = self.logins.remove(state)?;
        if pending.created_at.elapsed() > self.ttl {
            debug!("pending login expired");
            return None;
        }
        Some(pending)
    }

    /// Evict expired entries.
    pub fn cleanup(&self) {
        let ttl = self.ttl;
        self.logins.retain(|_, v| v.created_at.elapsed() <= ttl);
    }

    pub fn len(&self) -> usize {
        self.logins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.logins.is_empty()
    }

    /// Spawn a task that evicts expired entries every minute.
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

impl Default for PendingLoginStore {
    fn default() -> Self {
        Self::new()
    }
}
