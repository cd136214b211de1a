//! API server configuration.
//!
//! Built once at startup and shared read-only through [`crate::AppState`].

use confsched_core::graph::GRAPH_BASE_URL;
use confsched_core::graph::meeting::ONLINE_MEETINGS_PATH;
use confsched_core::identity::{DEFAULT_AUTHORITY, IdentitySettings};
use confsched_core::timestamp::UtcOffset;
use tracing::warn;
use url::Url;

/// Configuration for the API server.
#[derive(Clone)]
pub struct ApiConfig {
    /// Address to bind the HTTP listener (e.g. "127.0.0.1:5000").
    pub bind_addr: String,
    /// SQLite connection URL.
    pub database_url: String,
    /// Azure AD application (client) id.
    pub client_id: String,
    /// Azure AD client secret.
    pub client_secret: String,
    /// Identity authority, e.g. `https://login.microsoftonline.com/<tenant>`.
    pub authority: String,
    /// OAuth redirect URI registered for the app; its path is served by the callback route.
    pub redirect_uri: String,
    /// Delegated Graph scopes requested at sign-in.
    pub scopes: Vec<String>,
    /// Graph API base URL.
    pub graph_base_url: String,
    /// Endpoint used by the read-only `/graphcall` route.
    pub read_endpoint: String,
    /// Offset suffix appended to offset-less form timestamps.
    pub utc_offset: UtcOffset,
    pub login_path: String,
    pub logout_path: String,
    pub callback_path: String,
    /// Mark the session cookie `Secure` (set when served over HTTPS).
    pub cookie_secure: bool,
}

impl std::fmt::Debug for ApiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiConfig")
            .field("bind_addr", &self.bind_addr)
            .field("database_url", &self.database_url)
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .field("authority", &self.authority)
            .field("redirect_uri", &self.redirect_uri)
            .field("scopes", &self.scopes)
            .field("graph_base_url", &self.graph_base_url)
            .field("read_endpoint", &self.read_endpoint)
            .field("utc_offset", &self.utc_offset)
            .field("login_path", &self.login_path)
            .field("logout_path", &self.logout_path)
            .field("callback_path", &self.callback_path)
            .field("cookie_secure", &self.cookie_secure)
            .finish()
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1:5000".into(),
            database_url: "sqlite://myConferences.db".into(),
            client_id: String::new(),
            client_secret: String::new(),
            authority: DEFAULT_AUTHORITY.into(),
            redirect_uri: "http://localhost:5000/token".into(),
            scopes: vec!["User.ReadBasic.All".into(), "OnlineMeetings.ReadWrite".into()],
            graph_base_url: GRAPH_BASE_URL.into(),
            read_endpoint: format!("{GRAPH_BASE_URL}/users"),
            utc_offset: UtcOffset::default(),
            login_path: "/login".into(),
            logout_path: "/logout".into(),
            callback_path: "/token".into(),
            cookie_secure: false,
        }
    }
}

impl ApiConfig {
    /// Reads configuration from environment variables with sensible defaults.
    ///
    /// | Variable         | Default                                       |
    /// |------------------|-----------------------------------------------|
    /// | `BIND_ADDR`      | `127.0.0.1:5000`                              |
    /// | `DATABASE_URL`   | `sqlite://myConferences.db`                   |
    /// | `CLIENT_ID`      | empty                                         |
    /// | `CLIENT_SECRET`  | empty                                         |
    /// | `AUTHORITY`      | `https://login.microsoftonline.com/common`    |
    /// | `REDIRECT_URI`   | `http://localhost:5000/token`                 |
    /// | `SCOPES`         | `User.ReadBasic.All,OnlineMeetings.ReadWrite` |
    /// | `GRAPH_BASE_URL` | `https://graph.microsoft.com/v1.0`            |
    /// | `READ_ENDPOINT`  | `https://graph.microsoft.com/v1.0/users`      |
    /// | `UTC_OFFSET`     | `+00:00`                                      |
    /// | `COOKIE_SECURE`  | `false`                                       |
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let var = |name: &str, default: String| std::env::var(name).unwrap_or(default);

        let utc_offset = match std::env::var("UTC_OFFSET") {
            Ok(raw) => raw.parse().unwrap_or_else(|e| {
                warn!("ignoring UTC_OFFSET: {e}");
                defaults.utc_offset.clone()
            }),
            Err(_) => defaults.utc_offset.clone(),
        };
        let scopes = std::env::var("SCOPES")
            .map(|raw| parse_scopes(&raw))
            .unwrap_or_else(|_| defaults.scopes.clone());
        let redirect_uri = var("REDIRECT_URI", defaults.redirect_uri.clone());
        let callback_path = callback_path_of(&redirect_uri);

        Self {
            bind_addr: var("BIND_ADDR", defaults.bind_addr),
            database_url: var("DATABASE_URL", defaults.database_url),
            client_id: var("CLIENT_ID", defaults.client_id),
            client_secret: var("CLIENT_SECRET", defaults.client_secret),
            authority: var("AUTHORITY", defaults.authority),
            redirect_uri,
            scopes,
            graph_base_url: var("GRAPH_BASE_URL", defaults.graph_base_url),
            read_endpoint: var("READ_ENDPOINT", defaults.read_endpoint),
            utc_offset,
            login_path: defaults.login_path,
            logout_path: defaults.logout_path,
            callback_path,
            cookie_secure: std::env::var("COOKIE_SECURE")
                .map(|raw| parse_flag(&raw))
                .unwrap_or(defaults.cookie_secure),
        }
    }

    /// `POST` target for meeting creation.
    pub fn meetings_endpoint(&self) -> String {
        format!(
            "{}{ONLINE_MEETINGS_PATH}",
            self.graph_base_url.trim_end_matches('/')
        )
    }

    /// Sign-in settings for the identity client.
    pub fn identity_settings(&self) -> IdentitySettings {
        IdentitySettings {
            authority: self.authority.clone(),
            client_id: self.client_id.clone(),
            client_secret: self.client_secret.clone(),
            redirect_uri: self.redirect_uri.clone(),
            scopes: self.scopes.clone(),
        }
    }
}

/// Split a comma- or space-separated scope list.
pub fn parse_scopes(raw: &str) -> Vec<String> {
    raw.split([',', ' '])
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

/// Path component of the redirect URI (`/token` when it cannot be parsed).
pub fn callback_path_of(redirect_uri: &str) -> String {
    Url::parse(redirect_uri)
        .map(|u| u.path().to_string())
        .ok()
        .filter(|path| path != "/")
        .unwrap_or_else(|| "/token".to_string())
}

/// `true`/`1`/`yes` (any case) are truthy; anything else is false.
fn parse_flag(raw: &str) -> bool {
    matches!(raw.trim().to_ascii_lowercase().as_str(), "true" | "1" | "yes")
}
