//! # confsched_api
//!
//! HTTP API library for the conference scheduler.

pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod services;
pub mod views;

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};
use sqlx::SqlitePool;
use tower_http::trace::TraceLayer;

use confsched_core::graph::{GraphCaller, GraphClient};
use confsched_core::identity::IdentityClient;
use confsched_core::identity::pkce::PendingLoginStore;
use confsched_core::meetings::{MeetingStore, SqliteMeetingStore};
use confsched_core::session::SessionStore;

use crate::config::ApiConfig;
use crate::handlers::{graph, home, identity, meetings};

/// Shared application state passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    /// API configuration.
    pub config: ApiConfig,
    /// Where scheduled meetings are recorded.
    pub meetings: Arc<dyn MeetingStore>,
    /// Outbound Graph client.
    pub graph: Arc<dyn GraphCaller>,
    /// Signed-in sessions keyed by cookie id.
    pub sessions: Arc<SessionStore>,
    /// PKCE verifiers awaiting their callback.
    pub logins: Arc<PendingLoginStore>,
    pub identity: Arc<IdentityClient>,
}

impl AppState {
    /// Production wiring: SQLite store and `reqwest` clients.
    pub fn new(config: ApiConfig, pool: SqlitePool) -> Self {
        let http = reqwest::Client::new();
        let identity = IdentityClient::new(http.clone(), config.identity_settings());
        Self {
            meetings: Arc::new(SqliteMeetingStore::new(pool)),
            graph: Arc::new(GraphClient::new(http)),
            sessions: Arc::new(SessionStore::new()),
            logins: Arc::new(PendingLoginStore::new()),
            identity: Arc::new(identity),
            config,
        }
    }

    /// Swap the Graph client, e.g. for a fake in tests.
    pub fn with_graph(mut self, graph: Arc<dyn GraphCaller>) -> Self {
        self.graph = graph;
        self
    }
}

/// Run embedded database migrations.
///
/// Delegates to `confsched_core::migrate::migrate()` which owns the migration files.
pub async fn migrate(pool: &SqlitePool) -> Result<(), sqlx::migrate::MigrateError> {
    confsched_core::migrate::migrate(pool).await
}

/// Builds the Axum router with all routes and shared state.
pub fn router(state: AppState) -> Router {
    let config = &state.config;

    Router::new()
        .route("/", get(home::home))
        .route("/handleForm", post(meetings::handle_form))
        .route("/graphcall", get(graph::graph_call))
        .route(&config.login_path, get(identity::login))
        .route(&config.callback_path, get(identity::callback))
        .route(&config.logout_path, get(identity::logout))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::session::load_session,
        ))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
