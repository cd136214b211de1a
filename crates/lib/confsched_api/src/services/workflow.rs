//! Authenticated call-then-persist workflow.
//!
//! Every Graph-backed route runs the same sequence: check the session token,
//! build the request payload, call Graph, classify the body, and hand a
//! success to the route's persistence step. Routes differ only in the payload
//! they build and the [`PersistStep`] they pass in.

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info, warn};

use confsched_core::graph::{ExtractError, GraphCaller, GraphMethod, GraphOutcome};
use confsched_core::models::auth::AuthToken;
use confsched_core::session::SessionStore;

use crate::AppState;
use crate::error::AppResult;
use crate::views::Outcome;

/// Which part of the token bundle a route needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthRequirement {
    /// Identity claims only (home page).
    Claims,
    /// A Graph access token.
    AccessToken,
}

/// Where the outbound request body comes from.
pub enum Payload {
    /// No body (read-only GET).
    None,
    /// A fixed body.
    Static(Value),
    /// Built from the submitted form; runs only after the auth check passes.
    Form(Box<dyn FnOnce() -> AppResult<Value> + Send>),
}

impl Payload {
    fn build(self) -> AppResult<Option<Value>> {
        match self {
            Payload::None => Ok(None),
            Payload::Static(value) => Ok(Some(value)),
            Payload::Form(build) => build().map(Some),
        }
    }
}

/// Target of the outbound Graph call.
#[derive(Debug, Clone)]
pub struct GraphCall {
    pub method: GraphMethod,
    pub endpoint: String,
}

impl GraphCall {
    pub fn get(endpoint: impl Into<String>) -> Self {
        Self {
            method: GraphMethod::Get,
            endpoint: endpoint.into(),
        }
    }

    pub fn post(endpoint: impl Into<String>) -> Self {
        Self {
            method: GraphMethod::Post,
            endpoint: endpoint.into(),
        }
    }
}

/// Route-specific handling of a successful Graph response.
#[async_trait]
pub trait PersistStep: Send + Sync {
    type Record: Send;
    type View: Serialize + Send;

    /// Pull the typed record out of a success-shaped body. All-or-nothing.
    fn extract(&self, body: Value) -> Result<Self::Record, ExtractError>;

    /// Persist the record (if the route persists anything) and build the view.
    async fn persist(&self, record: Self::Record) -> AppResult<Self::View>;
}

/// The orchestrator. Cheap to build per request.
pub struct Workflow<'a> {
    sessions: &'a SessionStore,
    graph: &'a dyn GraphCaller,
    login_path: &'a str,
}

impl<'a> Workflow<'a> {
    pub fn new(sessions: &'a SessionStore, graph: &'a dyn GraphCaller, login_path: &'a str) -> Self {
        Self {
            sessions,
            graph,
            login_path,
        }
    }

    pub fn from_state(state: &'a AppState) -> Self {
        Self::new(&state.sessions, state.graph.as_ref(), &state.config.login_path)
    }

    /// Login redirect for unauthenticated callers.
    pub fn login_redirect<V>(&self) -> Outcome<V> {
        Outcome::Redirect(self.login_path.to_string())
    }

    /// Look up the session token, returning it only if it satisfies `requirement`.
    pub fn authorize(
        &self,
        session_id: Option<&str>,
        requirement: AuthRequirement,
    ) -> Option<AuthToken> {
        let session_id = session_id?;
        match requirement {
            AuthRequirement::Claims => self
                .sessions
                .get_session_token(session_id)
                .filter(AuthToken::has_claims),
            AuthRequirement::AccessToken => self.sessions.get_access_token(session_id),
        }
    }

    /// Run the workflow for one request.
    pub async fn execute<P: PersistStep>(
        &self,
        session_id: Option<&str>,
        requirement: AuthRequirement,
        payload: Payload,
        call: &GraphCall,
        step: &P,
    ) -> AppResult<Outcome<P::View>> {
        let Some(token) = self.authorize(session_id, requirement) else {
            debug!("no usable session token, redirecting to login");
            return Ok(self.login_redirect());
        };
        let Some(access_token) = token.access_token() else {
            debug!("session has no access token, redirecting to login");
            return Ok(self.login_redirect());
        };

        let body = payload.build()?;

        let response = self
            .graph
            .call(call.method, &call.endpoint, body.as_ref(), access_token)
            .await
            .inspect_err(|e| warn!(endpoint = %call.endpoint, "graph call failed: {e}"))?;

        let outcome = GraphOutcome::classify(response, |b| step.extract(b))
            .inspect_err(|e| warn!(endpoint = %call.endpoint, "unexpected graph response: {e}"))?;

        match outcome {
            GraphOutcome::ApiError(err) => {
                info!(endpoint = %call.endpoint, code = %err.code, "graph reported an error");
                Ok(Outcome::ApiError(err.into()))
            }
            GraphOutcome::Success(record) => Ok(Outcome::Success(step.persist(record).await?)),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicU32, Ordering};

    use confsched_core::graph::GraphError;
    use confsched_core::models::auth::Claims;
    use serde_json::json;

    use super::*;
    use crate::error::AppError;

    /// Graph fake returning a canned body and counting calls.
    struct FakeGraph {
        calls: AtomicU32,
        response: Mutex<Option<Result<Value, GraphError>>>,
        last_payload: Mutex<Option<Value>>,
    }

    impl FakeGraph {
        fn returning(response: Result<Value, GraphError>) -> Self {
            Self {
                calls: AtomicU32::new(0),
                response: Mutex::new(Some(response)),
                last_payload: Mutex::new(None),
            }
        }
    }

    #[async_trait]
    impl GraphCaller for FakeGraph {
        async fn call(
            &self,
            _method: GraphMethod,
            _endpoint: &str,
            payload: Option<&Value>,
            _access_token: &str,
        ) -> Result<Value, GraphError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            *self.last_payload.lock().unwrap() = payload.cloned();
            self.response
                .lock()
                .unwrap()
                .take()
                .expect("graph called more than once")
        }
    }

    /// Step that requires an `id` field and counts persists.
    struct CountingStep {
        persisted: AtomicU32,
    }

    #[async_trait]
    impl PersistStep for CountingStep {
        type Record = String;
        type View = String;

        fn extract(&self, body: Value) -> Result<String, ExtractError> {
            body.get("id")
                .and_then(Value::as_str)
                .map(String::from)
                .ok_or_else(|| ExtractError::Malformed("missing field `id`".into()))
        }

        async fn persist(&self, record: String) -> AppResult<String> {
            self.persisted.fetch_add(1, Ordering::SeqCst);
            Ok(record)
        }
    }

    fn counting_step() -> CountingStep {
        CountingStep {
            persisted: AtomicU32::new(0),
        }
    }

    fn signed_in(sessions: &SessionStore, access_token: Option<&str>) -> String {
        let mut claims = Claims::new();
        claims.insert("name".into(), "Ada".into());
        sessions.insert(AuthToken {
            identity_claims: Some(claims),
            access_token: access_token.map(String::from),
        })
    }

    fn call() -> GraphCall {
        GraphCall::post("http://graph.test/v1.0/me/onlineMeetings")
    }

    #[tokio::test]
    async fn missing_session_redirects_without_side_effects() {
        let sessions = SessionStore::new();
        let graph = FakeGraph::returning(Ok(json!({"id": "abc"})));
        let step = counting_step();
        let workflow = Workflow::new(&sessions, &graph, "/login");

        let payload = Payload::Form(Box::new(|| -> AppResult<Value> {
            panic!("form parsed before auth check")
        }));
        let outcome = workflow
            .execute(None, AuthRequirement::AccessToken, payload, &call(), &step)
            .await
            .unwrap();

        assert!(matches!(outcome, Outcome::Redirect(ref to) if to == "/login"));
        assert_eq!(graph.calls.load(Ordering::SeqCst), 0);
        assert_eq!(step.persisted.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn claims_without_access_token_redirect() {
        let sessions = SessionStore::new();
        let session = signed_in(&sessions, None);
        let graph = FakeGraph::returning(Ok(json!({"id": "abc"})));
        let step = counting_step();
        let workflow = Workflow::new(&sessions, &graph, "/login");

        let outcome = workflow
            .execute(
                Some(&session),
                AuthRequirement::AccessToken,
                Payload::None,
                &call(),
                &step,
            )
            .await
            .unwrap();

        assert!(matches!(outcome, Outcome::Redirect(_)));
        assert_eq!(graph.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn error_body_becomes_error_view() {
        let sessions = SessionStore::new();
        let session = signed_in(&sessions, Some("at"));
        let graph = FakeGraph::returning(Ok(json!({"error": {"code": "E1", "innerError": {}}})));
        let step = counting_step();
        let workflow = Workflow::new(&sessions, &graph, "/login");

        let outcome = workflow
            .execute(
                Some(&session),
                AuthRequirement::AccessToken,
                Payload::Static(json!({"subject": "fixed"})),
                &call(),
                &step,
            )
            .await
            .unwrap();

        match outcome {
            Outcome::ApiError(view) => {
                assert_eq!(view.code, "E1");
                assert_eq!(view.detail, json!({}));
            }
            other => panic!("expected error view, got {other:?}"),
        }
        assert_eq!(step.persisted.load(Ordering::SeqCst), 0);
        assert_eq!(
            *graph.last_payload.lock().unwrap(),
            Some(json!({"subject": "fixed"}))
        );
    }

    #[tokio::test]
    async fn extraction_failure_skips_persist() {
        let sessions = SessionStore::new();
        let session = signed_in(&sessions, Some("at"));
        let graph = FakeGraph::returning(Ok(json!({"subject": "no id here"})));
        let step = counting_step();
        let workflow = Workflow::new(&sessions, &graph, "/login");

        let err = workflow
            .execute(
                Some(&session),
                AuthRequirement::AccessToken,
                Payload::None,
                &call(),
                &step,
            )
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Upstream(_)));
        assert_eq!(step.persisted.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn transport_failure_propagates() {
        let sessions = SessionStore::new();
        let session = signed_in(&sessions, Some("at"));
        let graph = FakeGraph::returning(Err(GraphError::Transport("refused".into())));
        let step = counting_step();
        let workflow = Workflow::new(&sessions, &graph, "/login");

        let err = workflow
            .execute(
                Some(&session),
                AuthRequirement::AccessToken,
                Payload::None,
                &call(),
                &step,
            )
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Upstream(_)));
        assert_eq!(step.persisted.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn form_payload_failure_stops_before_graph() {
        let sessions = SessionStore::new();
        let session = signed_in(&sessions, Some("at"));
        let graph = FakeGraph::returning(Ok(json!({"id": "abc"})));
        let step = counting_step();
        let workflow = Workflow::new(&sessions, &graph, "/login");

        let payload = Payload::Form(Box::new(|| -> AppResult<Value> {
            Err(AppError::Validation("missing field `subject`".into()))
        }));
        let err = workflow
            .execute(
                Some(&session),
                AuthRequirement::AccessToken,
                payload,
                &call(),
                &step,
            )
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Validation(_)));
        assert_eq!(graph.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn success_is_persisted_once() {
        let sessions = SessionStore::new();
        let session = signed_in(&sessions, Some("at"));
        let graph = FakeGraph::returning(Ok(json!({"id": "abc"})));
        let step = counting_step();
        let workflow = Workflow::new(&sessions, &graph, "/login");

        let outcome = workflow
            .execute(
                Some(&session),
                AuthRequirement::AccessToken,
                Payload::Form(Box::new(|| -> AppResult<Value> { Ok(json!({"subject": "built"})) })),
                &call(),
                &step,
            )
            .await
            .unwrap();

        assert!(matches!(outcome, Outcome::Success(ref id) if id == "abc"));
        assert_eq!(step.persisted.load(Ordering::SeqCst), 1);
        assert_eq!(graph.calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn claims_requirement_ignores_access_token() {
        let sessions = SessionStore::new();
        let session = signed_in(&sessions, None);
        let graph = FakeGraph::returning(Ok(json!({})));
        let workflow = Workflow::new(&sessions, &graph, "/login");

        assert!(workflow.authorize(Some(&session), AuthRequirement::Claims).is_some());
        assert!(workflow.authorize(Some(&session), AuthRequirement::AccessToken).is_none());
        assert!(workflow.authorize(Some("unknown"), AuthRequirement::Claims).is_none());
    }
}
