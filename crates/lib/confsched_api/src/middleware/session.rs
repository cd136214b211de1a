//! Session middleware: resolves the session cookie for every request.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use axum_extra::extract::cookie::CookieJar;

use crate::AppState;
use crate::services::cookies::SESSION_COOKIE;

/// Session id from the request cookie, if the browser sent one we know about.
#[derive(Debug, Clone, Default)]
pub struct CurrentSession(pub Option<String>);

impl CurrentSession {
    pub fn id(&self) -> Option<&str> {
        self.0.as_deref()
    }
}

/// Axum middleware: reads the session cookie and injects [`CurrentSession`]
/// into request extensions. Unknown ids are dropped so handlers only see
/// sessions the store still holds.
pub async fn load_session(State(state): State<AppState>, mut request: Request, next: Next) -> Response {
    let jar = CookieJar::from_headers(request.headers());
    let session_id = jar
        .get(SESSION_COOKIE)
        .map(|c| c.value().to_string())
        .filter(|id| state.sessions.get_session_token(id).is_some());

    request.extensions_mut().insert(CurrentSession(session_id));
    next.run(request).await
}
