//! Sign-in, callback and sign-out.

use axum::extract::{Query, State};
use axum::response::Redirect;
use axum_extra::extract::cookie::CookieJar;
use serde::Deserialize;
use tracing::{debug, info, warn};

use confsched_core::identity::IdentityError;
use confsched_core::identity::pkce::{
    PendingLogin, compute_code_challenge, generate_code_verifier, generate_state,
};

use crate::AppState;
use crate::error::AppResult;
use crate::services::cookies::{SESSION_COOKIE, clear_session_cookie, session_cookie};

/// `GET /login`: starts the authorization-code flow.
pub async fn login(State(state): State<AppState>) -> AppResult<Redirect> {
    let verifier = generate_code_verifier();
    let challenge = compute_code_challenge(&verifier);
    let login_state = generate_state();

    let url = state.identity.authorize_url(&login_state, &challenge)?;
    state.logins.insert(login_state, PendingLogin::new(verifier));
    debug!(pending = state.logins.len(), "redirecting to identity provider");
    Ok(Redirect::to(&url))
}

/// Query parameters of the provider redirect.
#[derive(Debug, Deserialize)]
pub struct CallbackQuery {
    pub code: Option<String>,
    pub state: Option<String>,
    pub error: Option<String>,
    pub error_description: Option<String>,
}

/// `GET /token`: exchanges the authorization code and opens a session.
pub async fn callback(
    State(state): State<AppState>,
    jar: CookieJar,
    Query(query): Query<CallbackQuery>,
) -> AppResult<(CookieJar, Redirect)> {
    if let Some(error) = query.error {
        return Err(IdentityError::Provider {
            error,
            description: query.error_description.unwrap_or_default(),
        }
        .into());
    }

    let pending = query
        .state
        .as_deref()
        .and_then(|s| state.logins.take(s))
        .ok_or(IdentityError::InvalidState)?;
    let code = query.code.ok_or(IdentityError::InvalidState)?;

    let token = state
        .identity
        .exchange_code(&code, &pending.code_verifier)
        .await
        .and_then(|t| t.into_auth_token())
        .inspect_err(|e| warn!("sign-in failed: {e}"))?;
    let session_id = state.sessions.insert(token);
    info!(sessions = state.sessions.len(), "user signed in");

    Ok((jar.add(session_cookie(&session_id, state.config.cookie_secure)), Redirect::to("/")))
}

/// `GET /logout`: drops the session and clears the cookie.
pub async fn logout(State(state): State<AppState>, jar: CookieJar) -> (CookieJar, Redirect) {
    if let Some(cookie) = jar.get(SESSION_COOKIE) {
        state.sessions.remove(cookie.value());
        info!("user signed out");
    }
    (jar.add(clear_session_cookie(state.config.cookie_secure)), Redirect::to("/"))
}
