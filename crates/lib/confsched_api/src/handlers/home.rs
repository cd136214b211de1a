//! Signed-in landing page.

use axum::Extension;
use axum::extract::State;

use crate::AppState;
use crate::middleware::session::CurrentSession;
use crate::services::workflow::{AuthRequirement, Workflow};
use crate::views::{HomeView, Outcome};

/// `GET /`: shows the signed-in user's identity claims.
pub async fn home(
    State(state): State<AppState>,
    Extension(session): Extension<CurrentSession>,
) -> Outcome<HomeView> {
    let workflow = Workflow::from_state(&state);
    match workflow
        .authorize(session.id(), AuthRequirement::Claims)
        .and_then(|token| token.identity_claims)
    {
        Some(user) => Outcome::Success(HomeView {
            user,
            version: confsched_core::version(),
        }),
        None => workflow.login_redirect(),
    }
}
