//! Read-only Graph call.

use axum::Extension;
use axum::extract::State;
use serde_json::Value;

use crate::AppState;
use crate::error::AppResult;
use crate::middleware::session::CurrentSession;
use crate::services::steps::ShowBody;
use crate::services::workflow::{AuthRequirement, GraphCall, Payload, Workflow};
use crate::views::Outcome;

/// `GET /graphcall`: calls the configured read endpoint and shows the body.
pub async fn graph_call(
    State(state): State<AppState>,
    Extension(session): Extension<CurrentSession>,
) -> AppResult<Outcome<Value>> {
    let call = GraphCall::get(state.config.read_endpoint.clone());
    Workflow::from_state(&state)
        .execute(
            session.id(),
            AuthRequirement::AccessToken,
            Payload::None,
            &call,
            &ShowBody,
        )
        .await
}
