//! Meeting scheduling.

use axum::Extension;
use axum::body::Bytes;
use axum::extract::State;
use serde::Deserialize;
use serde_json::Value;

use confsched_core::graph::meeting::create_meeting_payload;
use confsched_core::models::meeting::SchedulingRequest;

use crate::AppState;
use crate::error::{AppError, AppResult};
use crate::middleware::session::CurrentSession;
use crate::services::steps::PersistMeeting;
use crate::services::workflow::{AuthRequirement, GraphCall, Payload, Workflow};
use crate::views::{MeetingView, Outcome};

/// Fields posted by the scheduling form.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SchedulingForm {
    start_time: String,
    end_time: String,
    subject: String,
}

/// `POST /handleForm`: schedules a Teams meeting and records it.
///
/// The body is taken raw so an unauthenticated caller is redirected before
/// the form is looked at.
pub async fn handle_form(
    State(state): State<AppState>,
    Extension(session): Extension<CurrentSession>,
    body: Bytes,
) -> AppResult<Outcome<MeetingView>> {
    let offset = state.config.utc_offset.clone();
    let payload = Payload::Form(Box::new(move || -> AppResult<Value> {
        let form: SchedulingForm = serde_urlencoded::from_bytes(&body)
            .map_err(|e| AppError::Validation(format!("scheduling form: {e}")))?;
        let request = SchedulingRequest::new(&form.start_time, &form.end_time, &form.subject, &offset)?;
        Ok(create_meeting_payload(&request)?)
    }));

    let call = GraphCall::post(state.config.meetings_endpoint());
    let step = PersistMeeting::new(state.meetings.clone());
    Workflow::from_state(&state)
        .execute(
            session.id(),
            AuthRequirement::AccessToken,
            payload,
            &call,
            &step,
        )
        .await
}
