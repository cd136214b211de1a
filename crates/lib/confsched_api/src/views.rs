//! Response views.
//!
//! Every route ends in one of three outcomes: a login redirect, an error view
//! describing what Graph reported, or a success view.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Redirect, Response};
use serde::Serialize;

use confsched_core::graph::GraphApiError;
use confsched_core::models::auth::Claims;
use confsched_core::models::meeting::MeetingRecord;

/// Outcome of an authenticated request.
#[derive(Debug)]
pub enum Outcome<V> {
    /// Caller is not signed in (or lacks the required token field).
    Redirect(String),
    /// Graph reported an error in the response body.
    ApiError(ErrorView),
    Success(V),
}

impl<V: Serialize> IntoResponse for Outcome<V> {
    fn into_response(self) -> Response {
        match self {
            Outcome::Redirect(to) => Redirect::to(&to).into_response(),
            Outcome::ApiError(view) => (StatusCode::BAD_GATEWAY, Json(view)).into_response(),
            Outcome::Success(view) => Json(view).into_response(),
        }
    }
}

/// Graph error as shown to the user.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ErrorView {
    pub code: String,
    pub detail: serde_json::Value,
}

impl From<GraphApiError> for ErrorView {
    fn from(e: GraphApiError) -> Self {
        Self {
            code: e.code,
            detail: e.detail,
        }
    }
}

/// Dial-in details of a freshly scheduled meeting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MeetingView {
    pub host: String,
    pub conference_id: String,
    pub toll_number: String,
    pub dial_in_url: String,
}

impl From<&MeetingRecord> for MeetingView {
    fn from(record: &MeetingRecord) -> Self {
        Self {
            host: record.host_upn.clone(),
            conference_id: record.conference_id.clone(),
            toll_number: record.toll_number.clone(),
            dial_in_url: record.dial_in_url.clone(),
        }
    }
}

/// Signed-in home page.
#[derive(Debug, Clone, Serialize)]
pub struct HomeView {
    pub user: Claims,
    pub version: &'static str,
}
