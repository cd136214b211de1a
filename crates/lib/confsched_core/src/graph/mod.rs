//! Microsoft Graph call client.
//!
//! Issues a single authenticated JSON request and hands back the parsed body
//! whatever the HTTP status was. Whether the call succeeded is decided from the
//! body shape by [`GraphOutcome::classify`], not from the status code.

pub mod meeting;
mod outcome;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use thiserror::Error;
use tracing::debug;

pub use outcome::{ExtractError, GraphApiError, GraphOutcome};

/// Default Graph API base URL.
pub const GRAPH_BASE_URL: &str = "https://graph.microsoft.com/v1.0";

/// Transport-level Graph failures. Never retried.
#[derive(Debug, Error)]
pub enum GraphError {
    #[error("Graph request failed: {0}")]
    Transport(String),

    #[error("Graph returned a non-JSON body (HTTP {status}): {message}")]
    Decode { status: u16, message: String },
}

/// HTTP verb for a Graph call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GraphMethod {
    Get,
    Post,
}

/// Performs one outbound Graph request.
#[async_trait]
pub trait GraphCaller: Send + Sync {
    /// Send `payload` (if any) to `endpoint` with `Authorization: Bearer <access_token>`
    /// and return the parsed JSON body.
    async fn call(
        &self,
        method: GraphMethod,
        endpoint: &str,
        payload: Option<&Value>,
        access_token: &str,
    ) -> Result<Value, GraphError>;
}

/// `reqwest`-backed [`GraphCaller`].
#[derive(Debug, Clone, Default)]
pub struct GraphClient {
    http: Client,
}

impl GraphClient {
    pub fn new(http: Client) -> Self {
        Self { http }
    }
}

#[async_trait]
impl GraphCaller for GraphClient {
    async fn call(
        &self,
        method: GraphMethod,
        endpoint: &str,
        payload: Option<&Value>,
        access_token: &str,
    ) -> Result<Value, GraphError> {
        let mut request = match method {
            GraphMethod::Get => self.http.get(endpoint),
            GraphMethod::Post => self.http.post(endpoint),
        }
        .header("Authorization", format!("Bearer {access_token}"));

        if let Some(body) = payload {
            request = request.json(body);
        }

        let resp = request
            .send()
            .await
            .map_err(|e| GraphError::Transport(e.to_string()))?;

        let status = resp.status();
        debug!(%endpoint, status = status.as_u16(), "graph call completed");

        let bytes = resp
            .bytes()
            .await
            .map_err(|e| GraphError::Transport(e.to_string()))?;

        serde_json::from_slice(&bytes).map_err(|e| GraphError::Decode {
            status: status.as_u16(),
            message: e.to_string(),
        })
    }
}
