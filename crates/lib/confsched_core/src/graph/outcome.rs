//! Body-shape classification of Graph responses.

use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

/// Code reported when Graph's `error` object lacks one.
const UNKNOWN_ERROR_CODE: &str = "UnknownError";

/// A success-shaped body could not be turned into the expected type.
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("Graph response is missing or has malformed fields: {0}")]
    Malformed(String),
}

/// Error reported by Graph inside the response body.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GraphApiError {
    /// `error.code`, verbatim.
    pub code: String,
    /// `error.innerError`, verbatim (`null` when absent).
    pub detail: Value,
}

/// Result of a Graph call, decided once from the body shape.
#[derive(Debug, Clone, PartialEq)]
pub enum GraphOutcome<T> {
    Success(T),
    ApiError(GraphApiError),
}

impl<T> GraphOutcome<T> {
    /// Classify `body`: an `error` key means [`GraphOutcome::ApiError`];
    /// anything else is handed to `extract`.
    pub fn classify<F>(body: Value, extract: F) -> Result<Self, ExtractError>
    where
        F: FnOnce(Value) -> Result<T, ExtractError>,
    {
        if let Some(error) = body.get("error") {
            let code = error
                .get("code")
                .and_then(Value::as_str)
                .unwrap_or(UNKNOWN_ERROR_CODE)
                .to_string();
            let detail = error.get("innerError").cloned().unwrap_or(Value::Null);
            return Ok(Self::ApiError(GraphApiError { code, detail }));
        }
        extract(body).map(Self::Success)
    }
}
