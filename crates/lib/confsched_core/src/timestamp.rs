//! Timestamp normalization for outbound meeting requests.
//!
//! Browsers submit `datetime-local` values without an offset
//! (`2024-01-01T10:00`). Graph needs an explicit offset, so the configured
//! suffix is appended to any value that does not already carry one.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, FixedOffset, NaiveDateTime};
use thiserror::Error;

/// Accepted layouts for offset-less client input.
const LOCAL_FORMATS: [&str; 3] = ["%Y-%m-%dT%H:%M", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M:%S%.f"];

/// The same layouts with a numeric `±HH:MM` offset.
const OFFSET_FORMATS: [&str; 3] = [
    "%Y-%m-%dT%H:%M%:z",
    "%Y-%m-%dT%H:%M:%S%:z",
    "%Y-%m-%dT%H:%M:%S%.f%:z",
];

/// Timestamp errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TimestampError {
    #[error("Invalid timestamp: {0}")]
    InvalidTimestamp(String),

    #[error("Invalid UTC offset '{0}' (expected Z or ±HH:MM)")]
    InvalidOffset(String),
}

/// A validated UTC offset suffix such as `-07:00`, `+05:30` or `Z`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UtcOffset(String);

impl UtcOffset {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for UtcOffset {
    fn default() -> Self {
        Self("+00:00".to_string())
    }
}

impl fmt::Display for UtcOffset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for UtcOffset {
    type Err = TimestampError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s == "Z" {
            return Ok(Self(s.to_string()));
        }
        if s.len() != 6 {
            return Err(TimestampError::InvalidOffset(s.to_string()));
        }
        let offset: FixedOffset = s
            .parse()
            .map_err(|_| TimestampError::InvalidOffset(s.to_string()))?;

        Ok(Self(offset.to_string()))
    }
}

/// Append `offset` to `input` unless it already carries an offset.
///
/// Values that carry one must still parse as a timestamp with that offset.
/// Applying this twice yields the same string as applying it once.
pub fn normalize_timestamp(input: &str, offset: &UtcOffset) -> Result<String, TimestampError> {
    let input = input.trim();
    let invalid = || TimestampError::InvalidTimestamp(input.to_string());
    let (_, time) = input.split_once('T').ok_or_else(invalid)?;

    if let Some(local) = input.strip_suffix('Z') {
        return if parses_local(local) {
            Ok(input.to_string())
        } else {
            Err(invalid())
        };
    }

    if time.contains(['+', '-']) {
        let parses = OFFSET_FORMATS
            .iter()
            .any(|fmt| DateTime::parse_from_str(input, fmt).is_ok());
        return if parses { Ok(input.to_string()) } else { Err(invalid()) };
    }

    if !parses_local(input) {
        return Err(invalid());
    }
    Ok(format!("{input}{offset}"))
}

fn parses_local(input: &str) -> bool {
    LOCAL_FORMATS
        .iter()
        .any(|fmt| NaiveDateTime::parse_from_str(input, fmt).is_ok())
}
