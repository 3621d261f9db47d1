//! Common types for the shared crate
//!
//! Utility types used across the server and its API payloads

use serde::{Deserialize, Serialize};

/// Timestamp type (Unix milliseconds)
pub type Timestamp = i64;

/// A date as accepted from API payloads.
///
/// Clients send either Unix millis or a string (`YYYY-MM`, `YYYY-MM-DD`
/// or RFC 3339). Interpretation happens server-side so that every
/// endpoint normalizes dates the same way.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DateInput {
    Millis(Timestamp),
    Text(String),
}

impl From<Timestamp> for DateInput {
    fn from(millis: Timestamp) -> Self {
        Self::Millis(millis)
    }
}

impl From<&str> for DateInput {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

impl std::fmt::Display for DateInput {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Millis(m) => write!(f, "{m}"),
            Self::Text(t) => write!(f, "{t}"),
        }
    }
}
