//! Triage case record.

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

/// Local time, minute precision.
pub const CASE_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M";

/// One triage interaction: what the patient wrote and what the assistant answered.
///
/// Created once per triage call (successful or not), then appended to the case
/// store. Never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TriageCase {
    pub timestamp: String,
    pub description: String,
    pub model_response: String,
}

impl TriageCase {
    pub fn new(
        timestamp: impl Into<String>,
        description: impl Into<String>,
        model_response: impl Into<String>,
    ) -> Self {
        Self {
            timestamp: timestamp.into(),
            description: description.into(),
            model_response: model_response.into(),
        }
    }

    /// Build a case stamped at `at`.
    pub fn at(
        at: DateTime<Local>,
        description: impl Into<String>,
        model_response: impl Into<String>,
    ) -> Self {
        Self::new(
            at.format(CASE_TIMESTAMP_FORMAT).to_string(),
            description,
            model_response,
        )
    }

    /// Build a case stamped with the current local time.
    pub fn now(description: impl Into<String>, model_response: impl Into<String>) -> Self {
        Self::at(Local::now(), description, model_response)
    }
}
