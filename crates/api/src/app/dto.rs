use serde::{Deserialize, Serialize};

use wardcast_ai::ForecastParams;
use wardcast_core::TriageCase;

// -------------------------
// Request DTOs
// -------------------------

/// Either key is accepted; `description` wins when both are non-blank.
#[derive(Debug, Default, Deserialize)]
pub struct TriageRequest {
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

impl TriageRequest {
    pub fn patient_text(&self) -> &str {
        [self.description.as_deref(), self.message.as_deref()]
            .into_iter()
            .flatten()
            .find(|s| !s.trim().is_empty())
            .unwrap_or("")
    }
}

#[derive(Debug, Deserialize)]
pub struct ForecastRequest {
    #[serde(default)]
    pub department: Option<String>,
    pub staff_count: Option<f64>,
    pub average_wait_time: Option<f64>,
    pub emergency_load: Option<String>,
}

impl ForecastRequest {
    /// `None` when no usable department was given.
    pub fn into_params(self) -> Option<ForecastParams> {
        let department = self.department.filter(|d| !d.trim().is_empty())?;
        let mut params = ForecastParams::for_department(department.trim());
        if let Some(v) = self.staff_count {
            params.staff_count = v;
        }
        if let Some(v) = self.average_wait_time {
            params.average_wait_time = v;
        }
        if let Some(v) = self.emergency_load.filter(|v| !v.trim().is_empty()) {
            params.emergency_load = v;
        }
        Some(params)
    }
}

// -------------------------
// Response DTOs
// -------------------------

#[derive(Debug, Serialize)]
pub struct TriageResponse {
    #[serde(flatten)]
    pub case: TriageCase,
    pub reply: String,
}

impl From<TriageCase> for TriageResponse {
    fn from(case: TriageCase) -> Self {
        let reply = case.model_response.clone();
        Self { case, reply }
    }
}
