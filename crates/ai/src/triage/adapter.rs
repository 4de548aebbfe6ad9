use std::str::FromStr;
use std::sync::Arc;

use thiserror::Error;

use wardcast_core::TriageCase;

use super::client::{InferenceClient, RemoteServiceError};
use super::prompt::{ChatRequest, Disposition};

pub const DEFAULT_TRIAGE_MODEL: &str = "meta-llama/Llama-3.1-8B-Instruct";
pub const DEFAULT_MAX_TOKENS: u32 = 150;

/// Language of the advisory text shown when the remote call fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AdvisoryLocale {
    #[default]
    Ar,
    En,
}

impl AdvisoryLocale {
    pub fn failure_message(&self, err: &RemoteServiceError) -> String {
        match self {
            AdvisoryLocale::Ar => format!(
                "عذرًا، تعذّر الوصول إلى مساعد الفرز حاليًا ({err}). \
                 إذا كانت حالتك طارئة فاتصل بالإسعاف أو توجّه إلى أقرب قسم طوارئ."
            ),
            AdvisoryLocale::En => format!(
                "Sorry, the triage assistant is unavailable right now ({err}). \
                 If this is urgent, call emergency services or go to the nearest emergency department."
            ),
        }
    }
}

impl FromStr for AdvisoryLocale {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "ar" | "arabic" => Ok(AdvisoryLocale::Ar),
            "en" | "english" => Ok(AdvisoryLocale::En),
            other => Err(format!("unsupported locale '{other}' (expected 'ar' or 'en')")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TriageSettings {
    pub model: String,
    pub max_tokens: u32,
    pub locale: AdvisoryLocale,
}

impl Default for TriageSettings {
    fn default() -> Self {
        Self {
            model: DEFAULT_TRIAGE_MODEL.to_string(),
            max_tokens: DEFAULT_MAX_TOKENS,
            locale: AdvisoryLocale::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TriageError {
    #[error("No description provided")]
    EmptyInput,
}

/// Result of one remote consultation. Both arms carry user-facing text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TriageOutcome {
    Answered(String),
    Failed {
        advisory: String,
        error: RemoteServiceError,
    },
}

impl TriageOutcome {
    pub fn into_model_response(self) -> String {
        match self {
            TriageOutcome::Answered(text) => text,
            TriageOutcome::Failed { advisory, .. } => advisory,
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, TriageOutcome::Failed { .. })
    }
}

/// Validates patient text, consults the remote model, and builds the case.
///
/// Persisting the case is the caller's job.
#[derive(Clone)]
pub struct TriageAdapter {
    client: Arc<dyn InferenceClient>,
    settings: TriageSettings,
}

impl TriageAdapter {
    pub fn new(client: Arc<dyn InferenceClient>, settings: TriageSettings) -> Self {
        Self { client, settings }
    }

    /// One remote round trip. Never fails: errors become localized advisory text.
    pub async fn consult(&self, patient_text: &str) -> TriageOutcome {
        let request = ChatRequest::triage(&self.settings.model, patient_text, self.settings.max_tokens);

        match self.client.chat(&request).await {
            Ok(response) => {
                let answer = response.answer();
                tracing::info!(
                    model = %self.settings.model,
                    disposition = ?Disposition::detect(&answer),
                    answer_len = answer.len(),
                    "triage answered"
                );
                TriageOutcome::Answered(answer)
            }
            Err(error) => {
                tracing::warn!(model = %self.settings.model, error = %error, "triage call failed");
                TriageOutcome::Failed {
                    advisory: self.settings.locale.failure_message(&error),
                    error,
                }
            }
        }
    }

    /// Validate, consult, and stamp a case with the current local time.
    ///
    /// Blank input is rejected before any remote call.
    pub async fn triage(&self, patient_text: &str) -> Result<TriageCase, TriageError> {
        if patient_text.trim().is_empty() {
            return Err(TriageError::EmptyInput);
        }

        tracing::debug!(text_len = patient_text.len(), "triage received");
        let outcome = self.consult(patient_text).await;
        Ok(TriageCase::now(patient_text, outcome.into_model_response()))
    }
}
