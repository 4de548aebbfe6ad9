use serde::{Deserialize, Serialize};

/// Fixed instruction sent as the system turn of every triage conversation.
pub const SYSTEM_PROMPT: &str = "You are a hospital triage assistant. \
Read the patient's description and answer with exactly one of these categories: \
\"emergency\", \"urgent-24-48h\", or \"self-care\". \
You may add one short sentence of justification after the category. \
Do not diagnose. Do not name or suggest any medication or dose. \
Your answer is advisory only and is not a medical diagnosis.";

/// The three advisory categories the remote model is asked to choose from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Disposition {
    #[serde(rename = "emergency")]
    Emergency,
    #[serde(rename = "urgent-24-48h")]
    Urgent,
    #[serde(rename = "self-care")]
    SelfCare,
}

impl Disposition {
    pub fn as_str(&self) -> &'static str {
        match self {
            Disposition::Emergency => "emergency",
            Disposition::Urgent => "urgent-24-48h",
            Disposition::SelfCare => "self-care",
        }
    }

    /// Best-effort read of which category a model answer starts with or names.
    ///
    /// Returns `None` when the answer names none of them.
    pub fn detect(answer: &str) -> Option<Self> {
        let lower = answer.to_lowercase();
        [Disposition::Emergency, Disposition::Urgent, Disposition::SelfCare]
            .into_iter()
            .filter_map(|d| lower.find(d.as_str()).map(|pos| (pos, d)))
            .min_by_key(|(pos, _)| *pos)
            .map(|(_, d)| d)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

/// OpenAI-compatible chat completion request body.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub max_tokens: u32,
    pub temperature: f32,
}

impl ChatRequest {
    /// System instruction plus the patient text as the only user turn, greedy decoding.
    pub fn triage(model: impl Into<String>, patient_text: &str, max_tokens: u32) -> Self {
        Self {
            model: model.into(),
            messages: vec![ChatMessage::system(SYSTEM_PROMPT), ChatMessage::user(patient_text)],
            max_tokens,
            temperature: 0.0,
        }
    }
}
