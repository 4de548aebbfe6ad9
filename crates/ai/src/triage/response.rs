use serde::Deserialize;
use serde_json::Value as JsonValue;

/// Answer used when the remote service replied but no text could be extracted.
pub const NO_RESPONSE_PLACEHOLDER: &str = "No response from model.";

/// The shapes a text-generation service may answer with.
///
/// Variants are tried in order; anything unrecognized is kept verbatim.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum RemoteResponse {
    /// `{"choices": [{"message": {"content": ".."}}]}` or `{"choices": [{"text": ".."}]}`
    Chat { choices: Vec<ChatChoice> },

    /// `[{"generated_text": ".."}]`
    GenerationList(Vec<Generation>),

    /// `{"generated_text": ".."}`
    Generation(Generation),

    /// `{"error": ".."}`, sometimes sent with a success status.
    ServiceError { error: String },

    Unrecognized(JsonValue),
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ChatChoice {
    #[serde(default)]
    pub message: Option<ChoiceMessage>,
    #[serde(default)]
    pub text: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ChoiceMessage {
    #[serde(default)]
    pub content: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Generation {
    pub generated_text: String,
}

impl RemoteResponse {
    /// First non-blank answer text, trimmed.
    pub fn extract_text(&self) -> Option<String> {
        match self {
            RemoteResponse::Chat { choices } => first_non_blank(choices.iter().filter_map(|c| {
                c.message
                    .as_ref()
                    .and_then(|m| m.content.as_deref())
                    .filter(|s| !s.trim().is_empty())
                    .or(c.text.as_deref())
            })),
            RemoteResponse::GenerationList(gens) => {
                first_non_blank(gens.iter().map(|g| g.generated_text.as_str()))
            }
            RemoteResponse::Generation(g) => first_non_blank([g.generated_text.as_str()]),
            RemoteResponse::ServiceError { .. } | RemoteResponse::Unrecognized(_) => None,
        }
    }

    /// Extracted text, or [`NO_RESPONSE_PLACEHOLDER`].
    pub fn answer(&self) -> String {
        self.extract_text()
            .unwrap_or_else(|| NO_RESPONSE_PLACEHOLDER.to_string())
    }
}

fn first_non_blank<'a>(texts: impl IntoIterator<Item = &'a str>) -> Option<String> {
    texts
        .into_iter()
        .map(str::trim)
        .find(|s| !s.is_empty())
        .map(str::to_string)
}
