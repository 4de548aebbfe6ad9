//! Process configuration, read once at startup from the environment.
//!
//! Every setting has a default; invalid values fall back to it with a warning
//! so a typo never keeps the server from starting. The inference token is
//! optional: without it triage still answers, with an advisory failure text.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use wardcast_ai::triage::adapter::{DEFAULT_MAX_TOKENS, DEFAULT_TRIAGE_MODEL};
use wardcast_ai::{AdvisoryLocale, TriageSettings};
use wardcast_infra::inference::DEFAULT_INFERENCE_URL;
use wardcast_infra::HttpInferenceConfig;

pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:5000";
pub const DEFAULT_MODELS_DIR: &str = "models";
pub const DEFAULT_CASES_PATH: &str = "cases.json";
const DEFAULT_TIMEOUT_SECS: u64 = 30;
const DEFAULT_MAX_ATTEMPTS: u32 = 2;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bind_addr: SocketAddr,
    pub models_dir: PathBuf,
    pub cases_path: PathBuf,
    pub inference: HttpInferenceConfig,
    pub triage: TriageSettings,
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup (the environment in production, a map in tests).
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let token = get("HF_API_TOKEN").or_else(|| get("HF_TOKEN"));
        if token.is_none() {
            tracing::warn!("HF_API_TOKEN not set; triage requests will return an advisory failure message");
        }

        let default_bind: SocketAddr = ([0, 0, 0, 0], 5000).into();

        Self {
            bind_addr: parse_or(&get, "WARDCAST_BIND_ADDR", default_bind),
            models_dir: get("WARDCAST_MODELS_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_MODELS_DIR)),
            cases_path: get("WARDCAST_CASES_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_CASES_PATH)),
            inference: HttpInferenceConfig {
                endpoint: get("WARDCAST_INFERENCE_URL").unwrap_or_else(|| DEFAULT_INFERENCE_URL.to_string()),
                token,
                timeout: Duration::from_secs(parse_or(&get, "WARDCAST_TRIAGE_TIMEOUT_SECS", DEFAULT_TIMEOUT_SECS).max(1)),
                max_attempts: parse_or(&get, "WARDCAST_TRIAGE_MAX_ATTEMPTS", DEFAULT_MAX_ATTEMPTS).max(1),
                ..HttpInferenceConfig::default()
            },
            triage: TriageSettings {
                model: get("WARDCAST_TRIAGE_MODEL").unwrap_or_else(|| DEFAULT_TRIAGE_MODEL.to_string()),
                max_tokens: parse_or(&get, "WARDCAST_TRIAGE_MAX_TOKENS", DEFAULT_MAX_TOKENS).max(1),
                locale: parse_or(&get, "WARDCAST_TRIAGE_LOCALE", AdvisoryLocale::default()),
            },
        }
    }
}

fn parse_or<T>(get: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> T
where
    T: FromStr + std::fmt::Debug,
    T::Err: std::fmt::Display,
{
    match get(key) {
        None => default,
        Some(raw) => match raw.trim().parse::<T>() {
            Ok(v) => v,
            Err(e) => {
                tracing::warn!(key, value = %raw, error = %e, default = ?default, "invalid config value; using default");
                default
            }
        },
    }
}
