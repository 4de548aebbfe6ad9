//! Triage conversation protocol.
//!
//! Turns a free-text patient description into a [`TriageCase`] by asking a
//! remote chat model for an advisory disposition. The transport is behind
//! [`InferenceClient`]; this module owns the prompt, the response shapes, and
//! the rule that a remote failure still yields a case.
//!
//! [`TriageCase`]: wardcast_core::TriageCase

pub mod adapter;
pub mod client;
pub mod prompt;
pub mod response;

pub use adapter::{AdvisoryLocale, TriageAdapter, TriageError, TriageOutcome, TriageSettings};
pub use client::{InferenceClient, RemoteServiceError};
pub use prompt::{ChatMessage, ChatRequest, Disposition, SYSTEM_PROMPT};
pub use response::{RemoteResponse, NO_RESPONSE_PLACEHOLDER};
