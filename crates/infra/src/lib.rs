//! Infrastructure layer: case persistence and the remote inference transport.

pub mod case_store;
pub mod inference;

pub use case_store::{CaseStore, CaseStoreError, InMemoryCaseStore, JsonFileCaseStore};
pub use inference::{HttpInferenceClient, HttpInferenceConfig};
