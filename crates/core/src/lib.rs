//! `wardcast-core` — shared primitives for the prediction and triage services.
//!
//! This crate is **pure**: no IO, no runtime, no model artifacts.

pub mod case;
pub mod error;
pub mod feature;

pub use case::{TriageCase, CASE_TIMESTAMP_FORMAT};
pub use error::{DomainError, DomainResult};
pub use feature::{reconcile, FeatureRecord, FeatureSchema, MISSING_FEATURE_DEFAULT};
