//! Append-only triage case store.
//!
//! Cases are only ever appended and read back in full, oldest first.
//! Implementations must serialize appends so concurrent writers never lose
//! each other's cases.

pub mod in_memory;
pub mod json_file;

use std::path::PathBuf;
use std::sync::Arc;

use thiserror::Error;

use wardcast_core::TriageCase;

pub use in_memory::InMemoryCaseStore;
pub use json_file::JsonFileCaseStore;

#[derive(Debug, Error)]
pub enum CaseStoreError {
    #[error("case store {path} is corrupt: {reason}")]
    Corrupt { path: PathBuf, reason: String },

    #[error("case store {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub trait CaseStore: Send + Sync {
    /// Durably add `case` after every existing case.
    fn append(&self, case: TriageCase) -> Result<(), CaseStoreError>;

    /// Every stored case, oldest first. An empty store is not an error.
    fn read_all(&self) -> Result<Vec<TriageCase>, CaseStoreError>;
}

impl<S: CaseStore + ?Sized> CaseStore for Arc<S> {
    fn append(&self, case: TriageCase) -> Result<(), CaseStoreError> {
        (**self).append(case)
    }

    fn read_all(&self) -> Result<Vec<TriageCase>, CaseStoreError> {
        (**self).read_all()
    }
}
