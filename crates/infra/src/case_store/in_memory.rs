use std::sync::RwLock;

use wardcast_core::TriageCase;

use super::{CaseStore, CaseStoreError};

/// In-memory case store.
///
/// Intended for tests/dev. Nothing survives a restart.
#[derive(Debug, Default)]
pub struct InMemoryCaseStore {
    cases: RwLock<Vec<TriageCase>>,
}

impl InMemoryCaseStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl CaseStore for InMemoryCaseStore {
    fn append(&self, case: TriageCase) -> Result<(), CaseStoreError> {
        // The vector is valid after every push, so a poisoned lock is still usable.
        let mut cases = self.cases.write().unwrap_or_else(|p| p.into_inner());
        cases.push(case);
        Ok(())
    }

    fn read_all(&self) -> Result<Vec<TriageCase>, CaseStoreError> {
        let cases = self.cases.read().unwrap_or_else(|p| p.into_inner());
        Ok(cases.clone())
    }
}
