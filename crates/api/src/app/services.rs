//! Request-scoped services: the loaded models, the triage adapter and the
//! case store, shared behind one `Arc` by every handler.

use std::sync::Arc;

use anyhow::Context;
use thiserror::Error;

use wardcast_ai::{PredictionPipeline, TriageAdapter};
use wardcast_core::TriageCase;
use wardcast_infra::{CaseStore, CaseStoreError, HttpInferenceClient, JsonFileCaseStore};

use crate::config::AppConfig;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error(transparent)]
    Store(#[from] CaseStoreError),
    #[error("blocking task failed: {0}")]
    Join(String),
}

pub struct AppServices {
    pipeline: PredictionPipeline,
    triage: TriageAdapter,
    cases: Arc<dyn CaseStore>,
}

impl AppServices {
    pub fn new(pipeline: PredictionPipeline, triage: TriageAdapter, cases: Arc<dyn CaseStore>) -> Self {
        Self {
            pipeline,
            triage,
            cases,
        }
    }

    pub fn pipeline(&self) -> &PredictionPipeline {
        &self.pipeline
    }

    pub fn triage(&self) -> &TriageAdapter {
        &self.triage
    }

    /// Store IO runs on the blocking pool.
    pub async fn append_case(&self, case: TriageCase) -> Result<(), ServiceError> {
        let cases = self.cases.clone();
        tokio::task::spawn_blocking(move || cases.append(case))
            .await
            .map_err(|e| ServiceError::Join(e.to_string()))??;
        Ok(())
    }

    pub async fn read_cases(&self) -> Result<Vec<TriageCase>, ServiceError> {
        let cases = self.cases.clone();
        let all = tokio::task::spawn_blocking(move || cases.read_all())
            .await
            .map_err(|e| ServiceError::Join(e.to_string()))??;
        Ok(all)
    }
}

/// Production wiring. Fails if the model artifacts cannot be loaded.
pub fn build_services(config: &AppConfig) -> anyhow::Result<AppServices> {
    let pipeline = PredictionPipeline::load(&config.models_dir)
        .with_context(|| format!("loading model artifacts from {}", config.models_dir.display()))?;

    let client = Arc::new(HttpInferenceClient::new(config.inference.clone()));
    let triage = TriageAdapter::new(client, config.triage.clone());

    let cases: Arc<dyn CaseStore> = Arc::new(JsonFileCaseStore::new(&config.cases_path));
    tracing::info!(path = %config.cases_path.display(), "case store ready");

    Ok(AppServices::new(pipeline, triage, cases))
}
