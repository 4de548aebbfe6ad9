//! `wardcast-ai`
//!
//! **Responsibility:** the model-facing side of the service.
//!
//! - Prediction: fitted artifacts, the column transformer, the two predictors,
//!   and the [`PredictionPipeline`] that composes them.
//! - Forecast: the hourly crowd grid built on top of the pipeline.
//! - Triage: the conversation protocol with a remote chat model.
//!
//! No HTTP, no file persistence of cases. Transports are injected.

pub mod artifact;
pub mod forecast;
pub mod pipeline;
pub mod predictor;
pub mod result;
pub mod transform;
pub mod triage;

pub use artifact::{ArtifactError, ModelArtifacts};
pub use forecast::{forecast, CrowdForecast, CrowdLevel, ForecastParams};
pub use pipeline::PredictionPipeline;
pub use predictor::{Classifier, ClassificationModel, RegressionModel, Regressor};
pub use result::{ModelError, PredictionResult, TransformError};
pub use transform::{ColumnTransformer, FittedTransform, TransformStep};
pub use triage::{
    AdvisoryLocale, InferenceClient, RemoteResponse, RemoteServiceError, TriageAdapter, TriageError,
    TriageOutcome, TriageSettings,
};
