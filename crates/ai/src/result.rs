use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use thiserror::Error;

/// Output of one pipeline run: both predictors applied to the same vector.
///
/// The wire names are what existing `/predict` clients read.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PredictionResult {
    #[serde(rename = "regression_prediction")]
    pub continuous_value: f64,

    #[serde(rename = "classification_prediction")]
    pub discrete_label: i64,
}

/// A reconciled record could not be encoded by the fitted transform.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TransformError {
    #[error("could not convert value {value} in column '{column}' to float")]
    NonNumeric { column: String, value: JsonValue },

    #[error("column '{column}' is null and has no imputation value")]
    MissingValue { column: String },

    #[error("found unknown category {value} in column '{column}' during transform")]
    UnknownCategory { column: String, value: JsonValue },

    #[error("column '{column}' is not part of the input record")]
    ColumnNotInRecord { column: String },
}

/// Failure while applying the loaded models to one input.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ModelError {
    #[error(transparent)]
    Transform(#[from] TransformError),

    #[error("X has {actual} features, but the model is expecting {expected} features as input")]
    Shape { expected: usize, actual: usize },

    #[error("model produced a non-finite value")]
    NonFinite,

    /// Model parameters that would not have passed load-time validation.
    #[error("malformed model: {0}")]
    Malformed(String),
}
