//! Loading pre-fitted model artifacts from disk.
//!
//! Layout of a models directory:
//!
//! ```text
//! models/
//!   feature_columns.json          ["Day_of_Week", "Hour", ...]
//!   preprocessing_pipeline.json   {"steps": [...]}
//!   regression_model.json         {"kind": "linear" | "forest", ...}
//!   classification_model.json     {"kind": "linear" | "forest", ...}
//! ```
//!
//! Everything is validated together at load time; a pipeline that loads is
//! shape-consistent end to end.

use std::fs;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use thiserror::Error;

use wardcast_core::{DomainError, FeatureSchema};

use crate::predictor::{Classifier, ClassificationModel, RegressionModel, Regressor};
use crate::transform::{ColumnTransformer, FittedTransform};

pub const FEATURE_COLUMNS_FILE: &str = "feature_columns.json";
pub const TRANSFORM_FILE: &str = "preprocessing_pipeline.json";
pub const REGRESSOR_FILE: &str = "regression_model.json";
pub const CLASSIFIER_FILE: &str = "classification_model.json";

#[derive(Debug, Error)]
pub enum ArtifactError {
    #[error("failed to read artifact {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse artifact {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid feature schema: {0}")]
    Schema(#[from] DomainError),

    #[error("inconsistent artifacts: {0}")]
    Invalid(String),
}

/// The four fitted artifacts, parsed and cross-validated.
#[derive(Debug, Clone)]
pub struct ModelArtifacts {
    pub schema: FeatureSchema,
    pub transform: ColumnTransformer,
    pub regressor: RegressionModel,
    pub classifier: ClassificationModel,
}

impl ModelArtifacts {
    /// Assemble and validate already-parsed artifacts.
    pub fn new(
        columns: Vec<String>,
        transform: ColumnTransformer,
        regressor: RegressionModel,
        classifier: ClassificationModel,
    ) -> Result<Self, ArtifactError> {
        let schema = FeatureSchema::new(columns)?;
        let artifacts = Self {
            schema,
            transform,
            regressor,
            classifier,
        };
        artifacts.validate()?;
        Ok(artifacts)
    }

    /// Load and validate all artifacts from `dir`.
    pub fn load_dir(dir: impl AsRef<Path>) -> Result<Self, ArtifactError> {
        let dir = dir.as_ref();
        let columns: Vec<String> = read_json(&dir.join(FEATURE_COLUMNS_FILE))?;
        let transform: ColumnTransformer = read_json(&dir.join(TRANSFORM_FILE))?;
        let regressor: RegressionModel = read_json(&dir.join(REGRESSOR_FILE))?;
        let classifier: ClassificationModel = read_json(&dir.join(CLASSIFIER_FILE))?;

        let artifacts = Self::new(columns, transform, regressor, classifier)?;
        tracing::info!(
            dir = %dir.display(),
            features = artifacts.schema.len(),
            vector_width = artifacts.transform.output_width(),
            "model artifacts loaded"
        );
        Ok(artifacts)
    }

    fn validate(&self) -> Result<(), ArtifactError> {
        self.transform
            .validate(&self.schema)
            .map_err(ArtifactError::Invalid)?;
        self.regressor
            .validate()
            .map_err(|e| ArtifactError::Invalid(format!("regressor: {e}")))?;
        self.classifier
            .validate()
            .map_err(|e| ArtifactError::Invalid(format!("classifier: {e}")))?;

        let width = self.transform.output_width();
        if self.regressor.input_width() != width {
            return Err(ArtifactError::Invalid(format!(
                "transform produces {width} features, regressor expects {}",
                self.regressor.input_width()
            )));
        }
        if self.classifier.input_width() != width {
            return Err(ArtifactError::Invalid(format!(
                "transform produces {width} features, classifier expects {}",
                self.classifier.input_width()
            )));
        }
        Ok(())
    }
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, ArtifactError> {
    let bytes = fs::read(path).map_err(|source| ArtifactError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_slice(&bytes).map_err(|source| ArtifactError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn write(dir: &Path, name: &str, v: serde_json::Value) {
        fs::write(dir.join(name), serde_json::to_vec_pretty(&v).unwrap()).unwrap();
    }

    fn write_valid(dir: &Path) {
        write(dir, FEATURE_COLUMNS_FILE, json!(["age", "bmi", "smoker"]));
        write(
            dir,
            TRANSFORM_FILE,
            json!({"steps": [
                {"kind": "passthrough", "column": "age"},
                {"kind": "standard_scaler", "column": "bmi", "mean": 25.0, "scale": 5.0},
                {"kind": "one_hot", "column": "smoker", "categories": [0, 1]}
            ]}),
        );
        write(
            dir,
            REGRESSOR_FILE,
            json!({"kind": "linear", "coefficients": [1.0, 1.0, 0.0, 0.0], "intercept": 0.0}),
        );
        write(
            dir,
            CLASSIFIER_FILE,
            json!({"kind": "linear", "classes": [0, 1], "coefficients": [[0.0, 0.0, -1.0, 1.0]], "intercepts": [0.0]}),
        );
    }

    #[test]
    fn loads_a_consistent_directory() {
        let dir = tempfile::tempdir().unwrap();
        write_valid(dir.path());

        let a = ModelArtifacts::load_dir(dir.path()).unwrap();
        assert_eq!(a.schema.columns(), ["age", "bmi", "smoker"]);
        assert_eq!(a.transform.output_width(), 4);
    }

    #[test]
    fn missing_file_is_an_io_error_naming_the_path() {
        let dir = tempfile::tempdir().unwrap();
        let err = ModelArtifacts::load_dir(dir.path()).unwrap_err();
        match err {
            ArtifactError::Io { path, .. } => assert!(path.ends_with(FEATURE_COLUMNS_FILE)),
            other => panic!("expected io error, got {other:?}"),
        }
    }

    #[test]
    fn width_mismatch_between_transform_and_model_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        write_valid(dir.path());
        write(
            dir.path(),
            REGRESSOR_FILE,
            json!({"kind": "linear", "coefficients": [1.0, 1.0], "intercept": 0.0}),
        );

        let err = ModelArtifacts::load_dir(dir.path()).unwrap_err();
        assert!(matches!(err, ArtifactError::Invalid(msg) if msg.contains("regressor expects 2")));
    }

    #[test]
    fn duplicate_schema_columns_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        write_valid(dir.path());
        write(dir.path(), FEATURE_COLUMNS_FILE, json!(["age", "age", "smoker"]));

        assert!(matches!(
            ModelArtifacts::load_dir(dir.path()),
            Err(ArtifactError::Schema(_))
        ));
    }

    #[test]
    fn malformed_json_is_a_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        write_valid(dir.path());
        fs::write(dir.path().join(CLASSIFIER_FILE), b"{not json").unwrap();

        assert!(matches!(
            ModelArtifacts::load_dir(dir.path()),
            Err(ArtifactError::Parse { .. })
        ));
    }
}
