use std::fmt;
use std::path::Path;
use std::sync::Arc;

use serde_json::{Map, Value as JsonValue};

use wardcast_core::{reconcile, FeatureSchema};

use crate::artifact::{ArtifactError, ModelArtifacts};
use crate::predictor::{Classifier, Regressor};
use crate::result::{ModelError, PredictionResult};
use crate::transform::FittedTransform;

/// Fitted transform + regressor + classifier behind one `predict` call.
///
/// Loaded once at startup and shared read-only (`Clone` only bumps `Arc`s).
/// Prediction is a pure function of the loaded state and the input.
#[derive(Clone)]
pub struct PredictionPipeline {
    schema: FeatureSchema,
    transform: Arc<dyn FittedTransform>,
    regressor: Arc<dyn Regressor>,
    classifier: Arc<dyn Classifier>,
}

impl PredictionPipeline {
    pub fn new(
        schema: FeatureSchema,
        transform: Arc<dyn FittedTransform>,
        regressor: Arc<dyn Regressor>,
        classifier: Arc<dyn Classifier>,
    ) -> Self {
        Self {
            schema,
            transform,
            regressor,
            classifier,
        }
    }

    pub fn from_artifacts(artifacts: ModelArtifacts) -> Self {
        Self::new(
            artifacts.schema,
            Arc::new(artifacts.transform),
            Arc::new(artifacts.regressor),
            Arc::new(artifacts.classifier),
        )
    }

    /// Load all artifacts from a models directory.
    pub fn load(dir: impl AsRef<Path>) -> Result<Self, ArtifactError> {
        ModelArtifacts::load_dir(dir).map(Self::from_artifacts)
    }

    /// Reconcile `raw` to the schema, transform it, and run both predictors on
    /// the same vector.
    pub fn predict(&self, raw: &Map<String, JsonValue>) -> Result<PredictionResult, ModelError> {
        let record = reconcile(raw, &self.schema);
        let x = self.transform.apply(&record)?;

        let continuous_value = self.regressor.predict(&x)?;
        let discrete_label = self.classifier.predict(&x)?;

        Ok(PredictionResult {
            continuous_value,
            discrete_label,
        })
    }
}

impl fmt::Debug for PredictionPipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PredictionPipeline")
            .field("schema", &self.schema)
            .field("vector_width", &self.transform.output_width())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    use crate::predictor::{ClassificationModel, RegressionModel};
    use crate::transform::{ColumnTransformer, TransformStep};
    use crate::result::TransformError;

    fn pipeline() -> PredictionPipeline {
        let artifacts = ModelArtifacts::new(
            vec!["age".into(), "bmi".into(), "smoker".into()],
            ColumnTransformer::new(vec![
                TransformStep::Passthrough {
                    column: "age".into(),
                    impute: None,
                },
                TransformStep::Passthrough {
                    column: "bmi".into(),
                    impute: None,
                },
                TransformStep::Passthrough {
                    column: "smoker".into(),
                    impute: None,
                },
            ]),
            RegressionModel::Linear {
                coefficients: vec![10.0, 2.0, 500.0],
                intercept: 100.0,
            },
            ClassificationModel::Linear {
                classes: vec![0, 1],
                coefficients: vec![vec![0.0, 0.0, 1.0]],
                intercepts: vec![-0.5],
            },
        )
        .unwrap();
        PredictionPipeline::from_artifacts(artifacts)
    }

    fn object(v: JsonValue) -> Map<String, JsonValue> {
        v.as_object().cloned().unwrap()
    }

    #[test]
    fn missing_features_are_zero_filled_before_transform() {
        let p = pipeline();
        let r = p.predict(&object(json!({"age": 45}))).unwrap();
        assert_eq!(r.continuous_value, 550.0);
        assert_eq!(r.discrete_label, 0);
    }

    #[test]
    fn extra_features_are_ignored() {
        let p = pipeline();
        let a = p.predict(&object(json!({"age": 30, "bmi": 20, "smoker": 1}))).unwrap();
        let b = p
            .predict(&object(json!({"zip": "12345", "smoker": 1, "bmi": 20, "age": 30})))
            .unwrap();
        assert_eq!(a, b);
        assert_eq!(a.discrete_label, 1);
    }

    #[test]
    fn predict_is_deterministic() {
        let p = pipeline();
        let input = object(json!({"age": 61, "bmi": 31.5, "smoker": 0}));
        assert_eq!(p.predict(&input).unwrap(), p.predict(&input).unwrap());
    }

    #[test]
    fn transform_errors_propagate() {
        let p = pipeline();
        let err = p.predict(&object(json!({"age": "old"}))).unwrap_err();
        assert!(matches!(err, ModelError::Transform(TransformError::NonNumeric { .. })));
    }

    #[test]
    fn result_serializes_with_wire_names() {
        let p = pipeline();
        let r = p.predict(&object(json!({"age": 1, "bmi": 1, "smoker": 1}))).unwrap();
        assert_eq!(
            serde_json::to_value(r).unwrap(),
            json!({"regression_prediction": 612.0, "classification_prediction": 1})
        );
    }
}
