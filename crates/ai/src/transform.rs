//! Fitted column transformer.
//!
//! Each step reads one column of a reconciled [`FeatureRecord`] and emits one
//! or more floats. Steps run in artifact order and their outputs are
//! concatenated into the model input vector.

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use wardcast_core::{FeatureRecord, FeatureSchema};

use crate::result::TransformError;

/// A fitted, call-stateless mapping from a reconciled record to a numeric vector.
pub trait FittedTransform: Send + Sync {
    /// Length of every vector produced by [`apply`](Self::apply).
    fn output_width(&self) -> usize;

    fn apply(&self, record: &FeatureRecord) -> Result<Vec<f64>, TransformError>;
}

/// What a one-hot step does with a value outside its fitted categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HandleUnknown {
    #[default]
    Error,
    Ignore,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TransformStep {
    /// `(x - mean) / scale`.
    StandardScaler {
        column: String,
        mean: f64,
        scale: f64,
        #[serde(default)]
        impute: Option<f64>,
    },

    Passthrough {
        column: String,
        #[serde(default)]
        impute: Option<f64>,
    },

    OneHot {
        column: String,
        categories: Vec<JsonValue>,
        #[serde(default)]
        handle_unknown: HandleUnknown,
    },
}

impl TransformStep {
    pub fn column(&self) -> &str {
        match self {
            TransformStep::StandardScaler { column, .. }
            | TransformStep::Passthrough { column, .. }
            | TransformStep::OneHot { column, .. } => column,
        }
    }

    pub fn width(&self) -> usize {
        match self {
            TransformStep::StandardScaler { .. } | TransformStep::Passthrough { .. } => 1,
            TransformStep::OneHot { categories, .. } => categories.len(),
        }
    }

    fn encode(&self, value: &JsonValue, out: &mut Vec<f64>) -> Result<(), TransformError> {
        match self {
            TransformStep::StandardScaler {
                column,
                mean,
                scale,
                impute,
            } => {
                let x = coerce_numeric(column, value, *impute)?;
                // A zero-variance column was fitted with scale 0; sklearn divides by 1.
                let scale = if *scale == 0.0 { 1.0 } else { *scale };
                out.push((x - mean) / scale);
            }
            TransformStep::Passthrough { column, impute } => {
                out.push(coerce_numeric(column, value, *impute)?);
            }
            TransformStep::OneHot {
                column,
                categories,
                handle_unknown,
            } => {
                let hit = categories.iter().position(|c| category_matches(c, value));
                if hit.is_none() && *handle_unknown == HandleUnknown::Error {
                    return Err(TransformError::UnknownCategory {
                        column: column.clone(),
                        value: value.clone(),
                    });
                }
                out.extend((0..categories.len()).map(|i| if Some(i) == hit { 1.0 } else { 0.0 }));
            }
        }
        Ok(())
    }
}

/// Ordered set of fitted steps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnTransformer {
    pub steps: Vec<TransformStep>,
}

impl ColumnTransformer {
    pub fn new(steps: Vec<TransformStep>) -> Self {
        Self { steps }
    }

    /// Check the steps against the schema the transformer will be fed.
    pub fn validate(&self, schema: &FeatureSchema) -> Result<(), String> {
        if self.steps.is_empty() {
            return Err("column transformer has no steps".to_string());
        }
        for step in &self.steps {
            if !schema.contains(step.column()) {
                return Err(format!(
                    "transform step references column '{}' which is not in the feature schema",
                    step.column()
                ));
            }
            match step {
                TransformStep::StandardScaler { mean, scale, .. } => {
                    if !(mean.is_finite() && scale.is_finite()) {
                        return Err(format!("scaler for '{}' has non-finite parameters", step.column()));
                    }
                }
                TransformStep::OneHot { categories, .. } if categories.is_empty() => {
                    return Err(format!("one-hot step for '{}' has no categories", step.column()));
                }
                _ => {}
            }
        }
        Ok(())
    }
}

impl FittedTransform for ColumnTransformer {
    fn output_width(&self) -> usize {
        self.steps.iter().map(TransformStep::width).sum()
    }

    fn apply(&self, record: &FeatureRecord) -> Result<Vec<f64>, TransformError> {
        let mut out = Vec::with_capacity(self.output_width());
        for step in &self.steps {
            let value = record
                .get(step.column())
                .ok_or_else(|| TransformError::ColumnNotInRecord {
                    column: step.column().to_string(),
                })?;
            step.encode(value, &mut out)?;
        }
        Ok(out)
    }
}

fn coerce_numeric(column: &str, value: &JsonValue, impute: Option<f64>) -> Result<f64, TransformError> {
    let non_numeric = || TransformError::NonNumeric {
        column: column.to_string(),
        value: value.clone(),
    };

    let x = match value {
        JsonValue::Number(n) => n.as_f64().ok_or_else(non_numeric)?,
        JsonValue::Bool(b) => {
            if *b {
                1.0
            } else {
                0.0
            }
        }
        JsonValue::String(s) => s.trim().parse::<f64>().map_err(|_| non_numeric())?,
        JsonValue::Null => {
            return impute.ok_or_else(|| TransformError::MissingValue {
                column: column.to_string(),
            });
        }
        JsonValue::Array(_) | JsonValue::Object(_) => return Err(non_numeric()),
    };

    if x.is_finite() { Ok(x) } else { Err(non_numeric()) }
}

/// Numbers compare numerically (`1` matches `1.0`); everything else by equality.
fn category_matches(category: &JsonValue, value: &JsonValue) -> bool {
    match (category.as_f64(), value.as_f64()) {
        (Some(a), Some(b)) => a == b,
        _ => category == value,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wardcast_core::reconcile;

    fn schema() -> FeatureSchema {
        FeatureSchema::new(["Hour", "Department", "Emergency_Load"]).unwrap()
    }

    fn transformer() -> ColumnTransformer {
        serde_json::from_value(json!({
            "steps": [
                {"kind": "standard_scaler", "column": "Hour", "mean": 12.0, "scale": 4.0},
                {"kind": "one_hot", "column": "Department", "categories": ["cardiology", "neurology"]},
                {"kind": "one_hot", "column": "Emergency_Load", "categories": ["No", "Yes"], "handle_unknown": "ignore"}
            ]
        }))
        .unwrap()
    }

    fn record(v: JsonValue) -> FeatureRecord {
        reconcile(v.as_object().unwrap(), &schema())
    }

    #[test]
    fn encodes_numeric_and_categorical_columns() {
        let t = transformer();
        assert_eq!(t.output_width(), 5);
        t.validate(&schema()).unwrap();

        let x = t
            .apply(&record(json!({"Hour": 16, "Department": "neurology", "Emergency_Load": "Yes"})))
            .unwrap();
        assert_eq!(x, vec![1.0, 0.0, 1.0, 0.0, 1.0]);
    }

    #[test]
    fn numeric_strings_and_bools_are_coerced() {
        let t = transformer();
        let x = t
            .apply(&record(json!({"Hour": " 8 ", "Department": "cardiology", "Emergency_Load": true})))
            .unwrap();
        // `true` is not a fitted Emergency_Load category; ignored -> all zero.
        assert_eq!(x, vec![-1.0, 1.0, 0.0, 0.0, 0.0]);
    }

    #[test]
    fn unknown_category_fails_when_handle_unknown_is_error() {
        let t = transformer();
        // Department is missing, so it reconciles to 0 which is not a fitted category.
        let err = t.apply(&record(json!({"Hour": 3}))).unwrap_err();
        assert!(matches!(err, TransformError::UnknownCategory { ref column, .. } if column == "Department"));
    }

    #[test]
    fn non_numeric_string_in_numeric_column_fails() {
        let t = transformer();
        let err = t
            .apply(&record(json!({"Hour": "noon", "Department": "cardiology"})))
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "could not convert value \"noon\" in column 'Hour' to float"
        );

        let err = t
            .apply(&record(json!({"Hour": "inf", "Department": "cardiology"})))
            .unwrap_err();
        assert!(matches!(err, TransformError::NonNumeric { .. }));
    }

    #[test]
    fn null_uses_imputation_value_when_fitted() {
        let t = ColumnTransformer::new(vec![TransformStep::Passthrough {
            column: "Hour".to_string(),
            impute: Some(9.0),
        }]);
        assert_eq!(t.apply(&record(json!({"Hour": null}))).unwrap(), vec![9.0]);

        let t = ColumnTransformer::new(vec![TransformStep::Passthrough {
            column: "Hour".to_string(),
            impute: None,
        }]);
        assert!(matches!(
            t.apply(&record(json!({"Hour": null}))),
            Err(TransformError::MissingValue { .. })
        ));
    }

    #[test]
    fn numeric_categories_match_across_int_and_float() {
        let t = ColumnTransformer::new(vec![TransformStep::OneHot {
            column: "Hour".to_string(),
            categories: vec![json!(0), json!(1.0)],
            handle_unknown: HandleUnknown::Error,
        }]);
        assert_eq!(t.apply(&record(json!({"Hour": 1}))).unwrap(), vec![0.0, 1.0]);
        assert_eq!(t.apply(&record(json!({}))).unwrap(), vec![1.0, 0.0]);
    }

    #[test]
    fn zero_scale_divides_by_one() {
        let t = ColumnTransformer::new(vec![TransformStep::StandardScaler {
            column: "Hour".to_string(),
            mean: 2.0,
            scale: 0.0,
            impute: None,
        }]);
        assert_eq!(t.apply(&record(json!({"Hour": 5}))).unwrap(), vec![3.0]);
    }

    #[test]
    fn validate_rejects_columns_outside_schema() {
        let t = ColumnTransformer::new(vec![TransformStep::Passthrough {
            column: "Ward".to_string(),
            impute: None,
        }]);
        let err = t.validate(&schema()).unwrap_err();
        assert!(err.contains("'Ward'"));
    }
}
