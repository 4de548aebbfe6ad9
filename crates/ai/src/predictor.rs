//! Fitted predictors.
//!
//! Two shapes of artifact are supported for each task: a linear model and a
//! forest of decision trees. Both are plain data; evaluation is a pure function
//! of the input vector.

use serde::{Deserialize, Serialize};

use crate::result::ModelError;

/// A fitted regressor over a single transformed row.
pub trait Regressor: Send + Sync {
    fn input_width(&self) -> usize;

    fn predict(&self, x: &[f64]) -> Result<f64, ModelError>;
}

/// A fitted classifier over a single transformed row.
pub trait Classifier: Send + Sync {
    fn input_width(&self) -> usize;

    fn predict(&self, x: &[f64]) -> Result<i64, ModelError>;
}

fn check_width(expected: usize, x: &[f64]) -> Result<(), ModelError> {
    if x.len() != expected {
        return Err(ModelError::Shape {
            expected,
            actual: x.len(),
        });
    }
    Ok(())
}

fn dot(w: &[f64], x: &[f64]) -> f64 {
    w.iter().zip(x).map(|(a, b)| a * b).sum()
}

// -------------------------
// Decision trees
// -------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TreeNode {
    /// `x[feature] <= threshold` goes left.
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
    Leaf {
        value: f64,
    },
}

/// Flat node array; node 0 is the root.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionTree {
    pub nodes: Vec<TreeNode>,
}

impl DecisionTree {
    /// Children must point forward, which also rules out cycles.
    pub fn validate(&self, n_features: usize) -> Result<(), String> {
        if self.nodes.is_empty() {
            return Err("decision tree has no nodes".to_string());
        }
        for (i, node) in self.nodes.iter().enumerate() {
            match node {
                TreeNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    if *feature >= n_features {
                        return Err(format!("node {i} splits on feature {feature}, input has {n_features}"));
                    }
                    if !threshold.is_finite() {
                        return Err(format!("node {i} has a non-finite threshold"));
                    }
                    for child in [left, right] {
                        if *child <= i || *child >= self.nodes.len() {
                            return Err(format!("node {i} has out-of-order child {child}"));
                        }
                    }
                }
                TreeNode::Leaf { value } => {
                    if !value.is_finite() {
                        return Err(format!("leaf {i} has a non-finite value"));
                    }
                }
            }
        }
        Ok(())
    }

    pub fn leaves(&self) -> impl Iterator<Item = f64> + '_ {
        self.nodes.iter().filter_map(|n| match n {
            TreeNode::Leaf { value } => Some(*value),
            TreeNode::Split { .. } => None,
        })
    }

    /// Walk from the root to a leaf.
    ///
    /// Out-of-range indices and cycles are errors rather than panics, so an
    /// unvalidated tree fails the prediction instead of the process.
    pub fn evaluate(&self, x: &[f64]) -> Result<f64, ModelError> {
        let mut idx = 0;
        // A well-formed path visits each node at most once.
        for _ in 0..self.nodes.len() {
            match self.nodes.get(idx) {
                Some(TreeNode::Leaf { value }) => return Ok(*value),
                Some(TreeNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                }) => {
                    let v = x.get(*feature).ok_or_else(|| {
                        ModelError::Malformed(format!("split on feature {feature} beyond input width {}", x.len()))
                    })?;
                    idx = if *v <= *threshold { *left } else { *right };
                }
                None => return Err(ModelError::Malformed(format!("tree node {idx} does not exist"))),
            }
        }
        Err(ModelError::Malformed("decision tree never reaches a leaf".to_string()))
    }
}

// -------------------------
// Regression
// -------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RegressionModel {
    Linear {
        coefficients: Vec<f64>,
        intercept: f64,
    },
    /// Mean of the trees' leaf values.
    Forest {
        n_features: usize,
        trees: Vec<DecisionTree>,
    },
}

impl RegressionModel {
    pub fn validate(&self) -> Result<(), String> {
        match self {
            RegressionModel::Linear {
                coefficients,
                intercept,
            } => {
                if coefficients.is_empty() {
                    return Err("linear regressor has no coefficients".to_string());
                }
                if !coefficients.iter().chain([intercept]).all(|c| c.is_finite()) {
                    return Err("linear regressor has non-finite parameters".to_string());
                }
            }
            RegressionModel::Forest { n_features, trees } => {
                if trees.is_empty() {
                    return Err("regression forest has no trees".to_string());
                }
                for (t, tree) in trees.iter().enumerate() {
                    tree.validate(*n_features).map_err(|e| format!("tree {t}: {e}"))?;
                }
            }
        }
        Ok(())
    }
}

impl Regressor for RegressionModel {
    fn input_width(&self) -> usize {
        match self {
            RegressionModel::Linear { coefficients, .. } => coefficients.len(),
            RegressionModel::Forest { n_features, .. } => *n_features,
        }
    }

    fn predict(&self, x: &[f64]) -> Result<f64, ModelError> {
        check_width(self.input_width(), x)?;
        let y = match self {
            RegressionModel::Linear {
                coefficients,
                intercept,
            } => dot(coefficients, x) + intercept,
            RegressionModel::Forest { trees, .. } => {
                trees.iter().map(|t| t.evaluate(x)).sum::<Result<f64, _>>()? / trees.len() as f64
            }
        };
        if y.is_finite() { Ok(y) } else { Err(ModelError::NonFinite) }
    }
}

// -------------------------
// Classification
// -------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ClassificationModel {
    /// One coefficient row per class (argmax), or a single row for a binary
    /// model where a positive score selects `classes[1]`.
    Linear {
        classes: Vec<i64>,
        coefficients: Vec<Vec<f64>>,
        intercepts: Vec<f64>,
    },
    /// Majority vote; each leaf holds an index into `classes`.
    Forest {
        classes: Vec<i64>,
        n_features: usize,
        trees: Vec<DecisionTree>,
    },
}

impl ClassificationModel {
    pub fn validate(&self) -> Result<(), String> {
        match self {
            ClassificationModel::Linear {
                classes,
                coefficients,
                intercepts,
            } => {
                let binary = coefficients.len() == 1 && classes.len() == 2;
                if !binary && (classes.len() < 2 || coefficients.len() != classes.len()) {
                    return Err(format!(
                        "linear classifier has {} coefficient rows for {} classes",
                        coefficients.len(),
                        classes.len()
                    ));
                }
                if intercepts.len() != coefficients.len() {
                    return Err("linear classifier needs one intercept per coefficient row".to_string());
                }
                let width = coefficients[0].len();
                if width == 0 || coefficients.iter().any(|row| row.len() != width) {
                    return Err("linear classifier coefficient rows must be non-empty and equal length".to_string());
                }
                if !coefficients.iter().flatten().chain(intercepts).all(|c| c.is_finite()) {
                    return Err("linear classifier has non-finite parameters".to_string());
                }
            }
            ClassificationModel::Forest {
                classes,
                n_features,
                trees,
            } => {
                if classes.is_empty() {
                    return Err("classification forest has no classes".to_string());
                }
                if trees.is_empty() {
                    return Err("classification forest has no trees".to_string());
                }
                for (t, tree) in trees.iter().enumerate() {
                    tree.validate(*n_features).map_err(|e| format!("tree {t}: {e}"))?;
                    for leaf in tree.leaves() {
                        if leaf < 0.0 || leaf.fract() != 0.0 || leaf as usize >= classes.len() {
                            return Err(format!("tree {t}: leaf {leaf} is not a class index"));
                        }
                    }
                }
            }
        }
        Ok(())
    }
}

impl Classifier for ClassificationModel {
    fn input_width(&self) -> usize {
        match self {
            ClassificationModel::Linear { coefficients, .. } => {
                coefficients.first().map(Vec::len).unwrap_or(0)
            }
            ClassificationModel::Forest { n_features, .. } => *n_features,
        }
    }

    fn predict(&self, x: &[f64]) -> Result<i64, ModelError> {
        check_width(self.input_width(), x)?;
        match self {
            ClassificationModel::Linear {
                classes,
                coefficients,
                intercepts,
            } => {
                let scores: Vec<f64> = coefficients
                    .iter()
                    .zip(intercepts)
                    .map(|(w, b)| dot(w, x) + b)
                    .collect();
                if scores.iter().any(|s| !s.is_finite()) {
                    return Err(ModelError::NonFinite);
                }

                if scores.len() == 1 {
                    return class_at(classes, usize::from(scores[0] > 0.0));
                }

                let best = first_max(&scores)
                    .ok_or_else(|| ModelError::Malformed("linear classifier has no coefficient rows".to_string()))?;
                class_at(classes, best)
            }
            ClassificationModel::Forest { classes, trees, .. } => {
                let mut votes = vec![0usize; classes.len()];
                for tree in trees {
                    let leaf = tree.evaluate(x)?;
                    let slot = (leaf >= 0.0 && leaf.fract() == 0.0)
                        .then_some(leaf as usize)
                        .and_then(|i| votes.get_mut(i))
                        .ok_or_else(|| ModelError::Malformed(format!("leaf {leaf} is not a class index")))?;
                    *slot += 1;
                }
                let best = first_max(&votes)
                    .ok_or_else(|| ModelError::Malformed("classification forest has no classes".to_string()))?;
                class_at(classes, best)
            }
        }
    }
}

/// Index of the first maximum; earlier entries win ties.
fn first_max<T: PartialOrd + Copy>(values: &[T]) -> Option<usize> {
    let mut best: Option<(usize, T)> = None;
    for (i, v) in values.iter().copied().enumerate() {
        match best {
            Some((_, b)) if b >= v => {}
            _ => best = Some((i, v)),
        }
    }
    best.map(|(i, _)| i)
}

fn class_at(classes: &[i64], index: usize) -> Result<i64, ModelError> {
    classes.get(index).copied().ok_or_else(|| {
        ModelError::Malformed(format!("class index {index} out of range for {} classes", classes.len()))
    })
}
