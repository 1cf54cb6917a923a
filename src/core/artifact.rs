//! Serialized classifier produced by the external training pipeline.
//!
//! The file is a JSON document holding the training column names and one
//! estimator, either a logistic regression or an ensemble of decision trees
//! exported from scikit-learn. Everything is validated once at load time so
//! that prediction only walks already-checked structures.

use crate::domain::model::{FeatureVector, FEATURE_COLUMNS, FEATURE_COUNT};
use crate::domain::ports::Predictor;
use crate::utils::error::{Result, RiskError};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub const SUPPORTED_FORMAT_VERSION: u32 = 1;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArtifactDocument {
    pub format_version: u32,
    pub feature_names: Vec<String>,
    pub estimator: Estimator,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Estimator {
    Logistic {
        coefficients: Vec<f64>,
        intercept: f64,
        #[serde(default = "default_threshold")]
        threshold: f64,
    },
    TreeEnsemble { trees: Vec<DecisionTree> },
}

fn default_threshold() -> f64 {
    0.5
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecisionTree {
    pub nodes: Vec<TreeNode>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TreeNode {
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
    Leaf {
        class: i64,
    },
}

/// A loaded, validated model. Immutable once constructed.
#[derive(Debug, Clone)]
pub struct ModelArtifact {
    source: String,
    estimator: Estimator,
}

impl ModelArtifact {
    /// Deserializes and validates artifact bytes. `source` names the file in errors.
    pub fn from_bytes(source: &str, bytes: &[u8]) -> Result<Self> {
        let document: ArtifactDocument = serde_json::from_slice(bytes)
            .map_err(|e| load_error(source, format!("corrupt artifact: {}", e)))?;
        Self::from_document(source, document)
    }

    pub fn from_document(source: &str, document: ArtifactDocument) -> Result<Self> {
        if document.format_version != SUPPORTED_FORMAT_VERSION {
            return Err(load_error(
                source,
                format!(
                    "unsupported format_version {} (expected {})",
                    document.format_version, SUPPORTED_FORMAT_VERSION
                ),
            ));
        }

        if document.feature_names.iter().map(String::as_str).ne(FEATURE_COLUMNS) {
            return Err(load_error(
                source,
                format!(
                    "schema mismatch: model expects columns [{}], this tool encodes [{}]",
                    document.feature_names.join(", "),
                    FEATURE_COLUMNS.join(", ")
                ),
            ));
        }

        validate_estimator(&document.estimator).map_err(|reason| load_error(source, reason))?;

        tracing::debug!(
            "Loaded {} model from {}",
            document.estimator.kind(),
            source
        );

        Ok(Self {
            source: source.to_string(),
            estimator: document.estimator,
        })
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn estimator(&self) -> &Estimator {
        &self.estimator
    }
}

impl Estimator {
    pub fn kind(&self) -> &'static str {
        match self {
            Estimator::Logistic { .. } => "logistic",
            Estimator::TreeEnsemble { .. } => "tree_ensemble",
        }
    }

    fn classify(&self, row: &[f64; FEATURE_COUNT]) -> Result<i64> {
        match self {
            Estimator::Logistic {
                coefficients,
                intercept,
                threshold,
            } => {
                let z = coefficients
                    .iter()
                    .zip(row.iter())
                    .fold(*intercept, |acc, (w, x)| acc + w * x);
                let probability = 1.0 / (1.0 + (-z).exp());
                if !probability.is_finite() {
                    return Err(RiskError::InferenceError {
                        message: format!("logistic score is not finite (z = {})", z),
                    });
                }
                Ok(i64::from(probability >= *threshold))
            }
            Estimator::TreeEnsemble { trees } => {
                let mut votes: BTreeMap<i64, usize> = BTreeMap::new();
                for tree in trees {
                    *votes.entry(tree.classify(row)?).or_default() += 1;
                }
                // Ascending class order; ties keep the smallest class.
                votes
                    .into_iter()
                    .fold(None, |best: Option<(i64, usize)>, (class, count)| match best {
                        Some((_, best_count)) if best_count >= count => best,
                        _ => Some((class, count)),
                    })
                    .map(|(class, _)| class)
                    .ok_or_else(|| RiskError::InferenceError {
                        message: "tree ensemble produced no votes".to_string(),
                    })
            }
        }
    }
}

impl DecisionTree {
    fn classify(&self, row: &[f64; FEATURE_COUNT]) -> Result<i64> {
        let mut index = 0;
        // Children always have larger indices, so the walk is bounded by the node count.
        loop {
            match self.nodes.get(index) {
                Some(TreeNode::Leaf { class }) => return Ok(*class),
                Some(TreeNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                }) => {
                    index = if row[*feature] <= *threshold { *left } else { *right };
                }
                None => {
                    return Err(RiskError::InferenceError {
                        message: format!("decision tree node {} does not exist", index),
                    })
                }
            }
        }
    }
}

impl Predictor for ModelArtifact {
    fn predict(&self, features: &FeatureVector) -> Result<i64> {
        self.estimator.classify(&features.to_row())
    }
}

fn load_error(source: &str, reason: String) -> RiskError {
    RiskError::ArtifactLoadError {
        path: source.to_string(),
        reason,
    }
}

fn validate_estimator(estimator: &Estimator) -> std::result::Result<(), String> {
    match estimator {
        Estimator::Logistic {
            coefficients,
            intercept,
            threshold,
        } => {
            if coefficients.len() != FEATURE_COUNT {
                return Err(format!(
                    "logistic model has {} coefficients, expected {}",
                    coefficients.len(),
                    FEATURE_COUNT
                ));
            }
            if coefficients.iter().any(|w| !w.is_finite()) || !intercept.is_finite() {
                return Err("logistic model has non-finite parameters".to_string());
            }
            if !(*threshold > 0.0 && *threshold < 1.0) {
                return Err(format!("decision threshold {} is outside (0, 1)", threshold));
            }
            Ok(())
        }
        Estimator::TreeEnsemble { trees } => {
            if trees.is_empty() {
                return Err("tree ensemble contains no trees".to_string());
            }
            for (t, tree) in trees.iter().enumerate() {
                if tree.nodes.is_empty() {
                    return Err(format!("tree {} has no nodes", t));
                }
                for (i, node) in tree.nodes.iter().enumerate() {
                    if let TreeNode::Split {
                        feature,
                        threshold,
                        left,
                        right,
                    } = node
                    {
                        if *feature >= FEATURE_COUNT {
                            return Err(format!(
                                "tree {} node {} splits on feature {} (only {} features)",
                                t, i, feature, FEATURE_COUNT
                            ));
                        }
                        if !threshold.is_finite() {
                            return Err(format!("tree {} node {} has a non-finite threshold", t, i));
                        }
                        for child in [*left, *right] {
                            if child <= i || child >= tree.nodes.len() {
                                return Err(format!(
                                    "tree {} node {} points to invalid child {}",
                                    t, i, child
                                ));
                            }
                        }
                    }
                }
            }
            Ok(())
        }
    }
}
