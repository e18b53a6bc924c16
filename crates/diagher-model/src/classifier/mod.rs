//! Classifier families the training job can emit.
//!
//! Every classifier yields a class-probability vector. Only tree ensembles
//! carry native feature importances; that capability is reached through
//! [`Classifier::importance_provider`] instead of probing at runtime.

mod forest;
mod logistic;

pub use forest::{DecisionTree, RandomForest};
pub use logistic::{LogisticRegression, MultiClass};

use serde::{Deserialize, Serialize};

use crate::Result;

/// Base capability shared by every model artifact.
pub trait ProbabilityClassifier: Send + Sync {
    /// Width of the (scaled) input vector the model was fitted on.
    fn n_features(&self) -> usize;

    /// Number of output classes.
    fn n_classes(&self) -> usize;

    /// One probability per class, index-aligned with the label encoder.
    fn predict_proba(&self, features: &[f64]) -> Result<Vec<f64>>;
}

/// Optional capability: per-feature importance scores, aligned with the
/// feature schema.
pub trait FeatureImportanceProvider {
    fn feature_importances(&self) -> &[f64];
}

/// Serialized classifier, tagged by family.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Classifier {
    RandomForest(RandomForest),
    LogisticRegression(LogisticRegression),
}

impl Classifier {
    /// The importance capability, if this family has one.
    pub fn importance_provider(&self) -> Option<&dyn FeatureImportanceProvider> {
        match self {
            Classifier::RandomForest(forest) => Some(forest),
            Classifier::LogisticRegression(_) => None,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Classifier::RandomForest(_) => "random_forest",
            Classifier::LogisticRegression(_) => "logistic_regression",
        }
    }

    /// Structural checks run once at load time.
    pub fn validate(&self) -> Result<()> {
        match self {
            Classifier::RandomForest(forest) => forest.validate(),
            Classifier::LogisticRegression(logistic) => logistic.validate(),
        }
    }

    fn inner(&self) -> &dyn ProbabilityClassifier {
        match self {
            Classifier::RandomForest(forest) => forest,
            Classifier::LogisticRegression(logistic) => logistic,
        }
    }
}

impl ProbabilityClassifier for Classifier {
    fn n_features(&self) -> usize {
        self.inner().n_features()
    }

    fn n_classes(&self) -> usize {
        self.inner().n_classes()
    }

    fn predict_proba(&self, features: &[f64]) -> Result<Vec<f64>> {
        self.inner().predict_proba(features)
    }
}

/// Reject an input row whose width differs from the fitted width.
pub(crate) fn check_width(expected: usize, features: &[f64]) -> Result<()> {
    if features.len() != expected {
        return Err(crate::ModelError::SchemaMismatch {
            component: "classifier",
            expected,
            actual: features.len(),
        });
    }
    Ok(())
}
