//! Random forest evaluation over flattened decision trees.
//!
//! Trees use the parallel-array node layout of the training library:
//! node `i` is a leaf when `children_left[i] == -1`, otherwise it routes
//! left when `x[feature[i]] <= threshold[i]`.

use serde::{Deserialize, Serialize};

use super::{check_width, FeatureImportanceProvider, ProbabilityClassifier};
use crate::{ArtifactKind, ModelError, Result};

const TREE_LEAF: i64 = -1;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecisionTree {
    pub children_left: Vec<i64>,
    pub children_right: Vec<i64>,
    pub feature: Vec<i64>,
    pub threshold: Vec<f64>,
    /// Per-node class weights; only leaf rows are read.
    pub value: Vec<Vec<f64>>,
}

impl DecisionTree {
    fn node_count(&self) -> usize {
        self.children_left.len()
    }

    fn validate(&self, index: usize, n_features: usize, n_classes: usize) -> Result<()> {
        let invalid = |reason: String| ModelError::ArtifactInvalid {
            artifact: ArtifactKind::Classifier,
            reason: format!("tree {}: {}", index, reason),
        };

        let n = self.node_count();
        if n == 0 {
            return Err(invalid("no nodes".to_string()));
        }
        if self.children_right.len() != n
            || self.feature.len() != n
            || self.threshold.len() != n
            || self.value.len() != n
        {
            return Err(invalid("node arrays have different lengths".to_string()));
        }

        for node in 0..n {
            let left = self.children_left[node];
            let right = self.children_right[node];
            if left == TREE_LEAF {
                let row = &self.value[node];
                if row.len() != n_classes {
                    return Err(invalid(format!(
                        "leaf {} has {} class weights, expected {}",
                        node,
                        row.len(),
                        n_classes
                    )));
                }
                continue;
            }
            for child in [left, right] {
                if child <= node as i64 || child as usize >= n {
                    return Err(invalid(format!("node {} has bad child {}", node, child)));
                }
            }
            let feature = self.feature[node];
            if feature < 0 || feature as usize >= n_features {
                return Err(invalid(format!(
                    "node {} splits on feature {} of {}",
                    node, feature, n_features
                )));
            }
        }
        Ok(())
    }

    /// Walk to the leaf for `x` and return its normalised class distribution.
    fn leaf_distribution(&self, x: &[f64]) -> Result<Vec<f64>> {
        let mut node = 0usize;
        // Children always have a higher index, so the walk is bounded by the node count.
        for _ in 0..=self.node_count() {
            if self.children_left[node] == TREE_LEAF {
                let row = &self.value[node];
                let total: f64 = row.iter().sum();
                if total <= 0.0 || !total.is_finite() {
                    return Err(ModelError::Inference(format!(
                        "leaf {} has no class weight",
                        node
                    )));
                }
                return Ok(row.iter().map(|w| w / total).collect());
            }

            let feature = self.feature[node] as usize;
            node = if x[feature] <= self.threshold[node] {
                self.children_left[node] as usize
            } else {
                self.children_right[node] as usize
            };
        }
        Err(ModelError::Inference("tree walk did not reach a leaf".to_string()))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RandomForest {
    pub n_features: usize,
    pub n_classes: usize,
    pub trees: Vec<DecisionTree>,
    #[serde(default)]
    pub feature_importances: Vec<f64>,
}

impl RandomForest {
    pub fn validate(&self) -> Result<()> {
        if self.trees.is_empty() {
            return Err(ModelError::ArtifactInvalid {
                artifact: ArtifactKind::Classifier,
                reason: "forest has no trees".to_string(),
            });
        }
        if !self.feature_importances.is_empty() && self.feature_importances.len() != self.n_features {
            return Err(ModelError::ArtifactInvalid {
                artifact: ArtifactKind::Classifier,
                reason: format!(
                    "{} feature importances for {} features",
                    self.feature_importances.len(),
                    self.n_features
                ),
            });
        }
        for (i, tree) in self.trees.iter().enumerate() {
            tree.validate(i, self.n_features, self.n_classes)?;
        }
        Ok(())
    }
}

impl ProbabilityClassifier for RandomForest {
    fn n_features(&self) -> usize {
        self.n_features
    }

    fn n_classes(&self) -> usize {
        self.n_classes
    }

    /// Mean of the per-tree leaf distributions.
    fn predict_proba(&self, features: &[f64]) -> Result<Vec<f64>> {
        check_width(self.n_features, features)?;
        let mut sum = vec![0.0; self.n_classes];
        for tree in &self.trees {
            for (acc, p) in sum.iter_mut().zip(tree.leaf_distribution(features)?) {
                *acc += p;
            }
        }
        let n_trees = self.trees.len() as f64;
        Ok(sum.into_iter().map(|s| s / n_trees).collect())
    }
}

impl FeatureImportanceProvider for RandomForest {
    fn feature_importances(&self) -> &[f64] {
        &self.feature_importances
    }
}
