//! Linear (logistic) classifier. Has no native feature importances.

use serde::{Deserialize, Serialize};

use super::{check_width, ProbabilityClassifier};
use crate::{ArtifactKind, ModelError, Result};

/// How per-class scores become a distribution.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MultiClass {
    /// Softmax over all class scores.
    #[default]
    Multinomial,
    /// Independent sigmoids, renormalised to sum to one.
    Ovr,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogisticRegression {
    /// One row per class; a single row means the binary case.
    pub coef: Vec<Vec<f64>>,
    pub intercept: Vec<f64>,
    #[serde(default)]
    pub multi_class: MultiClass,
}

fn sigmoid(z: f64) -> f64 {
    1.0 / (1.0 + (-z).exp())
}

fn softmax(scores: &[f64]) -> Vec<f64> {
    let max = scores.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let exps: Vec<f64> = scores.iter().map(|s| (s - max).exp()).collect();
    let total: f64 = exps.iter().sum();
    exps.into_iter().map(|e| e / total).collect()
}

impl LogisticRegression {
    pub fn validate(&self) -> Result<()> {
        let invalid = |reason: String| ModelError::ArtifactInvalid {
            artifact: ArtifactKind::Classifier,
            reason,
        };

        if self.coef.is_empty() {
            return Err(invalid("no coefficient rows".to_string()));
        }
        if self.coef.len() != self.intercept.len() {
            return Err(invalid(format!(
                "{} coefficient rows but {} intercepts",
                self.coef.len(),
                self.intercept.len()
            )));
        }
        let width = self.coef[0].len();
        if self.coef.iter().any(|row| row.len() != width) {
            return Err(invalid("coefficient rows have different widths".to_string()));
        }
        Ok(())
    }

    fn decision_function(&self, x: &[f64]) -> Vec<f64> {
        self.coef
            .iter()
            .zip(&self.intercept)
            .map(|(row, b)| row.iter().zip(x).map(|(w, v)| w * v).sum::<f64>() + b)
            .collect()
    }
}

impl ProbabilityClassifier for LogisticRegression {
    fn n_features(&self) -> usize {
        self.coef.first().map(Vec::len).unwrap_or(0)
    }

    fn n_classes(&self) -> usize {
        match self.coef.len() {
            1 => 2,
            n => n,
        }
    }

    fn predict_proba(&self, features: &[f64]) -> Result<Vec<f64>> {
        check_width(self.n_features(), features)?;
        let scores = self.decision_function(features);

        if scores.len() == 1 {
            let p = sigmoid(scores[0]);
            return Ok(vec![1.0 - p, p]);
        }

        let probs = match self.multi_class {
            MultiClass::Multinomial => softmax(&scores),
            MultiClass::Ovr => {
                let raw: Vec<f64> = scores.into_iter().map(sigmoid).collect();
                let total: f64 = raw.iter().sum();
                raw.into_iter().map(|p| p / total).collect()
            }
        };

        if probs.iter().any(|p| !p.is_finite()) {
            return Err(ModelError::Inference(
                "logistic scores produced a non-finite probability".to_string(),
            ));
        }
        Ok(probs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_binary_uses_single_row() {
        let lr = LogisticRegression { coef: vec![vec![2.0]], intercept: vec![0.0], multi_class: MultiClass::Multinomial };
        assert_eq!(lr.n_classes(), 2);
        let p = lr.predict_proba(&[0.0]).unwrap();
        assert_eq!(p, vec![0.5, 0.5]);
        let p = lr.predict_proba(&[3.0]).unwrap();
        assert!(p[1] > 0.99);
    }

    #[test]
    fn test_softmax_sums_to_one() {
        let lr = LogisticRegression {
            coef: vec![vec![1.0, 0.0], vec![0.0, 1.0], vec![-1.0, -1.0]],
            intercept: vec![0.1, 0.2, 0.3],
            multi_class: MultiClass::Multinomial,
        };
        let p = lr.predict_proba(&[0.7, -0.4]).unwrap();
        assert_eq!(p.len(), 3);
        assert!((p.iter().sum::<f64>() - 1.0).abs() < 1e-12);
        assert!(p[0] > p[1] && p[0] > p[2]);
    }

    #[test]
    fn test_ovr_normalises() {
        let lr = LogisticRegression {
            coef: vec![vec![1.0], vec![-1.0], vec![0.0]],
            intercept: vec![0.0; 3],
            multi_class: MultiClass::Ovr,
        };
        let p = lr.predict_proba(&[2.0]).unwrap();
        assert!((p.iter().sum::<f64>() - 1.0).abs() < 1e-12);
        assert!(p[0] > p[2] && p[2] > p[1]);
    }

    #[test]
    fn test_softmax_is_stable_for_large_scores() {
        let p = softmax(&[1000.0, 999.0]);
        assert!(p.iter().all(|v| v.is_finite()));
        assert!(p[0] > p[1]);
    }

    #[test]
    fn test_row_width_must_match_coefficients() {
        let lr = LogisticRegression {
            coef: vec![vec![1.0, 2.0, 3.0], vec![0.0, 0.0, 1.0]],
            intercept: vec![0.0, 0.0],
            multi_class: MultiClass::Multinomial,
        };
        assert!(matches!(
            lr.predict_proba(&[1.0, 1.0]),
            Err(ModelError::SchemaMismatch { component: "classifier", expected: 3, actual: 2 })
        ));
        assert!(matches!(
            lr.predict_proba(&[1.0, 1.0, 1.0, 1.0]),
            Err(ModelError::SchemaMismatch { expected: 3, actual: 4, .. })
        ));
    }

    #[test]
    fn test_validate_rejects_ragged_rows() {
        let lr = LogisticRegression {
            coef: vec![vec![1.0, 2.0], vec![1.0]],
            intercept: vec![0.0, 0.0],
            multi_class: MultiClass::Multinomial,
        };
        assert!(lr.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_missing_intercepts() {
        let lr = LogisticRegression { coef: vec![vec![1.0]], intercept: vec![], multi_class: MultiClass::Ovr };
        assert!(lr.validate().is_err());
    }
}
