//! Fitted preprocessing artifacts: the per-feature scaler and the label encoder.

use serde::{Deserialize, Serialize};

use crate::{ArtifactKind, ModelError, Result};

/// Mean/variance normalisation fitted at training time.
/// transform(x)_i = (x_i - mean_i) / scale_i
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StandardScaler {
    pub mean: Vec<f64>,
    pub scale: Vec<f64>,
}

impl StandardScaler {
    pub fn new(mean: Vec<f64>, scale: Vec<f64>) -> Self {
        Self { mean, scale }
    }

    /// Number of features the scaler was fitted on.
    pub fn n_features(&self) -> usize {
        self.mean.len()
    }

    pub fn validate(&self) -> Result<()> {
        if self.mean.len() != self.scale.len() {
            return Err(ModelError::ArtifactInvalid {
                artifact: ArtifactKind::Scaler,
                reason: format!(
                    "mean has {} entries but scale has {}",
                    self.mean.len(),
                    self.scale.len()
                ),
            });
        }
        if self.mean.iter().chain(&self.scale).any(|v| !v.is_finite()) {
            return Err(ModelError::ArtifactInvalid {
                artifact: ArtifactKind::Scaler,
                reason: "non-finite mean or scale".to_string(),
            });
        }
        Ok(())
    }

    /// Scale one row. A zero scale (constant training feature) divides by 1.
    pub fn transform(&self, row: &[f64]) -> Result<Vec<f64>> {
        if row.len() != self.n_features() {
            return Err(ModelError::SchemaMismatch {
                component: "scaler",
                expected: self.n_features(),
                actual: row.len(),
            });
        }

        Ok(row
            .iter()
            .zip(self.mean.iter().zip(&self.scale))
            .map(|(x, (mean, scale))| {
                let scale = if *scale == 0.0 { 1.0 } else { *scale };
                (x - mean) / scale
            })
            .collect())
    }
}

/// Ordered condition names; position i labels probability i.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabelEncoder {
    pub classes: Vec<String>,
}

impl LabelEncoder {
    pub fn new(classes: Vec<String>) -> Self {
        Self { classes }
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    pub fn validate(&self) -> Result<()> {
        if self.classes.is_empty() {
            return Err(ModelError::ArtifactInvalid {
                artifact: ArtifactKind::Encoder,
                reason: "no classes".to_string(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transform_standardises() {
        let scaler = StandardScaler::new(vec![40.0, 0.5], vec![15.0, 0.5]);
        let out = scaler.transform(&[55.0, 1.0]).unwrap();
        assert!((out[0] - 1.0).abs() < 1e-12);
        assert!((out[1] - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_zero_scale_is_treated_as_one() {
        let scaler = StandardScaler::new(vec![2.0], vec![0.0]);
        assert_eq!(scaler.transform(&[5.0]).unwrap(), vec![3.0]);
    }

    #[test]
    fn test_width_mismatch_is_schema_error() {
        let scaler = StandardScaler::new(vec![0.0; 3], vec![1.0; 3]);
        match scaler.transform(&[1.0, 2.0]) {
            Err(ModelError::SchemaMismatch { expected, actual, .. }) => {
                assert_eq!(expected, 3);
                assert_eq!(actual, 2);
            }
            other => panic!("expected SchemaMismatch, got {:?}", other),
        }
    }

    #[test]
    fn test_ragged_scaler_invalid() {
        let scaler = StandardScaler::new(vec![0.0; 3], vec![1.0; 2]);
        assert!(scaler.validate().is_err());
    }

    #[test]
    fn test_empty_encoder_invalid() {
        assert!(LabelEncoder::new(vec![]).validate().is_err());
    }
}
