//! Diagnosis predictor: scale → infer → rank → filter.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};

use diagher_common::confidence::round_to;

use crate::artifacts::{ArtifactStore, ModelState};
use crate::classifier::ProbabilityClassifier;
use crate::explain::{DiagnosisExplanation, Explanation};
use crate::features::{self, PatientRequest};
use crate::{ModelError, Result};

/// Hard floor on returned probabilities. Independent of any
/// presentation threshold the caller applies.
pub const MIN_CONFIDENCE: f64 = 0.10;

/// Maximum number of conditions returned by [`Predictor::predict`].
pub const MAX_PREDICTIONS: usize = 5;

/// Default number of features reported by importance views.
pub const DEFAULT_IMPORTANCE_TOP_N: usize = 10;

/// A candidate condition with its raw class probability in [0, 1].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    pub condition: String,
    pub probability: f64,
}

impl Prediction {
    /// Probability as a percentage rounded to two decimals.
    pub fn confidence_percent(&self) -> f64 {
        diagher_common::to_percent(self.probability)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureImportance {
    pub feature: String,
    pub importance: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelStatus {
    Loaded,
    NotLoaded,
}

/// Introspection view for health/status surfaces.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelInfo {
    pub status: ModelStatus,
    pub trained_date: Option<String>,
    pub feature_count: Option<usize>,
    pub class_count: Option<usize>,
    pub classes: Vec<String>,
}

/// Owns one immutable [`ModelState`]; safe to share behind an `Arc`.
#[derive(Debug, Clone)]
pub struct Predictor {
    state: ModelState,
}

impl Predictor {
    /// Load the bundle under `model_dir`. Never fails; check [`is_ready`](Self::is_ready).
    pub fn load(model_dir: impl AsRef<Path>) -> Self {
        let state = ArtifactStore::new(model_dir.as_ref()).load();
        Self { state }
    }

    pub fn from_state(state: ModelState) -> Self {
        Self { state }
    }

    pub fn state(&self) -> &ModelState {
        &self.state
    }

    pub fn is_ready(&self) -> bool {
        self.state.is_live()
    }

    /// Full class distribution in label-space order, unfiltered.
    pub fn probabilities(&self, request: &PatientRequest) -> Result<Vec<Prediction>> {
        let (Some(classifier), Some(encoder)) = (self.state.classifier(), self.state.encoder()) else {
            return Err(ModelError::ModelUnavailable);
        };
        if !self.state.is_live() {
            return Err(ModelError::ModelUnavailable);
        }

        let vector = features::build(&self.state, request)?;
        let probabilities = classifier.predict_proba(vector.as_slice())?;

        if probabilities.len() != encoder.len() {
            return Err(ModelError::SchemaMismatch {
                component: "encoder",
                expected: probabilities.len(),
                actual: encoder.len(),
            });
        }

        let total: f64 = probabilities.iter().sum();
        if (total - 1.0).abs() > 1e-6 {
            warn!("Class probabilities sum to {:.6}, expected 1.0", total);
        }

        Ok(encoder
            .classes()
            .iter()
            .zip(probabilities)
            .map(|(condition, probability)| Prediction {
                condition: condition.clone(),
                probability,
            })
            .collect())
    }

    /// Ranked conditions above [`MIN_CONFIDENCE`], at most [`MAX_PREDICTIONS`].
    ///
    /// Ties keep label-space order (the sort is stable), so tied outputs are
    /// reproducible. An empty result is a successful call.
    pub fn predict(&self, request: &PatientRequest) -> Result<Vec<Prediction>> {
        if !self.is_ready() {
            error!("Prediction requested but the diagnosis model is not loaded");
            return Err(ModelError::ModelUnavailable);
        }

        let distribution = self.probabilities(request).map_err(|e| {
            error!("Error making prediction: {}", e);
            e
        })?;

        let ranked = rank(distribution);
        info!("Generated {} diagnosis predictions", ranked.len());
        Ok(ranked)
    }

    /// Probability of one condition as reported by [`predict`](Self::predict).
    ///
    /// Returns `None` when the condition is below the floor or outside the
    /// top five even if the model gave it nonzero mass. Use
    /// [`class_probability`](Self::class_probability) for the raw value.
    pub fn predict_single_condition(&self, request: &PatientRequest, condition: &str) -> Result<Option<f64>> {
        let predictions = self.predict(request)?;
        Ok(find_condition(&predictions, condition))
    }

    /// Raw probability of one condition over the full distribution.
    pub fn class_probability(&self, request: &PatientRequest, condition: &str) -> Result<Option<f64>> {
        if !self.is_ready() {
            return Err(ModelError::ModelUnavailable);
        }
        let distribution = self.probabilities(request)?;
        Ok(find_condition(&distribution, condition))
    }

    /// Top `top_n` features by native importance. Empty when the model
    /// family has no importances or nothing is loaded.
    pub fn feature_importance(&self, top_n: usize) -> Vec<FeatureImportance> {
        let (Some(classifier), Some(schema)) = (self.state.classifier(), self.state.features()) else {
            return Vec::new();
        };
        let Some(provider) = classifier.importance_provider() else {
            debug!("{} model has no native feature importances", classifier.kind());
            return Vec::new();
        };

        let weights = provider.feature_importances();
        if weights.len() != schema.len() {
            warn!(
                "Model reports {} feature importances for {} schema features; skipping",
                weights.len(),
                schema.len()
            );
            return Vec::new();
        }

        let mut importances: Vec<FeatureImportance> = schema
            .names()
            .iter()
            .zip(weights)
            .map(|(feature, importance)| FeatureImportance {
                feature: feature.clone(),
                importance: *importance,
            })
            .collect();

        importances.sort_by(|a, b| b.importance.total_cmp(&a.importance));
        importances.truncate(top_n);
        importances
    }

    /// Explanation view combining predictions, active symptoms and importances.
    pub fn explain(&self, request: &PatientRequest) -> Result<Explanation> {
        let predictions = self.predict(request)?;

        let Some(top) = predictions.first().cloned() else {
            return Ok(Explanation::no_predictions());
        };

        let important_features = self
            .feature_importance(DEFAULT_IMPORTANCE_TOP_N)
            .into_iter()
            .map(|f| FeatureImportance {
                importance: round_to(f.importance, 4),
                ..f
            })
            .collect();

        Ok(Explanation::Available(Box::new(DiagnosisExplanation::new(
            top,
            predictions,
            request,
            important_features,
        ))))
    }

    /// Status and bundle description; metadata wins over derived values.
    pub fn model_info(&self) -> ModelInfo {
        let status = if self.is_ready() { ModelStatus::Loaded } else { ModelStatus::NotLoaded };

        if let Some(meta) = self.state.metadata() {
            return ModelInfo {
                status,
                trained_date: meta.trained_date.clone(),
                feature_count: meta.feature_count,
                class_count: meta.class_count,
                classes: meta.classes.clone(),
            };
        }

        ModelInfo {
            status,
            trained_date: Some("unknown".to_string()),
            feature_count: Some(self.state.features().map(|f| f.len()).unwrap_or(0)),
            class_count: Some(self.state.encoder().map(|e| e.len()).unwrap_or(0)),
            classes: self
                .state
                .encoder()
                .map(|e| e.classes().to_vec())
                .unwrap_or_default(),
        }
    }
}

/// Sort descending (stable), apply the floor, keep the top entries.
fn rank(distribution: Vec<Prediction>) -> Vec<Prediction> {
    let mut ranked: Vec<Prediction> = distribution
        .into_iter()
        .filter(|p| {
            let finite = p.probability.is_finite();
            if !finite {
                warn!("Dropping non-finite probability for {}", p.condition);
            }
            finite
        })
        .collect();

    ranked.sort_by(|a, b| b.probability.total_cmp(&a.probability));
    ranked.retain(|p| p.probability >= MIN_CONFIDENCE);
    ranked.truncate(MAX_PREDICTIONS);
    ranked
}

fn find_condition(predictions: &[Prediction], condition: &str) -> Option<f64> {
    let wanted = condition.to_lowercase();
    predictions
        .iter()
        .find(|p| p.condition.to_lowercase() == wanted)
        .map(|p| p.probability)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::{Classifier, DecisionTree, LogisticRegression, MultiClass, RandomForest};
    use crate::features::{FeatureSchema, Gender};
    use crate::preprocessing::{LabelEncoder, StandardScaler};

    fn p(condition: &str, probability: f64) -> Prediction {
        Prediction { condition: condition.to_string(), probability }
    }

    /// Logistic model with all-zero weights: uniform over `n_classes`.
    fn uniform_predictor(n_classes: usize) -> Predictor {
        let classes: Vec<String> = (0..n_classes).map(|i| format!("Condition {}", i)).collect();
        Predictor::from_state(ModelState::from_parts(
            Some(Classifier::LogisticRegression(LogisticRegression {
                coef: vec![vec![0.0; 2]; n_classes],
                intercept: vec![0.0; n_classes],
                multi_class: MultiClass::Multinomial,
            })),
            Some(StandardScaler::new(vec![0.0; 2], vec![1.0; 2])),
            Some(LabelEncoder::new(classes)),
            Some(FeatureSchema::new(vec!["age".into(), "gender".into()])),
            None,
        ))
    }

    #[test]
    fn test_rank_sorts_filters_and_truncates() {
        let ranked = rank(vec![
            p("a", 0.05),
            p("b", 0.30),
            p("c", 0.10),
            p("d", 0.55),
        ]);
        let names: Vec<&str> = ranked.iter().map(|p| p.condition.as_str()).collect();
        assert_eq!(names, vec!["d", "b", "c"]);
    }

    #[test]
    fn test_rank_ties_keep_class_order() {
        let ranked = rank(vec![p("x", 0.25), p("y", 0.5), p("z", 0.25)]);
        let names: Vec<&str> = ranked.iter().map(|p| p.condition.as_str()).collect();
        assert_eq!(names, vec!["y", "x", "z"]);
    }

    #[test]
    fn test_rank_drops_nan() {
        let ranked = rank(vec![p("a", f64::NAN), p("b", 0.9)]);
        assert_eq!(ranked, vec![p("b", 0.9)]);
    }

    #[test]
    fn test_uniform_seven_classes_truncate_to_five_in_class_order() {
        let predictor = uniform_predictor(7);
        let req = PatientRequest::new(30.0, Gender::Other);
        let out = predictor.predict(&req).unwrap();
        assert_eq!(out.len(), MAX_PREDICTIONS);
        let names: Vec<&str> = out.iter().map(|p| p.condition.as_str()).collect();
        assert_eq!(names, vec!["Condition 0", "Condition 1", "Condition 2", "Condition 3", "Condition 4"]);
    }

    #[test]
    fn test_uniform_eleven_classes_all_below_floor() {
        let predictor = uniform_predictor(11);
        let req = PatientRequest::new(30.0, Gender::Male);
        assert!(predictor.predict(&req).unwrap().is_empty());
    }

    #[test]
    fn test_class_probability_sees_filtered_classes() {
        let predictor = uniform_predictor(11);
        let req = PatientRequest::new(30.0, Gender::Male);
        assert_eq!(predictor.predict_single_condition(&req, "condition 3").unwrap(), None);
        let raw = predictor.class_probability(&req, "condition 3").unwrap().unwrap();
        assert!((raw - 1.0 / 11.0).abs() < 1e-12);
    }

    #[test]
    fn test_empty_predictor_is_unavailable() {
        let predictor = Predictor::from_state(ModelState::empty());
        let req = PatientRequest::new(30.0, Gender::Female);
        assert!(!predictor.is_ready());
        assert!(matches!(predictor.predict(&req), Err(ModelError::ModelUnavailable)));
        assert!(matches!(predictor.class_probability(&req, "x"), Err(ModelError::ModelUnavailable)));
        assert!(predictor.feature_importance(10).is_empty());
    }

    #[test]
    fn test_logistic_has_no_importances() {
        assert!(uniform_predictor(3).feature_importance(10).is_empty());
    }

    #[test]
    fn test_scaler_drift_is_schema_mismatch() {
        let state = ModelState::from_parts(
            Some(Classifier::LogisticRegression(LogisticRegression {
                coef: vec![vec![0.0; 2]; 2],
                intercept: vec![0.0; 2],
                multi_class: MultiClass::Multinomial,
            })),
            Some(StandardScaler::new(vec![0.0; 3], vec![1.0; 3])),
            Some(LabelEncoder::new(vec!["a".into(), "b".into()])),
            Some(FeatureSchema::new(vec!["age".into(), "gender".into()])),
            None,
        );
        let predictor = Predictor::from_state(state);
        let req = PatientRequest::new(30.0, Gender::Female);
        assert!(matches!(
            predictor.predict(&req),
            Err(ModelError::SchemaMismatch { component: "scaler", expected: 3, actual: 2 })
        ));
    }

    #[test]
    fn test_encoder_drift_is_schema_mismatch() {
        let state = ModelState::from_parts(
            Some(Classifier::LogisticRegression(LogisticRegression {
                coef: vec![vec![0.0; 2]; 3],
                intercept: vec![0.0; 3],
                multi_class: MultiClass::Multinomial,
            })),
            Some(StandardScaler::new(vec![0.0; 2], vec![1.0; 2])),
            Some(LabelEncoder::new(vec!["a".into(), "b".into()])),
            Some(FeatureSchema::new(vec!["age".into(), "gender".into()])),
            None,
        );
        let predictor = Predictor::from_state(state);
        let req = PatientRequest::new(30.0, Gender::Female);
        assert!(matches!(
            predictor.predict(&req),
            Err(ModelError::SchemaMismatch { component: "encoder", .. })
        ));
    }

    #[test]
    fn test_model_info_without_metadata_is_derived() {
        let info = uniform_predictor(3).model_info();
        assert_eq!(info.status, ModelStatus::Loaded);
        assert_eq!(info.trained_date.as_deref(), Some("unknown"));
        assert_eq!(info.feature_count, Some(2));
        assert_eq!(info.class_count, Some(3));
        assert_eq!(info.classes.len(), 3);
    }

    #[test]
    fn test_model_info_when_nothing_loaded() {
        let info = Predictor::from_state(ModelState::empty()).model_info();
        assert_eq!(info.status, ModelStatus::NotLoaded);
        assert_eq!(info.feature_count, Some(0));
        assert!(info.classes.is_empty());
    }

    #[test]
    fn test_importance_length_mismatch_is_empty() {
        let forest = RandomForest {
            n_features: 2,
            n_classes: 2,
            trees: vec![DecisionTree {
                children_left: vec![-1],
                children_right: vec![-1],
                feature: vec![-2],
                threshold: vec![-2.0],
                value: vec![vec![1.0, 1.0]],
            }],
            feature_importances: vec![0.6, 0.4],
        };
        let state = ModelState::from_parts(
            Some(Classifier::RandomForest(forest)),
            Some(StandardScaler::new(vec![0.0; 3], vec![1.0; 3])),
            Some(LabelEncoder::new(vec!["a".into(), "b".into()])),
            Some(FeatureSchema::new(vec!["age".into(), "gender".into(), "chest_pain".into()])),
            None,
        );
        let predictor = Predictor::from_state(state);
        assert!(predictor.feature_importance(DEFAULT_IMPORTANCE_TOP_N).is_empty());
    }

    #[test]
    fn test_importance_ranked_and_truncated() {
        let forest = RandomForest {
            n_features: 3,
            n_classes: 2,
            trees: vec![DecisionTree {
                children_left: vec![-1],
                children_right: vec![-1],
                feature: vec![-2],
                threshold: vec![-2.0],
                value: vec![vec![1.0, 1.0]],
            }],
            feature_importances: vec![0.2, 0.5, 0.3],
        };
        let state = ModelState::from_parts(
            Some(Classifier::RandomForest(forest)),
            Some(StandardScaler::new(vec![0.0; 3], vec![1.0; 3])),
            Some(LabelEncoder::new(vec!["a".into(), "b".into()])),
            Some(FeatureSchema::new(vec!["age".into(), "gender".into(), "chest_pain".into()])),
            None,
        );
        let top = Predictor::from_state(state).feature_importance(2);
        let names: Vec<&str> = top.iter().map(|f| f.feature.as_str()).collect();
        assert_eq!(names, vec!["gender", "chest_pain"]);
    }
}
