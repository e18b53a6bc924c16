//! Explanation view for a single prediction.

use serde::{Deserialize, Serialize};

use crate::features::{Gender, PatientRequest};
use crate::predictor::{FeatureImportance, Prediction};

pub const NO_PREDICTIONS_MESSAGE: &str = "No predictions available";

/// Condition with its confidence as a percentage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConditionConfidence {
    pub condition: String,
    pub confidence: f64,
}

impl From<&Prediction> for ConditionConfidence {
    fn from(p: &Prediction) -> Self {
        Self {
            condition: p.condition.clone(),
            confidence: p.confidence_percent(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatientInfo {
    pub age: f64,
    pub gender: Gender,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiagnosisExplanation {
    pub top_prediction: ConditionConfidence,
    pub all_predictions: Vec<ConditionConfidence>,
    pub active_symptoms: Vec<String>,
    pub important_features: Vec<FeatureImportance>,
    pub patient_info: PatientInfo,
}

impl DiagnosisExplanation {
    pub fn new(
        top: Prediction,
        predictions: Vec<Prediction>,
        request: &PatientRequest,
        important_features: Vec<FeatureImportance>,
    ) -> Self {
        Self {
            top_prediction: ConditionConfidence::from(&top),
            all_predictions: predictions.iter().map(ConditionConfidence::from).collect(),
            active_symptoms: request.active_symptoms(),
            important_features,
            patient_info: PatientInfo {
                age: request.age,
                gender: request.gender,
            },
        }
    }
}

/// Either a full explanation or the explicit "nothing to explain" marker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Explanation {
    Available(Box<DiagnosisExplanation>),
    Unavailable { error: String },
}

impl Explanation {
    pub fn no_predictions() -> Self {
        Explanation::Unavailable { error: NO_PREDICTIONS_MESSAGE.to_string() }
    }

    pub fn is_available(&self) -> bool {
        matches!(self, Explanation::Available(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_marker_serialises_as_error_object() {
        let json = serde_json::to_value(Explanation::no_predictions()).unwrap();
        assert_eq!(json, serde_json::json!({"error": "No predictions available"}));
    }

    #[test]
    fn test_explanation_renders_percentages() {
        let request = PatientRequest::new(45.0, Gender::Female)
            .with_symptom("chest_pain", 1.0)
            .with_symptom("jaw_pain", 0.0);
        let top = Prediction { condition: "Heart Disease".into(), probability: 0.61234 };
        let explanation = DiagnosisExplanation::new(top.clone(), vec![top], &request, vec![]);
        assert_eq!(explanation.top_prediction.confidence, 61.23);
        assert_eq!(explanation.active_symptoms, vec!["chest_pain"]);
        assert_eq!(explanation.patient_info.gender, Gender::Female);
    }
}
