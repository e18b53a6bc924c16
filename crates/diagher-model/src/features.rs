//! Request → feature vector.
//!
//! The feature schema is the single source of truth for vector layout: the
//! scaler and classifier were fitted on exactly this column order, so the
//! builder walks the schema and never the request.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::artifacts::ModelState;
use crate::{ArtifactKind, ModelError, Result};

pub const AGE_FEATURE: &str = "age";
pub const GENDER_FEATURE: &str = "gender";

/// Value used for any schema feature the request does not mention.
pub const MISSING_FEATURE_FILL: f64 = 0.0;

/// Ordered feature names the model bundle was trained on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FeatureSchema(Vec<String>);

impl FeatureSchema {
    pub fn new(names: Vec<String>) -> Self {
        Self(names)
    }

    pub fn names(&self) -> &[String] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.iter().any(|n| n == name)
    }

    pub fn validate(&self) -> Result<()> {
        if self.0.is_empty() {
            return Err(ModelError::ArtifactInvalid {
                artifact: ArtifactKind::Features,
                reason: "empty feature list".to_string(),
            });
        }
        let mut seen = std::collections::HashSet::new();
        if let Some(dup) = self.0.iter().find(|n| !seen.insert(n.as_str())) {
            return Err(ModelError::ArtifactInvalid {
                artifact: ArtifactKind::Features,
                reason: format!("duplicate feature {:?}", dup),
            });
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Gender {
    Male,
    Female,
    Other,
}

impl Gender {
    pub fn as_str(&self) -> &'static str {
        match self {
            Gender::Male => "Male",
            Gender::Female => "Female",
            Gender::Other => "Other",
        }
    }
}

impl std::str::FromStr for Gender {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "Male" => Ok(Gender::Male),
            "Female" => Ok(Gender::Female),
            "Other" => Ok(Gender::Other),
            other => Err(format!("unknown gender {:?}", other)),
        }
    }
}

/// A validated diagnosis request. Symptom keys need not cover the schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatientRequest {
    pub age: f64,
    pub gender: Gender,
    #[serde(default)]
    pub symptoms: BTreeMap<String, f64>,
}

impl PatientRequest {
    pub fn new(age: f64, gender: Gender) -> Self {
        Self { age, gender, symptoms: BTreeMap::new() }
    }

    pub fn with_symptom(mut self, name: &str, value: f64) -> Self {
        self.symptoms.insert(name.to_string(), value);
        self
    }

    /// Symptoms reported with a positive value, in name order.
    pub fn active_symptoms(&self) -> Vec<String> {
        self.symptoms
            .iter()
            .filter(|(_, v)| **v > 0.0)
            .map(|(k, _)| k.clone())
            .collect()
    }
}

/// A scaled, schema-ordered feature row.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureVector(Vec<f64>);

impl FeatureVector {
    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_inner(self) -> Vec<f64> {
        self.0
    }
}

/// Binary gender encoding used at training time.
/// Only Female maps to 1; Male and Other both map to 0.
pub fn encode_gender(gender: Gender) -> f64 {
    if gender == Gender::Female { 1.0 } else { 0.0 }
}

/// Fill policy for symptom features: the reported value verbatim, or
/// [`MISSING_FEATURE_FILL`] when absent.
pub fn symptom_value(symptoms: &BTreeMap<String, f64>, feature: &str) -> f64 {
    symptoms.get(feature).copied().unwrap_or(MISSING_FEATURE_FILL)
}

/// Unscaled row in schema order.
pub fn assemble(schema: &FeatureSchema, request: &PatientRequest) -> Vec<f64> {
    schema
        .names()
        .iter()
        .map(|name| match name.as_str() {
            AGE_FEATURE => request.age,
            GENDER_FEATURE => encode_gender(request.gender),
            symptom => symptom_value(&request.symptoms, symptom),
        })
        .collect()
}

/// Assemble and scale a request against a loaded model.
pub fn build(state: &ModelState, request: &PatientRequest) -> Result<FeatureVector> {
    let (schema, scaler) = match (state.features(), state.scaler()) {
        (Some(schema), Some(scaler)) if state.is_live() => (schema, scaler),
        _ => return Err(ModelError::PipelineNotReady),
    };

    let raw = assemble(schema, request);
    let scaled = scaler.transform(&raw)?;
    debug!("Built feature vector of width {}", scaled.len());
    Ok(FeatureVector(scaled))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn schema(names: &[&str]) -> FeatureSchema {
        FeatureSchema::new(names.iter().map(|s| s.to_string()).collect())
    }

    #[test]
    fn test_gender_encoding() {
        assert_eq!(encode_gender(Gender::Female), 1.0);
        assert_eq!(encode_gender(Gender::Male), 0.0);
        assert_eq!(encode_gender(Gender::Other), 0.0);
    }

    #[test]
    fn test_assemble_follows_schema_order() {
        let s = schema(&["fatigue", "gender", "age", "nausea"]);
        let req = PatientRequest::new(45.0, Gender::Female)
            .with_symptom("nausea", 2.0)
            .with_symptom("fatigue", 1.0);
        assert_eq!(assemble(&s, &req), vec![1.0, 1.0, 45.0, 2.0]);
    }

    #[test]
    fn test_missing_symptom_fills_zero() {
        let s = schema(&["age", "gender", "jaw_pain", "dizziness"]);
        let req = PatientRequest::new(30.0, Gender::Male).with_symptom("dizziness", 1.0);
        assert_eq!(assemble(&s, &req), vec![30.0, 0.0, 0.0, 1.0]);
    }

    #[test]
    fn test_unknown_symptoms_are_ignored() {
        let s = schema(&["age", "fever"]);
        let req = PatientRequest::new(20.0, Gender::Other).with_symptom("not_in_schema", 1.0);
        assert_eq!(assemble(&s, &req), vec![20.0, 0.0]);
    }

    #[test]
    fn test_schema_without_age_or_gender() {
        let s = schema(&["cough"]);
        let req = PatientRequest::new(99.0, Gender::Female).with_symptom("cough", 3.0);
        assert_eq!(assemble(&s, &req), vec![3.0]);
    }

    #[test]
    fn test_active_symptoms_skip_zero() {
        let req = PatientRequest::new(45.0, Gender::Female)
            .with_symptom("jaw_pain", 0.0)
            .with_symptom("chest_pain", 1.0)
            .with_symptom("dizziness", 2.0);
        assert_eq!(req.active_symptoms(), vec!["chest_pain", "dizziness"]);
    }

    #[test]
    fn test_build_without_model_is_not_ready() {
        let state = ModelState::empty();
        let req = PatientRequest::new(45.0, Gender::Female);
        assert!(matches!(build(&state, &req), Err(ModelError::PipelineNotReady)));
    }

    #[test]
    fn test_duplicate_features_invalid() {
        assert!(schema(&["age", "age"]).validate().is_err());
        assert!(schema(&[]).validate().is_err());
    }

    #[test]
    fn test_request_json_shape() {
        let req: PatientRequest = serde_json::from_value(serde_json::json!({
            "age": 45,
            "gender": "Female",
            "symptoms": {"chest_pain": 1, "jaw_pain": 0}
        }))
        .unwrap();
        assert_eq!(req.gender, Gender::Female);
        assert_eq!(req.symptoms.get("chest_pain"), Some(&1.0));
    }
}
