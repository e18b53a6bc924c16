//! Diagnosis and explanation endpoints.

use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use serde::Serialize;
use serde_json::Value;
use tracing::info;

use diagher_common::{to_percent, ConfidenceBands, ConfidenceLevel};
use diagher_model::explain::PatientInfo;
use diagher_model::{Explanation, Prediction};

use crate::error::ApiError;
use crate::response::{success, Envelope};
use crate::state::SharedState;
use crate::validation::validate_patient;

pub const RECOMMENDATION: &str =
    "Please consult with a healthcare provider for proper diagnosis and treatment.";

#[derive(Debug, Serialize)]
pub struct FormattedPrediction {
    pub condition: String,
    /// Percentage, two decimals.
    pub confidence: f64,
    pub confidence_level: ConfidenceLevel,
}

impl FormattedPrediction {
    fn new(prediction: &Prediction, bands: &ConfidenceBands) -> Self {
        Self {
            condition: prediction.condition.clone(),
            confidence: to_percent(prediction.probability),
            confidence_level: ConfidenceLevel::classify(prediction.probability, bands),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct DiagnosisResponse {
    pub patient_info: PatientInfo,
    pub predictions: Vec<FormattedPrediction>,
    pub total_symptoms: f64,
    pub recommendation: &'static str,
}

/// POST /api/v1/diagnosis: Rank candidate conditions for a patient
pub async fn diagnose(
    State(state): State<SharedState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Json<Envelope<DiagnosisResponse>>, ApiError> {
    let Json(body) = payload?;
    let request = validate_patient(&body)?;

    let predictor = state.service.predictor().await?;
    let predictions = predictor.predict(&request)?;

    let bands = &state.config.confidence;
    let response = DiagnosisResponse {
        patient_info: PatientInfo { age: request.age, gender: request.gender },
        predictions: predictions.iter().map(|p| FormattedPrediction::new(p, bands)).collect(),
        total_symptoms: request.symptoms.values().sum(),
        recommendation: RECOMMENDATION,
    };

    info!(
        "Diagnosis prediction made for {}, age {} ({} conditions)",
        request.gender.as_str(),
        request.age,
        response.predictions.len()
    );
    Ok(success(response, "Diagnosis prediction completed"))
}

/// POST /api/v1/diagnosis/explain: Prediction with active symptoms and importances
pub async fn explain(
    State(state): State<SharedState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Json<Envelope<Explanation>>, ApiError> {
    let Json(body) = payload?;
    let request = validate_patient(&body)?;

    let predictor = state.service.predictor().await?;
    let explanation = predictor.explain(&request)?;

    Ok(success(explanation, "Diagnosis explanation generated"))
}
