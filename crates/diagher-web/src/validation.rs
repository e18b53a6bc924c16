//! Request body validation. Turns raw JSON into a typed [`PatientRequest`]
//! or a caller-facing error message.

use std::collections::BTreeMap;

use serde_json::Value;

use diagher_model::{Gender, PatientRequest};

use crate::error::ApiError;

pub const MIN_AGE: f64 = 0.0;
pub const MAX_AGE: f64 = 150.0;

const PATIENT_FIELDS: [&str; 3] = ["age", "gender", "symptoms"];

/// Fail with "Missing required field: {field}" for the first absent field.
pub fn require_fields(body: &Value, fields: &[&str]) -> Result<(), ApiError> {
    for field in fields {
        if body.get(field).is_none() {
            return Err(ApiError::BadRequest(format!("Missing required field: {}", field)));
        }
    }
    Ok(())
}

pub fn validate_patient(body: &Value) -> Result<PatientRequest, ApiError> {
    require_fields(body, &PATIENT_FIELDS)?;

    let age = body["age"]
        .as_f64()
        .filter(|age| (MIN_AGE..=MAX_AGE).contains(age))
        .ok_or_else(|| ApiError::BadRequest("Age must be a number between 0 and 150".to_string()))?;

    let gender: Gender = body["gender"]
        .as_str()
        .and_then(|g| g.parse().ok())
        .ok_or_else(|| {
            ApiError::BadRequest("Gender must be 'Male', 'Female', or 'Other'".to_string())
        })?;

    let raw_symptoms = body["symptoms"]
        .as_object()
        .ok_or_else(|| ApiError::BadRequest("Symptoms must be a dictionary".to_string()))?;

    let mut symptoms = BTreeMap::new();
    for (name, value) in raw_symptoms {
        let value = value
            .as_f64()
            .ok_or_else(|| ApiError::BadRequest("Symptom values must be numeric".to_string()))?;
        symptoms.insert(name.clone(), value);
    }

    Ok(PatientRequest { age, gender, symptoms })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn message(result: Result<PatientRequest, ApiError>) -> String {
        match result {
            Err(ApiError::BadRequest(m)) => m,
            other => panic!("expected a bad request, got {:?}", other),
        }
    }

    #[test]
    fn test_valid_body() {
        let req = validate_patient(&json!({
            "age": 45,
            "gender": "Female",
            "symptoms": {"chest_pain": 1, "fatigue": 0.5}
        }))
        .unwrap();
        assert_eq!(req.age, 45.0);
        assert_eq!(req.gender, Gender::Female);
        assert_eq!(req.symptoms.len(), 2);
    }

    #[test]
    fn test_missing_fields_in_order() {
        assert_eq!(message(validate_patient(&json!({}))), "Missing required field: age");
        assert_eq!(
            message(validate_patient(&json!({"age": 30, "symptoms": {}}))),
            "Missing required field: gender"
        );
        assert_eq!(
            message(validate_patient(&json!({"age": 30, "gender": "Male"}))),
            "Missing required field: symptoms"
        );
    }

    #[test]
    fn test_age_bounds() {
        for age in [json!(-1), json!(151), json!("45"), json!(null)] {
            let body = json!({"age": age, "gender": "Male", "symptoms": {}});
            assert_eq!(message(validate_patient(&body)), "Age must be a number between 0 and 150");
        }
        for age in [0, 150] {
            let body = json!({"age": age, "gender": "Male", "symptoms": {}});
            assert!(validate_patient(&body).is_ok());
        }
    }

    #[test]
    fn test_gender_is_case_sensitive() {
        let body = json!({"age": 30, "gender": "female", "symptoms": {}});
        assert_eq!(
            message(validate_patient(&body)),
            "Gender must be 'Male', 'Female', or 'Other'"
        );
    }

    #[test]
    fn test_symptoms_shape() {
        let body = json!({"age": 30, "gender": "Other", "symptoms": ["chest_pain"]});
        assert_eq!(message(validate_patient(&body)), "Symptoms must be a dictionary");

        let body = json!({"age": 30, "gender": "Other", "symptoms": {"chest_pain": "yes"}});
        assert_eq!(message(validate_patient(&body)), "Symptom values must be numeric");
    }
}
