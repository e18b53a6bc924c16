//! Feedback intake. Feedback is logged, not stored.

use axum::{extract::rejection::JsonRejection, Json};
use serde::Serialize;
use serde_json::Value;
use tracing::info;
use uuid::Uuid;

use crate::error::ApiError;
use crate::response::{success, Envelope};
use crate::validation::require_fields;

#[derive(Debug, Serialize)]
pub struct FeedbackReceipt {
    pub feedback_id: String,
    pub status: &'static str,
    pub message: &'static str,
}

/// POST /api/v1/feedback: Accept a 1–5 score for a feedback type
pub async fn submit_feedback(
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Json<Envelope<FeedbackReceipt>>, ApiError> {
    let Json(body) = payload?;
    require_fields(&body, &["type", "feedback_score"])?;

    let score = body["feedback_score"]
        .as_f64()
        .filter(|s| (1.0..=5.0).contains(s))
        .ok_or_else(|| ApiError::BadRequest("Feedback score must be between 1 and 5".to_string()))?;

    let kind = match &body["type"] {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    };

    info!(feedback_type = %kind, score, "Feedback received: {}", body);

    Ok(success(
        FeedbackReceipt {
            feedback_id: format!("fb_{}_{}", kind, Uuid::new_v4().simple()),
            status: "received",
            message: "Thank you for your feedback. It will help improve our models.",
        },
        "Feedback submitted successfully",
    ))
}
