//! API error type and its mapping onto HTTP responses.

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use tracing::{error, warn};

use diagher_model::ModelError;

use crate::response::Envelope;

pub const PREDICTION_FAILED_MESSAGE: &str = "Unable to produce prediction";

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Caller error; the message is returned verbatim.
    #[error("{0}")]
    BadRequest(String),

    #[error("Not found")]
    NotFound,

    /// Any failure inside the inference pipeline. The detail is logged,
    /// never returned.
    #[error("Unable to produce prediction")]
    Prediction(#[from] ModelError),
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound => StatusCode::NOT_FOUND,
            ApiError::Prediction(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        match rejection {
            JsonRejection::MissingJsonContentType(_) => {
                ApiError::BadRequest("Content-Type must be application/json".to_string())
            }
            other => ApiError::BadRequest(format!("Invalid JSON body: {}", other.body_text())),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match &self {
            ApiError::Prediction(source) => error!("Diagnosis pipeline error: {}", source),
            ApiError::BadRequest(message) => warn!("Validation failed: {}", message),
            ApiError::NotFound => {}
        }
        (self.status_code(), Json(Envelope::error(self.to_string()))).into_response()
    }
}
