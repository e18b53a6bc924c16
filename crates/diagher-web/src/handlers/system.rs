//! API descriptor, health check and fallback.

use axum::{extract::State, Json};
use serde::Serialize;
use serde_json::{json, Value};
use tracing::warn;

use crate::error::ApiError;
use crate::response::{success, Envelope};
use crate::state::SharedState;

#[derive(Debug, Serialize)]
pub struct ApiDescriptor {
    pub api_name: String,
    pub version: String,
    pub description: String,
    pub model_ready: bool,
    pub endpoints: Value,
}

/// GET /: API name, version and route map. Initialises the predictor so
/// `model_ready` reflects the bundle on disk.
pub async fn index(State(state): State<SharedState>) -> Json<Envelope<ApiDescriptor>> {
    let model_ready = match state.service.predictor().await {
        Ok(predictor) => predictor.is_ready(),
        Err(e) => {
            warn!("Diagnosis predictor failed to initialise: {}", e);
            false
        }
    };
    let api = &state.config.api;
    success(
        ApiDescriptor {
            api_name: api.title.clone(),
            version: api.version.clone(),
            description: api.description.clone(),
            model_ready,
            endpoints: json!({
                "diagnosis": "/api/v1/diagnosis",
                "explain": "/api/v1/diagnosis/explain",
                "model_info": "/api/v1/model/info",
                "model_features": "/api/v1/model/features",
                "feedback": "/api/v1/feedback",
                "health": "/api/health",
            }),
        },
        "Success",
    )
}

/// GET /api/health: Liveness; does not touch the model
pub async fn health() -> Json<Value> {
    Json(json!({ "status": "OK", "message": "DiagHer API running" }))
}

pub async fn not_found() -> ApiError {
    ApiError::NotFound
}
