//! Axum router: maps all URL paths to handlers.

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

use crate::handlers::{
    diagnosis::{diagnose, explain},
    feedback::submit_feedback,
    model::{feature_importance, model_info},
    system::{health, index, not_found},
};
use crate::state::{AppState, SharedState};

/// Build and return the full Axum router.
pub fn build_router(state: AppState) -> Router {
    let shared: SharedState = Arc::new(state);

    Router::new()
        .route("/",           get(index))
        .route("/api/health", get(health))

        // Inference
        .route("/api/v1/diagnosis",         post(diagnose))
        .route("/api/v1/diagnosis/explain", post(explain))

        // Introspection
        .route("/api/v1/model/info",     get(model_info))
        .route("/api/v1/model/features", get(feature_importance))

        .route("/api/v1/feedback", post(submit_feedback))

        .fallback(not_found)
        .layer(TraceLayer::new_for_http())
        .with_state(shared)
}
