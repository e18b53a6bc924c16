//! Model introspection endpoints.

use axum::{
    extract::{Query, State},
    Json,
};
use serde::Deserialize;

use diagher_model::predictor::DEFAULT_IMPORTANCE_TOP_N;
use diagher_model::{FeatureImportance, ModelInfo};

use crate::error::ApiError;
use crate::response::{success, Envelope};
use crate::state::SharedState;

#[derive(Debug, Deserialize)]
pub struct FeaturesQuery {
    pub top_n: Option<usize>,
}

/// GET /api/v1/model/info: Status and bundle description
pub async fn model_info(
    State(state): State<SharedState>,
) -> Result<Json<Envelope<ModelInfo>>, ApiError> {
    let predictor = state.service.predictor().await?;
    Ok(success(predictor.model_info(), "Model information retrieved"))
}

/// GET /api/v1/model/features?top_n=N: Most important features
pub async fn feature_importance(
    State(state): State<SharedState>,
    Query(query): Query<FeaturesQuery>,
) -> Result<Json<Envelope<Vec<FeatureImportance>>>, ApiError> {
    let top_n = query.top_n.unwrap_or(DEFAULT_IMPORTANCE_TOP_N);
    let predictor = state.service.predictor().await?;
    Ok(success(predictor.feature_importance(top_n), "Feature importance retrieved"))
}
