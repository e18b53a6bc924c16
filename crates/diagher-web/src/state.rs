//! Shared application state for the web server.

use std::sync::Arc;

use diagher_common::DiagherConfig;
use diagher_model::DiagnosisService;

/// Shared state injected into every Axum handler.
#[derive(Debug, Clone)]
pub struct AppState {
    pub service: Arc<DiagnosisService>,
    pub config: DiagherConfig,
}

impl AppState {
    /// State with a lazily loaded predictor over `config.model.dir`.
    pub fn new(config: DiagherConfig) -> Self {
        let service = Arc::new(DiagnosisService::new(config.model.dir.clone()));
        Self { service, config }
    }

    pub fn with_service(service: Arc<DiagnosisService>, config: DiagherConfig) -> Self {
        Self { service, config }
    }
}

pub type SharedState = Arc<AppState>;
