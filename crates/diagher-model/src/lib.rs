//! Diagnosis inference pipeline.
//!
//! Loads a co-versioned artifact bundle (classifier, scaler, label encoder,
//! feature list), turns sparse patient requests into ordered feature
//! vectors and ranks candidate conditions by classifier probability.

pub mod artifacts;
pub mod classifier;
pub mod explain;
pub mod features;
pub mod predictor;
pub mod preprocessing;
pub mod service;

pub use artifacts::{ArtifactKind, ArtifactStore, ModelMetadata, ModelState};
pub use classifier::{Classifier, FeatureImportanceProvider, ProbabilityClassifier};
pub use explain::{DiagnosisExplanation, Explanation};
pub use features::{FeatureSchema, FeatureVector, Gender, PatientRequest};
pub use predictor::{
    FeatureImportance, ModelInfo, ModelStatus, Prediction, Predictor, MAX_PREDICTIONS,
    MIN_CONFIDENCE,
};
pub use preprocessing::{LabelEncoder, StandardScaler};
pub use service::DiagnosisService;

pub type Result<T> = std::result::Result<T, ModelError>;

#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    #[error("Artifact {artifact} not found at {path}")]
    ArtifactMissing { artifact: ArtifactKind, path: String },

    #[error("Artifact {artifact} is invalid: {reason}")]
    ArtifactInvalid { artifact: ArtifactKind, reason: String },

    #[error("Diagnosis model is not loaded")]
    ModelUnavailable,

    #[error("Feature pipeline is not ready: no schema loaded")]
    PipelineNotReady,

    #[error("Schema mismatch in {component}: expected {expected}, got {actual}")]
    SchemaMismatch {
        component: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("Inference failed: {0}")]
    Inference(String),

    #[error("Model load failed: {0}")]
    Load(String),
}
