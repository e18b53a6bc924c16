//! Artifact store: loads the co-versioned model bundle from a directory.
//!
//! Every required artifact is loaded independently. A missing or broken
//! file leaves its slot empty and is logged; the store never aborts early
//! and never raises. Callers check [`ModelState::is_live`] before inferring.

use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::classifier::{Classifier, ProbabilityClassifier};
use crate::features::FeatureSchema;
use crate::preprocessing::{LabelEncoder, StandardScaler};
use crate::{ModelError, Result};

pub const MODEL_FILE: &str = "diagnosis_model.json";
pub const SCALER_FILE: &str = "diagnosis_scaler.json";
pub const ENCODER_FILE: &str = "diagnosis_encoder.json";
pub const FEATURES_FILE: &str = "diagnosis_features.json";
pub const METADATA_FILE: &str = "diagnosis_metadata.json";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArtifactKind {
    Classifier,
    Scaler,
    Encoder,
    Features,
    Metadata,
}

impl ArtifactKind {
    pub const REQUIRED: [ArtifactKind; 4] = [
        ArtifactKind::Classifier,
        ArtifactKind::Scaler,
        ArtifactKind::Encoder,
        ArtifactKind::Features,
    ];

    pub fn file_name(&self) -> &'static str {
        match self {
            ArtifactKind::Classifier => MODEL_FILE,
            ArtifactKind::Scaler => SCALER_FILE,
            ArtifactKind::Encoder => ENCODER_FILE,
            ArtifactKind::Features => FEATURES_FILE,
            ArtifactKind::Metadata => METADATA_FILE,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ArtifactKind::Classifier => "classifier",
            ArtifactKind::Scaler => "scaler",
            ArtifactKind::Encoder => "encoder",
            ArtifactKind::Features => "features",
            ArtifactKind::Metadata => "metadata",
        }
    }
}

impl std::fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Optional sidecar written next to the bundle by the training job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelMetadata {
    pub trained_date: Option<String>,
    pub feature_count: Option<usize>,
    pub class_count: Option<usize>,
    #[serde(default)]
    pub classes: Vec<String>,
}

/// Loaded bundle. Immutable once built; usable only when all four
/// required slots are filled.
#[derive(Debug, Clone, Default)]
pub struct ModelState {
    classifier: Option<Classifier>,
    scaler: Option<StandardScaler>,
    encoder: Option<LabelEncoder>,
    features: Option<FeatureSchema>,
    metadata: Option<ModelMetadata>,
    failures: Vec<(ArtifactKind, String)>,
}

impl ModelState {
    /// State with nothing loaded.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Assemble a state from in-memory parts.
    pub fn from_parts(
        classifier: Option<Classifier>,
        scaler: Option<StandardScaler>,
        encoder: Option<LabelEncoder>,
        features: Option<FeatureSchema>,
        metadata: Option<ModelMetadata>,
    ) -> Self {
        Self { classifier, scaler, encoder, features, metadata, failures: Vec::new() }
    }

    pub fn is_live(&self) -> bool {
        self.classifier.is_some()
            && self.scaler.is_some()
            && self.encoder.is_some()
            && self.features.is_some()
    }

    pub fn classifier(&self) -> Option<&Classifier> {
        self.classifier.as_ref()
    }

    pub fn scaler(&self) -> Option<&StandardScaler> {
        self.scaler.as_ref()
    }

    pub fn encoder(&self) -> Option<&LabelEncoder> {
        self.encoder.as_ref()
    }

    pub fn features(&self) -> Option<&FeatureSchema> {
        self.features.as_ref()
    }

    pub fn metadata(&self) -> Option<&ModelMetadata> {
        self.metadata.as_ref()
    }

    /// Artifacts that failed to load, with the reason.
    pub fn failures(&self) -> &[(ArtifactKind, String)] {
        &self.failures
    }

    /// Required artifacts that are absent.
    pub fn missing(&self) -> Vec<ArtifactKind> {
        ArtifactKind::REQUIRED
            .into_iter()
            .filter(|kind| match kind {
                ArtifactKind::Classifier => self.classifier.is_none(),
                ArtifactKind::Scaler => self.scaler.is_none(),
                ArtifactKind::Encoder => self.encoder.is_none(),
                ArtifactKind::Features => self.features.is_none(),
                ArtifactKind::Metadata => false,
            })
            .collect()
    }

    /// Check that the four required artifacts agree on dimensions.
    /// Readiness does not depend on this; inference raises the same
    /// mismatch when it actually happens.
    pub fn check_consistency(&self) -> Result<()> {
        let (Some(classifier), Some(scaler), Some(encoder), Some(features)) =
            (&self.classifier, &self.scaler, &self.encoder, &self.features)
        else {
            return Err(ModelError::ModelUnavailable);
        };

        let checks = [
            ("scaler", features.len(), scaler.n_features()),
            ("classifier", features.len(), classifier.n_features()),
            ("encoder", classifier.n_classes(), encoder.len()),
        ];
        for (component, expected, actual) in checks {
            if expected != actual {
                return Err(ModelError::SchemaMismatch { component, expected, actual });
            }
        }
        Ok(())
    }
}

/// Reads a model bundle from a fixed directory layout.
#[derive(Debug, Clone)]
pub struct ArtifactStore {
    dir: PathBuf,
}

impl ArtifactStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, kind: ArtifactKind) -> PathBuf {
        self.dir.join(kind.file_name())
    }

    /// Load every artifact, recording per-slot failures instead of raising.
    pub fn load(&self) -> ModelState {
        info!("Loading diagnosis model from {}", self.dir.display());
        let mut failures = Vec::new();

        let classifier = self.load_slot(ArtifactKind::Classifier, &mut failures, |c: &Classifier| c.validate());
        let scaler = self.load_slot(ArtifactKind::Scaler, &mut failures, StandardScaler::validate);
        let encoder = self.load_slot(ArtifactKind::Encoder, &mut failures, LabelEncoder::validate);
        let features = self.load_slot(ArtifactKind::Features, &mut failures, FeatureSchema::validate);

        let metadata_path = self.path_for(ArtifactKind::Metadata);
        let metadata = if metadata_path.exists() {
            match read_json::<ModelMetadata>(ArtifactKind::Metadata, &metadata_path) {
                Ok(m) => Some(m),
                Err(e) => {
                    warn!("Ignoring unreadable model metadata: {}", e);
                    None
                }
            }
        } else {
            None
        };

        let state = ModelState { classifier, scaler, encoder, features, metadata, failures };

        info!(
            classifier = state.classifier.is_some(),
            scaler = state.scaler.is_some(),
            encoder = state.encoder.is_some(),
            features = state.features.is_some(),
            metadata = state.metadata.is_some(),
            "Model artifact load finished"
        );

        if state.is_live() {
            info!(
                "Diagnosis model loaded successfully ({}, {} features, {} classes)",
                state.classifier.as_ref().map(Classifier::kind).unwrap_or("unknown"),
                state.features.as_ref().map(FeatureSchema::len).unwrap_or(0),
                state.encoder.as_ref().map(LabelEncoder::len).unwrap_or(0),
            );
            if let Err(e) = state.check_consistency() {
                warn!("Model bundle is not co-versioned: {}", e);
            }
        } else {
            warn!("Some model components failed to load: {:?}", state.missing());
        }

        state
    }

    fn load_slot<T, V>(
        &self,
        kind: ArtifactKind,
        failures: &mut Vec<(ArtifactKind, String)>,
        validate: V,
    ) -> Option<T>
    where
        T: DeserializeOwned,
        V: Fn(&T) -> Result<()>,
    {
        let path = self.path_for(kind);
        let loaded = read_json::<T>(kind, &path).and_then(|value| {
            validate(&value)?;
            Ok(value)
        });

        match loaded {
            Ok(value) => {
                info!("Model artifact loaded from {}", path.display());
                Some(value)
            }
            Err(e) => {
                warn!("{}", e);
                failures.push((kind, e.to_string()));
                None
            }
        }
    }
}

fn read_json<T: DeserializeOwned>(kind: ArtifactKind, path: &Path) -> Result<T> {
    if !path.exists() {
        return Err(ModelError::ArtifactMissing {
            artifact: kind,
            path: path.display().to_string(),
        });
    }
    let content = std::fs::read_to_string(path).map_err(|e| ModelError::ArtifactInvalid {
        artifact: kind,
        reason: e.to_string(),
    })?;
    serde_json::from_str(&content).map_err(|e| ModelError::ArtifactInvalid {
        artifact: kind,
        reason: e.to_string(),
    })
}
