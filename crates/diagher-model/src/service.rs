//! Once-initialised predictor handle injected into the request layer.
//!
//! ```rust,no_run
//! use diagher_model::{DiagnosisService, Gender, PatientRequest};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let service = DiagnosisService::new("ml/models");
//!     let predictor = service.predictor().await?;
//!
//!     let request = PatientRequest::new(45.0, Gender::Female).with_symptom("chest_pain", 1.0);
//!     for p in predictor.predict(&request)? {
//!         println!("{}: {:.2}%", p.condition, p.confidence_percent());
//!     }
//!     Ok(())
//! }
//! ```

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::sync::OnceCell;
use tracing::info;

use crate::{ModelError, Predictor, Result};

/// Loads the model bundle at most once, on first use or via [`preload`](Self::preload).
/// Concurrent first callers wait on the same load.
pub struct DiagnosisService {
    model_dir: PathBuf,
    predictor: OnceCell<Arc<Predictor>>,
}

impl std::fmt::Debug for DiagnosisService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DiagnosisService")
            .field("model_dir", &self.model_dir)
            .field("initialised", &self.predictor.initialized())
            .finish()
    }
}

impl DiagnosisService {
    /// Lazy service; nothing is read from disk until the first request.
    pub fn new(model_dir: impl Into<PathBuf>) -> Self {
        Self {
            model_dir: model_dir.into(),
            predictor: OnceCell::new(),
        }
    }

    /// Service around an already-built predictor.
    pub fn with_predictor(predictor: Predictor) -> Self {
        Self {
            model_dir: PathBuf::new(),
            predictor: OnceCell::new_with(Some(Arc::new(predictor))),
        }
    }

    pub fn model_dir(&self) -> &Path {
        &self.model_dir
    }

    /// The shared predictor, loading it on first call.
    pub async fn predictor(&self) -> Result<Arc<Predictor>> {
        let predictor = self
            .predictor
            .get_or_try_init(|| async {
                let dir = self.model_dir.clone();
                info!("Initialising diagnosis predictor from {}", dir.display());
                let predictor = tokio::task::spawn_blocking(move || Predictor::load(dir))
                    .await
                    .map_err(|e| ModelError::Load(e.to_string()))?;
                Ok::<_, ModelError>(Arc::new(predictor))
            })
            .await?;
        Ok(Arc::clone(predictor))
    }

    /// Force the load now, e.g. at process start.
    pub async fn preload(&self) -> Result<bool> {
        Ok(self.predictor().await?.is_ready())
    }

    /// Readiness without triggering a load.
    pub fn is_ready(&self) -> bool {
        self.predictor.get().map(|p| p.is_ready()).unwrap_or(false)
    }
}
