//! Configuration loading for DiagHer.
//! Reads diagher.toml from the current directory or the path in DIAGHER_CONFIG.
//! DIAGHER_BIND and DIAGHER_MODEL_DIR override the file.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::error::{DiagherError, Result};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DiagherConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub model: ModelConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub confidence: ConfidenceBands,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
}

fn default_bind() -> String { "0.0.0.0:5000".to_string() }

impl Default for ServerConfig {
    fn default() -> Self {
        Self { bind: default_bind() }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    /// Directory holding the diagnosis_* artifact bundle.
    #[serde(default = "default_model_dir")]
    pub dir: PathBuf,
    /// Load the bundle at startup instead of on the first request.
    #[serde(default)]
    pub preload: bool,
}

fn default_model_dir() -> PathBuf { PathBuf::from("ml/models") }

impl Default for ModelConfig {
    fn default() -> Self {
        Self { dir: default_model_dir(), preload: false }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// EnvFilter directive used when RUST_LOG is unset.
    #[serde(default = "default_log_filter")]
    pub filter: String,
}

fn default_log_filter() -> String { "diagher=debug,info".to_string() }

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { filter: default_log_filter() }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_api_title")]
    pub title: String,
    #[serde(default = "default_api_version")]
    pub version: String,
    #[serde(default = "default_api_description")]
    pub description: String,
}

fn default_api_title()       -> String { "DiagHer API".to_string() }
fn default_api_version()     -> String { "v1".to_string() }
fn default_api_description() -> String { "Healthcare AI API for gender-aware medical diagnosis".to_string() }

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            title: default_api_title(),
            version: default_api_version(),
            description: default_api_description(),
        }
    }
}

/// Probability bands for the High / Medium / Low labels.
/// These are presentation thresholds only; the inference floor is fixed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfidenceBands {
    #[serde(default = "default_high_band")]
    pub high: f64,
    #[serde(default = "default_medium_band")]
    pub medium: f64,
}

fn default_high_band()   -> f64 { 0.8 }
fn default_medium_band() -> f64 { 0.6 }

impl Default for ConfidenceBands {
    fn default() -> Self {
        Self { high: default_high_band(), medium: default_medium_band() }
    }
}


impl DiagherConfig {
    /// Load configuration from diagher.toml.
    /// Checks DIAGHER_CONFIG first, then the current directory.
    /// A missing file yields the defaults.
    pub fn load() -> Result<Self> {
        let path = std::env::var("DIAGHER_CONFIG")
            .unwrap_or_else(|_| "diagher.toml".to_string());

        let mut config = if Path::new(&path).exists() {
            let config = Self::from_file(&path)?;
            info!("Configuration loaded from {}", path);
            config
        } else {
            warn!("Config file not found: {}, using defaults", path);
            Self::default()
        };

        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Parse a config file without consulting the environment.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: DiagherConfig = toml::from_str(&content)?;
        Ok(config)
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(bind) = std::env::var("DIAGHER_BIND") {
            self.server.bind = bind;
        }
        if let Ok(dir) = std::env::var("DIAGHER_MODEL_DIR") {
            self.model.dir = PathBuf::from(dir);
        }
    }

    /// Reject band settings that would make the labels meaningless.
    pub fn validate(&self) -> Result<()> {
        let ConfidenceBands { high, medium } = self.confidence;
        if !(0.0..=1.0).contains(&high) || !(0.0..=1.0).contains(&medium) {
            return Err(DiagherError::Config(format!(
                "confidence bands must lie in [0, 1] (high={}, medium={})",
                high, medium
            )));
        }
        if medium > high {
            return Err(DiagherError::Config(format!(
                "confidence.medium ({}) must not exceed confidence.high ({})",
                medium, high
            )));
        }
        Ok(())
    }
}
