//! diagher-common: Shared configuration, errors and confidence helpers
//! used across all DiagHer crates.

pub mod error;
pub mod confidence;
pub mod config;

// Re-export commonly used types
pub use config::{DiagherConfig, ServerConfig, ModelConfig, LoggingConfig, ApiConfig, ConfidenceBands};
pub use confidence::{ConfidenceLevel, to_percent};
