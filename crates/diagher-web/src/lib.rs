//! diagher-web: JSON API over the diagnosis predictor.
//! Provides:
//!   - Diagnosis and explanation endpoints
//!   - Model info and feature importance views
//!   - Feedback intake
//!   - Health and API descriptor routes

pub mod error;
pub mod handlers;
pub mod response;
pub mod router;
pub mod state;
pub mod telemetry;
pub mod validation;
