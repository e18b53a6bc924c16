//! HTTP handlers for all API routes.

pub mod diagnosis;
pub mod feedback;
pub mod model;
pub mod system;
