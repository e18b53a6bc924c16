//! Response envelope shared by every route.

use axum::Json;
use chrono::{SecondsFormat, Utc};
use serde::Serialize;

#[derive(Debug, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Success,
    Error,
}

/// `{status, message, data, timestamp}`
#[derive(Debug, Serialize)]
pub struct Envelope<T> {
    pub status: Status,
    pub message: String,
    pub data: Option<T>,
    pub timestamp: String,
}

impl<T: Serialize> Envelope<T> {
    pub fn success(data: T, message: impl Into<String>) -> Self {
        Self {
            status: Status::Success,
            message: message.into(),
            data: Some(data),
            timestamp: timestamp(),
        }
    }
}

impl Envelope<()> {
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            status: Status::Error,
            message: message.into(),
            data: None,
            timestamp: timestamp(),
        }
    }
}

pub fn success<T: Serialize>(data: T, message: &str) -> Json<Envelope<T>> {
    Json(Envelope::success(data, message))
}

fn timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true)
}
