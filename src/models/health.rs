//! Health model

use chrono::{DateTime, Utc};
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct HealthStatus {
    pub status: &'static str,
    pub model_status: &'static str,
    pub version: &'static str,
    pub timestamp: DateTime<Utc>,
}
