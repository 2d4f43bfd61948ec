//! Prediction models

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::features::{FeatureVector, FEATURE_COLUMNS};

/// Body of a successful POST /predict
#[derive(Debug, Clone, Serialize)]
pub struct PredictionResult {
    pub prediction: String,
    pub raw_prediction: i64,

    /// Label -> probability, in class order
    #[serde(
        skip_serializing_if = "Option::is_none",
        serialize_with = "super::ordered_pairs"
    )]
    pub confidence: Option<Vec<(String, f64)>>,

    pub timestamp: DateTime<Utc>,
    pub input_data: FeatureVector,
}

/// Body of GET /predict
#[derive(Debug, Clone, Serialize)]
pub struct PredictUsage {
    pub message: &'static str,
    pub method: &'static str,
    pub required_fields: Vec<&'static str>,
    pub example: FeatureVector,
}

impl Default for PredictUsage {
    fn default() -> Self {
        Self {
            message: "Prediction API endpoint",
            method: "POST",
            required_fields: FEATURE_COLUMNS.to_vec(),
            example: FeatureVector::uniform(8.0),
        }
    }
}
