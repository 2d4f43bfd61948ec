//! Model metadata model

use serde::Serialize;

/// Body of GET /model-info. Optional fields appear only when the
/// classifier exposes them.
#[derive(Debug, Clone, Serialize)]
pub struct ModelInfo {
    pub model_type: String,
    pub model_source: &'static str,
    pub feature_columns: Vec<&'static str>,
    pub n_features: usize,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub classes: Option<Vec<i64>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub n_estimators: Option<usize>,

    #[serde(
        skip_serializing_if = "Option::is_none",
        serialize_with = "super::ordered_pairs"
    )]
    pub feature_importance: Option<Vec<(String, f64)>>,
}
