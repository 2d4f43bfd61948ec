//! Prediction handlers

use axum::{body::Bytes, extract::State, Json};

use crate::features;
use crate::models::{PredictionResult, PredictUsage};
use crate::{AppResult, AppState};

/// Describe the expected request
pub async fn usage() -> Json<PredictUsage> {
    Json(PredictUsage::default())
}

/// Validate the scores and run the classifier
pub async fn predict(State(state): State<AppState>, body: Bytes) -> AppResult<Json<PredictionResult>> {
    let payload = features::parse_payload(&body)?;
    let result = state.service.predict(&payload)?;
    Ok(Json(result))
}
