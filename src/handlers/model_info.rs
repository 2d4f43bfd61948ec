//! Model metadata handler

use axum::{extract::State, Json};

use crate::models::ModelInfo;
use crate::{AppResult, AppState};

pub async fn describe(State(state): State<AppState>) -> AppResult<Json<ModelInfo>> {
    Ok(Json(state.service.describe()?))
}
