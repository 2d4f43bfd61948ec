//! Health check handler

use axum::{extract::State, Json};

use crate::models::HealthStatus;
use crate::AppState;

pub async fn check(State(state): State<AppState>) -> Json<HealthStatus> {
    Json(state.service.health())
}
