//! Catch-all handlers

use std::any::Any;

use axum::response::{IntoResponse, Response};

use crate::AppError;

/// Unmatched routes
pub async fn not_found() -> AppError {
    AppError::NotFound
}

/// Handler panics become a JSON 500
pub fn panic_response(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = err.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "unknown panic".to_string()
    };

    AppError::Internal(detail).into_response()
}
