//! Score Classifier - Prediction Server
//!
//! Serves a pre-trained classifier over HTTP: twenty scores in, a
//! "safe"/"warning" label and class probabilities out.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    PREDICTION SERVER                        │
//! ├─────────────────────────────────────────────────────────────┤
//! │  ┌───────────┐  ┌──────────────┐  ┌──────────────────────┐ │
//! │  │  Router   │─▶│  Prediction  │─▶│  LoadedModel         │ │
//! │  │  (Axum)   │  │  Service     │  │  (RandomForest)      │ │
//! │  └───────────┘  └──────────────┘  └──────────┬───────────┘ │
//! │                                              ▼             │
//! │                            model.json / synthetic fallback │
//! └─────────────────────────────────────────────────────────────┘
//! ```

pub mod config;
pub mod error;
pub mod features;
pub mod handlers;
pub mod model;
pub mod models;
pub mod service;

use std::sync::Arc;

use axum::{routing::get, Router};
use tower_http::{
    catch_panic::CatchPanicLayer,
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

pub use error::{AppError, AppResult};
use service::PredictionService;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<PredictionService>,
    pub config: config::Config,
}

impl AppState {
    pub fn new(service: PredictionService, config: config::Config) -> Self {
        Self {
            service: Arc::new(service),
            config,
        }
    }
}

/// Create the main router with all routes
pub fn create_router(state: AppState) -> Router {
    // API routes
    let api_routes = Router::new()
        .route("/predict", get(handlers::predict::usage).post(handlers::predict::predict))
        .route("/health", get(handlers::health::check))
        .route("/model-info", get(handlers::model_info::describe));

    // Static assets
    let asset_routes = Router::new()
        .route("/", get(handlers::assets::index))
        .route("/style.css", get(handlers::assets::stylesheet))
        .route("/script.js", get(handlers::assets::script));

    Router::new()
        .merge(api_routes)
        .merge(asset_routes)
        .fallback(handlers::fallback::not_found)
        .layer(CatchPanicLayer::custom(handlers::fallback::panic_response))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any)
        )
        .with_state(state)
}
