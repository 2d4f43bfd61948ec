//! Prediction server binary
//!
//! Loads the model (or trains the synthetic fallback), then serves the API.

use std::net::SocketAddr;

use anyhow::Context;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use prediction_server::{
    config::Config,
    create_router,
    model::{self, ModelSource},
    service::PredictionService,
    AppState,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration
    dotenvy::dotenv().ok();
    let config = Config::from_env();

    // Initialize logging
    let json_layer = config.log_json.then(|| tracing_subscriber::fmt::layer().json());
    let text_layer = (!config.log_json).then(|| tracing_subscriber::fmt::layer());
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| "prediction_server=debug,tower_http=debug".into()))
        .with(json_layer)
        .with(text_layer)
        .init();

    tracing::info!("Prediction server {} starting...", env!("CARGO_PKG_VERSION"));
    tracing::info!("Model artifact: {}", config.model_path.display());

    // Training the fallback is CPU-bound
    let startup_config = config.clone();
    let loaded = tokio::task::spawn_blocking(move || model::load_or_synthesize(&startup_config))
        .await
        .context("model startup task failed")?;

    match loaded.as_ref().map(|m| m.source()) {
        Some(ModelSource::Artifact(path)) => tracing::info!("🤖 Model status: loaded from {}", path.display()),
        Some(ModelSource::Synthetic) if config.is_production() => {
            tracing::warn!("🤖 Model status: serving a SYNTHETIC model in production")
        }
        Some(ModelSource::Synthetic) => tracing::info!("🤖 Model status: synthetic (testing only)"),
        None => tracing::warn!("🤖 Model status: not loaded"),
    }

    let state = AppState::new(PredictionService::new(loaded), config.clone());
    let app = create_router(state);

    // Start server
    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .with_context(|| format!("invalid bind address {}:{}", config.host, config.port))?;
    tracing::info!("🚀 Server listening on http://{}", addr);
    tracing::info!("🔗 API endpoint: http://{}/predict", addr);
    tracing::info!("💊 Health check: http://{}/health", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    axum::serve(listener, app).await.context("server error")?;

    Ok(())
}
