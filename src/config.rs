//! Configuration module

use std::env;
use std::path::PathBuf;

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Bind address
    pub host: String,

    /// Server port
    pub port: u16,

    /// Serialized model artifact read at startup
    pub model_path: PathBuf,

    /// Where the synthetic fallback model is written, if anywhere.
    /// The loader never reads from this path.
    pub synthetic_model_path: Option<PathBuf>,

    /// Train a synthetic model when the artifact is missing or unreadable
    pub fallback_enabled: bool,

    /// Directory holding index.html, style.css and script.js
    pub static_dir: PathBuf,

    /// Environment (development, production)
    pub environment: String,

    /// Emit logs as JSON lines instead of human-readable text
    pub log_json: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5000,
            model_path: PathBuf::from("model.json"),
            synthetic_model_path: None,
            fallback_enabled: true,
            static_dir: PathBuf::from("static"),
            environment: "development".to_string(),
            log_json: false,
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            host: env::var("HOST").unwrap_or(defaults.host),

            port: env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(defaults.port),

            model_path: env::var("MODEL_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.model_path),

            synthetic_model_path: env::var("SYNTHETIC_MODEL_PATH")
                .ok()
                .filter(|p| !p.trim().is_empty())
                .map(PathBuf::from),

            fallback_enabled: env::var("FALLBACK_MODEL")
                .ok()
                .and_then(|v| parse_flag(&v))
                .unwrap_or(defaults.fallback_enabled),

            static_dir: env::var("STATIC_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.static_dir),

            environment: env::var("ENVIRONMENT").unwrap_or(defaults.environment),

            log_json: env::var("LOG_FORMAT")
                .map(|f| f.eq_ignore_ascii_case("json"))
                .unwrap_or(defaults.log_json),
        }
    }

    /// Check if running in production
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
