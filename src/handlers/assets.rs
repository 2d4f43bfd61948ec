//! Static asset handlers
//!
//! Files are read from `STATIC_DIR` on every request; a missing file is a
//! 404 with placeholder content of the same type.

use std::path::Path;

use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};

use crate::AppState;

const HTML: &str = "text/html; charset=utf-8";
const CSS: &str = "text/css; charset=utf-8";
const JS: &str = "application/javascript; charset=utf-8";

const INDEX_MISSING: &str = r#"<h1>Error: index.html not found</h1>
<p>Make sure index.html exists in the static directory.</p>
<p>Or use the API directly at <a href="/predict">/predict</a></p>
"#;

pub async fn index(State(state): State<AppState>) -> Response {
    serve(&state.config.static_dir, "index.html", HTML, INDEX_MISSING).await
}

pub async fn stylesheet(State(state): State<AppState>) -> Response {
    serve(&state.config.static_dir, "style.css", CSS, "/* CSS file not found */").await
}

pub async fn script(State(state): State<AppState>) -> Response {
    serve(&state.config.static_dir, "script.js", JS, "// JavaScript file not found").await
}

async fn serve(dir: &Path, name: &str, content_type: &'static str, placeholder: &'static str) -> Response {
    let path = dir.join(name);
    match tokio::fs::read(&path).await {
        Ok(bytes) => ([(header::CONTENT_TYPE, content_type)], bytes).into_response(),
        Err(e) => {
            tracing::warn!("Static asset {} unavailable: {}", path.display(), e);
            (
                StatusCode::NOT_FOUND,
                [(header::CONTENT_TYPE, content_type)],
                placeholder,
            )
                .into_response()
        }
    }
}
