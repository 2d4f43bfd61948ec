//! HTTP handlers

pub mod assets;
pub mod fallback;
pub mod health;
pub mod model_info;
pub mod predict;
