//! Health check handler

use axum::{extract::State, Json};
use serde::Serialize;

use carprice_core::logic::features::layout::{layout_hash, FEATURE_VERSION};
use carprice_core::logic::model::EngineStatus;

use crate::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    status: &'static str,
    version: &'static str,
    timestamp: i64,
    layout_version: u8,
    layout_hash: String,
    engine: EngineStatus,
}

pub async fn check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
        timestamp: chrono::Utc::now().timestamp(),
        layout_version: FEATURE_VERSION,
        layout_hash: format!("{:08x}", layout_hash()),
        engine: state.service.status(),
    })
}
