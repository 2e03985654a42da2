//! Prediction handler

use std::time::Duration;

use axum::{
    extract::{rejection::JsonRejection, State},
    http::HeaderValue,
    response::{IntoResponse, Response},
    Json,
};
use validator::Validate;

use carprice_core::CarAttributes;

use crate::models::PredictRequest;
use crate::{AppError, AppResult, AppState};

/// Lists categorical fields whose value matched no model feature
pub const UNMATCHED_FIELDS_HEADER: &str = "x-unmatched-fields";

/// Predict car price
///
/// `POST /predict` with a `PredictRequest` body, answers `{"predicted_price": f32}`.
pub async fn predict(
    State(state): State<AppState>,
    payload: Result<Json<PredictRequest>, JsonRejection>,
) -> AppResult<Response> {
    let Json(req) = payload
        .map_err(|e| AppError::ValidationError(format!("Invalid request: {}", e.body_text())))?;
    req.validate()
        .map_err(|e| AppError::ValidationError(format!("Invalid request: {}", e)))?;

    let input = CarAttributes::from(req);
    let service = state.service.clone();
    let timeout_ms = state.config.inference_timeout_ms;

    // Inference is synchronous native code; keep it off the async workers.
    let task = tokio::task::spawn_blocking(move || service.predict_detailed(&input));
    let joined = tokio::time::timeout(Duration::from_millis(timeout_ms), task)
        .await
        .map_err(|_| AppError::Timeout(timeout_ms))?;
    let (result, report) = joined
        .map_err(|e| AppError::InternalError(format!("inference task failed: {}", e)))??;

    tracing::debug!("Predicted price {:.2}", result.predicted_price);

    let mut response = Json(result).into_response();
    if !report.is_clean() {
        tracing::debug!("Unmatched categorical fields: {:?}", report.fields());
        if let Ok(value) = HeaderValue::from_str(&report.fields().join(",")) {
            response.headers_mut().insert(UNMATCHED_FIELDS_HEADER, value);
        }
    }

    Ok(response)
}
