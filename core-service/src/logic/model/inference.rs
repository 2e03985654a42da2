//! Inference Adapter - FeatureVector → scalar price
//!
//! Wraps the vector as a `[1, FEATURE_COUNT]` tensor, hands it to an
//! `InferenceEngine` and pulls the single value out of the `[1, 1]` output.
//! The engine is a trait so the adapter can run against ONNX Runtime in
//! production and a stub in tests.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

use ndarray::Array2;
use serde::{Deserialize, Serialize};

use crate::logic::features::{FeatureVector, FEATURE_COUNT};

// ============================================================================
// STATE
// ============================================================================

/// Latency stats
static LATENCY_SUM: AtomicU64 = AtomicU64::new(0);
static INFERENCE_COUNT: AtomicU64 = AtomicU64::new(0);
static FAILURE_COUNT: AtomicU64 = AtomicU64::new(0);

// ============================================================================
// ERROR HANDLING
// ============================================================================

/// Per-request inference failure. Never retried automatically.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InferenceError {
    #[error("failed to create input tensor: {0}")]
    TensorConstruction(String),

    #[error("failed to create session: {0}")]
    SessionConstruction(String),

    #[error("model inference error: {0}")]
    Execution(String),

    #[error("model output '{0}' not found")]
    MissingOutput(String),

    #[error("model produced no output")]
    EmptyOutput,

    #[error("ONNX Runtime is not initialized")]
    RuntimeNotInitialized,
}

// ============================================================================
// INFERENCE ENGINE TRAIT
// ============================================================================

/// Opaque model execution: input `[1, N]` in, flattened output values back.
pub trait InferenceEngine: Send + Sync {
    fn run(&self, input: Array2<f32>) -> Result<Vec<f32>, InferenceError>;

    /// Human readable engine name for status reporting
    fn name(&self) -> &str {
        "custom"
    }
}

// ============================================================================
// ADAPTER
// ============================================================================

/// Run one single-record inference and return the predicted scalar
pub fn infer(engine: &dyn InferenceEngine, vector: &FeatureVector) -> Result<f32, InferenceError> {
    let start_time = Instant::now();

    let result = to_input_tensor(vector)
        .and_then(|input| engine.run(input))
        .and_then(|output| extract_scalar(&output));

    let elapsed_us = start_time.elapsed().as_micros() as u64;
    LATENCY_SUM.fetch_add(elapsed_us, Ordering::Relaxed);
    INFERENCE_COUNT.fetch_add(1, Ordering::Relaxed);

    match &result {
        Ok(value) => log::debug!("Inference ok in {}us: {}", elapsed_us, value),
        Err(e) => {
            FAILURE_COUNT.fetch_add(1, Ordering::Relaxed);
            log::debug!("Inference failed in {}us: {}", elapsed_us, e);
        }
    }

    result
}

/// Shape the vector as a single-row batch
pub fn to_input_tensor(vector: &FeatureVector) -> Result<Array2<f32>, InferenceError> {
    Array2::from_shape_vec((1, FEATURE_COUNT), vector.as_slice().to_vec())
        .map_err(|e| InferenceError::TensorConstruction(e.to_string()))
}

/// The first (and only) output cell is the predicted price
pub fn extract_scalar(output: &[f32]) -> Result<f32, InferenceError> {
    output.first().copied().ok_or(InferenceError::EmptyOutput)
}

// ============================================================================
// STATUS
// ============================================================================

/// Inference stats for health reporting
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineStatus {
    pub engine: String,
    pub runtime_initialized: bool,
    pub avg_latency_ms: f32,
    pub inference_count: u64,
    pub failure_count: u64,
}

pub fn get_status(engine: &dyn InferenceEngine) -> EngineStatus {
    let sum = LATENCY_SUM.load(Ordering::Relaxed);
    let count = INFERENCE_COUNT.load(Ordering::Relaxed);
    let avg = if count > 0 { (sum as f32 / count as f32) / 1000.0 } else { 0.0 };

    EngineStatus {
        engine: engine.name().to_string(),
        runtime_initialized: super::runtime::is_initialized(),
        avg_latency_ms: avg,
        inference_count: count,
        failure_count: FAILURE_COUNT.load(Ordering::Relaxed),
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;

    /// Returns a canned output and records the input shape it saw
    struct StubEngine {
        output: Result<Vec<f32>, InferenceError>,
        seen_shape: Mutex<Option<Vec<usize>>>,
    }

    impl StubEngine {
        fn returning(output: Result<Vec<f32>, InferenceError>) -> Self {
            Self { output, seen_shape: Mutex::new(None) }
        }
    }

    impl InferenceEngine for StubEngine {
        fn run(&self, input: Array2<f32>) -> Result<Vec<f32>, InferenceError> {
            *self.seen_shape.lock() = Some(input.shape().to_vec());
            self.output.clone()
        }
    }

    #[test]
    fn test_infer_returns_single_cell() {
        let engine = StubEngine::returning(Ok(vec![15000.0]));
        let mut vector = FeatureVector::new();
        vector.set(19, 1.0);

        assert_eq!(infer(&engine, &vector), Ok(15000.0));
        assert_eq!(*engine.seen_shape.lock(), Some(vec![1, FEATURE_COUNT]));
    }

    #[test]
    fn test_infer_empty_output_is_error() {
        let engine = StubEngine::returning(Ok(vec![]));
        assert_eq!(
            infer(&engine, &FeatureVector::new()),
            Err(InferenceError::EmptyOutput)
        );
    }

    #[test]
    fn test_infer_propagates_engine_error() {
        let engine = StubEngine::returning(Err(InferenceError::Execution("boom".into())));
        let err = infer(&engine, &FeatureVector::new()).unwrap_err();
        assert_eq!(err, InferenceError::Execution("boom".into()));
        assert!(err.to_string().contains("boom"));
    }

    #[test]
    fn test_input_tensor_preserves_order() {
        let mut vector = FeatureVector::new();
        for i in 0..FEATURE_COUNT {
            vector.set(i, i as f32);
        }
        let tensor = to_input_tensor(&vector).unwrap();

        assert_eq!(tensor.shape(), &[1, FEATURE_COUNT]);
        assert_eq!(tensor[[0, 0]], 0.0);
        assert_eq!(tensor[[0, 63]], 63.0);
    }

    #[test]
    fn test_status_counts_calls() {
        let engine = StubEngine::returning(Ok(vec![1.0]));
        let before = get_status(&engine).inference_count;
        infer(&engine, &FeatureVector::new()).unwrap();

        let status = get_status(&engine);
        assert!(status.inference_count > before);
        assert_eq!(status.engine, "custom");
    }
}
