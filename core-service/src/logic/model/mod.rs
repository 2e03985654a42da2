//! Model Module - Inference Invocation
//!
//! Split from the encoder so the engine can be swapped (ONNX Runtime in
//! production, stubs in tests).

pub mod artifact;
pub mod inference;
pub mod onnx;
pub mod runtime;

// Re-export common types
pub use inference::{infer, EngineStatus, InferenceEngine, InferenceError};
pub use onnx::OnnxEngine;
