//! Logic Module - Encoding & Inference
//!
//! ## Architecture
//! - `features/` - Feature index registry and encoder
//! - `model/` - Inference adapter (ONNX Runtime, runtime lifecycle, artifact check)
//! - `prediction` - Encoder + adapter composed for the request layer

pub mod config;
pub mod features;
pub mod model;
pub mod prediction;
