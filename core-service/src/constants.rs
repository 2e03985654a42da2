//! Central Configuration Constants
//!
//! Single source of truth for all configuration defaults.
//! The tensor names are fixed by the exported model, not free configuration.

/// Default model artifact path
pub const DEFAULT_MODEL_PATH: &str = "model/best_model.onnx";

/// Input tensor name exported by the trained model
pub const DEFAULT_INPUT_NAME: &str = "float_input";

/// Output tensor name exported by the trained model
pub const DEFAULT_OUTPUT_NAME: &str = "variable";

/// Name given to the ONNX Runtime environment
pub const RUNTIME_ENV_NAME: &str = "carprice";

/// App version
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// App name
pub const APP_NAME: &str = "Car Price Prediction";

// ============================================
// Environment variable names
// ============================================

pub const ENV_MODEL_PATH: &str = "CARPRICE_MODEL_PATH";
pub const ENV_RUNTIME_PATH: &str = "CARPRICE_RUNTIME_PATH";
pub const ENV_INPUT_NAME: &str = "CARPRICE_INPUT_NAME";
pub const ENV_OUTPUT_NAME: &str = "CARPRICE_OUTPUT_NAME";
pub const ENV_SESSION_MODE: &str = "CARPRICE_SESSION_MODE";
pub const ENV_MODEL_SHA256: &str = "CARPRICE_MODEL_SHA256";
pub const ENV_MODEL_LAYOUT_HASH: &str = "CARPRICE_MODEL_LAYOUT_HASH";

// ============================================
// Helper functions to read from env with fallback
// ============================================

/// Get model path from environment or use default
pub fn get_model_path() -> String {
    std::env::var(ENV_MODEL_PATH).unwrap_or_else(|_| DEFAULT_MODEL_PATH.to_string())
}

/// Get input tensor name from environment or use default
pub fn get_input_name() -> String {
    std::env::var(ENV_INPUT_NAME).unwrap_or_else(|_| DEFAULT_INPUT_NAME.to_string())
}

/// Get output tensor name from environment or use default
pub fn get_output_name() -> String {
    std::env::var(ENV_OUTPUT_NAME).unwrap_or_else(|_| DEFAULT_OUTPUT_NAME.to_string())
}

/// Get an optional, non-empty value from environment
pub fn get_optional(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|s| !s.trim().is_empty())
}
