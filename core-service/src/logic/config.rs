//! Engine Configuration
//!
//! Model artifact location, tensor names and session posture. Loaded from
//! the environment; `validate()` is the startup gate and any error it
//! returns is fatal.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::constants;
use crate::logic::features::layout::{self, LayoutMismatchError};
use crate::logic::model::artifact;

// ============================================================================
// ERRORS
// ============================================================================

/// Startup-time configuration failure. The process must not serve.
#[derive(Debug, thiserror::Error)]
pub enum ConfigurationError {
    #[error("Feature registry declares {declared} keys, model expects {expected}")]
    RegistrySize { declared: usize, expected: usize },

    #[error("Feature key registered more than once: {0}")]
    DuplicateFeature(String),

    #[error("Feature key is not lowercase: {0}")]
    NonLowercaseFeature(String),

    #[error("Model not found: {}", .0.display())]
    ModelNotFound(PathBuf),

    #[error("ONNX Runtime library not found: {}", .0.display())]
    RuntimeNotFound(PathBuf),

    #[error("Model checksum mismatch: expected {expected}, got {actual}")]
    ChecksumMismatch { expected: String, actual: String },

    #[error("Invalid configuration value for {key}: {value}")]
    InvalidValue { key: &'static str, value: String },

    #[error("Failed to initialize ONNX Runtime: {0}")]
    Runtime(String),

    #[error("Failed to load model {}: {reason}", .path.display())]
    ModelLoad { path: PathBuf, reason: String },

    #[error("Model has no {kind} tensor named {expected:?} (available: {available:?})")]
    TensorNameMismatch {
        kind: &'static str,
        expected: String,
        available: Vec<String>,
    },

    #[error(transparent)]
    LayoutMismatch(#[from] LayoutMismatchError),

    #[error("I/O error reading {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

// ============================================================================
// SESSION MODE
// ============================================================================

/// How inference sessions are acquired
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionMode {
    /// Fresh session per call, dropped when the call returns
    #[default]
    PerCall,
    /// One lazily built session, runs serialized behind a mutex
    Reuse,
}

impl SessionMode {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "per_call" | "percall" | "per-call" => Some(SessionMode::PerCall),
            "reuse" | "pooled" => Some(SessionMode::Reuse),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SessionMode::PerCall => "per_call",
            SessionMode::Reuse => "reuse",
        }
    }
}

// ============================================================================
// ENGINE CONFIG
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// ONNX model artifact
    pub model_path: PathBuf,
    /// Shared ONNX Runtime library (only used with the `load-dynamic` feature)
    pub runtime_path: Option<PathBuf>,
    /// Input tensor name, `[1, FEATURE_COUNT]` f32
    pub input_name: String,
    /// Output tensor name, `[1, 1]` f32
    pub output_name: String,
    pub session_mode: SessionMode,
    /// Expected SHA-256 of the model file, hex encoded
    pub model_sha256: Option<String>,
    /// Feature layout hash recorded when the model was trained, hex encoded
    pub model_layout_hash: Option<String>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            model_path: PathBuf::from(constants::DEFAULT_MODEL_PATH),
            runtime_path: None,
            input_name: constants::DEFAULT_INPUT_NAME.to_string(),
            output_name: constants::DEFAULT_OUTPUT_NAME.to_string(),
            session_mode: SessionMode::default(),
            model_sha256: None,
            model_layout_hash: None,
        }
    }
}

impl EngineConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        let session_mode = match constants::get_optional(constants::ENV_SESSION_MODE) {
            Some(raw) => SessionMode::parse(&raw).unwrap_or_else(|| {
                log::warn!(
                    "Unknown {}={:?}, falling back to per_call",
                    constants::ENV_SESSION_MODE,
                    raw
                );
                SessionMode::PerCall
            }),
            None => SessionMode::default(),
        };

        Self {
            model_path: PathBuf::from(constants::get_model_path()),
            runtime_path: constants::get_optional(constants::ENV_RUNTIME_PATH).map(PathBuf::from),
            input_name: constants::get_input_name(),
            output_name: constants::get_output_name(),
            session_mode,
            model_sha256: constants::get_optional(constants::ENV_MODEL_SHA256),
            model_layout_hash: constants::get_optional(constants::ENV_MODEL_LAYOUT_HASH),
        }
    }

    pub fn with_model_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.model_path = path.into();
        self
    }

    pub fn with_session_mode(mut self, mode: SessionMode) -> Self {
        self.session_mode = mode;
        self
    }

    pub fn with_model_sha256(mut self, digest: impl Into<String>) -> Self {
        self.model_sha256 = Some(digest.into());
        self
    }

    pub fn with_model_layout_hash(mut self, hash: impl Into<String>) -> Self {
        self.model_layout_hash = Some(hash.into());
        self
    }

    /// Check everything that can be checked without opening the model.
    /// Tensor names are checked against the model itself in `startup()`.
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        if self.input_name.trim().is_empty() {
            return Err(ConfigurationError::InvalidValue {
                key: constants::ENV_INPUT_NAME,
                value: self.input_name.clone(),
            });
        }
        if self.output_name.trim().is_empty() {
            return Err(ConfigurationError::InvalidValue {
                key: constants::ENV_OUTPUT_NAME,
                value: self.output_name.clone(),
            });
        }

        if !self.model_path.is_file() {
            return Err(ConfigurationError::ModelNotFound(self.model_path.clone()));
        }

        if let Some(runtime) = &self.runtime_path {
            if !runtime.is_file() {
                return Err(ConfigurationError::RuntimeNotFound(runtime.clone()));
            }
        }

        if let Some(expected) = &self.model_sha256 {
            artifact::verify_checksum(&self.model_path, expected)?;
        }

        if let Some(raw) = &self.model_layout_hash {
            let expected =
                layout::parse_layout_hash(raw).ok_or_else(|| ConfigurationError::InvalidValue {
                    key: constants::ENV_MODEL_LAYOUT_HASH,
                    value: raw.clone(),
                })?;
            layout::check_layout_hash(expected)?;
        }

        Ok(())
    }
}
