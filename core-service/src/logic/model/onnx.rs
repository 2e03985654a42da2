//! ONNX Engine - ONNX Runtime implementation of `InferenceEngine`
//!
//! Input and output are addressed by the names the model exported.
//! In `PerCall` mode every call owns its session and tensors and drops them
//! on return, error paths included. `Reuse` keeps one session behind a mutex.

use std::path::PathBuf;

use ndarray::Array2;
use ort::session::{builder::GraphOptimizationLevel, Session};
use ort::value::Value;
use parking_lot::Mutex;

use super::inference::{InferenceEngine, InferenceError};
use super::runtime;
use crate::logic::config::{ConfigurationError, EngineConfig, SessionMode};

pub struct OnnxEngine {
    model_path: PathBuf,
    input_name: String,
    output_name: String,
    mode: SessionMode,
    cached: RebuildOnFailure<Session>,
}

impl OnnxEngine {
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            model_path: config.model_path.clone(),
            input_name: config.input_name.clone(),
            output_name: config.output_name.clone(),
            mode: config.session_mode,
            cached: RebuildOnFailure::new(),
        }
    }

    pub fn mode(&self) -> SessionMode {
        self.mode
    }

    /// Open the model once and check it exposes the configured tensor names.
    ///
    /// Run at startup so a wrong name fails the process instead of every
    /// request. In `Reuse` mode the checked session is kept for serving.
    pub fn verify_contract(&self) -> Result<(), ConfigurationError> {
        let session = self.build_session().map_err(|e| ConfigurationError::ModelLoad {
            path: self.model_path.clone(),
            reason: e.to_string(),
        })?;

        let inputs: Vec<String> = session.inputs.iter().map(|i| i.name.clone()).collect();
        let outputs: Vec<String> = session.outputs.iter().map(|o| o.name.clone()).collect();
        check_tensor_names(&self.input_name, &self.output_name, &inputs, &outputs)?;

        log::info!(
            "Model contract verified: input '{}', output '{}'",
            self.input_name,
            self.output_name
        );

        if self.mode == SessionMode::Reuse {
            self.cached.store(session);
        }
        Ok(())
    }

    /// Build a session for the configured model file
    fn build_session(&self) -> Result<Session, InferenceError> {
        Session::builder()
            .map_err(|e| InferenceError::SessionConstruction(format!("session builder: {}", e)))?
            .with_optimization_level(GraphOptimizationLevel::Level3)
            .map_err(|e| InferenceError::SessionConstruction(format!("optimization: {}", e)))?
            .commit_from_file(&self.model_path)
            .map_err(|e| InferenceError::SessionConstruction(format!("load model: {}", e)))
    }

    /// Run on a session and copy the named output out before it is released
    fn execute(&self, session: &mut Session, input: Value) -> Result<Vec<f32>, InferenceError> {
        let outputs = session
            .run(ort::inputs![self.input_name.as_str() => input])
            .map_err(|e| InferenceError::Execution(e.to_string()))?;

        let output = outputs
            .get(self.output_name.as_str())
            .ok_or_else(|| InferenceError::MissingOutput(self.output_name.clone()))?;

        let (_, data) = output
            .try_extract_tensor::<f32>()
            .map_err(|e| InferenceError::Execution(format!("extract output: {}", e)))?;

        Ok(data.to_vec())
    }
}

impl InferenceEngine for OnnxEngine {
    fn run(&self, input: Array2<f32>) -> Result<Vec<f32>, InferenceError> {
        if !runtime::is_initialized() {
            return Err(InferenceError::RuntimeNotInitialized);
        }

        let tensor = Value::from_array(input)
            .map_err(|e| InferenceError::TensorConstruction(e.to_string()))?
            .into_dyn();

        match self.mode {
            SessionMode::PerCall => {
                let mut session = self.build_session()?;
                self.execute(&mut session, tensor)
            }
            SessionMode::Reuse => self.cached.run(
                || {
                    log::info!("Building reusable session for {}", self.model_path.display());
                    self.build_session()
                },
                |session| self.execute(session, tensor),
            ),
        }
    }

    fn name(&self) -> &str {
        "onnxruntime"
    }
}

impl std::fmt::Debug for OnnxEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OnnxEngine")
            .field("model_path", &self.model_path)
            .field("input_name", &self.input_name)
            .field("output_name", &self.output_name)
            .field("mode", &self.mode)
            .field("session_cached", &self.cached.is_cached())
            .finish()
    }
}

/// Both configured names must appear among the tensors the model declares
pub fn check_tensor_names(
    input_name: &str,
    output_name: &str,
    inputs: &[String],
    outputs: &[String],
) -> Result<(), ConfigurationError> {
    if !inputs.iter().any(|name| name == input_name) {
        return Err(ConfigurationError::TensorNameMismatch {
            kind: "input",
            expected: input_name.to_string(),
            available: inputs.to_vec(),
        });
    }
    if !outputs.iter().any(|name| name == output_name) {
        return Err(ConfigurationError::TensorNameMismatch {
            kind: "output",
            expected: output_name.to_string(),
            available: outputs.to_vec(),
        });
    }
    Ok(())
}

// ============================================================================
// SESSION CACHE
// ============================================================================

/// Lazily built value that is discarded after a failed run and rebuilt on
/// the next one. Runs are serialized by the lock.
struct RebuildOnFailure<T> {
    slot: Mutex<Option<T>>,
}

impl<T> RebuildOnFailure<T> {
    fn new() -> Self {
        Self {
            slot: Mutex::new(None),
        }
    }

    fn is_cached(&self) -> bool {
        self.slot.lock().is_some()
    }

    fn store(&self, value: T) {
        *self.slot.lock() = Some(value);
    }

    fn run<R>(
        &self,
        build: impl FnOnce() -> Result<T, InferenceError>,
        use_value: impl FnOnce(&mut T) -> Result<R, InferenceError>,
    ) -> Result<R, InferenceError> {
        let mut guard = self.slot.lock();
        if guard.is_none() {
            *guard = Some(build()?);
        }

        let value = guard
            .as_mut()
            .ok_or_else(|| InferenceError::SessionConstruction("session cache empty".to_string()))?;

        let result = use_value(value);
        if result.is_err() {
            log::warn!("Dropping reusable session after failed run; it will be rebuilt");
            *guard = None;
        }
        result
    }
}
