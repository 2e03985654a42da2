//! Car Price Prediction - Core
//!
//! Encodes a vehicle attribute record into the 64-slot feature vector the
//! trained price model expects and runs it through ONNX Runtime.
//!
//! ```text
//! CarAttributes ──encode──▶ FeatureVector [1, 64] ──infer──▶ f32 price
//!                   ▲                                 │
//!            FeatureRegistry                   InferenceEngine
//! ```

pub mod constants;
pub mod logic;

// Engine implementations outside this crate need the tensor type.
pub use ndarray;

pub use logic::config::{ConfigurationError, EngineConfig, SessionMode};
pub use logic::features::{encode, CarAttributes, FeatureVector, LayoutInfo, FEATURE_COUNT};
pub use logic::model::{InferenceEngine, InferenceError, OnnxEngine};
pub use logic::prediction::{PredictionError, PredictionResult, PredictionService};

/// Startup gate: registry invariants, configuration, runtime init and the
/// model's tensor contract. Returns the engine that was checked.
///
/// Any error is fatal; callers should exit instead of serving.
pub fn startup(config: &EngineConfig) -> Result<OnnxEngine, ConfigurationError> {
    logic::features::validate_registry()?;
    config.validate()?;

    let runtime = logic::model::runtime::init(config)?;
    log::info!(
        "ONNX Runtime '{}' ready since {} ({})",
        runtime.env_name,
        runtime.initialized_at.to_rfc3339(),
        runtime.library.as_deref().unwrap_or("linked")
    );

    let engine = OnnxEngine::new(config);
    engine.verify_contract()?;

    log::info!(
        "{} core ready: {} features (layout v{}, hash {:08x}), model {}, session mode {}",
        constants::APP_NAME,
        FEATURE_COUNT,
        logic::features::layout::FEATURE_VERSION,
        logic::features::layout::layout_hash(),
        config.model_path.display(),
        config.session_mode.as_str()
    );
    Ok(engine)
}

/// Counterpart of `startup`, called once at process exit
pub fn shutdown() {
    logic::model::runtime::shutdown();
}
