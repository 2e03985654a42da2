//! model-info - print the inputs and outputs a model artifact declares
//!
//! Usage: model-info [MODEL_PATH]
//! Falls back to CARPRICE_MODEL_PATH, then the default model path.

use anyhow::{anyhow, bail, Context, Result};
use ort::session::Session;

use carprice_core::logic::features::layout::{layout_hash, FEATURE_VERSION};
use carprice_core::logic::model::{onnx::check_tensor_names, runtime};
use carprice_core::{EngineConfig, FEATURE_COUNT};

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let mut config = EngineConfig::from_env();
    if let Some(path) = std::env::args().nth(1) {
        config = config.with_model_path(path);
    }

    if !config.model_path.is_file() {
        bail!("Model not found: {}", config.model_path.display());
    }

    runtime::init(&config).context("Error initializing onnxruntime library")?;

    let session = Session::builder()
        .map_err(|e| anyhow!("Error creating session builder: {}", e))?
        .commit_from_file(&config.model_path)
        .map_err(|e| anyhow!("Error loading {}: {}", config.model_path.display(), e))?;

    println!("{} inputs to {}:", session.inputs.len(), config.model_path.display());
    for (i, input) in session.inputs.iter().enumerate() {
        println!("  Index {}: {} {:?}", i, input.name, input.input_type);
    }

    println!("{} outputs from {}:", session.outputs.len(), config.model_path.display());
    for (i, output) in session.outputs.iter().enumerate() {
        println!("  Index {}: {} {:?}", i, output.name, output.output_type);
    }

    println!();
    println!(
        "Expected contract: input '{}' [1, {}], output '{}' [1, 1], layout v{}",
        config.input_name, FEATURE_COUNT, config.output_name, FEATURE_VERSION
    );
    println!("Record with the model: CARPRICE_MODEL_LAYOUT_HASH={:08x}", layout_hash());

    let inputs: Vec<String> = session.inputs.iter().map(|i| i.name.clone()).collect();
    let outputs: Vec<String> = session.outputs.iter().map(|o| o.name.clone()).collect();
    let contract = check_tensor_names(&config.input_name, &config.output_name, &inputs, &outputs);

    drop(session);
    runtime::shutdown();

    contract.context("Model does not match the configured contract")
}
