//! ONNX Runtime lifecycle
//!
//! The native runtime is process-wide: it is set up exactly once before the
//! first session and torn down exactly once at exit. `OnceCell` makes a
//! racing first use safe; after `shutdown()` new inference calls fail with
//! `RuntimeNotInitialized` instead of touching a dead environment.

use std::sync::atomic::{AtomicBool, Ordering};

use chrono::{DateTime, Utc};
use once_cell::sync::OnceCell;
use serde::Serialize;

use crate::constants::RUNTIME_ENV_NAME;
use crate::logic::config::{ConfigurationError, EngineConfig};

#[derive(Debug, Clone, Serialize)]
pub struct RuntimeInfo {
    pub env_name: String,
    pub library: Option<String>,
    pub initialized_at: DateTime<Utc>,
}

/// Init-once / shutdown-once guard
#[derive(Debug)]
pub struct RuntimeLifecycle {
    info: OnceCell<RuntimeInfo>,
    shut_down: AtomicBool,
}

impl RuntimeLifecycle {
    pub const fn new() -> Self {
        Self {
            info: OnceCell::new(),
            shut_down: AtomicBool::new(false),
        }
    }

    /// Run `setup` at most once; later callers get the first result's info
    pub fn init_with<F>(&self, setup: F) -> Result<&RuntimeInfo, ConfigurationError>
    where
        F: FnOnce() -> Result<RuntimeInfo, ConfigurationError>,
    {
        if self.shut_down.load(Ordering::Acquire) {
            return Err(ConfigurationError::Runtime("runtime already shut down".to_string()));
        }
        self.info.get_or_try_init(setup)
    }

    pub fn is_initialized(&self) -> bool {
        self.info.get().is_some() && !self.shut_down.load(Ordering::Acquire)
    }

    /// Returns true only for the call that actually performed the teardown
    pub fn shutdown(&self) -> bool {
        if self.info.get().is_none() {
            return false;
        }
        !self.shut_down.swap(true, Ordering::AcqRel)
    }

}

impl Default for RuntimeLifecycle {
    fn default() -> Self {
        Self::new()
    }
}

static RUNTIME: RuntimeLifecycle = RuntimeLifecycle::new();

/// Initialize the process-wide ONNX Runtime environment
pub fn init(config: &EngineConfig) -> Result<&'static RuntimeInfo, ConfigurationError> {
    RUNTIME.init_with(|| commit_environment(config))
}

pub fn is_initialized() -> bool {
    RUNTIME.is_initialized()
}

/// Mark the runtime as shut down at process exit. ort keeps its global
/// environment alive until the process ends; this only stops new inference
/// calls from building sessions.
pub fn shutdown() {
    if RUNTIME.shutdown() {
        log::info!("ONNX Runtime shut down");
    }
}

#[cfg(feature = "load-dynamic")]
fn commit_environment(config: &EngineConfig) -> Result<RuntimeInfo, ConfigurationError> {
    let library = config
        .runtime_path
        .as_ref()
        .ok_or_else(|| ConfigurationError::InvalidValue {
            key: crate::constants::ENV_RUNTIME_PATH,
            value: String::new(),
        })?;
    if !library.is_file() {
        return Err(ConfigurationError::RuntimeNotFound(library.clone()));
    }

    check_loadable(library)?;

    log::info!("Loading ONNX Runtime from: {}", library.display());
    ort::init_from(library.to_string_lossy().to_string())
        .with_name(RUNTIME_ENV_NAME)
        .commit()
        .map_err(|e| ConfigurationError::Runtime(e.to_string()))?;

    Ok(RuntimeInfo {
        env_name: RUNTIME_ENV_NAME.to_string(),
        library: Some(library.display().to_string()),
        initialized_at: Utc::now(),
    })
}

/// ort panics when the dynamic library cannot be loaded; open it here first
/// so a bad path is reported as a configuration error.
#[cfg(feature = "load-dynamic")]
fn check_loadable(library: &std::path::Path) -> Result<(), ConfigurationError> {
    let unloadable = |reason: String| {
        ConfigurationError::Runtime(format!("cannot load {}: {}", library.display(), reason))
    };

    // SAFETY: the library is the ONNX Runtime build the operator configured;
    // it is only opened and probed for its entry point, nothing is called.
    let lib = unsafe { libloading::Library::new(library) }.map_err(|e| unloadable(e.to_string()))?;
    unsafe { lib.get::<unsafe extern "C" fn()>(b"OrtGetApiBase\0") }
        .map_err(|e| unloadable(e.to_string()))?;
    Ok(())
}

#[cfg(not(feature = "load-dynamic"))]
fn commit_environment(config: &EngineConfig) -> Result<RuntimeInfo, ConfigurationError> {
    if let Some(library) = &config.runtime_path {
        log::warn!(
            "Ignoring runtime path {} (built without load-dynamic)",
            library.display()
        );
    }

    ort::init()
        .with_name(RUNTIME_ENV_NAME)
        .commit()
        .map_err(|e| ConfigurationError::Runtime(e.to_string()))?;
    log::info!("ONNX Runtime environment committed ({})", RUNTIME_ENV_NAME);

    Ok(RuntimeInfo {
        env_name: RUNTIME_ENV_NAME.to_string(),
        library: None,
        initialized_at: Utc::now(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;
    use std::sync::Arc;

    fn fake_info() -> RuntimeInfo {
        RuntimeInfo {
            env_name: "test".to_string(),
            library: None,
            initialized_at: Utc::now(),
        }
    }

    #[test]
    fn test_setup_runs_once() {
        let lifecycle = RuntimeLifecycle::new();
        let calls = AtomicUsize::new(0);

        for _ in 0..3 {
            lifecycle
                .init_with(|| {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Ok(fake_info())
                })
                .unwrap();
        }

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(lifecycle.is_initialized());
    }

    #[test]
    fn test_concurrent_first_use() {
        let lifecycle = Arc::new(RuntimeLifecycle::new());
        let calls = Arc::new(AtomicUsize::new(0));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let lifecycle = Arc::clone(&lifecycle);
                let calls = Arc::clone(&calls);
                std::thread::spawn(move || {
                    lifecycle
                        .init_with(|| {
                            calls.fetch_add(1, Ordering::SeqCst);
                            Ok(fake_info())
                        })
                        .map(|_| ())
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap().unwrap();
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_failed_setup_can_retry() {
        let lifecycle = RuntimeLifecycle::new();
        let failed = lifecycle.init_with(|| Err(ConfigurationError::Runtime("no lib".into())));
        assert!(failed.is_err());
        assert!(!lifecycle.is_initialized());

        assert!(lifecycle.init_with(|| Ok(fake_info())).is_ok());
    }

    #[test]
    fn test_shutdown_once() {
        let lifecycle = RuntimeLifecycle::new();
        assert!(!lifecycle.shutdown(), "nothing to shut down yet");

        lifecycle.init_with(|| Ok(fake_info())).unwrap();
        assert!(lifecycle.shutdown());
        assert!(!lifecycle.shutdown());
        assert!(!lifecycle.is_initialized());

        assert!(lifecycle.init_with(|| Ok(fake_info())).is_err());
    }

    #[cfg(feature = "load-dynamic")]
    #[test]
    fn test_unloadable_library_is_configuration_error() {
        use std::io::Write;

        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"not a shared library").unwrap();
        let mut config = EngineConfig::default();
        config.runtime_path = Some(file.path().to_path_buf());

        let lifecycle = RuntimeLifecycle::new();
        let result = lifecycle.init_with(|| commit_environment(&config));

        assert!(matches!(result, Err(ConfigurationError::Runtime(_))));
        assert!(!lifecycle.is_initialized());
    }

    #[cfg(feature = "load-dynamic")]
    #[test]
    fn test_missing_runtime_path_is_configuration_error() {
        let mut config = EngineConfig::default();
        config.runtime_path = Some(std::path::PathBuf::from("/nope/libonnxruntime.so"));

        assert!(matches!(
            commit_environment(&config),
            Err(ConfigurationError::RuntimeNotFound(_))
        ));
    }
}
