//! Configuration module

use std::env;

use carprice_core::EngineConfig;

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Server port
    pub port: u16,

    /// Upper bound for one prediction, in milliseconds
    pub inference_timeout_ms: u64,

    /// Environment (development, production)
    pub environment: String,

    /// Model artifact and inference settings
    pub engine: EngineConfig,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        Self {
            port: env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(8080),

            inference_timeout_ms: env::var("CARPRICE_INFERENCE_TIMEOUT_MS")
                .ok()
                .and_then(|t| t.parse().ok())
                .filter(|t| *t > 0)
                .unwrap_or(5000),

            environment: env::var("ENVIRONMENT")
                .unwrap_or_else(|_| "development".to_string()),

            engine: EngineConfig::from_env(),
        }
    }

    /// Check if running in production
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 8080,
            inference_timeout_ms: 5000,
            environment: "development".to_string(),
            engine: EngineConfig::default(),
        }
    }
}
