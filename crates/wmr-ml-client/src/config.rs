//! Endpoint configuration for the model clients.

use std::time::Duration;

/// Timeout for readiness probes against either endpoint.
pub const HEALTH_TIMEOUT: Duration = Duration::from_secs(3);

/// Vision-language detector settings.
#[derive(Debug, Clone)]
pub struct DetectorConfig {
    /// Base URL of the Ollama-compatible server
    pub base_url: String,
    /// Model tag sent with every request
    pub model: String,
    /// Request timeout
    pub timeout: Duration,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:11434".to_string(),
            model: "llava:7b".to_string(),
            timeout: Duration::from_secs(60),
        }
    }
}

impl DetectorConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            base_url: std::env::var("OLLAMA_URL")
                .map(|url| url.trim_end_matches('/').to_string())
                .unwrap_or(defaults.base_url),
            model: std::env::var("DETECTOR_MODEL").unwrap_or(defaults.model),
            timeout: std::env::var("DETECTOR_TIMEOUT")
                .ok()
                .and_then(|s| s.parse().ok())
                .map(Duration::from_secs)
                .unwrap_or(defaults.timeout),
        }
    }
}

/// Inpainting server settings.
#[derive(Debug, Clone)]
pub struct InpainterConfig {
    /// Base URL of the IOPaint-compatible server
    pub base_url: String,
    /// Request timeout
    pub timeout: Duration,
}

impl Default for InpainterConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080".to_string(),
            timeout: Duration::from_secs(120),
        }
    }
}

impl InpainterConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            base_url: std::env::var("IOPAINT_URL")
                .map(|url| url.trim_end_matches('/').to_string())
                .unwrap_or(defaults.base_url),
            timeout: std::env::var("INPAINT_TIMEOUT")
                .ok()
                .and_then(|s| s.parse().ok())
                .map(Duration::from_secs)
                .unwrap_or(defaults.timeout),
        }
    }
}
