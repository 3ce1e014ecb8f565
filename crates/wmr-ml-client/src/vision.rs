//! Vision-language detector client.

use std::time::Duration;

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use reqwest::Client;
use tracing::{debug, warn};

use crate::config::{DetectorConfig, HEALTH_TIMEOUT};
use crate::error::{MlError, MlResult};
use crate::types::{GenerateRequest, GenerateResponse};

/// A model that answers a text prompt about one image.
#[async_trait]
pub trait VisionModel: Send + Sync {
    /// Ask `prompt` about `image` and return the free-text answer.
    async fn describe(&self, prompt: &str, image: &[u8]) -> MlResult<String>;

    /// Whether the model server answers at all.
    async fn health_check(&self) -> bool;
}

/// HTTP client for an Ollama-compatible `/api/generate` endpoint.
pub struct VisionClient {
    http: Client,
    config: DetectorConfig,
}

impl VisionClient {
    /// Create a new detector client.
    pub fn new(config: DetectorConfig) -> MlResult<Self> {
        let http = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(MlError::Network)?;

        Ok(Self { http, config })
    }

    /// Create from environment variables.
    pub fn from_env() -> MlResult<Self> {
        Self::new(DetectorConfig::from_env())
    }

    pub fn config(&self) -> &DetectorConfig {
        &self.config
    }

    fn timeout_secs(&self) -> u64 {
        self.config.timeout.as_secs()
    }
}

#[async_trait]
impl VisionModel for VisionClient {
    async fn describe(&self, prompt: &str, image: &[u8]) -> MlResult<String> {
        let url = format!("{}/api/generate", self.config.base_url);
        let body = GenerateRequest {
            model: &self.config.model,
            prompt,
            images: vec![STANDARD.encode(image)],
            stream: false,
        };

        debug!(url = %url, model = %self.config.model, "Sending detection request");

        let response = self
            .http
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| MlError::from_transport(e, self.timeout_secs()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(MlError::RequestFailed(format!(
                "detector returned {}: {}",
                status, body
            )));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| MlError::from_transport(e, self.timeout_secs()))?;
        let generated: GenerateResponse = serde_json::from_slice(&bytes)?;
        Ok(generated.response)
    }

    async fn health_check(&self) -> bool {
        let url = format!("{}/api/tags", self.config.base_url);
        probe(&self.http, &url, HEALTH_TIMEOUT).await
    }
}

/// GET `url` with a short timeout; any 2xx counts as healthy.
pub(crate) async fn probe(http: &Client, url: &str, timeout: Duration) -> bool {
    match http.get(url).timeout(timeout).send().await {
        Ok(response) if response.status().is_success() => true,
        Ok(response) => {
            warn!(url = %url, status = %response.status(), "Model health check failed");
            false
        }
        Err(e) => {
            warn!(url = %url, "Model health check error: {}", e);
            false
        }
    }
}
