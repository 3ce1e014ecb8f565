//! Inpainting server client.

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::Client;
use tracing::debug;

use crate::config::{InpainterConfig, HEALTH_TIMEOUT};
use crate::error::{MlError, MlResult};
use crate::vision::probe;

/// A model that fills the white area of `mask` in `image`.
#[async_trait]
pub trait InpaintModel: Send + Sync {
    /// Both inputs are PNG-encoded and share dimensions. Returns the
    /// server's image bytes.
    async fn inpaint(&self, image_png: Vec<u8>, mask_png: Vec<u8>) -> MlResult<Vec<u8>>;

    /// Whether the inpainting server answers at all.
    async fn health_check(&self) -> bool;
}

/// HTTP client for an IOPaint-compatible `/inpaint` endpoint.
pub struct InpaintClient {
    http: Client,
    config: InpainterConfig,
}

impl InpaintClient {
    /// Create a new inpainting client.
    pub fn new(config: InpainterConfig) -> MlResult<Self> {
        let http = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(MlError::Network)?;

        Ok(Self { http, config })
    }

    /// Create from environment variables.
    pub fn from_env() -> MlResult<Self> {
        Self::new(InpainterConfig::from_env())
    }

    pub fn config(&self) -> &InpainterConfig {
        &self.config
    }
}

fn png_part(bytes: Vec<u8>, file_name: &'static str) -> MlResult<Part> {
    Part::bytes(bytes)
        .file_name(file_name)
        .mime_str("image/png")
        .map_err(MlError::Network)
}

#[async_trait]
impl InpaintModel for InpaintClient {
    async fn inpaint(&self, image_png: Vec<u8>, mask_png: Vec<u8>) -> MlResult<Vec<u8>> {
        let url = format!("{}/inpaint", self.config.base_url);
        let timeout_secs = self.config.timeout.as_secs();

        let form = Form::new()
            .part("image", png_part(image_png, "image.png")?)
            .part("mask", png_part(mask_png, "mask.png")?);

        debug!(url = %url, "Sending inpaint request");

        let response = self
            .http
            .post(&url)
            .multipart(form)
            .send()
            .await
            .map_err(|e| MlError::from_transport(e, timeout_secs))?;

        let status = response.status();
        if status != reqwest::StatusCode::OK {
            let body = response.text().await.unwrap_or_default();
            return Err(MlError::RequestFailed(format!(
                "inpainter returned {}: {}",
                status, body
            )));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| MlError::from_transport(e, timeout_secs))?;
        if bytes.is_empty() {
            return Err(MlError::InvalidResponse("empty image body".to_string()));
        }
        Ok(bytes.to_vec())
    }

    async fn health_check(&self) -> bool {
        let url = format!("{}/api/v1/server-config", self.config.base_url);
        probe(&self.http, &url, HEALTH_TIMEOUT).await
    }
}
