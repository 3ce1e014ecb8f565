//! Wire types for the detector endpoint.

use serde::{Deserialize, Serialize};

/// Body of `POST /api/generate`.
#[derive(Debug, Clone, Serialize)]
pub struct GenerateRequest<'a> {
    pub model: &'a str,
    pub prompt: &'a str,
    /// Base64-encoded images
    pub images: Vec<String>,
    pub stream: bool,
}

/// Non-streaming `/api/generate` reply. Only the text is used.
#[derive(Debug, Clone, Deserialize)]
pub struct GenerateResponse {
    #[serde(default)]
    pub response: String,
}
