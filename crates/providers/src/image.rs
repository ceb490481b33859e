//! Avatar image generation.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use tama_core::style::{self, Style, NEGATIVE_PROMPT};

use crate::error::{http_client, parse_response, ProviderError};

const TEXT_TO_IMAGE_PATH: &str = "/v1/generation/stable-diffusion-xl-1024-v1-0/text-to-image";

#[async_trait]
pub trait ImageProvider: Send + Sync {
    /// Generate `count` avatar images for `prompt`, returned as URLs or
    /// data URIs.
    async fn generate(
        &self,
        style: Style,
        prompt: &str,
        count: usize,
    ) -> Result<Vec<String>, ProviderError>;
}

// ---------------------------------------------------------------------------
// Stability-style HTTP client
// ---------------------------------------------------------------------------

/// Client for a Stability-style text-to-image API.
pub struct StabilityClient {
    client: reqwest::Client,
    api_url: String,
    api_key: String,
}

#[derive(Debug, Deserialize)]
struct GenerationResponse {
    #[serde(default)]
    artifacts: Vec<Artifact>,
}

#[derive(Debug, Deserialize)]
struct Artifact {
    base64: Option<String>,
}

impl StabilityClient {
    pub fn new(api_url: String, api_key: String, timeout: Duration) -> Result<Self, ProviderError> {
        Ok(Self {
            client: http_client(timeout)?,
            api_url: api_url.trim_end_matches('/').to_string(),
            api_key,
        })
    }
}

#[async_trait]
impl ImageProvider for StabilityClient {
    async fn generate(
        &self,
        _style: Style,
        prompt: &str,
        count: usize,
    ) -> Result<Vec<String>, ProviderError> {
        let body = serde_json::json!({
            "text_prompts": [
                { "text": prompt, "weight": 1 },
                { "text": NEGATIVE_PROMPT, "weight": -1 },
            ],
            "cfg_scale": 7,
            "height": 1024,
            "width": 1024,
            "samples": count,
            "steps": 30,
        });

        let response = self
            .client
            .post(format!("{}{TEXT_TO_IMAGE_PATH}", self.api_url))
            .bearer_auth(&self.api_key)
            .header(reqwest::header::ACCEPT, "application/json")
            .json(&body)
            .send()
            .await?;

        let parsed: GenerationResponse = parse_response(response).await?;
        let images: Vec<String> = parsed
            .artifacts
            .into_iter()
            .filter_map(|a| a.base64)
            .map(|b64| format!("data:image/png;base64,{b64}"))
            .collect();

        if images.is_empty() {
            return Err(ProviderError::Malformed(
                "generation returned no artifacts".to_string(),
            ));
        }
        Ok(images)
    }
}

// ---------------------------------------------------------------------------
// Local placeholders
// ---------------------------------------------------------------------------

/// Returns deterministic placeholder URLs. Never fails.
#[derive(Debug, Default, Clone, Copy)]
pub struct PlaceholderImageProvider;

#[async_trait]
impl ImageProvider for PlaceholderImageProvider {
    async fn generate(
        &self,
        style: Style,
        _prompt: &str,
        count: usize,
    ) -> Result<Vec<String>, ProviderError> {
        Ok(style::placeholders(style, count))
    }
}
