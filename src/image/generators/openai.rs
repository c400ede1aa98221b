//! OpenAI image edit backend (gpt-image-1).
//!
//! Uploads the prompt and source images as a multipart form to the
//! `/v1/images/edits` endpoint. Transport timeouts are retried with
//! exponential backoff; HTTP error statuses fail immediately.

use crate::error::{ImageForgeError, Result};
use crate::image::generator::{GeneratorKind, ImageGenerator};
use crate::image::persist;
use crate::image::types::{GenerationRequest, ImageResult, Usage};
use crate::retry::with_timeout_retry;
use async_trait::async_trait;
use base64::Engine;
use serde::Deserialize;
use std::time::Duration;

const DEFAULT_BASE_URL: &str = "https://api.openai.com";
const DEFAULT_MODEL: &str = "gpt-image-1";
const DEFAULT_SIZE: &str = "1024x1024";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);
const MAX_RETRIES: u32 = 3;

/// Builder for [`OpenAiGenerator`].
#[derive(Debug, Clone, Default)]
pub struct OpenAiGeneratorBuilder {
    api_key: Option<String>,
    model: Option<String>,
    base_url: Option<String>,
}

impl OpenAiGeneratorBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the API key. Falls back to the `OPENAI_API_KEY` env var.
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Sets the model identifier (default: `gpt-image-1`).
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    /// Overrides the API base URL.
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Builds the generator, resolving the API key.
    pub fn build(self) -> Result<OpenAiGenerator> {
        let api_key = self
            .api_key
            .or_else(|| std::env::var("OPENAI_API_KEY").ok())
            .ok_or_else(|| {
                ImageForgeError::Config("OPENAI_API_KEY not set and no API key provided".into())
            })?;

        Ok(OpenAiGenerator {
            client: reqwest::Client::new(),
            api_key,
            model: self.model.unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            base_url: self.base_url.unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
        })
    }
}

/// OpenAI image edit backend.
pub struct OpenAiGenerator {
    client: reqwest::Client,
    api_key: String,
    model: String,
    base_url: String,
}

/// Multipart field name for the image at `index`.
///
/// The first image is named `image[]` and later ones `image[N]` with their
/// 0-based index. The endpoint's array parsing depends on this exact naming,
/// so it is preserved as-is.
fn image_field_name(index: usize) -> String {
    if index == 0 {
        "image[]".to_string()
    } else {
        format!("image[{index}]")
    }
}

impl OpenAiGenerator {
    /// Creates a new [`OpenAiGeneratorBuilder`].
    pub fn builder() -> OpenAiGeneratorBuilder {
        OpenAiGeneratorBuilder::new()
    }

    /// Builds a fresh multipart form. Forms are single-use, so each retry
    /// attempt rebuilds one from the request.
    fn build_form(&self, request: &GenerationRequest) -> Result<reqwest::multipart::Form> {
        let mut form = reqwest::multipart::Form::new()
            .text("model", self.model.clone())
            .text("prompt", request.prompt.clone())
            .text(
                "size",
                request
                    .size
                    .clone()
                    .unwrap_or_else(|| DEFAULT_SIZE.to_string()),
            );

        for (index, image) in request.images.iter().enumerate() {
            let part = reqwest::multipart::Part::bytes(image.data.clone())
                .file_name(image.file_name.clone())
                .mime_str(&image.mime_type)
                .map_err(|e| ImageForgeError::InvalidRequest(e.to_string()))?;
            form = form.part(image_field_name(index), part);
        }

        Ok(form)
    }

    /// A single transport attempt: send the form, classify the outcome.
    async fn attempt(&self, request: &GenerationRequest) -> Result<OpenAiResponse> {
        let url = format!("{}/v1/images/edits", self.base_url);
        let form = self.build_form(request)?;

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .multipart(form)
            .timeout(REQUEST_TIMEOUT)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ImageForgeError::RequestTimeout(e.to_string())
                } else {
                    ImageForgeError::Network(e)
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::error!(status = status.as_u16(), body = %body, "OpenAI API error");
            return Err(ImageForgeError::Api {
                status: status.as_u16(),
                body,
            });
        }

        Ok(response.json().await?)
    }

    async fn generate_impl(&self, request: &GenerationRequest) -> Result<ImageResult> {
        if request.images.is_empty() {
            return Err(ImageForgeError::InvalidRequest(
                "at least one source image is required".into(),
            ));
        }

        tracing::debug!(model = %self.model, images = request.images.len(), "sending OpenAI image edit request");

        let response = with_timeout_retry(MAX_RETRIES, || self.attempt(request)).await?;
        let image_data = extract_image_data(&response)?;

        if let Some(ref path) = request.output_path {
            persist::write_image(path, &image_data)?;
        }

        tracing::debug!(bytes = image_data.len(), "OpenAI image edit complete");

        Ok(ImageResult {
            image_data,
            output_path: request.output_path.clone(),
            success: true,
            usage: response.usage,
        })
    }
}

#[async_trait]
impl ImageGenerator for OpenAiGenerator {
    async fn generate(&self, request: &GenerationRequest) -> Result<ImageResult> {
        self.generate_impl(request).await
    }

    fn kind(&self) -> GeneratorKind {
        GeneratorKind::OpenAi
    }

    async fn health_check(&self) -> Result<()> {
        if self.api_key.starts_with("sk-") {
            Ok(())
        } else {
            Err(ImageForgeError::Config("invalid API key format".into()))
        }
    }
}

/// Pulls `data[0].b64_json` out of the response and decodes it.
fn extract_image_data(response: &OpenAiResponse) -> Result<Vec<u8>> {
    let b64 = response
        .data
        .first()
        .and_then(|d| d.b64_json.as_deref())
        .filter(|s| !s.is_empty())
        .ok_or_else(|| {
            tracing::error!("no image data in OpenAI response");
            ImageForgeError::NoImageData
        })?;

    base64::engine::general_purpose::STANDARD
        .decode(b64)
        .map_err(|e| {
            tracing::error!(error = %e, "failed to decode OpenAI image data");
            ImageForgeError::Decode(e.to_string())
        })
}

#[derive(Debug, Deserialize)]
struct OpenAiResponse {
    #[serde(default)]
    data: Vec<OpenAiImageData>,
    #[serde(default)]
    usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
struct OpenAiImageData {
    #[serde(default)]
    b64_json: Option<String>,
}
