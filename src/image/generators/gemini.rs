//! Gemini (Google) image generation backend.
//!
//! Sends the prompt and source images inline as base64 JSON parts to the
//! `generateContent` endpoint and extracts the first image part from the
//! response. Single attempt, no retry: the caller sees the raw upstream
//! status and body on failure.

use crate::error::{ImageForgeError, Result};
use crate::image::generator::{GeneratorKind, ImageGenerator};
use crate::image::persist;
use crate::image::types::{GenerationRequest, ImageResult};
use async_trait::async_trait;
use base64::Engine;
use serde::{Deserialize, Serialize};

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";
const DEFAULT_MODEL: &str = "gemini-2.5-flash-image-preview";

/// Builder for [`GeminiGenerator`].
#[derive(Debug, Clone, Default)]
pub struct GeminiGeneratorBuilder {
    api_key: Option<String>,
    model: Option<String>,
    base_url: Option<String>,
}

impl GeminiGeneratorBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the API key. Falls back to the `GEMINI_API_KEY` env var.
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Sets the model identifier (default: `gemini-2.5-flash-image-preview`).
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
    pub fn build(self) -> Result<GeminiGenerator> {
        let api_key = self
            .api_key
            .or_else(|| std::env::var("GEMINI_API_KEY").ok())
            .ok_or_else(|| {
                ImageForgeError::Config("GEMINI_API_KEY not set and no API key provided".into())
            })?;

        Ok(GeminiGenerator {
            client: reqwest::Client::new(),
            api_key,
            model: self.model.unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            base_url: self.base_url.unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
        })
    }
}

/// Gemini image generation backend.
pub struct GeminiGenerator {
    client: reqwest::Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl GeminiGenerator {
    /// Creates a new [`GeminiGeneratorBuilder`].
    pub fn builder() -> GeminiGeneratorBuilder {
        GeminiGeneratorBuilder::new()
    }

    async fn generate_impl(&self, request: &GenerationRequest) -> Result<ImageResult> {
        if request.images.is_empty() {
            return Err(ImageForgeError::InvalidRequest(
                "at least one source image is required".into(),
            ));
        }

        let url = format!(
            "{}/v1beta/models/{}:generateContent?key={}",
            self.base_url, self.model, self.api_key,
        );

        let body = GeminiRequest::from_generation_request(request);

        tracing::debug!(model = %self.model, images = request.images.len(), "sending Gemini image generation request");

        let response = self
            .client
            .post(&url)
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::error!(status = status.as_u16(), body = %body, "Gemini API error");
            return Err(ImageForgeError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let gemini_response: GeminiResponse = response.json().await?;
        let image_data = extract_image_data(gemini_response)?;

        if let Some(ref path) = request.output_path {
            persist::write_image(path, &image_data)?;
        }

        tracing::debug!(bytes = image_data.len(), "Gemini image generation complete");

        Ok(ImageResult {
            image_data,
            output_path: request.output_path.clone(),
            success: true,
            usage: None,
        })
    }
}

#[async_trait]
impl ImageGenerator for GeminiGenerator {
    async fn generate(&self, request: &GenerationRequest) -> Result<ImageResult> {
        self.generate_impl(request).await
    }

    fn kind(&self) -> GeneratorKind {
        GeneratorKind::Gemini
    }

    async fn health_check(&self) -> Result<()> {
        let url = format!(
            "{}/v1beta/models/{}?key={}",
            self.base_url, self.model, self.api_key,
        );

        let response = self.client.get(&url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ImageForgeError::Api {
                status: status.as_u16(),
                body: "health check failed".into(),
            });
        }
        Ok(())
    }
}

/// Locates the first image part in the response and base64-decodes it.
fn extract_image_data(response: GeminiResponse) -> Result<Vec<u8>> {
    let parts = response
        .candidates
        .into_iter()
        .next()
        .and_then(|c| c.content)
        .and_then(|c| c.parts)
        .ok_or_else(|| {
            tracing::error!("no parts found in Gemini response");
            ImageForgeError::NoImagePart
        })?;

    let inline = parts
        .into_iter()
        .filter_map(|p| p.inline_data)
        .find(|d| d.mime_type.starts_with("image/"))
        .ok_or_else(|| {
            tracing::error!("no image data found in Gemini response");
            ImageForgeError::NoImageFound
        })?;

    base64::engine::general_purpose::STANDARD
        .decode(&inline.data)
        .map_err(|e| {
            tracing::error!(error = %e, "failed to decode Gemini image data");
            ImageForgeError::Decode(e.to_string())
        })
}

// Request/Response wire types
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiRequest {
    contents: Vec<GeminiContent>,
    generation_config: GeminiConfig,
}

#[derive(Debug, Serialize)]
struct GeminiContent {
    parts: Vec<GeminiRequestPart>,
}

/// A part in a Gemini request - the text prompt or inline image data.
#[derive(Debug, Serialize)]
#[serde(untagged)]
enum GeminiRequestPart {
    Text { text: String },
    InlineData { inline_data: GeminiInlineData },
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiInlineData {
    mime_type: String,
    data: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiConfig {
    response_modalities: Vec<String>,
}

impl GeminiRequest {
    fn from_generation_request(req: &GenerationRequest) -> Self {
        // Prompt first, then one inline part per image in input order.
        let mut parts = vec![GeminiRequestPart::Text {
            text: req.prompt.clone(),
        }];

        for image in &req.images {
            parts.push(GeminiRequestPart::InlineData {
                inline_data: GeminiInlineData {
                    mime_type: image.mime_type.clone(),
                    data: base64::engine::general_purpose::STANDARD.encode(&image.data),
                },
            });
        }

        Self {
            contents: vec![GeminiContent { parts }],
            generation_config: GeminiConfig {
                response_modalities: vec!["TEXT".to_string(), "IMAGE".to_string()],
            },
        }
    }
}

#[derive(Debug, Deserialize)]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
}

#[derive(Debug, Deserialize)]
struct GeminiCandidate {
    #[serde(default)]
    content: Option<GeminiContentResponse>,
}

#[derive(Debug, Deserialize)]
struct GeminiContentResponse {
    #[serde(default)]
    parts: Option<Vec<GeminiPartResponse>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiPartResponse {
    #[serde(default)]
    inline_data: Option<InlineData>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct InlineData {
    mime_type: String,
    data: String,
}
