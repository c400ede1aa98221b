//! Image generator trait.

use crate::error::Result;
use crate::image::types::{GenerationRequest, ImageResult};
use async_trait::async_trait;

/// The vendor behind a generator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GeneratorKind {
    /// Google Gemini image models.
    Gemini,
    /// OpenAI image models (gpt-image-1).
    OpenAi,
}

impl std::fmt::Display for GeneratorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Gemini => write!(f, "gemini"),
            Self::OpenAi => write!(f, "openai"),
        }
    }
}

/// Trait for image generation backends.
///
/// Both vendors honor the same contract: prompt plus source images in,
/// decoded image bytes out, optionally persisted to the request's output
/// path. Everything vendor-specific (wire format, auth, retry policy) stays
/// inside the implementation.
#[async_trait]
pub trait ImageGenerator: Send + Sync {
    /// Generates an image from the given request.
    async fn generate(&self, request: &GenerationRequest) -> Result<ImageResult>;

    /// Returns the kind of this generator.
    fn kind(&self) -> GeneratorKind;

    /// Returns the name of this generator for display.
    fn name(&self) -> &str {
        match self.kind() {
            GeneratorKind::Gemini => "Gemini (Google)",
            GeneratorKind::OpenAi => "OpenAI (gpt-image)",
        }
    }

    /// Checks if the backend is reachable and authenticated.
    async fn health_check(&self) -> Result<()>;
}
