//! Core types for image generation.

use crate::error::{ImageForgeError, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Returns the MIME type for an image file path, derived from its extension.
///
/// Unrecognized extensions map to `application/octet-stream`.
pub fn mime_type_for_path(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase());

    match ext.as_deref() {
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        _ => "application/octet-stream",
    }
}

/// A source image to send to the generation API.
#[derive(Debug, Clone)]
pub struct SourceImage {
    /// Raw image bytes.
    pub data: Vec<u8>,
    /// MIME type of the image.
    pub mime_type: String,
    /// File name used for multipart uploads.
    pub file_name: String,
}

impl SourceImage {
    /// Reads an image from disk, deriving MIME type and file name from the path.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let data = std::fs::read(path).map_err(|source| {
            tracing::error!(path = %path.display(), error = %source, "failed to read input image");
            ImageForgeError::FileRead {
                path: path.to_path_buf(),
                source,
            }
        })?;

        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("image")
            .to_string();

        Ok(Self {
            data,
            mime_type: mime_type_for_path(path).to_string(),
            file_name,
        })
    }
}

/// A request to generate an image from a prompt and one or more source images.
///
/// Built once per call and discarded afterwards; no state is shared across
/// calls.
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    /// The text prompt describing the desired edit.
    pub prompt: String,
    /// Source images, in the order they will be sent.
    pub images: Vec<SourceImage>,
    /// Requested output size (e.g. "1024x1024"), where the vendor supports it.
    pub size: Option<String>,
    /// Where to persist the result. When `None` the caller receives only the
    /// in-memory bytes.
    pub output_path: Option<PathBuf>,
}

impl GenerationRequest {
    /// Creates a new request with the given prompt.
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            images: Vec::new(),
            size: None,
            output_path: None,
        }
    }

    /// Reads an image file and appends it to the request.
    ///
    /// Fails with [`ImageForgeError::FileRead`] if the file cannot be read,
    /// before any network call is made.
    pub fn with_image_path(mut self, path: impl AsRef<Path>) -> Result<Self> {
        self.images.push(SourceImage::from_path(path)?);
        Ok(self)
    }

    /// Appends an in-memory image to the request.
    pub fn with_image(mut self, image: SourceImage) -> Self {
        self.images.push(image);
        self
    }

    /// Sets the requested output size.
    pub fn with_size(mut self, size: impl Into<String>) -> Self {
        self.size = Some(size.into());
        self
    }

    /// Sets the path the generated image will be written to.
    pub fn with_output_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.output_path = Some(path.into());
        self
    }
}

/// Vendor-reported token usage for a generation call.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Usage {
    /// Tokens consumed by the input.
    #[serde(default)]
    pub input_tokens: Option<u64>,
    /// Tokens consumed by the generated output.
    #[serde(default)]
    pub output_tokens: Option<u64>,
    /// Total tokens for the call.
    #[serde(default)]
    pub total_tokens: Option<u64>,
}

/// The outcome of a successful generation call.
#[derive(Debug, Clone)]
#[must_use = "generated image should be saved or processed"]
pub struct ImageResult {
    /// Decoded image bytes.
    pub image_data: Vec<u8>,
    /// Path the image was written to, if persistence was requested.
    pub output_path: Option<PathBuf>,
    /// Whether the call fully succeeded.
    pub success: bool,
    /// Vendor-reported usage metadata, where available.
    pub usage: Option<Usage>,
}

impl ImageResult {
    /// Returns the size of the decoded image in bytes.
    pub fn size(&self) -> usize {
        self.image_data.len()
    }
}
