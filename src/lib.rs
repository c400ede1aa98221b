#![warn(missing_docs)]
//! ImageForge - prompt-driven image editing via AI APIs.
//!
//! This crate provides a unified interface for editing images with a text
//! prompt using either the Gemini or OpenAI image generation APIs.
//!
//! # Quick Start
//!
//! ```no_run
//! use imageforge::{GeminiGenerator, GenerationRequest, ImageGenerator};
//!
//! #[tokio::main]
//! async fn main() -> imageforge::Result<()> {
//!     let generator = GeminiGenerator::builder().build()?;
//!     let request = GenerationRequest::new("Add a llama next to me in this photo")
//!         .with_image_path("photo.jpg")?
//!         .with_output_path("llama_photo.png");
//!     let result = generator.generate(&request).await?;
//!     println!("wrote {} bytes", result.size());
//!     Ok(())
//! }
//! ```

mod error;
pub mod image;
mod retry;

pub use error::{ImageForgeError, Result};

pub use image::{
    mime_type_for_path, GeneratorKind, GenerationRequest, ImageGenerator, ImageResult,
    SourceImage, Usage,
};

pub use image::generators::{
    GeminiGenerator, GeminiGeneratorBuilder, OpenAiGenerator, OpenAiGeneratorBuilder,
};

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::error::{ImageForgeError, Result};
    pub use crate::image::generators::{GeminiGenerator, OpenAiGenerator};
    pub use crate::image::{GenerationRequest, ImageGenerator, ImageResult};
}
