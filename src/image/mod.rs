//! Image generation module.

mod generator;
pub mod generators;
pub mod persist;
mod types;

pub use generator::{GeneratorKind, ImageGenerator};
pub use types::{mime_type_for_path, GenerationRequest, ImageResult, SourceImage, Usage};
