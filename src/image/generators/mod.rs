//! Image generation backends.

mod gemini;
mod openai;

pub use gemini::{GeminiGenerator, GeminiGeneratorBuilder};
pub use openai::{OpenAiGenerator, OpenAiGeneratorBuilder};
