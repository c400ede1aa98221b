//! CLI for ImageForge - prompt-driven image editing.

use clap::{Parser, ValueEnum};
use imageforge::{GeminiGenerator, GenerationRequest, ImageGenerator, OpenAiGenerator};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "imageforge")]
#[command(about = "Edit images with a text prompt via the Gemini or OpenAI image APIs")]
#[command(version)]
struct Cli {
    /// The text prompt describing the edit
    prompt: String,

    /// Input image file (repeat for multiple images)
    #[arg(short, long, required = true)]
    input: Vec<PathBuf>,

    /// Output file path
    #[arg(short, long)]
    output: PathBuf,

    /// Backend to use
    #[arg(short, long, value_enum, default_value = "gemini")]
    generator: GeneratorArg,

    /// Model identifier (defaults to the backend's standard image model)
    #[arg(long)]
    model: Option<String>,

    /// Output size, e.g. 1024x1024 (OpenAI only)
    #[arg(long)]
    size: Option<String>,

    /// Output as JSON
    #[arg(long)]
    json: bool,
}

#[derive(Clone, Copy, ValueEnum)]
enum GeneratorArg {
    Gemini,
    Openai,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    if matches!(cli.generator, GeneratorArg::Gemini) && cli.size.is_some() {
        anyhow::bail!("Gemini does not support --size");
    }

    let mut request = GenerationRequest::new(&cli.prompt).with_output_path(&cli.output);
    for path in &cli.input {
        request = request.with_image_path(path)?;
    }
    if let Some(size) = cli.size {
        request = request.with_size(size);
    }

    let result = match cli.generator {
        GeneratorArg::Gemini => {
            let mut builder = GeminiGenerator::builder();
            if let Some(ref model) = cli.model {
                builder = builder.model(model);
            }
            builder.build()?.generate(&request).await?
        }
        GeneratorArg::Openai => {
            let mut builder = OpenAiGenerator::builder();
            if let Some(ref model) = cli.model {
                builder = builder.model(model);
            }
            builder.build()?.generate(&request).await?
        }
    };

    if cli.json {
        let out = serde_json::json!({
            "success": result.success,
            "output": cli.output.display().to_string(),
            "size_bytes": result.size(),
            "total_tokens": result.usage.as_ref().and_then(|u| u.total_tokens),
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
    } else {
        println!(
            "Image saved to {} ({} bytes)",
            cli.output.display(),
            result.size()
        );
    }

    Ok(())
}
