//! CLI binary for cookery.
//!
//! A thin shim over the library crate that maps CLI flags to
//! `PipelineConfig`, reads Azure OpenAI credentials from the environment,
//! and prints the written artifact paths.

use anyhow::{Context, Result};
use clap::Parser;
use cookery::ai::azure::{AzureConfig, AzureOpenAiClient};
use cookery::{run, DocumentFormat, PipelineConfig, DEFAULT_ASPECT_RATIO, DEFAULT_MARGIN_RATIO};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Generate an illustrated cookbook from recipe card photos.
#[derive(Debug, Parser)]
#[command(name = "cookery", version, about)]
struct Cli {
    /// Directory containing recipe card photos.
    #[arg(long, default_value = "input")]
    input_dir: PathBuf,

    /// Directory for generated records, illustrations, and documents.
    #[arg(long, default_value = "output")]
    output_dir: PathBuf,

    /// Directory containing reference style images.
    #[arg(long, default_value = "reference_style")]
    reference_style_dir: PathBuf,

    /// Target aspect ratio (width/height) for preprocessing splits.
    #[arg(long, default_value_t = DEFAULT_ASPECT_RATIO)]
    aspect_ratio: f64,

    /// Overlap margin ratio when splitting images.
    #[arg(long, default_value_t = DEFAULT_MARGIN_RATIO)]
    split_margin_ratio: f64,

    /// Target language for the generated recipes.
    #[arg(long, default_value = "English")]
    language: String,

    /// Export each recipe as Markdown alongside the JSON record.
    #[arg(long)]
    export_markdown: bool,

    /// Export each recipe as HTML alongside the JSON record.
    #[arg(long)]
    export_html: bool,
}

impl Cli {
    fn document_format(&self) -> Option<DocumentFormat> {
        match (self.export_markdown, self.export_html) {
            (true, true) => Some(DocumentFormat::Both),
            (true, false) => Some(DocumentFormat::Markdown),
            (false, true) => Some(DocumentFormat::Html),
            (false, false) => None,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let cli = Cli::parse();

    let mut builder = PipelineConfig::builder(
        &cli.input_dir,
        &cli.output_dir,
        &cli.reference_style_dir,
    )
    .target_aspect_ratio(cli.aspect_ratio)
    .margin_ratio(cli.split_margin_ratio)
    .language(&cli.language);
    if let Some(format) = cli.document_format() {
        builder = builder.documents(format);
    }
    let config = builder.build().context("invalid pipeline configuration")?;

    let azure = AzureConfig::from_env().context("Azure OpenAI configuration")?;
    let client = AzureOpenAiClient::new(azure);

    let output = run(&config, &client, &client, &client).await?;

    for path in &output.written {
        println!("Generated {}", path.display());
    }
    if let Some(index) = &output.index {
        println!("Index {}", index.display());
    }
    eprintln!(
        "{} processed, {} skipped, {} failed",
        output.processed,
        output.skipped,
        output.failed.len()
    );
    for failure in &output.failed {
        eprintln!("  {failure}");
    }

    Ok(())
}
