//! # cookery
//!
//! Turn photographed recipe cards into structured recipe records,
//! AI-generated illustrations, and rendered cookbook pages.
//!
//! ## Why this crate?
//!
//! A box of handwritten recipe cards is unsearchable and unshareable.
//! Plain OCR mangles handwriting and loses the ingredient/step structure.
//! Instead this crate splits each photo into aspect-ratio crops a vision
//! model reads reliably, extracts a structured [`Recipe`](recipe::Recipe),
//! paints an illustration in a style derived from reference artwork, and
//! renders the lot into a linked cookbook.
//!
//! ## Pipeline Overview
//!
//! ```text
//! photos/
//!  │
//!  ├─ 1. Input       enumerate candidates, skip already-processed photos
//!  ├─ 2. Split       sliding-window crops at the target aspect ratio
//!  ├─ 3. Extract     multimodal chat call → structured Recipe
//!  ├─ 4. Illustrate  image generation with a 3-rung content-filter ladder
//!  ├─ 5. Persist     JSON record + illustration + Markdown/HTML document
//!  └─ 6. Index       rebuild the alphabetical gallery page
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use cookery::ai::azure::{AzureConfig, AzureOpenAiClient};
//! use cookery::{run, PipelineConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = PipelineConfig::builder("photos", "output", "reference_style")
//!         .language("English")
//!         .build()?;
//!     let client = AzureOpenAiClient::new(AzureConfig::from_env()?);
//!     let output = run(&config, &client, &client, &client).await?;
//!     for path in &output.written {
//!         println!("Generated {}", path.display());
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Reruns
//!
//! Every persisted record carries the filename of the photo it came from.
//! A rerun snapshots those filenames first and skips matching photos, so
//! pointing the pipeline at the same directory twice costs zero API calls
//! for already-processed cards.
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `cookery` binary (clap + anyhow + tracing-subscriber) |

// ── Modules ──────────────────────────────────────────────────────────────

pub mod ai;
pub mod config;
pub mod error;
pub mod pipeline;
pub mod prompts;
pub mod recipe;
pub mod run;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{PipelineConfig, PipelineConfigBuilder, DEFAULT_ASPECT_RATIO, DEFAULT_MARGIN_RATIO};
pub use error::{AiError, CookbookError, PhotoError, PhotoStage};
pub use pipeline::render::DocumentFormat;
pub use recipe::Recipe;
pub use run::{run, RunOutput};
