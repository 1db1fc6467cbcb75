//! AI capability boundaries.
//!
//! The orchestrator treats its AI collaborators as three narrow
//! capabilities — "extract a structured recipe from images", "describe a
//! visual style from references", "paint an illustration from a prompt" —
//! and owns only the retry/fallback policy layered on top of them.
//! Everything provider-specific (endpoints, auth, payload shape, error
//! text) lives behind these traits, and every failure crosses the boundary
//! already translated into the closed [`AiError`] classification.
//!
//! [`azure`] provides the production Azure OpenAI implementation; tests
//! substitute in-memory fakes.

pub mod azure;

use crate::error::AiError;
use crate::pipeline::encode::ImageData;
use crate::recipe::Recipe;
use async_trait::async_trait;

/// Capability: given same-page crops in reading order, return a structured
/// recipe in the target language.
///
/// Implementations must surface a provider response with no parsed content
/// as [`AiError::EmptyResponse`], never as a defaulted [`Recipe`].
#[async_trait]
pub trait RecipeExtractor: Send + Sync {
    async fn extract(&self, crops: &[ImageData], language: &str) -> Result<Recipe, AiError>;
}

/// Capability: given reference images, return a free-text description of
/// their shared visual style.
///
/// The returned text is trimmed and non-empty; an empty provider response
/// is [`AiError::EmptyResponse`].
#[async_trait]
pub trait StyleDeriver: Send + Sync {
    async fn derive_style(&self, references: &[ImageData]) -> Result<String, AiError>;
}

/// One illustration request: a text prompt plus optional conditioning
/// imagery.
#[derive(Debug, Clone)]
pub struct IllustrationRequest {
    /// The full text prompt.
    pub prompt: String,
    /// Source crops of the dish photo, as auxiliary input conditioning.
    pub input_images: Vec<ImageData>,
    /// Style reference images.
    pub style_images: Vec<ImageData>,
}

/// Capability: given a prompt (plus optional conditioning imagery), return
/// one generated image's raw bytes.
///
/// Content-policy rejections must be reported as
/// [`AiError::ContentBlocked`] so the caller's fallback ladder can react;
/// see [`AiError::classify_rejection`] for the default translation rule.
#[async_trait]
pub trait Illustrator: Send + Sync {
    async fn generate(&self, request: &IllustrationRequest) -> Result<Vec<u8>, AiError>;
}
