//! Error types for the cookery library.
//!
//! Three distinct error types reflect three distinct failure modes:
//!
//! * [`CookbookError`] — **Fatal**: the run cannot proceed at all (no input
//!   photos on a first run, no reference style images, broken configuration).
//!   Returned as `Err(CookbookError)` from the top-level [`crate::run::run`].
//!
//! * [`PhotoError`] — **Non-fatal**: a single photo failed (bad geometry,
//!   extraction rejected, illustration exhausted its fallback ladder) but the
//!   rest of the batch is fine. Collected in [`crate::run::RunOutput`] so
//!   callers can inspect partial success rather than losing the whole batch
//!   to one bad card.
//!
//! * [`AiError`] — the closed classification every AI collaborator must
//!   translate its provider-specific failures into. The illustration retry
//!   ladder dispatches on [`AiError::ContentBlocked`] rather than matching
//!   provider error strings, so the retry policy stays stable across
//!   providers. The string-matching heuristic the ladder historically relied
//!   on survives as the default translation rule in
//!   [`AiError::classify_rejection`].

use std::path::PathBuf;
use thiserror::Error;

/// All fatal errors returned by the cookery library.
///
/// Photo-level failures use [`PhotoError`] and are stored in
/// [`crate::run::RunOutput`] rather than propagated here.
#[derive(Debug, Error)]
pub enum CookbookError {
    // ── Setup errors ──────────────────────────────────────────────────────
    /// No candidate photos exist and no prior outputs exist either.
    #[error("No photos found in input directory '{dir}'\nExpected .jpg/.jpeg/.png recipe card photos.")]
    NoPhotosFound { dir: PathBuf },

    /// The reference style directory holds no usable images.
    ///
    /// The style description is shared by every photo in the run, so its
    /// absence is checked before any photo is touched.
    #[error("No reference images found in '{dir}'\nAdd at least one style reference image.")]
    NoReferenceImages { dir: PathBuf },

    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Geometry errors ───────────────────────────────────────────────────
    /// The split window computed to a non-positive size.
    ///
    /// Raised instead of silently emitting zero crops; caught by the
    /// per-photo handler, so it is fatal to one photo, not the run.
    #[error("Invalid split geometry: {width}x{height} at target ratio {target_ratio} yields window size {window}")]
    InvalidGeometry {
        width: u32,
        height: u32,
        target_ratio: f64,
        window: i64,
    },

    // ── I/O errors ────────────────────────────────────────────────────────
    /// Could not create or write an output file.
    #[error("Failed to write output file '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Could not read a source or reference image.
    #[error("Failed to read image '{path}': {detail}")]
    ImageReadFailed { path: PathBuf, detail: String },

    /// Image decoding or encoding failed.
    #[error("Image processing error: {0}")]
    Image(#[from] image::ImageError),

    // ── AI errors ─────────────────────────────────────────────────────────
    /// An AI collaborator failed in a way that aborts the current unit of work.
    #[error(transparent)]
    Ai(#[from] AiError),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// A non-fatal error for a single source photo.
///
/// Stored in [`crate::run::RunOutput::failed`] when a photo fails.
/// The overall run continues with the next photo.
#[derive(Debug, Error)]
#[error("Photo '{photo}' failed during {stage}: {detail}")]
pub struct PhotoError {
    /// Source photo filename (the idempotency key).
    pub photo: String,
    /// Pipeline stage that failed.
    pub stage: PhotoStage,
    /// Human-readable failure detail.
    pub detail: String,
}

/// Pipeline stage names used in per-photo failure reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhotoStage {
    Split,
    Extract,
    Illustrate,
    Persist,
}

impl std::fmt::Display for PhotoStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            PhotoStage::Split => "split",
            PhotoStage::Extract => "extraction",
            PhotoStage::Illustrate => "illustration",
            PhotoStage::Persist => "persist",
        };
        f.write_str(s)
    }
}

/// Closed error classification for AI collaborator failures.
///
/// Collaborator implementations translate provider-specific errors into this
/// set at the boundary. The retry ladder in [`crate::pipeline::illustrate`]
/// retries only on [`AiError::ContentBlocked`].
#[derive(Debug, Error)]
pub enum AiError {
    /// The provider rejected the request on content-policy grounds.
    ///
    /// Resolved by the prompt-simplification ladder before being treated as
    /// a photo-level failure.
    #[error("Content blocked by provider: {0}")]
    ContentBlocked(String),

    /// The provider answered but returned no usable content.
    ///
    /// Surfaced as a distinct failure, never silently defaulted to an empty
    /// record.
    #[error("Provider returned no usable content: {0}")]
    EmptyResponse(String),

    /// Authentication or authorization failure — retry will not help.
    #[error("Authentication error: {0}")]
    Auth(String),

    /// The provider returned a non-retryable API error.
    #[error("AI API error: {0}")]
    Api(String),

    /// Transport-level failure (connection, TLS, timeout).
    #[error("HTTP error: {0}")]
    Http(String),

    /// The provider's response body could not be parsed.
    #[error("Malformed provider response: {0}")]
    MalformedResponse(String),
}

impl AiError {
    /// Translate a provider rejection message into the closed classification.
    ///
    /// Default rule, kept behavior-compatible with the historical heuristic:
    /// a message containing "blocklist" or "content" (case-insensitive) is a
    /// content-policy rejection; anything else is a plain API error.
    pub fn classify_rejection(message: impl Into<String>) -> AiError {
        let message = message.into();
        let lower = message.to_lowercase();
        if lower.contains("blocklist") || lower.contains("content") {
            AiError::ContentBlocked(message)
        } else {
            AiError::Api(message)
        }
    }

    /// True when the error is a content-policy rejection.
    pub fn is_content_blocked(&self) -> bool {
        matches!(self, AiError::ContentBlocked(_))
    }
}
