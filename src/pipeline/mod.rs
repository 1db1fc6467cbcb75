//! Pipeline stages for photo-to-cookbook conversion.
//!
//! Each submodule implements exactly one transformation step, so every
//! stage is independently testable and the orchestrator in [`crate::run`]
//! stays a thin control loop.
//!
//! ## Data Flow
//!
//! ```text
//! input ──▶ split ──▶ encode ──▶ extract ──▶ illustrate ──▶ render
//! (photos)  (crops)   (base64)   (Recipe)    (ladder)       (md/html)
//! ```
//!
//! 1. [`input`]      — enumerate candidate photos and scan persisted
//!    records for the processed set (resumability)
//! 2. [`split`]      — slide an aspect-ratio window over each photo,
//!    emitting overlapping crops in reading order
//! 3. [`encode`]     — base64-wrap crop files for the multimodal request body
//! 4. [`illustrate`] — drive image generation through the three-rung
//!    content-filter fallback ladder
//! 5. [`render`]     — Markdown/HTML documents and the gallery index
//!
//! Extraction and style derivation have no stage module of their own: they
//! are single capability calls, made directly by the orchestrator through
//! the [`crate::ai`] traits.

pub mod encode;
pub mod illustrate;
pub mod input;
pub mod render;
pub mod split;
