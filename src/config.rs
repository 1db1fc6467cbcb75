//! Configuration for a cookbook pipeline run.
//!
//! All pipeline behaviour is controlled through [`PipelineConfig`], built
//! via its [`PipelineConfigBuilder`]. The config is plain data with no side
//! effects and no live service handles — AI collaborators are passed to
//! [`crate::run::run`] as explicit arguments, so tests can substitute fakes
//! and two runs can be diffed by diffing their configs.
//!
//! # Design choice: builder over constructor
//! A many-field constructor breaks on every new field. The builder lets
//! callers set only what they care about and rely on defaults for the rest.

use crate::error::CookbookError;
use crate::pipeline::render::DocumentFormat;
use std::path::PathBuf;

/// Default target aspect ratio (width/height) for crop windows.
///
/// 4:5 portrait matches both common card photography and the conditioning
/// expectations of the image models this pipeline was tuned against.
pub const DEFAULT_ASPECT_RATIO: f64 = 0.8;

/// Default overlap between adjacent crops, as a fraction of the window.
///
/// 8 % is enough for a full line of card text to appear whole in at least
/// one crop without inflating the number of extraction images.
pub const DEFAULT_MARGIN_RATIO: f64 = 0.08;

/// Configuration for one pipeline run.
///
/// Built via [`PipelineConfig::builder()`].
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Directory containing source recipe card photos.
    pub input_dir: PathBuf,

    /// Directory for all outputs: records, crops, illustrations, documents.
    pub output_dir: PathBuf,

    /// Directory of reference style images. Required: the derived style
    /// description is shared by every illustration in the run.
    pub reference_style_dir: PathBuf,

    /// Target aspect ratio (width/height) for the splitter. Default: 0.8.
    pub target_aspect_ratio: f64,

    /// Crop overlap ratio in [0, 1); values ≥ 1 degrade to non-overlapping
    /// tiling in the splitter. Default: 0.08.
    pub margin_ratio: f64,

    /// Target language for extracted recipes. Default: "English".
    pub language: String,

    /// Document export format, or `None` to persist JSON records only.
    /// Default: `None`.
    pub documents: Option<DocumentFormat>,
}

impl PipelineConfig {
    /// Create a new builder with the given input, output, and style dirs.
    pub fn builder(
        input_dir: impl Into<PathBuf>,
        output_dir: impl Into<PathBuf>,
        reference_style_dir: impl Into<PathBuf>,
    ) -> PipelineConfigBuilder {
        PipelineConfigBuilder {
            config: PipelineConfig {
                input_dir: input_dir.into(),
                output_dir: output_dir.into(),
                reference_style_dir: reference_style_dir.into(),
                target_aspect_ratio: DEFAULT_ASPECT_RATIO,
                margin_ratio: DEFAULT_MARGIN_RATIO,
                language: "English".to_string(),
                documents: None,
            },
        }
    }

    /// Directory holding persisted recipe records, illustrations, and
    /// rendered documents.
    pub fn records_dir(&self) -> PathBuf {
        self.output_dir.join("recipes")
    }

    /// Scratch directory for split crops.
    pub fn splits_dir(&self) -> PathBuf {
        self.output_dir.join("splits")
    }
}

/// Builder for [`PipelineConfig`].
#[derive(Debug)]
pub struct PipelineConfigBuilder {
    config: PipelineConfig,
}

impl PipelineConfigBuilder {
    pub fn target_aspect_ratio(mut self, ratio: f64) -> Self {
        self.config.target_aspect_ratio = ratio;
        self
    }

    pub fn margin_ratio(mut self, margin: f64) -> Self {
        self.config.margin_ratio = margin;
        self
    }

    pub fn language(mut self, language: impl Into<String>) -> Self {
        self.config.language = language.into();
        self
    }

    pub fn documents(mut self, format: DocumentFormat) -> Self {
        self.config.documents = Some(format);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<PipelineConfig, CookbookError> {
        let c = &self.config;
        if !(c.target_aspect_ratio > 0.0 && c.target_aspect_ratio.is_finite()) {
            return Err(CookbookError::InvalidConfig(format!(
                "target aspect ratio must be a positive number, got {}",
                c.target_aspect_ratio
            )));
        }
        if !(c.margin_ratio >= 0.0 && c.margin_ratio.is_finite()) {
            return Err(CookbookError::InvalidConfig(format!(
                "margin ratio must be ≥ 0, got {}",
                c.margin_ratio
            )));
        }
        if c.language.trim().is_empty() {
            return Err(CookbookError::InvalidConfig(
                "language must not be empty".into(),
            ));
        }
        Ok(self.config)
    }
}
