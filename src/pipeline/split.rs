//! Aspect-ratio-preserving image splitting.
//!
//! Recipe card photos are usually much taller (or occasionally wider) than
//! the aspect ratio vision models handle well. Rather than squashing the
//! card — which destroys the small handwriting the extractor needs — we
//! slide a fixed-size window along the long axis and emit overlapping
//! crops. The overlap (`margin_ratio`) guarantees that a line of text cut
//! by one window boundary appears whole in the neighbouring crop, and the
//! crop index preserves reading order so the extractor can correlate
//! adjacent crops as continuations of the same card.
//!
//! The geometry is computed by [`plan_crops`], a pure function over
//! dimensions only, so every edge case is unit-testable without pixel data.
//!
//! ## Boundary convention
//!
//! Crops are emitted at offsets `0, step, 2·step, …` for as long as
//! `offset + window ≤ dimension`. No trailing crop is flushed against the
//! far edge when the last step falls short of it; the overlap margin is
//! what keeps edge content covered.

use crate::error::CookbookError;
use image::DynamicImage;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Ratio difference below which an image counts as already matching the
/// target. Avoids re-encoding a photo over a sub-percent mismatch.
const RATIO_TOLERANCE: f64 = 0.01;

/// A planned rectangular crop within a source image.
///
/// `index` is the zero-based traversal order and the sole key used to
/// reconstruct reading order downstream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CropRegion {
    pub left: u32,
    pub top: u32,
    pub right: u32,
    pub bottom: u32,
    pub index: usize,
}

impl CropRegion {
    /// Crop width in pixels.
    pub fn width(&self) -> u32 {
        self.right - self.left
    }

    /// Crop height in pixels.
    pub fn height(&self) -> u32 {
        self.bottom - self.top
    }
}

/// Plan the crop regions for an image of the given dimensions.
///
/// * An image already within [`RATIO_TOLERANCE`] of `target_ratio` yields a
///   single whole-image crop.
/// * A too-wide image is tiled by a vertical window of width
///   `round(height × target_ratio)` slid left to right.
/// * A too-tall image is tiled by a horizontal window of height
///   `round(width / target_ratio)` slid top to bottom.
/// * The step is `round(window × (1 − margin_ratio))`; a non-positive step
///   (margin_ratio ≥ 1) clamps to the window size, degenerating to
///   non-overlapping tiling rather than looping forever.
///
/// # Errors
///
/// [`CookbookError::InvalidGeometry`] when the window size computes to ≤ 0
/// (pathological ratio/dimension combination). Zero crops are never
/// silently returned.
pub fn plan_crops(
    width: u32,
    height: u32,
    target_ratio: f64,
    margin_ratio: f64,
) -> Result<Vec<CropRegion>, CookbookError> {
    if width == 0 || height == 0 || target_ratio <= 0.0 {
        return Err(CookbookError::InvalidGeometry {
            width,
            height,
            target_ratio,
            window: 0,
        });
    }

    let current_ratio = f64::from(width) / f64::from(height);
    if (current_ratio - target_ratio).abs() < RATIO_TOLERANCE {
        debug!(
            "{}x{} already matches target ratio {:.3}, single crop",
            width, height, target_ratio
        );
        return Ok(vec![CropRegion {
            left: 0,
            top: 0,
            right: width,
            bottom: height,
            index: 0,
        }]);
    }

    if current_ratio > target_ratio {
        // Too wide: slide a vertical window left to right.
        let window = (f64::from(height) * target_ratio).round() as i64;
        let offsets = window_offsets(u64::from(width), window, margin_ratio, width, height, target_ratio)?;
        Ok(offsets
            .into_iter()
            .enumerate()
            .map(|(index, left)| CropRegion {
                left: left as u32,
                top: 0,
                right: (left + window as u64) as u32,
                bottom: height,
                index,
            })
            .collect())
    } else {
        // Too tall: slide a horizontal window top to bottom.
        let window = (f64::from(width) / target_ratio).round() as i64;
        let offsets = window_offsets(u64::from(height), window, margin_ratio, width, height, target_ratio)?;
        Ok(offsets
            .into_iter()
            .enumerate()
            .map(|(index, top)| CropRegion {
                left: 0,
                top: top as u32,
                right: width,
                bottom: (top + window as u64) as u32,
                index,
            })
            .collect())
    }
}

/// Offsets of the sliding window along one dimension.
///
/// Validates the window, clamps a degenerate step, and walks
/// `0, step, 2·step, …` while the window still fits.
fn window_offsets(
    dimension: u64,
    window: i64,
    margin_ratio: f64,
    width: u32,
    height: u32,
    target_ratio: f64,
) -> Result<Vec<u64>, CookbookError> {
    if window <= 0 || window as u64 > dimension {
        return Err(CookbookError::InvalidGeometry {
            width,
            height,
            target_ratio,
            window,
        });
    }
    let window = window as u64;

    let mut step = (window as f64 * (1.0 - margin_ratio)).round() as i64;
    if step <= 0 {
        // margin_ratio ≥ 1 would stall the slide; fall back to
        // non-overlapping tiling.
        step = window as i64;
    }
    let step = step as u64;

    let mut offsets = Vec::new();
    let mut offset = 0u64;
    while offset + window <= dimension {
        offsets.push(offset);
        offset += step;
    }
    debug!(
        "window {} step {} over dimension {} -> {} crops",
        window,
        step,
        dimension,
        offsets.len()
    );
    Ok(offsets)
}

/// Split a loaded image into crops satisfying `target_ratio`.
///
/// Crops are returned in reading order (matching [`CropRegion::index`]).
pub fn split_image(
    image: &DynamicImage,
    target_ratio: f64,
    margin_ratio: f64,
) -> Result<Vec<DynamicImage>, CookbookError> {
    let regions = plan_crops(image.width(), image.height(), target_ratio, margin_ratio)?;
    Ok(regions
        .iter()
        .map(|r| image.crop_imm(r.left, r.top, r.width(), r.height()))
        .collect())
}

/// Split a photo on disk and write the crops as `{stem}_part{index}.jpg`
/// into `out_dir`, returning the crop paths in reading order.
pub fn split_to_files(
    photo_path: &Path,
    out_dir: &Path,
    target_ratio: f64,
    margin_ratio: f64,
) -> Result<Vec<PathBuf>, CookbookError> {
    std::fs::create_dir_all(out_dir).map_err(|e| CookbookError::OutputWriteFailed {
        path: out_dir.to_path_buf(),
        source: e,
    })?;

    let image = image::open(photo_path).map_err(|e| CookbookError::ImageReadFailed {
        path: photo_path.to_path_buf(),
        detail: e.to_string(),
    })?;
    let stem = photo_path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "photo".to_string());

    let crops = split_image(&image, target_ratio, margin_ratio)?;
    let mut paths = Vec::with_capacity(crops.len());
    for (index, crop) in crops.iter().enumerate() {
        let path = out_dir.join(format!("{stem}_part{index}.jpg"));
        // JPEG needs RGB; photos may decode with an alpha channel.
        crop.to_rgb8()
            .save_with_format(&path, image::ImageFormat::Jpeg)?;
        paths.push(path);
    }
    debug!("split {} -> {} crops", photo_path.display(), paths.len());
    Ok(paths)
}
