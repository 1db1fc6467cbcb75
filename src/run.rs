//! The pipeline orchestrator: the per-photo control loop.
//!
//! Per photo the loop drives split → extract → illustrate → persist, with
//! two guarantees the rest of the crate is built around:
//!
//! * **Failure isolation** — one bad photo is logged, recorded in the run
//!   report, and skipped; it never aborts the batch.
//! * **Resumability** — every record carries its `source_photo`, and a run
//!   starts by snapshotting the set of already-persisted source photos.
//!   Rerunning on an unchanged input directory produces zero new outputs.
//!
//! The AI collaborators are explicit arguments rather than config fields:
//! the orchestrator owns policy (ordering, skipping, the fallback ladder),
//! the capabilities own mechanism, and tests swap in fakes.

use crate::ai::{Illustrator, RecipeExtractor, StyleDeriver};
use crate::config::PipelineConfig;
use crate::error::{CookbookError, PhotoError, PhotoStage};
use crate::pipeline::{encode, illustrate, input, render, split};
use crate::recipe::{output_base_name, Recipe};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Result of one pipeline run.
///
/// `Ok(RunOutput)` is returned even when individual photos failed; check
/// [`RunOutput::failed`] for the per-photo report. Fatal setup errors are
/// the only `Err` cases.
#[derive(Debug, Default)]
pub struct RunOutput {
    /// Every artifact written for successfully processed photos, in
    /// processing order (record, illustration, documents).
    pub written: Vec<PathBuf>,
    /// Photos fully processed in this run.
    pub processed: usize,
    /// Photos skipped because a persisted record already covers them.
    pub skipped: usize,
    /// Per-photo failures; these photos' artifacts are absent from `written`.
    pub failed: Vec<PhotoError>,
    /// Path of the rebuilt gallery index, when the rebuild succeeded.
    pub index: Option<PathBuf>,
}

/// Run the pipeline over every eligible photo in the input directory.
///
/// # Errors
///
/// Fatal setup errors only:
/// * [`CookbookError::NoPhotosFound`] — no candidates and no prior outputs;
/// * [`CookbookError::NoReferenceImages`] — the shared style cannot be
///   derived, checked before any photo is touched;
/// * style derivation failure (the description is required by every photo).
pub async fn run(
    config: &PipelineConfig,
    extractor: &dyn RecipeExtractor,
    style_deriver: &dyn StyleDeriver,
    illustrator: &dyn Illustrator,
) -> Result<RunOutput, CookbookError> {
    let records_dir = config.records_dir();
    std::fs::create_dir_all(&records_dir).map_err(|e| CookbookError::OutputWriteFailed {
        path: records_dir.clone(),
        source: e,
    })?;

    // ── Step 1: Enumerate candidates and snapshot the processed set ──────
    let candidates = input::list_images(&config.input_dir);
    let (processed_set, record_count) = input::scan_processed(&records_dir);

    if candidates.is_empty() && record_count == 0 {
        return Err(CookbookError::NoPhotosFound {
            dir: config.input_dir.clone(),
        });
    }

    // ── Step 2: Reference style images are required up front ─────────────
    let reference_paths = input::list_images(&config.reference_style_dir);
    if reference_paths.is_empty() {
        return Err(CookbookError::NoReferenceImages {
            dir: config.reference_style_dir.clone(),
        });
    }

    let mut output = RunOutput::default();
    let remaining: Vec<&PathBuf> = candidates
        .iter()
        .filter(|p| {
            let name = photo_name(p);
            if processed_set.contains(&name) {
                debug!("skipping '{name}': record already exists");
                output.skipped += 1;
                false
            } else {
                true
            }
        })
        .collect();

    info!(
        "run start: {} candidates, {} already processed, {} to do",
        candidates.len(),
        output.skipped,
        remaining.len()
    );

    if remaining.is_empty() {
        // Fully processed input: a successful no-op run, not an error.
        output.index = rebuild_index(&records_dir, config);
        return Ok(output);
    }

    // ── Step 3: Derive the shared style description once ─────────────────
    let style_images = encode::encode_image_files(&reference_paths)?;
    let style = style_deriver.derive_style(&style_images).await?;
    info!("derived style description ({} chars)", style.len());

    // ── Step 4: Per-photo loop, failure-isolated ─────────────────────────
    let today = chrono::Local::now().date_naive();
    for photo in remaining {
        match process_photo(photo, config, &style, &style_images, extractor, illustrator, today)
            .await
        {
            Ok(mut written) => {
                output.processed += 1;
                output.written.append(&mut written);
            }
            Err(e) => {
                warn!("{e}");
                output.failed.push(e);
            }
        }
    }

    // ── Step 5: Rebuild the gallery index, best-effort ───────────────────
    output.index = rebuild_index(&records_dir, config);

    info!(
        "run complete: {} processed, {} skipped, {} failed",
        output.processed,
        output.skipped,
        output.failed.len()
    );
    Ok(output)
}

/// Bare filename of a photo path — the idempotency key.
fn photo_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Drive one photo through split → extract → illustrate → persist.
///
/// Every stage failure is wrapped into a [`PhotoError`] naming the photo
/// and the stage, so the caller can log and continue.
#[allow(clippy::too_many_arguments)]
async fn process_photo(
    photo: &Path,
    config: &PipelineConfig,
    style: &str,
    style_images: &[encode::ImageData],
    extractor: &dyn RecipeExtractor,
    illustrator: &dyn Illustrator,
    today: chrono::NaiveDate,
) -> Result<Vec<PathBuf>, PhotoError> {
    let name = photo_name(photo);
    let fail = |stage: PhotoStage| {
        let photo = name.clone();
        move |detail: String| PhotoError {
            photo,
            stage,
            detail,
        }
    };

    // Split into aspect-ratio crops.
    let crop_paths = split::split_to_files(
        photo,
        &config.splits_dir(),
        config.target_aspect_ratio,
        config.margin_ratio,
    )
    .map_err(|e| fail(PhotoStage::Split)(e.to_string()))?;
    debug!("'{name}': {} crops", crop_paths.len());

    // Extract the structured recipe from the crops, in reading order.
    let crops = encode::encode_image_files(&crop_paths)
        .map_err(|e| fail(PhotoStage::Extract)(e.to_string()))?;
    let mut recipe = extractor
        .extract(&crops, &config.language)
        .await
        .map_err(|e| fail(PhotoStage::Extract)(e.to_string()))?;
    if recipe.dish_name.trim().is_empty() {
        return Err(fail(PhotoStage::Extract)(
            "extractor returned a blank dish name".into(),
        ));
    }
    // The extractor does not know the filename; stamp the idempotency key here.
    recipe.source_photo = name.clone();

    let base = output_base_name(today, &recipe.dish_name);
    let records_dir = config.records_dir();
    let illustration_path = records_dir.join(format!("{base}_illustration.png"));

    // Illustration with the content-filter fallback ladder.
    illustrate::generate_illustration(
        illustrator,
        &recipe,
        style,
        &crops,
        style_images,
        &illustration_path,
    )
    .await
    .map_err(|e| fail(PhotoStage::Illustrate)(e.to_string()))?;

    // Persist the record (always) and documents (when export is enabled).
    let mut written = vec![illustration_path.clone()];
    let record_path = records_dir.join(format!("{base}.json"));
    let json = serde_json::to_string_pretty(&recipe)
        .map_err(|e| fail(PhotoStage::Persist)(e.to_string()))?;
    std::fs::write(&record_path, json).map_err(|e| fail(PhotoStage::Persist)(e.to_string()))?;
    written.push(record_path);

    let illustration_name = format!("{base}_illustration.png");
    if let Some(format) = config.documents {
        if format.wants_markdown() {
            let path = records_dir.join(format!("{base}.md"));
            let md = render::render_recipe_markdown(&recipe, &illustration_name);
            std::fs::write(&path, md).map_err(|e| fail(PhotoStage::Persist)(e.to_string()))?;
            written.push(path);
        }
        if format.wants_html() {
            let path = records_dir.join(format!("{base}.html"));
            let html = render::render_recipe_html(&recipe, &illustration_name);
            std::fs::write(&path, html).map_err(|e| fail(PhotoStage::Persist)(e.to_string()))?;
            written.push(path);
        }
    }

    info!("'{name}' -> {base}");
    Ok(written)
}

/// Rescan persisted records and rewrite the gallery index.
///
/// Best-effort by contract: a malformed record is logged and skipped, and
/// an index write failure is logged rather than failing the run.
fn rebuild_index(records_dir: &Path, config: &PipelineConfig) -> Option<PathBuf> {
    let mut entries = Vec::new();

    let dir = match std::fs::read_dir(records_dir) {
        Ok(dir) => dir,
        Err(e) => {
            warn!("index rebuild: cannot read '{}': {e}", records_dir.display());
            return None;
        }
    };

    for entry in dir.filter_map(|e| e.ok()) {
        let path = entry.path();
        if path.extension().map(|e| e.to_string_lossy().to_lowercase()) != Some("json".into()) {
            continue;
        }
        let stem = match path.file_stem() {
            Some(stem) => stem.to_string_lossy().into_owned(),
            None => continue,
        };
        let recipe: Recipe = match std::fs::read_to_string(&path)
            .map_err(|e| e.to_string())
            .and_then(|text| serde_json::from_str(&text).map_err(|e| e.to_string()))
        {
            Ok(recipe) => recipe,
            Err(e) => {
                warn!("index rebuild: skipping '{}': {e}", path.display());
                continue;
            }
        };

        // Link the richest artifact available for the configured format;
        // with export disabled the JSON record itself is the document.
        let document = match config.documents {
            Some(f) if f.wants_markdown() => format!("{stem}.md"),
            Some(_) => format!("{stem}.html"),
            None => format!("{stem}.json"),
        };
        entries.push(render::IndexEntry {
            dish_name: recipe.dish_name,
            document,
            illustration: format!("{stem}_illustration.png"),
        });
    }

    let index_path = records_dir.join("index.md");
    let content = render::render_index(&entries);
    match std::fs::write(&index_path, content) {
        Ok(()) => {
            debug!("index rebuilt with {} entries", entries.len());
            Some(index_path)
        }
        Err(e) => {
            warn!("index rebuild: write failed: {e}");
            None
        }
    }
}
