//! Integration tests for the pipeline orchestrator.
//!
//! These tests drive [`cookery::run`] end to end against scripted in-memory
//! AI capabilities and real files in temp directories — no network, no API
//! keys. Each test builds its own input/output/style tree, so they can run
//! in parallel.

use cookery::ai::{IllustrationRequest, Illustrator, RecipeExtractor, StyleDeriver};
use cookery::pipeline::encode::ImageData;
use cookery::{run, AiError, DocumentFormat, PhotoStage, PipelineConfig, Recipe};
use image::DynamicImage;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use tempfile::TempDir;

// ── Scripted capability fakes ────────────────────────────────────────────

/// Extractor that pops one canned result per call.
struct ScriptedExtractor {
    script: Mutex<Vec<Result<Recipe, AiError>>>,
    calls: AtomicUsize,
}

impl ScriptedExtractor {
    fn new(script: Vec<Result<Recipe, AiError>>) -> Self {
        ScriptedExtractor {
            script: Mutex::new(script),
            calls: AtomicUsize::new(0),
        }
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl RecipeExtractor for ScriptedExtractor {
    async fn extract(&self, _crops: &[ImageData], _language: &str) -> Result<Recipe, AiError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.script.lock().unwrap().remove(0)
    }
}

/// Style deriver returning a fixed description.
struct FixedStyle {
    calls: AtomicUsize,
}

impl FixedStyle {
    fn new() -> Self {
        FixedStyle {
            calls: AtomicUsize::new(0),
        }
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl StyleDeriver for FixedStyle {
    async fn derive_style(&self, references: &[ImageData]) -> Result<String, AiError> {
        assert!(!references.is_empty(), "references must be encoded and passed");
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok("Loose watercolor, warm palette".to_string())
    }
}

/// Illustrator that pops scripted results, defaulting to success.
struct ScriptedIllustrator {
    script: Mutex<Vec<Result<Vec<u8>, AiError>>>,
    calls: AtomicUsize,
}

impl ScriptedIllustrator {
    fn always_ok() -> Self {
        Self::new(Vec::new())
    }

    fn new(script: Vec<Result<Vec<u8>, AiError>>) -> Self {
        ScriptedIllustrator {
            script: Mutex::new(script),
            calls: AtomicUsize::new(0),
        }
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl Illustrator for ScriptedIllustrator {
    async fn generate(&self, _request: &IllustrationRequest) -> Result<Vec<u8>, AiError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let mut script = self.script.lock().unwrap();
        if script.is_empty() {
            Ok(b"png bytes".to_vec())
        } else {
            script.remove(0)
        }
    }
}

// ── Test fixtures ────────────────────────────────────────────────────────

/// A workspace with `photos/`, `style/`, and `out/` directories.
struct Fixture {
    _dir: TempDir,
    root: PathBuf,
}

impl Fixture {
    /// Create the workspace with `photo_count` card photos and one style
    /// reference image. Photos are 80x100 (exactly the default 0.8 target
    /// ratio), so each yields a single crop.
    fn new(photo_count: usize) -> Fixture {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().to_path_buf();
        std::fs::create_dir_all(root.join("photos")).unwrap();
        std::fs::create_dir_all(root.join("style")).unwrap();
        for i in 1..=photo_count {
            DynamicImage::new_rgb8(80, 100)
                .save(root.join("photos").join(format!("card_{i:02}.jpg")))
                .unwrap();
        }
        DynamicImage::new_rgb8(80, 100)
            .save(root.join("style").join("reference.jpg"))
            .unwrap();
        Fixture { _dir: dir, root }
    }

    fn config(&self) -> PipelineConfig {
        PipelineConfig::builder(
            self.root.join("photos"),
            self.root.join("out"),
            self.root.join("style"),
        )
        .documents(DocumentFormat::Markdown)
        .build()
        .unwrap()
    }

    fn records_dir(&self) -> PathBuf {
        self.root.join("out").join("recipes")
    }

    fn record_files(&self) -> Vec<PathBuf> {
        let mut files: Vec<PathBuf> = std::fs::read_dir(self.records_dir())
            .unwrap()
            .filter_map(|e| e.ok())
            .map(|e| e.path())
            .filter(|p| p.extension().is_some_and(|e| e == "json"))
            .collect();
        files.sort();
        files
    }
}

fn recipe(dish: &str) -> Result<Recipe, AiError> {
    let mut r = Recipe::new(dish);
    r.ingredients = vec!["flour".into(), "eggs".into()];
    r.cooking_steps = vec!["mix".into(), "bake".into()];
    Ok(r)
}

fn load_recipe(path: &Path) -> Recipe {
    serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap()
}

// ── Tests ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn first_run_processes_every_photo() {
    let fx = Fixture::new(2);
    let extractor = ScriptedExtractor::new(vec![recipe("Dish One"), recipe("Dish Two")]);
    let styler = FixedStyle::new();
    let illustrator = ScriptedIllustrator::always_ok();

    let output = run(&fx.config(), &extractor, &styler, &illustrator)
        .await
        .unwrap();

    assert_eq!(output.processed, 2);
    assert_eq!(output.skipped, 0);
    assert!(output.failed.is_empty());
    assert_eq!(styler.calls(), 1, "style must be derived exactly once per run");

    // One JSON record per photo, stamped with its source photo.
    let records = fx.record_files();
    assert_eq!(records.len(), 2);
    let sources: Vec<String> = records.iter().map(|p| load_recipe(p).source_photo).collect();
    assert!(sources.contains(&"card_01.jpg".to_string()));
    assert!(sources.contains(&"card_02.jpg".to_string()));

    // Illustration + markdown document per record.
    for record in &records {
        let stem = record.file_stem().unwrap().to_string_lossy();
        assert!(fx.records_dir().join(format!("{stem}_illustration.png")).exists());
        assert!(fx.records_dir().join(format!("{stem}.md")).exists());
    }

    // Gallery index lists both dishes.
    let index = std::fs::read_to_string(output.index.unwrap()).unwrap();
    assert!(index.contains("Dish One"));
    assert!(index.contains("Dish Two"));
}

#[tokio::test]
async fn rerun_on_unchanged_input_is_a_full_skip() {
    let fx = Fixture::new(2);
    let extractor = ScriptedExtractor::new(vec![recipe("Dish One"), recipe("Dish Two")]);
    let styler = FixedStyle::new();
    let illustrator = ScriptedIllustrator::always_ok();
    run(&fx.config(), &extractor, &styler, &illustrator)
        .await
        .unwrap();

    // Second run with fresh fakes: nothing may reach the capabilities.
    let extractor2 = ScriptedExtractor::new(Vec::new());
    let styler2 = FixedStyle::new();
    let illustrator2 = ScriptedIllustrator::always_ok();
    let output = run(&fx.config(), &extractor2, &styler2, &illustrator2)
        .await
        .unwrap();

    assert_eq!(output.processed, 0);
    assert_eq!(output.skipped, 2);
    assert!(output.written.is_empty(), "rerun must produce zero new outputs");
    assert_eq!(extractor2.calls(), 0);
    assert_eq!(illustrator2.calls(), 0);
    assert_eq!(styler2.calls(), 0, "fully skipped run needs no style derivation");
}

#[tokio::test]
async fn no_photos_on_first_run_is_fatal() {
    let fx = Fixture::new(0);
    let extractor = ScriptedExtractor::new(Vec::new());
    let styler = FixedStyle::new();
    let illustrator = ScriptedIllustrator::always_ok();

    let err = run(&fx.config(), &extractor, &styler, &illustrator)
        .await
        .unwrap_err();
    assert!(err.to_string().contains("No photos found"), "got: {err}");
}

#[tokio::test]
async fn missing_reference_images_is_fatal_before_any_photo() {
    let fx = Fixture::new(1);
    std::fs::remove_file(fx.root.join("style").join("reference.jpg")).unwrap();
    let extractor = ScriptedExtractor::new(vec![recipe("Dish One")]);
    let styler = FixedStyle::new();
    let illustrator = ScriptedIllustrator::always_ok();

    let err = run(&fx.config(), &extractor, &styler, &illustrator)
        .await
        .unwrap_err();
    assert!(err.to_string().contains("No reference images"), "got: {err}");
    assert_eq!(extractor.calls(), 0);
}

#[tokio::test]
async fn one_failed_photo_does_not_abort_the_batch() {
    let fx = Fixture::new(3);
    let extractor = ScriptedExtractor::new(vec![
        recipe("Dish One"),
        Err(AiError::Api("boom".into())),
        recipe("Dish Three"),
    ]);
    let styler = FixedStyle::new();
    let illustrator = ScriptedIllustrator::always_ok();

    let output = run(&fx.config(), &extractor, &styler, &illustrator)
        .await
        .unwrap();

    assert_eq!(output.processed, 2);
    assert_eq!(output.failed.len(), 1);
    assert_eq!(output.failed[0].photo, "card_02.jpg");
    assert_eq!(output.failed[0].stage, PhotoStage::Extract);

    let sources: Vec<String> = fx
        .record_files()
        .iter()
        .map(|p| load_recipe(p).source_photo)
        .collect();
    assert!(sources.contains(&"card_01.jpg".to_string()));
    assert!(sources.contains(&"card_03.jpg".to_string()));
    assert!(!sources.contains(&"card_02.jpg".to_string()));
}

#[tokio::test]
async fn empty_extraction_is_a_named_failure() {
    let fx = Fixture::new(1);
    let extractor = ScriptedExtractor::new(vec![Err(AiError::EmptyResponse(
        "extraction returned no content".into(),
    ))]);
    let styler = FixedStyle::new();
    let illustrator = ScriptedIllustrator::always_ok();

    let output = run(&fx.config(), &extractor, &styler, &illustrator)
        .await
        .unwrap();

    assert_eq!(output.processed, 0);
    assert_eq!(output.failed.len(), 1);
    assert!(output.failed[0].detail.contains("no usable content"));
    assert!(fx.record_files().is_empty());
}

#[tokio::test]
async fn content_blocked_illustrations_fall_down_the_ladder() {
    let fx = Fixture::new(1);
    let extractor = ScriptedExtractor::new(vec![recipe("Dish One")]);
    let styler = FixedStyle::new();
    let illustrator = ScriptedIllustrator::new(vec![
        Err(AiError::ContentBlocked("blocklist".into())),
        Err(AiError::ContentBlocked("content".into())),
        Ok(b"third time lucky".to_vec()),
    ]);

    let output = run(&fx.config(), &extractor, &styler, &illustrator)
        .await
        .unwrap();

    assert_eq!(output.processed, 1);
    assert_eq!(illustrator.calls(), 3);
    let illustration = fx
        .record_files()
        .first()
        .map(|p| {
            let stem = p.file_stem().unwrap().to_string_lossy().into_owned();
            fx.records_dir().join(format!("{stem}_illustration.png"))
        })
        .unwrap();
    assert_eq!(std::fs::read(illustration).unwrap(), b"third time lucky");
}

#[tokio::test]
async fn non_blocked_illustration_error_fails_the_photo_without_retry() {
    let fx = Fixture::new(1);
    let extractor = ScriptedExtractor::new(vec![recipe("Dish One")]);
    let styler = FixedStyle::new();
    let illustrator = ScriptedIllustrator::new(vec![Err(AiError::Auth("bad key".into()))]);

    let output = run(&fx.config(), &extractor, &styler, &illustrator)
        .await
        .unwrap();

    assert_eq!(illustrator.calls(), 1);
    assert_eq!(output.processed, 0);
    assert_eq!(output.failed.len(), 1);
    assert_eq!(output.failed[0].stage, PhotoStage::Illustrate);
}

#[tokio::test]
async fn corrupt_record_does_not_break_skip_scan_or_index() {
    let fx = Fixture::new(1);
    std::fs::create_dir_all(fx.records_dir()).unwrap();
    std::fs::write(fx.records_dir().join("broken.json"), b"{ nope").unwrap();

    let extractor = ScriptedExtractor::new(vec![recipe("Dish One")]);
    let styler = FixedStyle::new();
    let illustrator = ScriptedIllustrator::always_ok();

    let output = run(&fx.config(), &extractor, &styler, &illustrator)
        .await
        .unwrap();

    assert_eq!(output.processed, 1);
    let index = std::fs::read_to_string(output.index.unwrap()).unwrap();
    assert!(index.contains("Dish One"));
}

#[tokio::test]
async fn tall_photos_are_split_before_extraction() {
    let fx = Fixture::new(0);
    // 80x300 at target 0.8: window 100, step 92, offsets 0/92/184 → 3 crops.
    DynamicImage::new_rgb8(80, 300)
        .save(fx.root.join("photos").join("tall_card.jpg"))
        .unwrap();

    /// Extractor asserting it receives all crops of the card.
    struct CropCounting {
        seen: AtomicUsize,
    }

    #[async_trait::async_trait]
    impl RecipeExtractor for CropCounting {
        async fn extract(&self, crops: &[ImageData], _language: &str) -> Result<Recipe, AiError> {
            self.seen.store(crops.len(), Ordering::SeqCst);
            let mut r = Recipe::new("Tall Dish");
            r.ingredients = vec!["x".into()];
            Ok(r)
        }
    }

    let extractor = CropCounting {
        seen: AtomicUsize::new(0),
    };
    let styler = FixedStyle::new();
    let illustrator = ScriptedIllustrator::always_ok();

    let output = run(&fx.config(), &extractor, &styler, &illustrator)
        .await
        .unwrap();

    assert_eq!(output.processed, 1);
    assert_eq!(extractor.seen.load(Ordering::SeqCst), 3);
}
