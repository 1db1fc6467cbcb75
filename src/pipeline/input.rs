//! Input enumeration and the processed-set scan.
//!
//! Candidates are discovered purely by file extension, sorted by filename
//! so runs are deterministic regardless of directory iteration order.
//!
//! ## Resumability
//!
//! A rerun must not re-extract (and re-bill) photos that already produced
//! a record. Every persisted record carries the `source_photo` it came
//! from, so scanning the output directory's JSON files once at run start
//! yields the set of already-processed filenames. The scan is one atomic
//! snapshot per run — records written mid-run are intentionally not
//! re-scanned. A malformed record file is skipped with a warning; it must
//! not block the scan from seeing the valid records around it.

use crate::recipe::Recipe;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Extensions accepted as candidate photos or reference images.
const IMAGE_EXTENSIONS: [&str; 3] = ["jpg", "jpeg", "png"];

/// True when the path carries a recognised image extension (case-insensitive).
fn is_image(path: &Path) -> bool {
    path.extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .is_some_and(|ext| IMAGE_EXTENSIONS.contains(&ext.as_str()))
}

/// List image files in `dir`, sorted by filename.
///
/// A missing or unreadable directory yields an empty list; the caller
/// decides whether that is fatal.
pub fn list_images(dir: &Path) -> Vec<PathBuf> {
    let mut paths: Vec<PathBuf> = match std::fs::read_dir(dir) {
        Ok(entries) => entries
            .filter_map(|e| e.ok())
            .map(|e| e.path())
            .filter(|p| p.is_file() && is_image(p))
            .collect(),
        Err(e) => {
            debug!("cannot read directory '{}': {e}", dir.display());
            Vec::new()
        }
    };
    paths.sort();
    paths
}

/// Scan persisted recipe records and collect their `source_photo` values.
///
/// Returns the processed set used for skip-on-rerun, plus the number of
/// record files seen (valid or not) so the caller can distinguish "first
/// run" from "fully processed input".
pub fn scan_processed(records_dir: &Path) -> (HashSet<String>, usize) {
    let mut processed = HashSet::new();
    let mut record_files = 0usize;

    let entries = match std::fs::read_dir(records_dir) {
        Ok(entries) => entries,
        Err(_) => return (processed, 0),
    };

    for entry in entries.filter_map(|e| e.ok()) {
        let path = entry.path();
        if path.extension().map(|e| e.to_string_lossy().to_lowercase()) != Some("json".into()) {
            continue;
        }
        record_files += 1;
        match std::fs::read_to_string(&path)
            .map_err(|e| e.to_string())
            .and_then(|text| serde_json::from_str::<Recipe>(&text).map_err(|e| e.to_string()))
        {
            Ok(recipe) => {
                if !recipe.source_photo.is_empty() {
                    processed.insert(recipe.source_photo);
                }
            }
            Err(e) => {
                warn!(
                    "skipping unreadable record '{}' during processed-set scan: {e}",
                    path.display()
                );
            }
        }
    }
    debug!(
        "processed-set scan: {} records, {} source photos",
        record_files,
        processed.len()
    );
    (processed, record_files)
}
