//! The canonical structured recipe record and its on-disk naming scheme.
//!
//! A [`Recipe`] is created once by the extraction capability, stamped with
//! its `source_photo` by the orchestrator, serialised to a flat JSON file,
//! and never mutated again. Reruns either skip the photo (a record with the
//! same `source_photo` already exists) or produce a brand-new record.
//!
//! Output files are named from the run date plus a slug of the dish name,
//! **not** from the source photo name: two distinct dishes photographed on
//! the same day get distinct slugs and never collide. Re-photographing the
//! same dish on the same day would collide — an accepted tradeoff.

use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Structured recipe data extracted from one photo's crop set.
///
/// Sequence fields default to empty — a persisted record never contains
/// null collections. `dish_name` is the only required field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recipe {
    /// Name of the dish. Always present and non-blank.
    pub dish_name: String,

    /// A short, appetizing description or subtitle for the dish.
    #[serde(default)]
    pub description: String,

    /// Ingredient list, one item per entry, in listed order.
    #[serde(default)]
    pub ingredients: Vec<String>,

    /// Cooking steps in execution order.
    #[serde(default)]
    pub cooking_steps: Vec<String>,

    /// Preparation time including units, e.g. "15 min".
    #[serde(default)]
    pub preparation_time: String,

    /// Cooking time including units, e.g. "30 min".
    #[serde(default)]
    pub cooking_time: String,

    /// Number of servings, e.g. "2".
    #[serde(default)]
    pub servings: String,

    /// Optional cooking tips or notes.
    #[serde(default)]
    pub tips: Vec<String>,

    /// Filename of the source photo this recipe was extracted from.
    ///
    /// Populated by the orchestrator after extraction (the extractor does
    /// not know the filename). Used as the idempotency key when scanning
    /// persisted records on a rerun.
    #[serde(default)]
    pub source_photo: String,
}

impl Recipe {
    /// Minimal constructor used by tests and the extraction boundary.
    pub fn new(dish_name: impl Into<String>) -> Self {
        Recipe {
            dish_name: dish_name.into(),
            description: String::new(),
            ingredients: Vec::new(),
            cooking_steps: Vec::new(),
            preparation_time: String::new(),
            cooking_time: String::new(),
            servings: String::new(),
            tips: Vec::new(),
            source_photo: String::new(),
        }
    }
}

// Anything that is not a Unicode word character separates (or is dropped
// from) slug words. `\w` is Unicode-aware in the regex crate, so non-Latin
// dish names survive intact.
static NON_WORD: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^\w]+").expect("valid regex"));

/// Derive a filesystem-safe slug from a dish name.
///
/// Non-word characters are treated as word separators and dropped; each
/// remaining word is capitalized on its first letter and the words are
/// concatenated.
///
/// ```
/// use cookery::recipe::dish_slug;
/// assert_eq!(dish_slug("chicken tikka masala"), "ChickenTikkaMasala");
/// assert_eq!(dish_slug("Sauce béarnaise!"), "SauceBéarnaise");
/// ```
pub fn dish_slug(dish_name: &str) -> String {
    NON_WORD
        .split(dish_name)
        .filter(|word| !word.is_empty())
        .map(capitalize)
        .collect()
}

/// Uppercase the first character of a word, leaving the rest untouched.
fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Base name shared by every artifact of one processed photo:
/// `{YYYYMMDD}_{DishSlug}`.
///
/// The record lands at `{base}.json`, the illustration at
/// `{base}_illustration.png`, rendered documents at `{base}.md` / `{base}.html`.
pub fn output_base_name(date: NaiveDate, dish_name: &str) -> String {
    format!("{}_{}", date.format("%Y%m%d"), dish_slug(dish_name))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slug_capitalizes_and_concatenates() {
        assert_eq!(dish_slug("beef bourguignon"), "BeefBourguignon");
    }

    #[test]
    fn slug_strips_punctuation() {
        assert_eq!(dish_slug("mac & cheese, deluxe!"), "MacCheeseDeluxe");
    }

    #[test]
    fn slug_keeps_unicode_words() {
        assert_eq!(dish_slug("crème brûlée"), "CrèmeBrûlée");
        // Scripts without case pass through unchanged.
        assert_eq!(dish_slug("味噌汁"), "味噌汁");
    }

    #[test]
    fn slug_of_blank_name_is_empty() {
        assert_eq!(dish_slug("   "), "");
    }

    #[test]
    fn base_name_combines_date_and_slug() {
        let date = NaiveDate::from_ymd_opt(2026, 1, 8).unwrap();
        assert_eq!(output_base_name(date, "Test Dish"), "20260108_TestDish");
    }

    #[test]
    fn recipe_roundtrips_through_json() {
        let mut r = Recipe::new("Pad Thai");
        r.ingredients = vec!["noodles".into(), "tamarind".into()];
        r.cooking_steps = vec!["soak".into(), "fry".into()];
        r.source_photo = "card_01.jpg".into();
        let json = serde_json::to_string(&r).unwrap();
        let back: Recipe = serde_json::from_str(&json).unwrap();
        assert_eq!(back, r);
    }

    #[test]
    fn missing_collections_deserialize_as_empty() {
        let json = r#"{"dish_name": "Toast"}"#;
        let r: Recipe = serde_json::from_str(json).unwrap();
        assert!(r.ingredients.is_empty());
        assert!(r.cooking_steps.is_empty());
        assert!(r.tips.is_empty());
        assert!(r.source_photo.is_empty());
    }
}
