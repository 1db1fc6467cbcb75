//! Prompt text for the AI capabilities.
//!
//! Centralising every prompt here serves two purposes:
//!
//! 1. **Single source of truth** — tweaking the extraction rules or the
//!    illustration style language requires editing exactly one place.
//!
//! 2. **Testability** — the fallback ladder tests can assert which prompt
//!    tier reached the provider without spinning up a real model.
//!
//! The three illustration builders form a deliberate ladder of decreasing
//! specificity. Image-generation content filters occasionally trip on dish
//! names or ingredients (organ meats, alcohol, brand names); each rung
//! drops the part most likely to have offended while keeping the shared
//! style so the cookbook stays visually coherent.

use crate::recipe::Recipe;

/// System prompt for structured recipe extraction.
pub const EXTRACTION_SYSTEM_PROMPT: &str =
    "You are an expert chef transcribing recipes from photographed recipe cards. \
     Return structured data only.";

/// At most this many ingredients are listed in the full illustration prompt.
/// Beyond that the prompt stops helping composition and starts tripping filters.
const MAX_PROMPT_INGREDIENTS: usize = 7;

/// User prompt for recipe extraction, in the configured target language.
///
/// The crops are attached after this text, in reading order; the prompt
/// tells the model to treat them as overlapping views of one card.
pub fn extraction_prompt(language: &str) -> String {
    format!(
        "The attached images are overlapping crops of a single recipe card, \
         in reading order. Transcribe the complete recipe they describe.\n\
         - Combine the crops; text near a crop boundary appears in two crops — do not duplicate it.\n\
         - Keep ingredients in their listed order and steps in execution order.\n\
         - Write all output in {language}.\n\
         - Leave any field you cannot read empty rather than guessing."
    )
}

/// Prompt for deriving a shared style description from reference images.
pub const STYLE_DERIVATION_PROMPT: &str =
    "Describe the shared visual style of the attached reference illustrations \
     in one short paragraph: medium, palette, line quality, composition, mood. \
     Write it as a reusable art direction brief, without referring to the \
     specific subjects depicted.";

/// Negative-instruction boilerplate shared by every illustration tier.
const ILLUSTRATION_CONSTRAINTS: &str =
    "No text, no lettering, no watermark. Clean, uncluttered background.";

/// Tier 1: full prompt — dish name, leading ingredients, derived style.
pub fn full_illustration_prompt(recipe: &Recipe, style: &str) -> String {
    let ingredients = recipe
        .ingredients
        .iter()
        .take(MAX_PROMPT_INGREDIENTS)
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join(", ");
    format!(
        "An appetizing illustration of the dish \"{}\".\n\
         Key ingredients: {}.\n\
         Style: {}\n\
         {}",
        recipe.dish_name, ingredients, style, ILLUSTRATION_CONSTRAINTS
    )
}

/// Tier 2: simplified prompt — dish name and style only, no ingredient
/// list, no structural markup.
pub fn simplified_illustration_prompt(recipe: &Recipe, style: &str) -> String {
    format!(
        "An appetizing illustration of {}. Style: {} {}",
        recipe.dish_name, style, ILLUSTRATION_CONSTRAINTS
    )
}

/// Tier 3: fully generic prompt with no dish-specific content at all.
pub fn generic_illustration_prompt(style: &str) -> String {
    format!(
        "An appetizing illustration of a delicious home-cooked meal on a plate. \
         Style: {style} {ILLUSTRATION_CONSTRAINTS}"
    )
}
