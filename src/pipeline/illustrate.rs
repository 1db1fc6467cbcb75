//! Illustration generation with the content-filter fallback ladder.
//!
//! Image-generation providers reject a small but annoying fraction of
//! legitimate recipe prompts on content-policy grounds. One rejected
//! illustration should not cost the photo, so generation walks a ladder of
//! three prompts of decreasing specificity:
//!
//! 1. full prompt — dish name + leading ingredients + style;
//! 2. simplified — dish name + style;
//! 3. generic — no dish-specific content at all.
//!
//! Only [`AiError::ContentBlocked`] moves down the ladder. Any other
//! failure (network, auth, quota) propagates immediately — retrying a dead
//! endpoint with a softer prompt helps nobody. A third-attempt failure of
//! any kind propagates; there is no rung below "generic meal".

use crate::ai::{IllustrationRequest, Illustrator};
use crate::error::{AiError, CookbookError};
use crate::pipeline::encode::ImageData;
use crate::prompts;
use crate::recipe::Recipe;
use std::path::Path;
use tracing::{info, warn};

/// Generate an illustration for `recipe`, writing the image bytes verbatim
/// to `output_path`.
///
/// `crops` are the photo's split crops (input conditioning) and
/// `style_images` the shared reference set; both ride along on every
/// attempt unchanged — only the text prompt softens.
pub async fn generate_illustration(
    illustrator: &dyn Illustrator,
    recipe: &Recipe,
    style: &str,
    crops: &[ImageData],
    style_images: &[ImageData],
    output_path: &Path,
) -> Result<(), CookbookError> {
    let prompts = [
        prompts::full_illustration_prompt(recipe, style),
        prompts::simplified_illustration_prompt(recipe, style),
        prompts::generic_illustration_prompt(style),
    ];
    let last = prompts.len() - 1;

    for (attempt, prompt) in prompts.iter().enumerate() {
        let request = IllustrationRequest {
            prompt: prompt.clone(),
            input_images: crops.to_vec(),
            style_images: style_images.to_vec(),
        };
        match illustrator.generate(&request).await {
            Ok(bytes) => {
                std::fs::write(output_path, &bytes).map_err(|e| {
                    CookbookError::OutputWriteFailed {
                        path: output_path.to_path_buf(),
                        source: e,
                    }
                })?;
                info!(
                    "illustration for '{}' written after attempt {} ({} bytes)",
                    recipe.dish_name,
                    attempt + 1,
                    bytes.len()
                );
                return Ok(());
            }
            Err(AiError::ContentBlocked(detail)) if attempt < last => {
                warn!(
                    "illustration attempt {} for '{}' content-blocked ({detail}), \
                     retrying with a simpler prompt",
                    attempt + 1,
                    recipe.dish_name
                );
            }
            Err(e) => return Err(e.into()),
        }
    }
    unreachable!("ladder returns or propagates within three attempts")
}
