//! Presentation: recipe documents and the gallery index.
//!
//! Pure string builders — no I/O in the render functions, so the exact
//! output shape is unit-testable. The orchestrator owns writing the
//! results to disk.

use crate::recipe::Recipe;

/// Which document format(s) to export alongside the JSON record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DocumentFormat {
    /// Markdown only (default).
    #[default]
    Markdown,
    /// HTML only.
    Html,
    /// Both Markdown and HTML.
    Both,
}

impl DocumentFormat {
    pub fn wants_markdown(self) -> bool {
        matches!(self, DocumentFormat::Markdown | DocumentFormat::Both)
    }

    pub fn wants_html(self) -> bool {
        matches!(self, DocumentFormat::Html | DocumentFormat::Both)
    }
}

/// Render a recipe as a Markdown document.
///
/// `illustration` is the illustration filename, referenced relative to the
/// document (both live in the same output directory).
pub fn render_recipe_markdown(recipe: &Recipe, illustration: &str) -> String {
    let mut out = String::new();
    out.push_str(&format!("# {}\n\n", recipe.dish_name));
    if !recipe.description.is_empty() {
        out.push_str(&format!("*{}*\n\n", recipe.description));
    }
    out.push_str(&format!("![{}]({})\n\n", recipe.dish_name, illustration));

    out.push_str(&format!(
        "**Preparation:** {} · **Cooking:** {} · **Servings:** {}\n\n",
        or_dash(&recipe.preparation_time),
        or_dash(&recipe.cooking_time),
        or_dash(&recipe.servings),
    ));

    out.push_str("## Ingredients\n");
    for item in &recipe.ingredients {
        out.push_str(&format!("- {item}\n"));
    }
    out.push('\n');

    out.push_str("## Steps\n");
    for (i, step) in recipe.cooking_steps.iter().enumerate() {
        out.push_str(&format!("{}. {step}\n", i + 1));
    }

    if !recipe.tips.is_empty() {
        out.push_str("\n## Tips\n");
        for tip in &recipe.tips {
            out.push_str(&format!("- {tip}\n"));
        }
    }
    out
}

/// Render a recipe as a printable HTML page.
pub fn render_recipe_html(recipe: &Recipe, illustration: &str) -> String {
    let description = if recipe.description.is_empty() {
        String::new()
    } else {
        format!("    <p class=\"description\">{}</p>\n", escape(&recipe.description))
    };

    let ingredients: String = recipe
        .ingredients
        .iter()
        .map(|i| format!("      <li>{}</li>\n", escape(i)))
        .collect();
    let steps: String = recipe
        .cooking_steps
        .iter()
        .map(|s| format!("      <li>{}</li>\n", escape(s)))
        .collect();

    let notes = if recipe.tips.is_empty() {
        String::new()
    } else {
        format!(
            "    <div class=\"notes\">\n      <h3>Notes</h3>\n      <p>{}</p>\n    </div>\n",
            escape(&recipe.tips.join(" "))
        )
    };

    format!(
        "<!DOCTYPE html>\n<html>\n<head>\n  <meta charset=\"utf-8\">\n  <title>{title}</title>\n</head>\n<body>\n  <article class=\"recipe\">\n    <h1>{title}</h1>\n{description}    <img src=\"{illustration}\" alt=\"{title}\">\n    <p class=\"meta\">Servings: {servings} · Prep: {prep} · Cook: {cook}</p>\n    <h2>Ingredients</h2>\n    <ul>\n{ingredients}    </ul>\n    <h2>Steps</h2>\n    <ol>\n{steps}    </ol>\n{notes}  </article>\n</body>\n</html>\n",
        title = escape(&recipe.dish_name),
        illustration = illustration,
        servings = or_dash(&recipe.servings),
        prep = or_dash(&recipe.preparation_time),
        cook = or_dash(&recipe.cooking_time),
    )
}

/// One gallery index entry: a persisted dish and its artifact filenames.
#[derive(Debug, Clone)]
pub struct IndexEntry {
    pub dish_name: String,
    pub document: String,
    pub illustration: String,
}

/// Render the gallery index as Markdown, dishes sorted alphabetically by
/// name.
pub fn render_index(entries: &[IndexEntry]) -> String {
    let mut sorted: Vec<&IndexEntry> = entries.iter().collect();
    sorted.sort_by(|a, b| a.dish_name.cmp(&b.dish_name));

    let mut out = String::from("# Cookbook\n\n");
    for entry in sorted {
        out.push_str(&format!(
            "- [{}]({}) — [illustration]({})\n",
            entry.dish_name, entry.document, entry.illustration
        ));
    }
    out
}

fn or_dash(value: &str) -> &str {
    if value.is_empty() {
        "-"
    } else {
        value
    }
}

/// Minimal HTML escaping for text interpolated into the page.
fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}
