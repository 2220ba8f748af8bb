//! Template auto-selection from the payload's dominant and second
//! profile categories.

use serde_json::Value;

use crate::error::CoreError;
use crate::models::template::{Category, TemplateChoice};
use crate::naming::template_filename;
use crate::payload::{TextLookup, lookup_text, value_text};

/// Pair used whenever the payload does not name a valid combination.
pub const DEFAULT_TEMPLATE_KEY: &str = "CT";

/// Payload paths carrying the dominant category, in priority order.
pub const DOMINANT_PATHS: &[&str] = &[
    "dominantKey",
    "domKey",
    "dominant",
    "ctrl.dominant",
    "profile.dominant",
    "state.dominant",
    "p1:dom",
];

/// Payload paths carrying the second category, in priority order.
pub const SECOND_PATHS: &[&str] = &[
    "secondKey",
    "secKey",
    "second",
    "ctrl.second",
    "profile.second",
    "state.second",
    "p1:sec",
];

/// Resolve one category from a free-form value.
///
/// Tries, in order: an exact single letter (`C`, `T`, `R`, `L`), a known
/// label word anywhere in the text (`concealed`, `triggered`, `regulated`,
/// `lead`), and finally the first character.
pub fn resolve_category(raw: &str) -> Option<Category> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }

    let mut chars = trimmed.chars();
    if let (Some(only), None) = (chars.next(), chars.next())
        && let Some(cat) = Category::from_letter(only)
    {
        return Some(cat);
    }

    let lower = trimmed.to_lowercase();
    if let Some(cat) = Category::ALL
        .into_iter()
        .find(|cat| lower.contains(cat.label()))
    {
        return Some(cat);
    }

    trimmed.chars().next().and_then(Category::from_letter)
}

/// True for the twelve ordered pairs of distinct categories.
pub fn is_valid_pair(dominant: Category, second: Category) -> bool {
    dominant != second
}

/// Pick the template for a payload. Never fails: anything unusable
/// resolves to [`DEFAULT_TEMPLATE_KEY`].
pub fn select_template(payload: &Value) -> TemplateChoice {
    let dominant = first_category(payload, DOMINANT_PATHS);
    let second = first_category(payload, SECOND_PATHS);

    let (template_key, defaulted) = match (dominant, second) {
        (Some(d), Some(s)) if is_valid_pair(d, s) => (format!("{d}{s}"), false),
        _ => {
            tracing::debug!(
                dominant = ?dominant,
                second = ?second,
                "template pair unresolved, using default"
            );
            (DEFAULT_TEMPLATE_KEY.to_string(), true)
        }
    };

    TemplateChoice {
        dominant_key: dominant,
        second_key: second,
        chosen_filename: template_filename(&template_key),
        template_key,
        defaulted,
    }
}

/// Strict variant of [`select_template`]: an unresolvable pair is an error
/// instead of the default.
pub fn select_template_strict(payload: &Value) -> Result<TemplateChoice, CoreError> {
    let choice = select_template(payload);
    if choice.defaulted {
        return Err(CoreError::UnresolvedTemplateCode {
            dominant: first_raw(payload, DOMINANT_PATHS),
            second: first_raw(payload, SECOND_PATHS),
        });
    }
    Ok(choice)
}

fn first_raw(payload: &Value, paths: &[&str]) -> Option<String> {
    paths.iter().find_map(|path| match lookup_text(payload, path) {
        TextLookup::Found(value) => Some(value_text(value)),
        _ => None,
    })
}

fn first_category(payload: &Value, paths: &[&str]) -> Option<Category> {
    first_raw(payload, paths).and_then(|raw| resolve_category(&raw))
}
