use std::fmt;

use serde::{Deserialize, Serialize};

/// One of the four profile categories a template variant is authored for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    #[serde(rename = "C")]
    Concealed,
    #[serde(rename = "T")]
    Triggered,
    #[serde(rename = "R")]
    Regulated,
    #[serde(rename = "L")]
    Lead,
}

impl Category {
    pub const ALL: [Category; 4] = [
        Category::Concealed,
        Category::Triggered,
        Category::Regulated,
        Category::Lead,
    ];

    pub fn letter(self) -> char {
        match self {
            Category::Concealed => 'C',
            Category::Triggered => 'T',
            Category::Regulated => 'R',
            Category::Lead => 'L',
        }
    }

    /// Lowercase word whose presence in a label identifies the category.
    pub fn label(self) -> &'static str {
        match self {
            Category::Concealed => "concealed",
            Category::Triggered => "triggered",
            Category::Regulated => "regulated",
            Category::Lead => "lead",
        }
    }

    pub fn from_letter(c: char) -> Option<Category> {
        Category::ALL
            .into_iter()
            .find(|cat| cat.letter() == c.to_ascii_uppercase())
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.letter())
    }
}

/// Outcome of template auto-selection for one payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateChoice {
    pub dominant_key: Option<Category>,
    pub second_key: Option<Category>,
    /// Two-letter code actually used, e.g. `CT`.
    pub template_key: String,
    /// True when the resolved pair was unusable and the default was taken.
    pub defaulted: bool,
    pub chosen_filename: String,
}
