use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunRole {
    Heading,
    Bullet,
    Paragraph,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FontVariant {
    Regular,
    Bold,
}

/// One positioned line of text, ready to be drawn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OverlayRun {
    pub text: String,
    pub role: RunRole,
    pub font: FontVariant,
    pub size: f32,
    pub indent: f32,
    /// Left edge after indent and alignment, from the page's left edge.
    pub x: f32,
    /// Baseline, measured down from the page's top edge.
    pub baseline: f32,
    pub width: f32,
}

/// Result of laying out one box.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OverlayLayout {
    pub runs: Vec<OverlayRun>,
    pub lines_used: u32,
    /// True when content was dropped because the line cap was reached.
    pub clipped: bool,
    /// Vertical cursor after the last advance, from the page's top edge.
    pub cursor: f32,
}
