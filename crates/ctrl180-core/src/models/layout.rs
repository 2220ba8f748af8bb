use std::collections::BTreeMap;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Default font size for plain text boxes.
pub const DEFAULT_TEXT_SIZE: f32 = 12.0;

/// Default gap between lines of a plain text box.
pub const DEFAULT_LINE_GAP: f32 = 3.0;

/// Line cap used when a box has neither `max_lines` nor a height.
pub const DEFAULT_MAX_LINES: u32 = 40;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Align {
    #[default]
    Left,
    Center,
    Right,
}

impl FromStr for Align {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "left" => Ok(Align::Left),
            "center" | "centre" => Ok(Align::Center),
            "right" => Ok(Align::Right),
            other => Err(format!("unknown alignment: {other}")),
        }
    }
}

/// A rectangular placement on a page.
///
/// Coordinates are PDF points measured from the page's top-left corner;
/// the render driver flips them into PDF user space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutBox {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub h: Option<f32>,
    pub size: f32,
    pub line_gap: f32,
    #[serde(default)]
    pub align: Align,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_lines: Option<u32>,
}

impl Default for LayoutBox {
    fn default() -> Self {
        Self {
            x: 40.0,
            y: 40.0,
            w: 540.0,
            h: None,
            size: DEFAULT_TEXT_SIZE,
            line_gap: DEFAULT_LINE_GAP,
            align: Align::Left,
            max_lines: None,
        }
    }
}

impl LayoutBox {
    /// Vertical advance of one body line.
    pub fn line_height(&self) -> f32 {
        self.size.max(1.0) + self.line_gap
    }

    /// Effective line cap: explicit, else what fits in `h`, else the default.
    pub fn effective_max_lines(&self) -> u32 {
        if let Some(max) = self.max_lines {
            return max.max(1);
        }
        match self.h {
            Some(h) => ((h / self.line_height()).floor() as u32).max(1),
            None => DEFAULT_MAX_LINES,
        }
    }
}

/// How a box is drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BoxKind {
    /// Plain wrapped text, no heading or bullet detection.
    Text,
    /// Structured narrative through the overlay layout engine.
    Overlay,
    /// The fetched chart image, scaled into `w` x `h`.
    Image,
}

/// Which resolved field feeds a box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldSlot {
    Name,
    DateLabel,
    Summary,
    Frequency,
    Sequence,
    ThemePair,
    Tip(usize),
    ColleaguesNarrative,
    ColleaguesQuestions,
    LeadersNarrative,
    LeadersQuestions,
    Chart,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoxSpec {
    /// 1-based page numbers the box is drawn on.
    pub pages: Vec<usize>,
    pub kind: BoxKind,
    pub slot: FieldSlot,
    pub geometry: LayoutBox,
}

/// Every box of the report, keyed by box id.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LayoutTable {
    pub boxes: BTreeMap<String, BoxSpec>,
}

/// Per-request adjustments to one box. Unset fields keep the base value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoxOverride {
    pub x: Option<f32>,
    pub y: Option<f32>,
    pub w: Option<f32>,
    pub h: Option<f32>,
    pub size: Option<f32>,
    pub line_gap: Option<f32>,
    pub max_lines: Option<u32>,
    pub align: Option<Align>,
    pub dx: Option<f32>,
    pub dy: Option<f32>,
}

impl BoxOverride {
    pub fn is_empty(&self) -> bool {
        *self == BoxOverride::default()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LayoutOverrides {
    pub boxes: BTreeMap<String, BoxOverride>,
}

impl LayoutOverrides {
    pub fn is_empty(&self) -> bool {
        self.boxes.values().all(BoxOverride::is_empty)
    }
}
