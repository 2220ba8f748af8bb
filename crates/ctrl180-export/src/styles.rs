use serde::{Deserialize, Serialize};

use ctrl180_core::models::overlay::FontVariant;

/// Drawing configuration for report overlays.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderStyles {
    /// Page resource name of the regular font. Chosen so it cannot collide
    /// with the template's own font names.
    pub regular_font_key: String,

    /// Page resource name of the bold font.
    pub bold_font_key: String,

    /// Page resource name of the chart image.
    pub chart_key: String,

    /// Fill color for text as RGB in `0.0..=1.0`.
    pub text_color: [f32; 3],
}

impl Default for RenderStyles {
    fn default() -> Self {
        Self {
            regular_font_key: "CtrlReg".to_string(),
            bold_font_key: "CtrlBold".to_string(),
            chart_key: "CtrlChart".to_string(),
            text_color: [0.0, 0.0, 0.0],
        }
    }
}

impl RenderStyles {
    pub fn font_key(&self, variant: FontVariant) -> &str {
        match variant {
            FontVariant::Regular => &self.regular_font_key,
            FontVariant::Bold => &self.bold_font_key,
        }
    }
}
