use crate::models::overlay::FontVariant;

/// Width oracle supplied by the rendering backend.
///
/// The layout code has no glyph knowledge of its own; every width decision
/// goes through this trait.
pub trait TextMeasure {
    /// Advance width of `text` set in `font` at `size` points.
    fn text_width(&self, text: &str, font: FontVariant, size: f32) -> f32;
}

impl<F> TextMeasure for F
where
    F: Fn(&str, FontVariant, f32) -> f32,
{
    fn text_width(&self, text: &str, font: FontVariant, size: f32) -> f32 {
        self(text, font, size)
    }
}
