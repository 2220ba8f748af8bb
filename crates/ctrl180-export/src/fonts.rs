//! Base-14 Helvetica metrics and WinAnsi encoding.
//!
//! The report only uses the two standard fonts every PDF reader ships, so
//! nothing is embedded. Widths are the AFM advance widths in 1/1000 em.

use unicode_normalization::UnicodeNormalization;

use ctrl180_core::measure::TextMeasure;
use ctrl180_core::models::overlay::FontVariant;

/// Helvetica advance widths for codes 32..=126.
const HELVETICA: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278, // 32
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 278, 278, 584, 584, 584, 556, // 48
    1015, 667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, 722, 778, // 64
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 278, 278, 278, 469, 556, // 80
    333, 556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, 556, 556, // 96
    556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, 334, 260, 334, 584, // 112
];

/// Helvetica-Bold advance widths for codes 32..=126.
const HELVETICA_BOLD: [u16; 95] = [
    278, 333, 474, 556, 556, 889, 722, 238, 333, 333, 389, 584, 278, 333, 278, 278, // 32
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 333, 333, 584, 584, 584, 611, // 48
    975, 722, 722, 722, 722, 667, 611, 778, 722, 278, 556, 722, 611, 833, 722, 778, // 64
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 333, 278, 333, 584, 556, // 80
    333, 556, 611, 556, 611, 556, 333, 611, 611, 278, 278, 556, 278, 889, 611, 611, // 96
    611, 611, 389, 556, 333, 611, 556, 778, 556, 556, 500, 389, 280, 389, 584, // 112
];

const BULLET_WIDTH: u16 = 350;

/// Byte written for characters WinAnsi cannot represent.
const REPLACEMENT: u8 = b'?';

/// PostScript name of the standard font behind a variant.
pub fn base_font(variant: FontVariant) -> &'static str {
    match variant {
        FontVariant::Regular => "Helvetica",
        FontVariant::Bold => "Helvetica-Bold",
    }
}

/// Advance width of one character in 1/1000 em.
///
/// Accented letters use the width of their base letter; other non-ASCII
/// characters are approximated by the width of `?`.
pub fn char_width(ch: char, variant: FontVariant) -> u16 {
    let table = match variant {
        FontVariant::Regular => &HELVETICA,
        FontVariant::Bold => &HELVETICA_BOLD,
    };
    let ascii = |c: char| table[(c as usize) - 32];

    match ch {
        ' '..='~' => ascii(ch),
        '\u{2022}' => BULLET_WIDTH,
        _ => match ch.nfd().next() {
            Some(base @ ' '..='~') => ascii(base),
            _ => ascii('?'),
        },
    }
}

/// Width of `text` in points at `size`.
pub fn text_width(text: &str, variant: FontVariant, size: f32) -> f32 {
    let units: u32 = text.chars().map(|c| u32::from(char_width(c, variant))).sum();
    units as f32 * size / 1000.0
}

/// Width oracle for the standard fonts.
#[derive(Debug, Clone, Copy, Default)]
pub struct StandardFonts;

impl TextMeasure for StandardFonts {
    fn text_width(&self, text: &str, font: FontVariant, size: f32) -> f32 {
        text_width(text, font, size)
    }
}

/// Encode text for a simple font using WinAnsiEncoding.
pub fn encode_winansi(text: &str) -> Vec<u8> {
    text.chars()
        .filter(|c| !c.is_control())
        .map(|ch| match ch {
            ' '..='~' => ch as u8,
            '\u{00A0}'..='\u{00FF}' => ch as u32 as u8,
            other => winansi_high(other).unwrap_or(REPLACEMENT),
        })
        .collect()
}

/// The 0x80..=0x9F block, where WinAnsi departs from Latin-1.
fn winansi_high(ch: char) -> Option<u8> {
    let byte = match ch {
        '€' => 0x80,
        '‚' => 0x82,
        'ƒ' => 0x83,
        '„' => 0x84,
        '…' => 0x85,
        '†' => 0x86,
        '‡' => 0x87,
        'ˆ' => 0x88,
        '‰' => 0x89,
        'Š' => 0x8A,
        '‹' => 0x8B,
        'Œ' => 0x8C,
        'Ž' => 0x8E,
        '\u{2018}' => 0x91,
        '\u{2019}' => 0x92,
        '\u{201C}' => 0x93,
        '\u{201D}' => 0x94,
        '\u{2022}' => 0x95,
        '–' => 0x96,
        '—' => 0x97,
        '˜' => 0x98,
        '™' => 0x99,
        'š' => 0x9A,
        '›' => 0x9B,
        'œ' => 0x9C,
        'ž' => 0x9E,
        'Ÿ' => 0x9F,
        _ => return None,
    };
    Some(byte)
}
