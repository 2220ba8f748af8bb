//! Overlay layout engine.
//!
//! Turns a narrative block into positioned lines. The text follows an
//! authoring convention rather than a schema:
//!
//! - a paragraph that starts with the word `What` and ends with a colon is
//!   a section heading, drawn bold one point larger with extra space above
//! - a paragraph starting with `- ` is a bullet, drawn with `•` and a
//!   10 point indent
//! - anything else is a plain paragraph
//!
//! Output stops once the box's line cap is reached, even mid-paragraph.

use std::sync::LazyLock;

use regex::Regex;

use crate::measure::TextMeasure;
use crate::models::layout::{Align, LayoutBox};
use crate::models::overlay::{FontVariant, OverlayLayout, OverlayRun, RunRole};
use crate::normalize::normalize;
use crate::wrap::{wrap, wrap_text};

/// Indent applied to bullet lines.
pub const BULLET_INDENT: f32 = 10.0;

/// Glyph prefixed to bullet lines. WinAnsi encodes it as 0x95.
pub const BULLET_GLYPH: &str = "\u{2022} ";

static HEADING: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^what\b.*:\s*$").expect("static heading pattern"));

static BULLET: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^-\s+").expect("static bullet pattern"));

static PARAGRAPH_BREAK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n+").expect("static paragraph pattern"));

/// Role of one logical line under the authoring convention.
pub fn classify(line: &str) -> RunRole {
    if HEADING.is_match(line) {
        RunRole::Heading
    } else if BULLET.is_match(line) {
        RunRole::Bullet
    } else {
        RunRole::Paragraph
    }
}

/// Lay out a structured narrative block inside `bx`.
pub fn layout_overlay<M: TextMeasure + ?Sized>(
    text: &str,
    bx: &LayoutBox,
    measure: &M,
) -> OverlayLayout {
    let mut cursor = Cursor::new(bx);
    let normalized = normalize(text);
    if normalized.is_empty() {
        return cursor.finish();
    }

    let base_size = bx.size.max(1.0);
    let heading_size = base_size + 1.0;
    let body_advance = base_size + bx.line_gap;
    let heading_advance = heading_size + bx.line_gap;

    for raw in PARAGRAPH_BREAK.split(&normalized) {
        let line = raw.trim();
        if line.is_empty() {
            cursor.y += body_advance;
            continue;
        }

        match classify(line) {
            RunRole::Heading => {
                cursor.y += heading_advance * 2.0;
                let title = format!(
                    "{}:",
                    line.trim_end_matches(|c: char| c == ':' || c.is_whitespace())
                );
                cursor.push(&title, RunRole::Heading, FontVariant::Bold, heading_size, 0.0, measure);
                cursor.y += heading_advance * 0.5;
            }
            RunRole::Bullet => {
                let body = BULLET.replace(line, "");
                let bulleted = format!("{BULLET_GLYPH}{body}");
                cursor.push(
                    &bulleted,
                    RunRole::Bullet,
                    FontVariant::Regular,
                    base_size,
                    BULLET_INDENT,
                    measure,
                );
            }
            RunRole::Paragraph => {
                cursor.push(line, RunRole::Paragraph, FontVariant::Regular, base_size, 0.0, measure);
            }
        }
    }

    cursor.finish()
}

/// Lay out a plain text box: no heading or bullet detection, every
/// newline-separated line wrapped at full width.
pub fn layout_plain<M: TextMeasure + ?Sized>(
    text: &str,
    bx: &LayoutBox,
    measure: &M,
) -> OverlayLayout {
    let size = bx.size.max(1.0);
    let wrapped = wrap_text(
        text,
        |s, sz| measure.text_width(s, FontVariant::Regular, sz),
        bx.w,
        size,
        bx.effective_max_lines(),
    );

    let mut y = bx.y;
    let mut runs = Vec::with_capacity(wrapped.lines.len());
    for line in wrapped.lines {
        let width = measure.text_width(&line, FontVariant::Regular, size);
        runs.push(OverlayRun {
            x: aligned_x(bx, 0.0, width),
            baseline: y + size,
            text: line,
            role: RunRole::Paragraph,
            font: FontVariant::Regular,
            size,
            indent: 0.0,
            width,
        });
        y += bx.line_height();
    }

    OverlayLayout {
        lines_used: runs.len() as u32,
        runs,
        clipped: wrapped.clipped,
        cursor: y,
    }
}

/// Left edge of a line. Center and right alignment measure against the
/// full box width and ignore the indent.
fn aligned_x(bx: &LayoutBox, indent: f32, width: f32) -> f32 {
    match bx.align {
        Align::Left => bx.x + indent,
        Align::Center => bx.x + (bx.w - width) / 2.0,
        Align::Right => bx.x + (bx.w - width),
    }
}

struct Cursor<'a> {
    bx: &'a LayoutBox,
    y: f32,
    max_lines: u32,
    runs: Vec<OverlayRun>,
    clipped: bool,
}

impl<'a> Cursor<'a> {
    fn new(bx: &'a LayoutBox) -> Self {
        Self {
            bx,
            y: bx.y,
            max_lines: bx.effective_max_lines(),
            runs: Vec::new(),
            clipped: false,
        }
    }

    fn used(&self) -> u32 {
        self.runs.len() as u32
    }

    fn push<M: TextMeasure + ?Sized>(
        &mut self,
        line: &str,
        role: RunRole,
        font: FontVariant,
        size: f32,
        indent: f32,
        measure: &M,
    ) {
        if self.used() >= self.max_lines {
            self.clipped = true;
            return;
        }

        let segments = wrap(
            line,
            |s, sz| measure.text_width(s, font, sz),
            self.bx.w - indent,
            size,
        );

        for segment in segments {
            if self.used() >= self.max_lines {
                self.clipped = true;
                break;
            }
            let width = measure.text_width(&segment, font, size);
            self.runs.push(OverlayRun {
                x: aligned_x(self.bx, indent, width),
                baseline: self.y + size,
                text: segment,
                role,
                font,
                size,
                indent,
                width,
            });
            self.y += size + self.bx.line_gap;
        }
    }

    fn finish(self) -> OverlayLayout {
        OverlayLayout {
            lines_used: self.used(),
            runs: self.runs,
            clipped: self.clipped,
            cursor: self.y,
        }
    }
}
