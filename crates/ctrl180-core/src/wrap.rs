//! Greedy word wrap against a backend-supplied width function.

use crate::normalize::normalize;

/// Wrap one logical line into lines no wider than `box_width`.
///
/// Words accumulate while `measure(current + " " + word, size)` still fits.
/// A word wider than the box is never split; it gets a line to itself.
/// An empty or all-whitespace line produces no output.
pub fn wrap<M>(line: &str, measure: M, box_width: f32, size: f32) -> Vec<String>
where
    M: Fn(&str, f32) -> f32,
{
    let mut lines = Vec::new();
    let mut current = String::new();

    for word in line.split_whitespace() {
        if current.is_empty() {
            current.push_str(word);
            continue;
        }

        let candidate = format!("{current} {word}");
        if measure(&candidate, size) <= box_width {
            current = candidate;
        } else {
            lines.push(std::mem::replace(&mut current, word.to_string()));
        }
    }

    if !current.is_empty() {
        lines.push(current);
    }

    lines
}

/// Wrapped lines of a whole text block, capped at `max_lines`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WrappedText {
    pub lines: Vec<String>,
    /// True when lines beyond the cap were dropped.
    pub clipped: bool,
}

/// Normalize `text`, wrap every newline-separated line and keep at most
/// `max_lines` of the result. Excess lines are dropped, not carried over.
pub fn wrap_text<M>(text: &str, measure: M, box_width: f32, size: f32, max_lines: u32) -> WrappedText
where
    M: Fn(&str, f32) -> f32,
{
    let normalized = normalize(text);
    let mut lines: Vec<String> = normalized
        .split('\n')
        .flat_map(|line| wrap(line.trim(), &measure, box_width, size))
        .collect();

    let cap = max_lines.max(1) as usize;
    let clipped = lines.len() > cap;
    lines.truncate(cap);

    WrappedText { lines, clipped }
}
