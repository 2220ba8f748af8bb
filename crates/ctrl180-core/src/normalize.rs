//! Text normalization for standard-font rendering.
//!
//! The report is drawn with the base-14 Helvetica fonts, which only cover
//! WinAnsi. Anything authored with typographic punctuation, arrows or
//! invisible characters is folded to a plain ASCII approximation here, so
//! the layout engine and the width oracle only ever see safe text.

use unicode_normalization::UnicodeNormalization;

/// Normalize `raw`, treating `None` as the empty string.
pub fn normalize_opt(raw: Option<&str>) -> String {
    normalize_or(raw, "")
}

/// Normalize `raw`, or `fallback` when there is no input.
pub fn normalize_or(raw: Option<&str>, fallback: &str) -> String {
    normalize(raw.unwrap_or(fallback))
}

/// Canonicalize arbitrary text into the plain form the layout engine expects.
///
/// Newlines are preserved as paragraph separators; every other whitespace
/// run collapses to one space and line ends are trimmed. The function is
/// idempotent.
pub fn normalize(raw: &str) -> String {
    // Stripping invisible characters can put a combining mark next to a new
    // base character, so repeat until the text is stable.
    let mut current = normalize_pass(raw);
    for _ in 0..4 {
        let next = normalize_pass(&current);
        if next == current {
            break;
        }
        current = next;
    }
    current
}

fn normalize_pass(raw: &str) -> String {
    let mut folded = String::with_capacity(raw.len());
    for ch in raw.nfkc() {
        fold_char(ch, &mut folded);
    }
    collapse_whitespace(&folded)
}

fn fold_char(ch: char, out: &mut String) {
    match ch {
        '\u{2018}' | '\u{2019}' => out.push('\''),
        '\u{201C}' | '\u{201D}' => out.push('"'),
        '\u{2010}'..='\u{2014}' => out.push('-'),
        '\u{2026}' => out.push_str("..."),
        '\u{00A0}' | '\t' => out.push(' '),
        '\u{2022}' | '\u{00B7}' => out.push('-'),
        '\u{2194}' => out.push_str("<->"),
        '\u{2192}' | '\u{2196}'..='\u{2199}' | '\u{21AA}' => out.push_str("->"),
        '\u{2190}' | '\u{21A9}' => out.push_str("<-"),
        '\u{2191}' => out.push('^'),
        '\u{2193}' => out.push('v'),
        '\u{00D7}' => out.push('x'),
        '\u{200B}'..='\u{200D}' | '\u{2060}' | '\u{FEFF}' => {}
        '\u{E000}'..='\u{F8FF}' | '\u{F0000}'..='\u{10FFFF}' => {}
        // Line structure and the whitespace controls are handled by
        // `collapse_whitespace`.
        '\n' | '\r' | '\u{000B}' | '\u{000C}' => out.push(ch),
        c if c.is_control() => {}
        c => out.push(c),
    }
}

/// `\r\n` and `\r` become `\n`, horizontal whitespace runs become one
/// space, spaces before a newline are dropped and the ends are trimmed.
fn collapse_whitespace(text: &str) -> String {
    let unified = text.replace("\r\n", "\n").replace('\r', "\n");

    let lines: Vec<String> = unified
        .split('\n')
        .map(|line| {
            let mut out = String::with_capacity(line.len());
            let mut in_run = false;
            for ch in line.chars() {
                if matches!(ch, ' ' | '\u{000B}' | '\u{000C}') {
                    if !in_run {
                        out.push(' ');
                    }
                    in_run = true;
                } else {
                    out.push(ch);
                    in_run = false;
                }
            }
            out.trim_end_matches(' ').to_string()
        })
        .collect();

    lines.join("\n").trim().to_string()
}
