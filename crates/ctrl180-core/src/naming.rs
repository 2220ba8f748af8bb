//! Template and output file naming conventions.
//!
//! Pure string functions, no filesystem access. These define the canonical
//! template filenames and the download name of a rendered report.

use std::sync::LazyLock;

use regex::Regex;

/// Prefix shared by every template variant.
pub const TEMPLATE_PREFIX: &str = "CTRL_PoC_180_Assessment_Report_template_";

/// The one template that may stand in when no template was requested.
pub const FALLBACK_TEMPLATE: &str = "CTRL_PoC_180_Assessment_Report_template_fallback.pdf";

/// Longest date token kept when a label cannot be parsed as a date.
const MAX_DATE_TOKEN_LEN: usize = 40;

static UNSAFE_FILENAME_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^A-Za-z0-9_.-]+").expect("static filename pattern"));

pub fn template_filename(code: &str) -> String {
    format!("{TEMPLATE_PREFIX}{code}.pdf")
}

/// Strip a requested template name down to `[A-Za-z0-9._-]`.
pub fn sanitize_template_name(raw: &str) -> String {
    raw.trim()
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'))
        .collect()
}

/// Replace every run of characters outside `[A-Za-z0-9_.-]` with `_`.
pub fn sanitize_filename(raw: &str) -> String {
    UNSAFE_FILENAME_RUN.replace_all(raw, "_").into_owned()
}

/// First and last whitespace-separated tokens of a full name. The last
/// token is empty for single-word names.
pub fn split_name(full: &str) -> (String, String) {
    let tokens: Vec<&str> = full.split_whitespace().collect();
    match tokens.as_slice() {
        [] => (String::new(), String::new()),
        [only] => ((*only).to_string(), String::new()),
        [first, .., last] => ((*first).to_string(), (*last).to_string()),
    }
}

/// Synthesize a date label from a human date: `23 Nov 2025` → `23_NOV_2025`.
///
/// No calendar validation is done.
pub fn derive_date_label(human: &str) -> String {
    human
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("_")
        .to_uppercase()
}

/// Parse a human date label into `YYYY-MM-DD`.
///
/// Accepts ISO dates, `23 Nov 2025`, `23 November 2025`, `Nov 23 2025` and
/// the derived label form `23_NOV_2025`. Returns `None` for anything else,
/// including impossible dates.
pub fn parse_date_label_to_yyyymmdd(label: &str) -> Option<String> {
    let trimmed = label.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Ok(date) = trimmed.parse::<jiff::civil::Date>() {
        return Some(date.strftime("%Y-%m-%d").to_string());
    }

    let tokens: Vec<&str> = trimmed
        .split(|c: char| c.is_whitespace() || matches!(c, '_' | '-' | ',' | '/' | '.'))
        .filter(|t| !t.is_empty())
        .collect();

    let (day, month, year) = match tokens.as_slice() {
        [d, m, y] if is_digits(d) && is_alpha(m) => (*d, *m, *y),
        [m, d, y] if is_alpha(m) && is_digits(d) => (*d, *m, *y),
        _ => return None,
    };
    if day.len() > 2 || year.len() != 4 || !is_digits(year) || month.len() < 3 {
        return None;
    }

    let mut abbrev: String = month.chars().take(3).collect::<String>().to_lowercase();
    if let Some(first) = abbrev.get_mut(0..1) {
        first.make_ascii_uppercase();
    }

    let canonical = format!("{day:0>2} {abbrev} {year}");
    jiff::civil::Date::strptime("%d %b %Y", &canonical)
        .ok()
        .map(|date| date.strftime("%Y-%m-%d").to_string())
}

/// Filename token for a date label: the ISO date when parseable, else the
/// sanitized label clamped to a sane length.
pub fn date_token(label: &str) -> String {
    if let Some(iso) = parse_date_label_to_yyyymmdd(label) {
        return iso;
    }
    sanitize_filename(label.trim())
        .trim_matches('_')
        .chars()
        .take(MAX_DATE_TOKEN_LEN)
        .collect()
}

/// Download name for a rendered report:
/// `CTRL_180_<First>_<Last>_<YYYY-MM-DD>.pdf`, empty tokens omitted.
pub fn default_output_name(full_name: &str, date_label: &str) -> String {
    let (first, last) = split_name(full_name);
    let date = date_token(date_label);

    let stem = ["CTRL", "180", first.as_str(), last.as_str(), date.as_str()]
        .into_iter()
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join("_");

    sanitize_filename(&format!("{stem}.pdf"))
}

fn is_digits(s: &str) -> bool {
    !s.is_empty() && s.chars().all(|c| c.is_ascii_digit())
}

fn is_alpha(s: &str) -> bool {
    !s.is_empty() && s.chars().all(|c| c.is_ascii_alphabetic())
}
