//! Payload field resolution.
//!
//! Producers of the payload have renamed fields many times over. Each
//! report field therefore has an ordered list of candidate paths and the
//! first one holding non-empty text wins. The lists are data so the
//! priority order can be inspected and tested on its own.

use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;

use crate::models::fields::{AssessmentFields, AudienceBlock, DEFAULT_NAME, WorkWith};
use crate::naming::derive_date_label;
use crate::normalize::normalize;
use crate::payload::{TextLookup, lookup, lookup_text, value_text};

/// A report field and the payload paths it may be read from.
#[derive(Debug, Clone, Copy)]
pub struct FieldRule {
    pub field: &'static str,
    pub paths: &'static [&'static str],
}

pub const NAME: FieldRule = FieldRule {
    field: "name",
    paths: &["person.fullName", "fullName"],
};

pub const DATE_LABEL: FieldRule = FieldRule {
    field: "dateLabel",
    paths: &[
        "dateLbl",
        "identity.dateLabel",
        "identity.dateLbl",
        "person.dateLabel",
        "person.dateLbl",
        "date",
        "Date",
    ],
};

/// Legacy human-readable date, used to synthesize a label.
pub const HUMAN_DATE: FieldRule = FieldRule {
    field: "humanDate",
    paths: &["p1:d", "p1_d", "identity.date"],
};

pub const SUMMARY: FieldRule = FieldRule {
    field: "summary",
    paths: &[
        "text.summary",
        "textV2.summary",
        "gen.summary",
        "summary",
        "execSummary",
        "p3:exec",
    ],
};

pub const FREQUENCY: FieldRule = FieldRule {
    field: "frequency",
    paths: &[
        "text.frequency",
        "textV2.frequency",
        "gen.frequency",
        "frequency",
        "overview",
        "ctrl_overview",
        "p4:freq",
    ],
};

pub const SEQUENCE: FieldRule = FieldRule {
    field: "sequence",
    paths: &[
        "text.sequence",
        "textV2.sequence",
        "gen.sequence",
        "sequence",
        "deepdive",
        "ctrl_deepdive",
        "p5:seq",
    ],
};

pub const THEMEPAIR: FieldRule = FieldRule {
    field: "themepair",
    paths: &[
        "text.themepair",
        "textV2.themepair",
        "gen.themepair",
        "themepair",
        "themePair",
        "themes",
        "p6:theme",
    ],
};

pub const TIPS: FieldRule = FieldRule {
    field: "tips",
    paths: &[
        "text.tips",
        "textV2.tips",
        "gen.tips",
        "tips",
        "actions",
        "tipsText",
        "p7:tips",
    ],
};

pub const CHART_URL: FieldRule = FieldRule {
    field: "chartUrl",
    paths: &["chartUrl", "spiderChartUrl", "chart.spiderUrl"],
};

pub const COLLEAGUES: FieldRule = FieldRule {
    field: "workWith.colleagues",
    paths: &[
        "text.workWith.colleagues",
        "textV2.workWith.colleagues",
        "workWith.colleagues",
        "workwith.colleagues",
        "p8:collabC",
    ],
};

pub const LEADERS: FieldRule = FieldRule {
    field: "workWith.leaders",
    paths: &[
        "text.workWith.leaders",
        "textV2.workWith.leaders",
        "workWith.leaders",
        "workwith.leaders",
        "p8:collabL",
    ],
};

/// Every text rule, in the order fields appear in the report.
pub const TEXT_RULES: &[FieldRule] = &[
    NAME, DATE_LABEL, SUMMARY, FREQUENCY, SEQUENCE, THEMEPAIR, TIPS, CHART_URL,
];

static BLANK_LINES: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n{2,}").expect("static blank line pattern"));

/// A field value together with the path it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolved {
    pub value: String,
    pub path: &'static str,
}

/// Candidate paths that held something unusable, for diagnostics.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolveIssues {
    pub malformed: Vec<(&'static str, &'static str)>,
}

/// First candidate path with non-empty normalized text.
///
/// `None` means no candidate had usable text; any candidate that existed
/// but could not be read as text is recorded in `issues`.
pub fn resolve_rule(payload: &Value, rule: &FieldRule, issues: &mut ResolveIssues) -> Option<Resolved> {
    for &path in rule.paths {
        match lookup_text(payload, path) {
            TextLookup::Found(value) => {
                let text = normalize(&value_text(value));
                if !text.is_empty() {
                    return Some(Resolved { value: text, path });
                }
            }
            TextLookup::Malformed(kind) => {
                tracing::debug!(field = rule.field, path, kind, "ignoring non-text candidate");
                issues.malformed.push((path, kind));
            }
            TextLookup::Missing | TextLookup::Blank => {}
        }
    }
    None
}

/// Map a loosely shaped payload onto the report's fixed field set.
///
/// Never fails: missing or malformed data degrades to empty strings.
pub fn resolve(payload: &Value) -> AssessmentFields {
    resolve_with_issues(payload).0
}

/// [`resolve`], also reporting candidates that existed but were not text.
pub fn resolve_with_issues(payload: &Value) -> (AssessmentFields, ResolveIssues) {
    let mut issues = ResolveIssues::default();
    let mut fields = AssessmentFields::default();

    let mut take = |rule: &FieldRule, fields: &mut AssessmentFields| -> String {
        match resolve_rule(payload, rule, &mut issues) {
            Some(found) => {
                fields
                    .sources
                    .insert(rule.field.to_string(), found.path.to_string());
                found.value
            }
            None => String::new(),
        }
    };

    fields.name = take(&NAME, &mut fields);
    if fields.name.is_empty() {
        fields.name = DEFAULT_NAME.to_string();
    }

    fields.date_label = take(&DATE_LABEL, &mut fields);
    if fields.date_label.is_empty() {
        let human = take(&HUMAN_DATE, &mut fields);
        if !human.is_empty() {
            fields.date_label = derive_date_label(&human);
        }
    }

    fields.summary = take(&SUMMARY, &mut fields);
    fields.frequency = take(&FREQUENCY, &mut fields);
    fields.sequence = take(&SEQUENCE, &mut fields);
    fields.themepair = take(&THEMEPAIR, &mut fields);
    fields.tips = take(&TIPS, &mut fields);
    fields.tip_items = split_tips(&fields.tips);

    let chart = take(&CHART_URL, &mut fields);
    fields.chart_url = if chart.is_empty() { None } else { Some(chart) };

    fields.work_with = WorkWith {
        colleagues: resolve_audience(payload, &COLLEAGUES, &mut fields),
        leaders: resolve_audience(payload, &LEADERS, &mut fields),
    };

    (fields, issues)
}

/// Split a tips block into three action items on blank-line boundaries.
///
/// The first two paragraphs become items one and two; everything after is
/// rejoined with blank lines into item three, so nothing is dropped.
pub fn split_tips(tips: &str) -> [String; 3] {
    let parts: Vec<&str> = BLANK_LINES
        .split(tips.trim())
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .collect();

    let mut items: [String; 3] = Default::default();
    for (i, part) in parts.iter().take(2).enumerate() {
        items[i] = (*part).to_string();
    }
    if parts.len() > 2 {
        items[2] = parts[2..].join("\n\n");
    }
    items
}

/// Split free text into a narrative and a question list: lines starting
/// with `- ` are questions, everything else is narrative.
pub fn split_audience_text(text: &str) -> AudienceBlock {
    let mut narrative = Vec::new();
    let mut questions = Vec::new();

    let normalized = normalize(text);
    for line in normalized.lines() {
        let line = line.trim();
        match line.strip_prefix("- ") {
            Some(q) if !q.trim().is_empty() => questions.push(q.trim().to_string()),
            _ => narrative.push(line),
        }
    }

    AudienceBlock {
        narrative: narrative.join("\n").trim().to_string(),
        questions,
    }
}

/// A normalized question line without its list marker.
fn question_text(line: &str) -> String {
    line.trim().trim_start_matches("- ").trim().to_string()
}

/// Resolve one work-with audience. The value may be plain text or an object
/// with a narrative (`text`, `narrative` or `body`) and `questions` given
/// as a list or as text.
fn resolve_audience(
    payload: &Value,
    rule: &FieldRule,
    fields: &mut AssessmentFields,
) -> Option<AudienceBlock> {
    for path in rule.paths {
        let block = match lookup(payload, path) {
            Some(Value::String(s)) => split_audience_text(s),
            Some(Value::Object(obj)) => {
                let narrative = ["text", "narrative", "body"]
                    .iter()
                    .find_map(|k| obj.get(*k).and_then(Value::as_str))
                    .map(normalize)
                    .unwrap_or_default();
                let questions = match obj.get("questions").or_else(|| obj.get("qs")) {
                    Some(Value::Array(items)) => items
                        .iter()
                        .filter_map(Value::as_str)
                        .map(|q| question_text(&normalize(q)))
                        .filter(|q| !q.is_empty())
                        .collect(),
                    Some(Value::String(s)) => normalize(s)
                        .lines()
                        .map(question_text)
                        .filter(|q| !q.is_empty())
                        .collect(),
                    _ => Vec::new(),
                };
                AudienceBlock {
                    narrative,
                    questions,
                }
            }
            _ => continue,
        };

        if !block.is_empty() {
            fields
                .sources
                .insert(rule.field.to_string(), (*path).to_string());
            return Some(block);
        }
    }
    None
}
