use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::layout::FieldSlot;

/// Name used when the payload carries no person name at all.
pub const DEFAULT_NAME: &str = "Perspective Overlay";

/// The resolved, normalized content of one assessment report.
///
/// Every text field is already normalized. An empty string means the
/// payload had nothing usable for that field.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssessmentFields {
    pub name: String,
    pub date_label: String,
    pub summary: String,
    pub frequency: String,
    pub sequence: String,
    pub themepair: String,
    pub tips: String,
    /// `tips` redistributed over the three action boxes.
    pub tip_items: [String; 3],
    pub chart_url: Option<String>,
    pub work_with: WorkWith,
    /// Field name → payload path the value was taken from.
    pub sources: BTreeMap<String, String>,
}

/// Audience-specific guidance: how colleagues and leaders can work with
/// the assessed person.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkWith {
    pub colleagues: Option<AudienceBlock>,
    pub leaders: Option<AudienceBlock>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AudienceBlock {
    pub narrative: String,
    pub questions: Vec<String>,
}

impl AudienceBlock {
    pub fn is_empty(&self) -> bool {
        self.narrative.is_empty() && self.questions.is_empty()
    }

    /// Questions rendered as `- ` lines so the overlay engine draws bullets.
    pub fn questions_text(&self) -> String {
        self.questions
            .iter()
            .map(|q| format!("- {q}"))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl AssessmentFields {
    /// Text bound to a layout slot, or `None` when there is nothing to draw.
    pub fn slot_text(&self, slot: FieldSlot) -> Option<String> {
        let text = match slot {
            FieldSlot::Name => self.name.clone(),
            FieldSlot::DateLabel => self.date_label.clone(),
            FieldSlot::Summary => self.summary.clone(),
            FieldSlot::Frequency => self.frequency.clone(),
            FieldSlot::Sequence => self.sequence.clone(),
            FieldSlot::ThemePair => self.themepair.clone(),
            FieldSlot::Tip(i) => self.tip_items.get(i).cloned().unwrap_or_default(),
            FieldSlot::ColleaguesNarrative => self
                .work_with
                .colleagues
                .as_ref()
                .map(|b| b.narrative.clone())
                .unwrap_or_default(),
            FieldSlot::ColleaguesQuestions => self
                .work_with
                .colleagues
                .as_ref()
                .map(AudienceBlock::questions_text)
                .unwrap_or_default(),
            FieldSlot::LeadersNarrative => self
                .work_with
                .leaders
                .as_ref()
                .map(|b| b.narrative.clone())
                .unwrap_or_default(),
            FieldSlot::LeadersQuestions => self
                .work_with
                .leaders
                .as_ref()
                .map(AudienceBlock::questions_text)
                .unwrap_or_default(),
            FieldSlot::Chart => self.chart_url.clone().unwrap_or_default(),
        };

        if text.is_empty() { None } else { Some(text) }
    }
}
