//! The report's page layout and per-request overrides.
//!
//! [`LayoutTable::standard`] builds the base layout fresh on every call;
//! overrides produce a new table and never touch the base.

use std::collections::BTreeMap;

use crate::models::layout::{
    Align, BoxKind, BoxOverride, BoxSpec, FieldSlot, LayoutBox, LayoutOverrides, LayoutTable,
};

/// Body text size of the narrative pages.
pub const OVERLAY_SIZE: f32 = 15.0;
/// Line gap of the narrative pages.
pub const OVERLAY_LINE_GAP: f32 = 6.0;
/// Line cap of a full-page narrative box.
pub const OVERLAY_MAX_LINES: u32 = 110;

/// Query parameter suffixes accepted per box.
pub const OVERRIDE_PROPS: &[&str] = &[
    "x", "y", "w", "h", "size", "lineGap", "maxLines", "align", "dx", "dy",
];

/// Legacy chart placement parameters and the chart property they set.
const LEGACY_CHART_PARAMS: &[(&str, &str)] = &[("cx", "x"), ("cy", "y"), ("cw", "w"), ("ch", "h")];

impl LayoutTable {
    /// The canonical eight-page layout.
    pub fn standard() -> Self {
        let mut boxes = BTreeMap::new();

        let text = |x: f32, y: f32, w: f32, size: f32, align: Align, max_lines: u32| LayoutBox {
            x,
            y,
            w,
            h: None,
            size,
            line_gap: 3.0,
            align,
            max_lines: Some(max_lines),
        };
        let narrative = |y: f32, h: Option<f32>| LayoutBox {
            x: 25.0,
            y,
            w: 550.0,
            h,
            size: OVERLAY_SIZE,
            line_gap: OVERLAY_LINE_GAP,
            align: Align::Left,
            max_lines: if h.is_some() { None } else { Some(OVERLAY_MAX_LINES) },
        };

        let mut put = |id: &str, pages: Vec<usize>, kind: BoxKind, slot: FieldSlot, geometry| {
            boxes.insert(
                id.to_string(),
                BoxSpec {
                    pages,
                    kind,
                    slot,
                    geometry,
                },
            );
        };

        put(
            "name",
            vec![1],
            BoxKind::Text,
            FieldSlot::Name,
            text(7.0, 473.0, 500.0, 30.0, Align::Center, 2),
        );
        put(
            "date",
            vec![1],
            BoxKind::Text,
            FieldSlot::DateLabel,
            text(210.0, 600.0, 500.0, 25.0, Align::Left, 1),
        );
        put(
            "header",
            (2..=8).collect(),
            BoxKind::Text,
            FieldSlot::Name,
            text(380.0, 51.0, 400.0, 13.0, Align::Left, 1),
        );
        put(
            "chart",
            vec![2],
            BoxKind::Image,
            FieldSlot::Chart,
            LayoutBox {
                x: 40.0,
                y: 170.0,
                w: 520.0,
                h: Some(360.0),
                ..LayoutBox::default()
            },
        );
        put("summary", vec![3], BoxKind::Overlay, FieldSlot::Summary, narrative(150.0, None));
        put("frequency", vec![4], BoxKind::Overlay, FieldSlot::Frequency, narrative(150.0, None));
        put("sequence", vec![5], BoxKind::Overlay, FieldSlot::Sequence, narrative(150.0, None));
        put("themepair", vec![6], BoxKind::Overlay, FieldSlot::ThemePair, narrative(280.0, None));
        put("tips1", vec![7], BoxKind::Overlay, FieldSlot::Tip(0), narrative(150.0, Some(190.0)));
        put("tips2", vec![7], BoxKind::Overlay, FieldSlot::Tip(1), narrative(360.0, Some(190.0)));
        put("tips3", vec![7], BoxKind::Overlay, FieldSlot::Tip(2), narrative(570.0, Some(200.0)));
        put(
            "colleagues",
            vec![8],
            BoxKind::Overlay,
            FieldSlot::ColleaguesNarrative,
            narrative(150.0, Some(150.0)),
        );
        put(
            "colleaguesQ",
            vec![8],
            BoxKind::Overlay,
            FieldSlot::ColleaguesQuestions,
            narrative(305.0, Some(150.0)),
        );
        put(
            "leaders",
            vec![8],
            BoxKind::Overlay,
            FieldSlot::LeadersNarrative,
            narrative(470.0, Some(130.0)),
        );
        put(
            "leadersQ",
            vec![8],
            BoxKind::Overlay,
            FieldSlot::LeadersQuestions,
            narrative(605.0, Some(160.0)),
        );

        Self { boxes }
    }

    pub fn get(&self, id: &str) -> Option<&BoxSpec> {
        self.boxes.get(id)
    }

    /// Boxes drawn on a 1-based page, in id order.
    pub fn boxes_on_page(&self, page: usize) -> impl Iterator<Item = (&str, &BoxSpec)> {
        self.boxes
            .iter()
            .filter(move |(_, entry)| entry.pages.contains(&page))
            .map(|(id, entry)| (id.as_str(), entry))
    }

    /// Highest page number any box is drawn on.
    pub fn page_count(&self) -> usize {
        self.boxes
            .values()
            .flat_map(|entry| entry.pages.iter().copied())
            .max()
            .unwrap_or(0)
    }
}

/// Apply one override set to a box, returning the adjusted copy.
///
/// Absolute values replace the base; `dx`/`dy` shift the result. Widths,
/// sizes and line caps that are not positive are ignored so the box
/// invariants always hold.
pub fn apply_box_override(base: &LayoutBox, ov: &BoxOverride) -> LayoutBox {
    let mut out = *base;

    if let Some(x) = ov.x {
        out.x = x;
    }
    if let Some(y) = ov.y {
        out.y = y;
    }
    if let Some(w) = ov.w.filter(|w| *w > 0.0) {
        out.w = w;
    }
    if let Some(h) = ov.h.filter(|h| *h > 0.0) {
        out.h = Some(h);
    }
    if let Some(size) = ov.size.filter(|s| *s > 0.0) {
        out.size = size;
    }
    if let Some(gap) = ov.line_gap.filter(|g| *g >= 0.0) {
        out.line_gap = gap;
    }
    if let Some(max) = ov.max_lines.filter(|m| *m >= 1) {
        out.max_lines = Some(max);
    }
    if let Some(align) = ov.align {
        out.align = align;
    }
    if let Some(dx) = ov.dx {
        out.x += dx;
    }
    if let Some(dy) = ov.dy {
        out.y += dy;
    }

    out
}

/// Build the request's layout from an immutable base and an override set.
///
/// Overrides naming unknown boxes are ignored.
pub fn apply_overrides(base: &LayoutTable, overrides: &LayoutOverrides) -> LayoutTable {
    let mut table = base.clone();
    for (id, ov) in &overrides.boxes {
        match table.boxes.get_mut(id) {
            Some(entry) => entry.geometry = apply_box_override(&entry.geometry, ov),
            None => tracing::debug!(box_id = %id, "override for unknown box ignored"),
        }
    }
    table
}

/// Collect `<boxId>_<prop>` parameters (plus the legacy `cx`/`cy`/`cw`/`ch`
/// chart aliases) into an override set.
///
/// Values that do not parse are skipped; later parameters win.
pub fn parse_overrides<'a, I>(params: I) -> LayoutOverrides
where
    I: IntoIterator<Item = (&'a str, &'a str)>,
{
    let mut overrides = LayoutOverrides::default();

    for (key, value) in params {
        let target = LEGACY_CHART_PARAMS
            .iter()
            .find(|(alias, _)| *alias == key)
            .map(|(_, prop)| ("chart", *prop))
            .or_else(|| {
                OVERRIDE_PROPS.iter().find_map(|prop| {
                    key.strip_suffix(prop)
                        .and_then(|rest| rest.strip_suffix('_'))
                        .filter(|id| !id.is_empty())
                        .map(|id| (id, *prop))
                })
            });

        let Some((id, prop)) = target else {
            continue;
        };
        let entry = overrides.boxes.entry(id.to_string()).or_default();
        set_prop(entry, prop, value.trim());
    }

    overrides.boxes.retain(|_, ov| !ov.is_empty());
    overrides
}

fn set_prop(ov: &mut BoxOverride, prop: &str, value: &str) {
    let number = || value.parse::<f32>().ok().filter(|n| n.is_finite());
    match prop {
        "x" => ov.x = number().or(ov.x),
        "y" => ov.y = number().or(ov.y),
        "w" => ov.w = number().or(ov.w),
        "h" => ov.h = number().or(ov.h),
        "size" => ov.size = number().or(ov.size),
        "lineGap" => ov.line_gap = number().or(ov.line_gap),
        "maxLines" => {
            ov.max_lines = number()
                .filter(|n| *n >= 1.0)
                .map(|n| n.floor() as u32)
                .or(ov.max_lines)
        }
        "align" => ov.align = value.parse::<Align>().ok().or(ov.align),
        "dx" => ov.dx = number().or(ov.dx),
        "dy" => ov.dy = number().or(ov.dy),
        _ => {}
    }
}
