//! Report rendering: lay out every box and draw it onto the template.

use std::collections::BTreeMap;

use ctrl180_core::measure::TextMeasure;
use ctrl180_core::models::fields::AssessmentFields;
use ctrl180_core::models::layout::{BoxKind, LayoutTable};
use ctrl180_core::models::overlay::OverlayLayout;
use ctrl180_core::overlay::{layout_overlay, layout_plain};

use crate::chart::ChartImage;
use crate::error::ExportError;
use crate::fonts::StandardFonts;
use crate::pdf::ReportDocument;
use crate::styles::RenderStyles;

/// Everything one render needs.
pub struct RenderRequest<'a> {
    pub template: &'a [u8],
    pub fields: &'a AssessmentFields,
    pub layout: &'a LayoutTable,
    pub chart: Option<&'a ChartImage>,
}

#[derive(Debug)]
pub struct RenderedReport {
    pub bytes: Vec<u8>,
    pub page_count: usize,
    /// Per-box layout of every text box that had content.
    pub boxes: BTreeMap<String, OverlayLayout>,
    pub chart_drawn: bool,
    /// Pages named by the layout that the template does not have.
    pub skipped_pages: Vec<usize>,
}

/// Lay out every text and overlay box that has content.
///
/// Layout does not depend on the template, so this is also what the debug
/// snapshot reports.
pub fn plan_layout<M: TextMeasure + ?Sized>(
    fields: &AssessmentFields,
    layout: &LayoutTable,
    measure: &M,
) -> BTreeMap<String, OverlayLayout> {
    layout
        .boxes
        .iter()
        .filter_map(|(id, entry)| {
            let text = fields.slot_text(entry.slot)?;
            let planned = match entry.kind {
                BoxKind::Text => layout_plain(&text, &entry.geometry, measure),
                BoxKind::Overlay => layout_overlay(&text, &entry.geometry, measure),
                BoxKind::Image => return None,
            };
            Some((id.clone(), planned))
        })
        .collect()
}

pub fn render_report(
    request: &RenderRequest<'_>,
    styles: &RenderStyles,
) -> Result<RenderedReport, ExportError> {
    let mut doc = ReportDocument::load(request.template, styles.clone())?;
    let page_count = doc.page_count();
    let boxes = plan_layout(request.fields, request.layout, &StandardFonts);

    let mut skipped_pages = Vec::new();
    let mut skip = |page: usize| {
        if !skipped_pages.contains(&page) {
            tracing::warn!(page, page_count, "template has no such page, skipping");
            skipped_pages.push(page);
        }
    };

    for (id, planned) in &boxes {
        let Some(entry) = request.layout.get(id) else {
            continue;
        };
        for &page in &entry.pages {
            if !doc.draw_runs(page, &planned.runs)? {
                skip(page);
            }
        }
        if planned.clipped {
            tracing::debug!(box_id = %id, lines = planned.lines_used, "box text clipped");
        }
    }

    let mut chart_drawn = false;
    if let Some(image) = request.chart {
        for entry in request.layout.boxes.values() {
            if entry.kind != BoxKind::Image {
                continue;
            }
            for &page in &entry.pages {
                if doc.draw_image(page, image, &entry.geometry)? {
                    chart_drawn = true;
                } else {
                    skip(page);
                }
            }
        }
    }

    skipped_pages.sort_unstable();
    let bytes = doc.finish()?;
    tracing::info!(
        page_count,
        boxes = boxes.len(),
        chart_drawn,
        bytes = bytes.len(),
        "report rendered"
    );

    Ok(RenderedReport {
        bytes,
        page_count,
        boxes,
        chart_drawn,
        skipped_pages,
    })
}
