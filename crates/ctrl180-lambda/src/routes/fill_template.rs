use std::collections::BTreeMap;

use axum::Json;
use axum::body::Bytes;
use axum::extract::{Query, State};
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use serde_json::{Value, json};

use ctrl180_core::fields::resolve_with_issues;
use ctrl180_core::layout::apply_overrides;
use ctrl180_core::models::template::TemplateChoice;
use ctrl180_core::naming::{FALLBACK_TEMPLATE, default_output_name, sanitize_filename};
use ctrl180_core::template::{select_template, select_template_strict};
use ctrl180_export::fonts::StandardFonts;
use ctrl180_export::render::{RenderRequest, plan_layout, render_report};

use crate::chart::{ChartOutcome, load_chart};
use crate::error::ApiError;
use crate::request::{FillParams, body_json, merge_body_params, read_payload};
use crate::state::AppState;

/// Which template file a request resolved to.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateResolution {
    pub filename: String,
    /// Named by the caller rather than auto-selected.
    pub explicit: bool,
    /// The auto-selected template was missing and the fallback was used.
    pub fallback: bool,
    pub found: bool,
    #[serde(flatten)]
    pub choice: TemplateChoice,
}

impl TemplateResolution {
    /// `X-CTRL-TEMPLATE-KEY` value: the selected pair, or `explicit` when
    /// the caller named the file and the pair played no part.
    pub fn key_header(&self) -> String {
        if self.explicit {
            "explicit".to_string()
        } else {
            self.choice.template_key.clone()
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct BoxSummary {
    runs: usize,
    lines_used: u32,
    clipped: bool,
}

pub async fn fill_template_get(
    State(state): State<AppState>,
    Query(query): Query<Vec<(String, String)>>,
) -> Result<Response, ApiError> {
    fill(state, query, None).await
}

pub async fn fill_template_post(
    State(state): State<AppState>,
    Query(query): Query<Vec<(String, String)>>,
    body: Bytes,
) -> Result<Response, ApiError> {
    fill(state, query, Some(body)).await
}

async fn fill(
    state: AppState,
    query: Vec<(String, String)>,
    body: Option<Bytes>,
) -> Result<Response, ApiError> {
    let body_len = body.as_ref().map_or(0, Bytes::len);
    let body_value = body.as_deref().and_then(body_json);

    let pairs = merge_body_params(query, body_value.as_ref());
    let params = FillParams::from_pairs(&pairs);
    let payload = read_payload(params.data.as_deref(), body_value, body_len);

    let template = resolve_template(&state, &params, &payload.value)?;
    let (fields, issues) = resolve_with_issues(&payload.value);
    let layout = apply_overrides(&state.layout, &params.overrides);

    tracing::info!(
        template = %template.filename,
        template_key = %template.choice.template_key,
        fallback = template.fallback,
        payload_bytes = payload.bytes,
        overrides = params.overrides.boxes.len(),
        debug = params.debug,
        "fill request"
    );

    if params.debug {
        let overlay: BTreeMap<String, BoxSummary> = plan_layout(&fields, &layout, &StandardFonts)
            .into_iter()
            .map(|(id, planned)| {
                let summary = BoxSummary {
                    runs: planned.runs.len(),
                    lines_used: planned.lines_used,
                    clipped: planned.clipped,
                };
                (id, summary)
            })
            .collect();

        let malformed: Vec<Value> = issues
            .malformed
            .iter()
            .map(|(path, kind)| json!({ "path": path, "kind": kind }))
            .collect();

        let snapshot = json!({
            "ok": true,
            "template": template,
            "fields": fields,
            "malformed": malformed,
            "layout": layout,
            "overlay": overlay,
            "payloadBytes": payload.bytes,
            "config": state.config.as_ref(),
        });
        return Ok(Json(snapshot).into_response());
    }

    let template_bytes = state.templates.load(&template.filename)?;

    let (chart, mut chart_outcome) =
        load_chart(state.chart_fetcher.clone(), fields.chart_url.as_deref()).await;

    let rendered = render_report(
        &RenderRequest {
            template: &template_bytes,
            fields: &fields,
            layout: &layout,
            chart: chart.as_ref(),
        },
        &state.styles,
    )?;

    if chart_outcome == ChartOutcome::Embedded && !rendered.chart_drawn {
        chart_outcome = ChartOutcome::Skipped("no chart page in template".to_string());
    }

    let out_name = match &params.out {
        Some(out) => sanitize_filename(out),
        None => default_output_name(&fields.name, &fields.date_label),
    };

    let headers = [
        ("content-type", "application/pdf".to_string()),
        ("content-disposition", format!("inline; filename=\"{out_name}\"")),
        ("x-ctrl-tpl", template.filename.clone()),
        ("x-ctrl-tpl-fallback", if template.fallback { "1" } else { "0" }.to_string()),
        ("x-ctrl-template-key", template.key_header()),
        ("x-ctrl-payload-bytes", payload.bytes.to_string()),
        ("x-ctrl-chart", chart_outcome.header_value()),
    ];

    Ok((headers, rendered.bytes).into_response())
}

/// Pick the template file.
///
/// An explicit `tpl` is used as-is. Otherwise the payload's category pair
/// picks one, and only a missing auto-selected file falls back to
/// [`FALLBACK_TEMPLATE`]. Existence is checked here; the read happens at
/// render time and fails the request if the file is unreadable.
pub fn resolve_template(
    state: &AppState,
    params: &FillParams,
    payload: &Value,
) -> Result<TemplateResolution, ApiError> {
    if let Some(tpl) = &params.tpl {
        if !tpl.ends_with(".pdf") {
            return Err(ApiError::BadRequest(format!(
                "template must be a .pdf file: {tpl}"
            )));
        }
        return Ok(TemplateResolution {
            filename: tpl.clone(),
            explicit: true,
            fallback: false,
            found: state.templates.contains(tpl),
            choice: select_template(payload),
        });
    }

    let choice = if state.config.strict_template {
        select_template_strict(payload)?
    } else {
        select_template(payload)
    };

    if state.templates.contains(&choice.chosen_filename) {
        return Ok(TemplateResolution {
            filename: choice.chosen_filename.clone(),
            explicit: false,
            fallback: false,
            found: true,
            choice,
        });
    }

    tracing::warn!(
        wanted = %choice.chosen_filename,
        fallback = FALLBACK_TEMPLATE,
        "auto-selected template missing, using fallback"
    );
    Ok(TemplateResolution {
        filename: FALLBACK_TEMPLATE.to_string(),
        explicit: false,
        fallback: true,
        found: state.templates.contains(FALLBACK_TEMPLATE),
        choice,
    })
}
