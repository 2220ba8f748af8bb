mod common;

use lopdf::{Document, Object};
use serde_json::json;

use ctrl180_core::fields::resolve;
use ctrl180_core::models::fields::AssessmentFields;
use ctrl180_core::models::layout::LayoutTable;
use ctrl180_export::chart::{ChartImage, ImageKind};
use ctrl180_export::error::ExportError;
use ctrl180_export::fonts::{StandardFonts, encode_winansi};
use ctrl180_export::render::{RenderRequest, plan_layout, render_report};
use ctrl180_export::styles::RenderStyles;

fn sample_fields() -> AssessmentFields {
    resolve(&json!({
        "person": { "fullName": "Ada Lovelace" },
        "dateLbl": "23_NOV_2025",
        "text": {
            "summary": "What this means:\n- point one\n- point two",
            "frequency": "Often.",
        },
        "tips": "First tip.\n\nSecond tip.\n\nThird tip.",
    }))
}

fn render(template: &[u8], fields: &AssessmentFields, chart: Option<&ChartImage>) -> Document {
    let layout = LayoutTable::standard();
    let rendered = render_report(
        &RenderRequest {
            template,
            fields,
            layout: &layout,
            chart,
        },
        &RenderStyles::default(),
    )
    .expect("render");
    Document::load_mem(&rendered.bytes).expect("reload")
}

#[test]
fn text_is_drawn_on_the_expected_pages() {
    let doc = render(&common::template_pdf(8, false), &sample_fields(), None);
    let pages = common::page_ids(&doc);
    assert_eq!(pages.len(), 8);

    let first = common::shown_strings(&doc, pages[0]);
    assert!(first.contains(&b"Ada Lovelace".to_vec()));
    assert!(first.contains(&b"23_NOV_2025".to_vec()));

    let summary = common::shown_strings(&doc, pages[2]);
    assert!(summary.contains(&b"What this means:".to_vec()));
    assert!(summary.contains(&encode_winansi("\u{2022} point one")));
    // Header repeats the name.
    assert!(summary.contains(&b"Ada Lovelace".to_vec()));

    let tips = common::shown_strings(&doc, pages[6]);
    for tip in ["First tip.", "Second tip.", "Third tip."] {
        assert!(tips.contains(&tip.as_bytes().to_vec()), "{tip} missing");
    }
}

#[test]
fn template_content_is_preserved_and_isolated() {
    let doc = render(&common::template_pdf(3, false), &sample_fields(), None);
    let page = common::page_ids(&doc)[0];

    let ops = common::page_operations(&doc, page);
    let operators: Vec<&str> = ops.iter().map(|op| op.operator.as_str()).collect();
    assert_eq!(operators.first(), Some(&"q"));
    assert_eq!(operators.last(), Some(&"Q"));

    let strings = common::shown_strings(&doc, page);
    assert!(strings.contains(&b"Template page 1".to_vec()));
    assert!(strings.contains(&b"Ada Lovelace".to_vec()));
}

#[test]
fn fonts_are_added_to_inherited_resources() {
    let doc = render(&common::template_pdf(8, true), &sample_fields(), None);
    let page = common::page_ids(&doc)[0];

    let fonts = common::resource_keys(&doc, page, b"Font");
    assert!(fonts.contains(&"F1".to_string()), "template font lost: {fonts:?}");
    assert!(fonts.contains(&"CtrlReg".to_string()));
    assert!(fonts.contains(&"CtrlBold".to_string()));

    let strings = common::shown_strings(&doc, page);
    assert!(strings.contains(&b"Ada Lovelace".to_vec()));
}

#[test]
fn font_dictionaries_use_winansi() {
    let doc = render(&common::template_pdf(1, false), &sample_fields(), None);
    let page = common::page_ids(&doc)[0];
    let resources = common::page_resources(&doc, page);

    let font_dict = match resources.get(b"Font") {
        Ok(Object::Reference(id)) => doc.get_dictionary(*id).expect("font dict").clone(),
        Ok(Object::Dictionary(dict)) => dict.clone(),
        _ => panic!("no fonts"),
    };
    let regular_id = font_dict
        .get(b"CtrlReg")
        .and_then(Object::as_reference)
        .expect("regular font ref");
    let regular = doc.get_dictionary(regular_id).expect("regular font");

    assert_eq!(regular.get(b"BaseFont").and_then(Object::as_name).ok(), Some(&b"Helvetica"[..]));
    assert_eq!(
        regular.get(b"Encoding").and_then(Object::as_name).ok(),
        Some(&b"WinAnsiEncoding"[..])
    );
}

#[test]
fn pages_missing_from_the_template_are_skipped() {
    let fields = sample_fields();
    let layout = LayoutTable::standard();
    let template = common::template_pdf(3, false);

    let rendered = render_report(
        &RenderRequest {
            template: &template,
            fields: &fields,
            layout: &layout,
            chart: None,
        },
        &RenderStyles::default(),
    )
    .expect("render");

    assert_eq!(rendered.page_count, 3);
    assert_eq!(rendered.skipped_pages, vec![4, 5, 6, 7, 8]);
    assert!(Document::load_mem(&rendered.bytes).is_ok());
}

#[test]
fn chart_is_embedded_on_page_two() {
    let png = common::png_bytes(&[[0, 0, 0, 255], [255, 255, 255, 0]], 2);
    let chart = ChartImage::decode(&png, ImageKind::Png).expect("decode");
    let fields = sample_fields();
    let layout = LayoutTable::standard();
    let template = common::template_pdf(8, false);

    let rendered = render_report(
        &RenderRequest {
            template: &template,
            fields: &fields,
            layout: &layout,
            chart: Some(&chart),
        },
        &RenderStyles::default(),
    )
    .expect("render");
    assert!(rendered.chart_drawn);

    let doc = Document::load_mem(&rendered.bytes).expect("reload");
    let page = common::page_ids(&doc)[1];
    assert_eq!(
        common::resource_keys(&doc, page, b"XObject"),
        vec!["CtrlChart".to_string()]
    );

    let ops = common::page_operations(&doc, page);
    let cm = ops.iter().find(|op| op.operator == "cm").expect("cm");
    let numbers: Vec<f32> = cm.operands.iter().filter_map(|o| o.as_float().ok()).collect();
    // 792 - 170 - 360
    assert_eq!(numbers, vec![520.0, 0.0, 0.0, 360.0, 40.0, 262.0]);
    assert!(ops.iter().any(|op| op.operator == "Do"));
}

#[test]
fn unreadable_templates_fail() {
    let fields = sample_fields();
    let layout = LayoutTable::standard();
    let result = render_report(
        &RenderRequest {
            template: b"not a pdf",
            fields: &fields,
            layout: &layout,
            chart: None,
        },
        &RenderStyles::default(),
    );
    assert!(matches!(result, Err(ExportError::PdfLoad(_))));
}

#[test]
fn plan_covers_only_boxes_with_content() {
    let fields = resolve(&json!({}));
    let planned = plan_layout(&fields, &LayoutTable::standard(), &StandardFonts);
    let ids: Vec<&str> = planned.keys().map(String::as_str).collect();
    assert_eq!(ids, vec!["header", "name"]);
}

#[test]
fn adobe_cmyk_chart_gets_a_decode_array() {
    let chart = ChartImage {
        width: 2,
        height: 2,
        color_space: "DeviceCMYK",
        filter: Some("DCTDecode"),
        data: vec![0xFF, 0xD8, 0xFF, 0xD9],
        alpha: None,
        inverted: true,
    };
    let doc = render(&common::template_pdf(8, false), &sample_fields(), Some(&chart));

    let image = doc
        .objects
        .values()
        .filter_map(|o| o.as_stream().ok())
        .find(|s| s.dict.get(b"Subtype").and_then(Object::as_name).ok() == Some(b"Image".as_slice()))
        .expect("image xobject");
    assert_eq!(
        image.dict.get(b"ColorSpace").and_then(Object::as_name).ok(),
        Some(b"DeviceCMYK".as_slice())
    );
    let decode: Vec<i64> = image
        .dict
        .get(b"Decode")
        .and_then(Object::as_array)
        .expect("decode array")
        .iter()
        .filter_map(|o| o.as_i64().ok())
        .collect();
    assert_eq!(decode, vec![1, 0, 1, 0, 1, 0, 1, 0]);
}
