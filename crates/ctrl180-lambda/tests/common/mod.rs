#![allow(dead_code)]

use std::io::Cursor;
use std::path::Path;
use std::sync::Arc;

use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{Request, Response};
use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use image::{DynamicImage, ImageOutputFormat, Rgba, RgbaImage};
use lopdf::content::{Content, Operation};
use lopdf::{Dictionary, Document, Object, Stream};
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;

use ctrl180_lambda::app;
use ctrl180_lambda::chart::{ChartFetcher, FetchedChart};
use ctrl180_lambda::config::ServiceConfig;
use ctrl180_lambda::state::AppState;

pub const CT_TEMPLATE: &str = "CTRL_PoC_180_Assessment_Report_template_CT.pdf";
pub const LR_TEMPLATE: &str = "CTRL_PoC_180_Assessment_Report_template_LR.pdf";
pub const FALLBACK: &str = "CTRL_PoC_180_Assessment_Report_template_fallback.pdf";

/// A blank template with `pages` US Letter pages.
pub fn template_pdf(pages: usize) -> Vec<u8> {
    let mut doc = Document::with_version("1.5");
    let page_tree_id = doc.new_object_id();

    let mut kids = Vec::new();
    for _ in 0..pages {
        let content = Content {
            operations: vec![Operation::new("n", vec![])],
        };
        let content_id = doc.add_object(Stream::new(
            Dictionary::new(),
            content.encode().unwrap_or_default(),
        ));
        let page_id = doc.add_object(Dictionary::from_iter([
            ("Type", Object::Name(b"Page".to_vec())),
            ("Parent", Object::Reference(page_tree_id)),
            ("Contents", Object::Reference(content_id)),
            (
                "MediaBox",
                Object::Array(vec![0.into(), 0.into(), 612.into(), 792.into()]),
            ),
        ]));
        kids.push(Object::Reference(page_id));
    }

    let page_tree = Dictionary::from_iter([
        ("Type", Object::Name(b"Pages".to_vec())),
        ("Count", Object::Integer(pages as i64)),
        ("Kids", Object::Array(kids)),
    ]);
    doc.objects.insert(page_tree_id, Object::Dictionary(page_tree));

    let catalog_id = doc.add_object(Dictionary::from_iter([
        ("Type", Object::Name(b"Catalog".to_vec())),
        ("Pages", Object::Reference(page_tree_id)),
    ]));
    doc.trailer.set("Root", Object::Reference(catalog_id));

    let mut output = Vec::new();
    doc.save_to(&mut output).expect("save fixture");
    output
}

/// A temp directory holding the named eight-page templates.
pub fn template_dir(names: &[&str]) -> TempDir {
    let dir = tempfile::tempdir().expect("tempdir");
    for name in names {
        std::fs::write(dir.path().join(name), template_pdf(8)).expect("write template");
    }
    dir
}

pub fn png_bytes() -> Vec<u8> {
    let img = RgbaImage::from_pixel(4, 4, Rgba([10, 20, 30, 255]));
    let mut buf = Cursor::new(Vec::new());
    DynamicImage::ImageRgba8(img)
        .write_to(&mut buf, ImageOutputFormat::Png)
        .expect("encode png");
    buf.into_inner()
}

pub struct FailingFetcher;

impl ChartFetcher for FailingFetcher {
    fn fetch(&self, _url: &str) -> Result<FetchedChart, String> {
        Err("status 404".to_string())
    }
}

pub struct PngFetcher;

impl ChartFetcher for PngFetcher {
    fn fetch(&self, _url: &str) -> Result<FetchedChart, String> {
        Ok(FetchedChart {
            bytes: png_bytes(),
            content_type: "image/png".to_string(),
        })
    }
}

pub fn config(dir: &Path) -> ServiceConfig {
    ServiceConfig {
        template_dirs: vec![dir.to_path_buf()],
        ..ServiceConfig::default()
    }
}

pub fn router(config: ServiceConfig, fetcher: Arc<dyn ChartFetcher>) -> Router {
    app(AppState::with_fetcher(config, fetcher))
}

pub fn encode_data(payload: &Value) -> String {
    URL_SAFE_NO_PAD.encode(payload.to_string())
}

pub async fn get(router: Router, uri: &str) -> Response<Body> {
    let req = Request::builder()
        .uri(uri)
        .body(Body::empty())
        .expect("request");
    router.oneshot(req).await.expect("infallible")
}

pub async fn post_json(router: Router, uri: &str, body: &Value) -> Response<Body> {
    let req = Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .expect("request");
    router.oneshot(req).await.expect("infallible")
}

pub async fn body_bytes(response: Response<Body>) -> Vec<u8> {
    to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body")
        .to_vec()
}

pub async fn body_json(response: Response<Body>) -> Value {
    serde_json::from_slice(&body_bytes(response).await).expect("json body")
}

pub fn header<'a>(response: &'a Response<Body>, name: &str) -> &'a str {
    response
        .headers()
        .get(name)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
}
