#![allow(dead_code)]

use std::io::Cursor;

use image::{DynamicImage, ImageOutputFormat, Rgba, RgbaImage};
use lopdf::content::{Content, Operation};
use lopdf::{Dictionary, Document, Object, ObjectId, Stream};

/// A template of `pages` US Letter pages, each showing `Template page N`.
///
/// With `inherit`, Resources and MediaBox live on the page tree node
/// instead of the pages, as many authoring tools write them.
pub fn template_pdf(pages: usize, inherit: bool) -> Vec<u8> {
    let mut doc = Document::with_version("1.5");
    let page_tree_id = doc.new_object_id();

    let font_id = doc.add_object(Dictionary::from_iter([
        ("Type", Object::Name(b"Font".to_vec())),
        ("Subtype", Object::Name(b"Type1".to_vec())),
        ("BaseFont", Object::Name(b"Times-Roman".to_vec())),
    ]));
    let resources = Dictionary::from_iter([(
        "Font",
        Object::Dictionary(Dictionary::from_iter([("F1", Object::Reference(font_id))])),
    )]);
    let resources_id = doc.add_object(resources.clone());
    let media_box = Object::Array(vec![0.into(), 0.into(), 612.into(), 792.into()]);

    let mut kids = Vec::new();
    for n in 1..=pages {
        let content = Content {
            operations: vec![
                Operation::new("BT", vec![]),
                Operation::new("Tf", vec!["F1".into(), 24.into()]),
                Operation::new("Td", vec![72.into(), 720.into()]),
                Operation::new("Tj", vec![Object::string_literal(format!("Template page {n}"))]),
                Operation::new("ET", vec![]),
            ],
        };
        let content_id = doc.add_object(Stream::new(
            Dictionary::new(),
            content.encode().unwrap_or_default(),
        ));

        let mut page = Dictionary::from_iter([
            ("Type", Object::Name(b"Page".to_vec())),
            ("Parent", Object::Reference(page_tree_id)),
            ("Contents", Object::Reference(content_id)),
        ]);
        if !inherit {
            page.set("Resources", Object::Reference(resources_id));
            page.set("MediaBox", media_box.clone());
        }
        kids.push(Object::Reference(doc.add_object(page)));
    }

    let mut page_tree = Dictionary::from_iter([
        ("Type", Object::Name(b"Pages".to_vec())),
        ("Count", Object::Integer(pages as i64)),
        ("Kids", Object::Array(kids)),
    ]);
    if inherit {
        page_tree.set("Resources", Object::Dictionary(resources));
        page_tree.set("MediaBox", media_box);
    }
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

pub fn png_bytes(pixels: &[[u8; 4]], width: u32) -> Vec<u8> {
    let height = pixels.len() as u32 / width;
    let mut img = RgbaImage::new(width, height);
    for (i, px) in pixels.iter().enumerate() {
        img.put_pixel(i as u32 % width, i as u32 / width, Rgba(*px));
    }
    let mut buf = Cursor::new(Vec::new());
    DynamicImage::ImageRgba8(img)
        .write_to(&mut buf, ImageOutputFormat::Png)
        .expect("encode png");
    buf.into_inner()
}

pub fn jpeg_bytes(width: u32, height: u32) -> Vec<u8> {
    let img = image::RgbImage::from_pixel(width, height, image::Rgb([200, 30, 30]));
    let mut buf = Cursor::new(Vec::new());
    DynamicImage::ImageRgb8(img)
        .write_to(&mut buf, ImageOutputFormat::Jpeg(85))
        .expect("encode jpeg");
    buf.into_inner()
}

pub fn page_ids(doc: &Document) -> Vec<ObjectId> {
    doc.get_pages().into_values().collect()
}

/// Operations of a page's (concatenated) content streams.
pub fn page_operations(doc: &Document, page_id: ObjectId) -> Vec<Operation> {
    let bytes = doc.get_page_content(page_id).expect("page content");
    Content::decode(&bytes).expect("decode content").operations
}

/// Every string drawn with `Tj` on a page.
pub fn shown_strings(doc: &Document, page_id: ObjectId) -> Vec<Vec<u8>> {
    page_operations(doc, page_id)
        .into_iter()
        .filter(|op| op.operator == "Tj")
        .filter_map(|op| op.operands.first().and_then(|o| o.as_str().ok()).map(<[u8]>::to_vec))
        .collect()
}

/// A page's own Resources dictionary, resolving a reference.
pub fn page_resources(doc: &Document, page_id: ObjectId) -> Dictionary {
    let page = doc.get_dictionary(page_id).expect("page dict");
    match page.get(b"Resources") {
        Ok(Object::Dictionary(dict)) => dict.clone(),
        Ok(Object::Reference(id)) => doc.get_dictionary(*id).expect("resources").clone(),
        _ => Dictionary::new(),
    }
}

/// Keys of one resource category (`Font`, `XObject`) on a page.
pub fn resource_keys(doc: &Document, page_id: ObjectId, category: &[u8]) -> Vec<String> {
    let resources = page_resources(doc, page_id);
    let dict = match resources.get(category) {
        Ok(Object::Dictionary(dict)) => dict.clone(),
        Ok(Object::Reference(id)) => doc.get_dictionary(*id).expect("category").clone(),
        _ => return Vec::new(),
    };
    dict.iter()
        .map(|(k, _)| String::from_utf8_lossy(k).into_owned())
        .collect()
}
