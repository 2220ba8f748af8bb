//! Overlay drawing on an existing PDF via `lopdf`.
//!
//! # Coordinate System
//!
//! Layout boxes measure `y` down from the top of the page, while PDF user
//! space has its origin at the bottom-left and `y` grows upward:
//!
//! ```text
//! pdf_y = media_box_top - top_y
//! ```
//!
//! # Content Strategy
//!
//! The template's existing content is left untouched. A `q` stream is put
//! in front of it and one overlay stream per page is appended after it,
//! starting with `Q`, so whatever graphics state the template leaves
//! behind cannot leak into the overlay.

use std::collections::BTreeMap;
use std::io::Write;

use flate2::Compression;
use flate2::write::ZlibEncoder;
use lopdf::content::{Content, Operation};
use lopdf::{Dictionary, Document, Object, ObjectId, Stream};

use ctrl180_core::models::layout::LayoutBox;
use ctrl180_core::models::overlay::{FontVariant, OverlayRun};

use crate::chart::ChartImage;
use crate::error::ExportError;
use crate::fonts::{base_font, encode_winansi};
use crate::styles::RenderStyles;

/// US Letter, used when a page has no readable MediaBox.
const DEFAULT_MEDIA_BOX: [f32; 4] = [0.0, 0.0, 612.0, 792.0];

/// Depth limit when walking up the page tree.
const MAX_TREE_DEPTH: usize = 10;

/// A loaded template with overlay operations queued per page.
pub struct ReportDocument {
    doc: Document,
    pages: Vec<ObjectId>,
    styles: RenderStyles,
    fonts: Option<(ObjectId, ObjectId)>,
    pending: BTreeMap<usize, Vec<Operation>>,
}

impl ReportDocument {
    pub fn load(bytes: &[u8], styles: RenderStyles) -> Result<Self, ExportError> {
        let doc = Document::load_mem(bytes).map_err(|e| ExportError::PdfLoad(e.to_string()))?;
        let pages = doc.get_pages().into_values().collect();
        Ok(Self {
            doc,
            pages,
            styles,
            fonts: None,
            pending: BTreeMap::new(),
        })
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Page object for a 1-based page number.
    fn page_id(&self, page: usize) -> Option<ObjectId> {
        page.checked_sub(1).and_then(|i| self.pages.get(i)).copied()
    }

    /// MediaBox of a 1-based page, or `None` past the last page.
    pub fn media_box(&self, page: usize) -> Option<[f32; 4]> {
        let page_id = self.page_id(page)?;
        let page_obj = self.doc.get_object(page_id).ok()?;
        Some(media_box(&self.doc, page_obj, MAX_TREE_DEPTH))
    }

    /// Queue text runs on a 1-based page. Returns `false` when the page does
    /// not exist in the template.
    pub fn draw_runs(&mut self, page: usize, runs: &[OverlayRun]) -> Result<bool, ExportError> {
        let (Some(page_id), Some(mb)) = (self.page_id(page), self.media_box(page)) else {
            return Ok(false);
        };
        if runs.is_empty() {
            return Ok(true);
        }

        let (regular_id, bold_id) = self.ensure_fonts();
        let regular_key = self.styles.regular_font_key.clone();
        let bold_key = self.styles.bold_font_key.clone();
        insert_resource(&mut self.doc, page_id, b"Font", &regular_key, regular_id)?;
        insert_resource(&mut self.doc, page_id, b"Font", &bold_key, bold_id)?;

        let ops = self.pending.entry(page).or_default();
        for run in runs {
            let key = self.styles.font_key(run.font);
            ops.push(Operation::new("BT", vec![]));
            ops.push(Operation::new(
                "Tf",
                vec![Object::Name(key.as_bytes().to_vec()), run.size.into()],
            ));
            ops.push(Operation::new(
                "Td",
                vec![(mb[0] + run.x).into(), (mb[3] - run.baseline).into()],
            ));
            ops.push(Operation::new(
                "Tj",
                vec![Object::string_literal(encode_winansi(&run.text))],
            ));
            ops.push(Operation::new("ET", vec![]));
        }

        Ok(true)
    }

    /// Queue an image scaled into `bx` (which must carry a height).
    pub fn draw_image(
        &mut self,
        page: usize,
        image: &ChartImage,
        bx: &LayoutBox,
    ) -> Result<bool, ExportError> {
        let (Some(page_id), Some(mb)) = (self.page_id(page), self.media_box(page)) else {
            return Ok(false);
        };
        let h = bx.h.unwrap_or(bx.w);

        let image_id = self.add_image(image)?;
        let key = self.styles.chart_key.clone();
        insert_resource(&mut self.doc, page_id, b"XObject", &key, image_id)?;

        let x = mb[0] + bx.x;
        let y_bottom = mb[3] - bx.y - h;
        let ops = self.pending.entry(page).or_default();
        ops.push(Operation::new("q", vec![]));
        ops.push(Operation::new(
            "cm",
            vec![
                bx.w.into(),
                Object::Integer(0),
                Object::Integer(0),
                h.into(),
                x.into(),
                y_bottom.into(),
            ],
        ));
        ops.push(Operation::new("Do", vec![Object::Name(key.into_bytes())]));
        ops.push(Operation::new("Q", vec![]));

        Ok(true)
    }

    /// Write queued overlays into their pages and serialize the document.
    pub fn finish(mut self) -> Result<Vec<u8>, ExportError> {
        let [r, g, b] = self.styles.text_color;
        let pending = std::mem::take(&mut self.pending);

        for (page, ops) in pending {
            let Some(page_id) = self.page_id(page) else {
                continue;
            };

            let mut operations = Vec::with_capacity(ops.len() + 4);
            operations.push(Operation::new("Q", vec![]));
            operations.push(Operation::new("q", vec![]));
            operations.push(Operation::new("rg", vec![r.into(), g.into(), b.into()]));
            operations.extend(ops);
            operations.push(Operation::new("Q", vec![]));

            let encoded = Content { operations }
                .encode()
                .map_err(|e| ExportError::Pdf(format!("content encode failed: {e}")))?;
            wrap_page_contents(&mut self.doc, page_id, encoded)?;
        }

        let mut output = Vec::new();
        self.doc
            .save_to(&mut output)
            .map_err(|e| ExportError::Pdf(format!("save failed: {e}")))?;
        Ok(output)
    }

    fn ensure_fonts(&mut self) -> (ObjectId, ObjectId) {
        if let Some(ids) = self.fonts {
            return ids;
        }
        let regular = self.doc.add_object(font_dict(FontVariant::Regular));
        let bold = self.doc.add_object(font_dict(FontVariant::Bold));
        self.fonts = Some((regular, bold));
        (regular, bold)
    }

    fn add_image(&mut self, image: &ChartImage) -> Result<ObjectId, ExportError> {
        let smask = match &image.alpha {
            Some(alpha) => {
                let dict = Dictionary::from_iter([
                    ("Type", Object::Name(b"XObject".to_vec())),
                    ("Subtype", Object::Name(b"Image".to_vec())),
                    ("Width", i64::from(image.width).into()),
                    ("Height", i64::from(image.height).into()),
                    ("ColorSpace", Object::Name(b"DeviceGray".to_vec())),
                    ("BitsPerComponent", Object::Integer(8)),
                    ("Filter", Object::Name(b"FlateDecode".to_vec())),
                ]);
                Some(self.doc.add_object(Stream::new(dict, deflate(alpha)?)))
            }
            None => None,
        };

        let (filter, data) = match image.filter {
            Some(filter) => (filter, image.data.clone()),
            None => ("FlateDecode", deflate(&image.data)?),
        };

        let mut dict = Dictionary::from_iter([
            ("Type", Object::Name(b"XObject".to_vec())),
            ("Subtype", Object::Name(b"Image".to_vec())),
            ("Width", i64::from(image.width).into()),
            ("Height", i64::from(image.height).into()),
            ("ColorSpace", Object::Name(image.color_space.as_bytes().to_vec())),
            ("BitsPerComponent", Object::Integer(8)),
            ("Filter", Object::Name(filter.as_bytes().to_vec())),
        ]);
        if let Some(smask_id) = smask {
            dict.set("SMask", Object::Reference(smask_id));
        }
        if image.inverted {
            let decode = [1, 0, 1, 0, 1, 0, 1, 0].map(Object::Integer).to_vec();
            dict.set("Decode", Object::Array(decode));
        }

        Ok(self.doc.add_object(Stream::new(dict, data)))
    }
}

fn font_dict(variant: FontVariant) -> Dictionary {
    Dictionary::from_iter([
        ("Type", Object::Name(b"Font".to_vec())),
        ("Subtype", Object::Name(b"Type1".to_vec())),
        ("BaseFont", Object::Name(base_font(variant).as_bytes().to_vec())),
        ("Encoding", Object::Name(b"WinAnsiEncoding".to_vec())),
    ])
}

fn deflate(data: &[u8]) -> Result<Vec<u8>, ExportError> {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder
        .write_all(data)
        .and_then(|()| encoder.finish())
        .map_err(|e| ExportError::Pdf(format!("deflate failed: {e}")))
}

/// Resolve a page's MediaBox, walking up the page tree when inherited.
fn media_box(doc: &Document, page_obj: &Object, depth: usize) -> [f32; 4] {
    if depth == 0 {
        return DEFAULT_MEDIA_BOX;
    }

    let Object::Dictionary(dict) = page_obj else {
        return DEFAULT_MEDIA_BOX;
    };

    if let Ok(obj) = dict.get(b"MediaBox") {
        let arr = match obj {
            Object::Array(arr) => Some(arr),
            Object::Reference(id) => match doc.get_object(*id) {
                Ok(Object::Array(arr)) => Some(arr),
                _ => None,
            },
            _ => None,
        };

        if let Some(arr) = arr {
            let values: Vec<f32> = arr
                .iter()
                .filter_map(|o| match o {
                    Object::Integer(i) => Some(*i as f32),
                    Object::Real(r) => Some(*r),
                    _ => None,
                })
                .collect();
            if let [x0, y0, x1, y1] = values[..] {
                return [x0.min(x1), y0.min(y1), x0.max(x1), y0.max(y1)];
            }
        }
    }

    if let Ok(Object::Reference(parent_id)) = dict.get(b"Parent")
        && let Ok(parent) = doc.get_object(*parent_id)
    {
        return media_box(doc, parent, depth - 1);
    }

    DEFAULT_MEDIA_BOX
}

/// Resources a page inherits from its ancestors, copied so they can be
/// given to the page itself.
fn inherited_resources(doc: &Document, page_id: ObjectId) -> Option<Dictionary> {
    let mut current = doc.get_dictionary(page_id).ok()?;
    for _ in 0..MAX_TREE_DEPTH {
        let parent_id = match current.get(b"Parent") {
            Ok(Object::Reference(id)) => *id,
            _ => return None,
        };
        current = doc.get_dictionary(parent_id).ok()?;
        match current.get(b"Resources") {
            Ok(Object::Dictionary(dict)) => return Some(dict.clone()),
            Ok(Object::Reference(id)) => return doc.get_dictionary(*id).ok().cloned(),
            _ => {}
        }
    }
    None
}

/// Give the page its own Resources entry if it only inherits one.
fn ensure_own_resources(doc: &mut Document, page_id: ObjectId) -> Result<(), ExportError> {
    if doc.get_dictionary(page_id)?.has(b"Resources") {
        return Ok(());
    }
    let inherited = inherited_resources(doc, page_id).unwrap_or_default();
    doc.get_dictionary_mut(page_id)?
        .set("Resources", Object::Dictionary(inherited));
    Ok(())
}

fn resources_mut(doc: &mut Document, page_id: ObjectId) -> Result<&mut Dictionary, ExportError> {
    let resources_ref = match doc.get_dictionary(page_id)?.get(b"Resources") {
        Ok(Object::Reference(id)) => Some(*id),
        _ => None,
    };

    match resources_ref {
        Some(id) => Ok(doc.get_dictionary_mut(id)?),
        None => Ok(doc
            .get_dictionary_mut(page_id)?
            .get_mut(b"Resources")?
            .as_dict_mut()?),
    }
}

/// Register `target` under `/category/key` in the page's resources.
fn insert_resource(
    doc: &mut Document,
    page_id: ObjectId,
    category: &[u8],
    key: &str,
    target: ObjectId,
) -> Result<(), ExportError> {
    ensure_own_resources(doc, page_id)?;

    let shared = match resources_mut(doc, page_id)?.get(category) {
        Ok(Object::Reference(id)) => Some(*id),
        _ => None,
    };
    if let Some(id) = shared {
        doc.get_dictionary_mut(id)?
            .set(key, Object::Reference(target));
        return Ok(());
    }

    let resources = resources_mut(doc, page_id)?;
    let has_inline = matches!(resources.get(category), Ok(Object::Dictionary(_)));
    if has_inline {
        resources
            .get_mut(category)?
            .as_dict_mut()?
            .set(key, Object::Reference(target));
    } else {
        resources.set(
            category.to_vec(),
            Object::Dictionary(Dictionary::from_iter([(key, Object::Reference(target))])),
        );
    }
    Ok(())
}

/// Bracket the page's existing content with `q` and the overlay stream.
fn wrap_page_contents(
    doc: &mut Document,
    page_id: ObjectId,
    overlay: Vec<u8>,
) -> Result<(), ExportError> {
    let existing: Vec<Object> = match doc.get_dictionary(page_id)?.get(b"Contents") {
        Ok(Object::Reference(id)) => match doc.get_object(*id) {
            Ok(Object::Array(items)) => items.clone(),
            _ => vec![Object::Reference(*id)],
        },
        Ok(Object::Array(items)) => items.clone(),
        _ => Vec::new(),
    };

    let open_id = doc.add_object(Stream::new(Dictionary::new(), b"q\n".to_vec()));
    let overlay_id = doc.add_object(Stream::new(Dictionary::new(), overlay));

    let mut contents = Vec::with_capacity(existing.len() + 2);
    contents.push(Object::Reference(open_id));
    contents.extend(existing);
    contents.push(Object::Reference(overlay_id));

    doc.get_dictionary_mut(page_id)?
        .set("Contents", Object::Array(contents));
    Ok(())
}
