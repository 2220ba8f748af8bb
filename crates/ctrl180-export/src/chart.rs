//! Chart image decoding for embedding as a PDF image XObject.

use image::{ColorType, GenericImageView, ImageFormat};

use crate::error::ExportError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageKind {
    Png,
    Jpeg,
}

impl ImageKind {
    /// Guess the kind from the response content type, then the URL suffix
    /// (with or without a query string). `None` means "do not embed".
    pub fn detect(url: &str, content_type: &str) -> Option<ImageKind> {
        let ct = content_type.to_ascii_lowercase();
        let u = url.to_ascii_lowercase();
        let has_ext = |ext: &str| u.ends_with(ext) || u.contains(&format!("{ext}?"));

        if ct.contains("png") || has_ext(".png") {
            Some(ImageKind::Png)
        } else if ct.contains("jpeg") || ct.contains("jpg") || has_ext(".jpg") || has_ext(".jpeg") {
            Some(ImageKind::Jpeg)
        } else {
            None
        }
    }
}

/// Pixel data ready to become an image XObject.
#[derive(Debug, Clone)]
pub struct ChartImage {
    pub width: u32,
    pub height: u32,
    pub color_space: &'static str,
    /// `DCTDecode` for JPEG passthrough, `None` for raw samples that the
    /// writer still has to compress.
    pub filter: Option<&'static str>,
    pub data: Vec<u8>,
    /// 8-bit alpha channel, present only when some pixel is not opaque.
    pub alpha: Option<Vec<u8>>,
    /// Samples are stored inverted (Adobe CMYK JPEGs) and need a
    /// `[1 0 1 0 …]` decode array.
    pub inverted: bool,
}

impl ChartImage {
    pub fn decode(bytes: &[u8], kind: ImageKind) -> Result<ChartImage, ExportError> {
        match kind {
            ImageKind::Jpeg => decode_jpeg(bytes),
            ImageKind::Png => decode_png(bytes),
        }
    }
}

fn decode_jpeg(bytes: &[u8]) -> Result<ChartImage, ExportError> {
    let decoded = image::load_from_memory_with_format(bytes, ImageFormat::Jpeg)
        .map_err(|e| ExportError::Image(e.to_string()))?;
    let (width, height) = decoded.dimensions();

    // The decoder converts CMYK to RGB, so the stored layout comes from the
    // frame header.
    let (color_space, inverted) = match jpeg_layout(bytes) {
        Some(layout) => (layout.color_space(), layout.components == 4 && layout.adobe),
        None => match decoded.color() {
            ColorType::L8 | ColorType::La8 => ("DeviceGray", false),
            _ => ("DeviceRGB", false),
        },
    };

    Ok(ChartImage {
        width,
        height,
        color_space,
        filter: Some("DCTDecode"),
        data: bytes.to_vec(),
        alpha: None,
        inverted,
    })
}

/// Sample layout of a JPEG as stored in the file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JpegLayout {
    /// Component count from the frame header.
    pub components: u8,
    /// An Adobe APP14 segment precedes the frame.
    pub adobe: bool,
}

impl JpegLayout {
    pub fn color_space(&self) -> &'static str {
        match self.components {
            1 => "DeviceGray",
            4 => "DeviceCMYK",
            _ => "DeviceRGB",
        }
    }
}

/// Read the component count from the first SOF segment.
pub fn jpeg_layout(bytes: &[u8]) -> Option<JpegLayout> {
    if bytes.get(..2)? != [0xFF, 0xD8] {
        return None;
    }

    let mut adobe = false;
    let mut pos = 2;
    loop {
        if *bytes.get(pos)? != 0xFF {
            return None;
        }
        let mut marker_at = pos + 1;
        while *bytes.get(marker_at)? == 0xFF {
            marker_at += 1;
        }
        let marker = bytes[marker_at];
        pos = marker_at + 1;

        // Standalone markers carry no length.
        if matches!(marker, 0x01 | 0xD0..=0xD7) {
            continue;
        }

        let len = usize::from(u16::from_be_bytes([*bytes.get(pos)?, *bytes.get(pos + 1)?]));
        if len < 2 {
            return None;
        }
        match marker {
            0xC0..=0xCF if !matches!(marker, 0xC4 | 0xC8 | 0xCC) => {
                let components = *bytes.get(pos + 7)?;
                return Some(JpegLayout { components, adobe });
            }
            0xEE => adobe |= bytes.get(pos + 2..pos + 7) == Some(b"Adobe".as_slice()),
            0xD9 | 0xDA => return None,
            _ => {}
        }
        pos += len;
    }
}

fn decode_png(bytes: &[u8]) -> Result<ChartImage, ExportError> {
    let decoded = image::load_from_memory_with_format(bytes, ImageFormat::Png)
        .map_err(|e| ExportError::Image(e.to_string()))?;
    let (width, height) = decoded.dimensions();
    let rgba = decoded.to_rgba8();

    let pixels = (width as usize) * (height as usize);
    let mut rgb = Vec::with_capacity(pixels * 3);
    let mut alpha = Vec::with_capacity(pixels);
    let mut translucent = false;
    for pixel in rgba.pixels() {
        let [r, g, b, a] = pixel.0;
        rgb.extend_from_slice(&[r, g, b]);
        alpha.push(a);
        translucent |= a != u8::MAX;
    }

    Ok(ChartImage {
        width,
        height,
        color_space: "DeviceRGB",
        filter: None,
        data: rgb,
        alpha: translucent.then_some(alpha),
        inverted: false,
    })
}
