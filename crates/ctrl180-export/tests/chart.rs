mod common;

use ctrl180_export::chart::{ChartImage, ImageKind, JpegLayout, jpeg_layout};
use ctrl180_export::error::ExportError;

#[test]
fn kind_detection_reads_the_content_type() {
    assert_eq!(
        ImageKind::detect("https://c/chart", "image/png"),
        Some(ImageKind::Png)
    );
    assert_eq!(
        ImageKind::detect("https://c/chart", "image/jpeg; charset=binary"),
        Some(ImageKind::Jpeg)
    );
}

#[test]
fn kind_detection_falls_back_to_the_url_suffix() {
    assert_eq!(
        ImageKind::detect("https://c/chart.PNG?v=2", ""),
        Some(ImageKind::Png)
    );
    assert_eq!(ImageKind::detect("https://c/c.jpeg", ""), Some(ImageKind::Jpeg));
    assert_eq!(ImageKind::detect("https://c/c.jpg?x=1", ""), Some(ImageKind::Jpeg));
    assert_eq!(ImageKind::detect("https://c/page", "text/html"), None);
}

#[test]
fn png_with_alpha_gets_a_soft_mask() {
    let bytes = common::png_bytes(&[[255, 0, 0, 255], [0, 0, 255, 128]], 2);
    let chart = ChartImage::decode(&bytes, ImageKind::Png).expect("decode");

    assert_eq!((chart.width, chart.height), (2, 1));
    assert_eq!(chart.color_space, "DeviceRGB");
    assert_eq!(chart.filter, None);
    assert_eq!(chart.data, vec![255, 0, 0, 0, 0, 255]);
    assert_eq!(chart.alpha, Some(vec![255, 128]));
}

#[test]
fn opaque_png_has_no_mask() {
    let bytes = common::png_bytes(&[[1, 2, 3, 255]; 4], 2);
    let chart = ChartImage::decode(&bytes, ImageKind::Png).expect("decode");
    assert_eq!((chart.width, chart.height), (2, 2));
    assert_eq!(chart.alpha, None);
}

#[test]
fn jpeg_bytes_pass_through() {
    let bytes = common::jpeg_bytes(8, 4);
    let chart = ChartImage::decode(&bytes, ImageKind::Jpeg).expect("decode");
    assert_eq!((chart.width, chart.height), (8, 4));
    assert_eq!(chart.filter, Some("DCTDecode"));
    assert_eq!(chart.color_space, "DeviceRGB");
    assert!(!chart.inverted);
    assert_eq!(chart.data, bytes);
}

/// SOI, an optional Adobe APP14 segment and the head of a baseline frame
/// with `components` components.
fn jpeg_header(components: u8, adobe: bool) -> Vec<u8> {
    let mut bytes = vec![0xFF, 0xD8];
    if adobe {
        bytes.extend_from_slice(&[0xFF, 0xEE, 0x00, 0x0E]);
        bytes.extend_from_slice(b"Adobe");
        bytes.extend_from_slice(&[0x00, 0x64, 0x00, 0x00, 0x00, 0x00, 0x02]);
    }
    bytes.extend_from_slice(&[0xFF, 0xC0, 0x00, 0x11, 0x08, 0x00, 0x04, 0x00, 0x08, components]);
    bytes
}

#[test]
fn jpeg_layout_reads_the_frame_header() {
    let layout = jpeg_layout(&common::jpeg_bytes(8, 4)).expect("layout");
    assert_eq!(layout.components, 3);
    assert_eq!(layout.color_space(), "DeviceRGB");

    assert_eq!(
        jpeg_layout(&jpeg_header(4, true)),
        Some(JpegLayout {
            components: 4,
            adobe: true
        })
    );
    assert_eq!(jpeg_layout(&jpeg_header(4, false)).map(|l| l.adobe), Some(false));
    assert_eq!(
        jpeg_layout(&jpeg_header(4, true)).map(|l| l.color_space()),
        Some("DeviceCMYK")
    );
    assert_eq!(
        jpeg_layout(&jpeg_header(1, false)).map(|l| l.color_space()),
        Some("DeviceGray")
    );
}

#[test]
fn jpeg_layout_rejects_other_data() {
    assert_eq!(jpeg_layout(b"\x89PNG\r\n"), None);
    assert_eq!(jpeg_layout(&[0xFF, 0xD8, 0xFF]), None);
    assert_eq!(jpeg_layout(&[]), None);
}

#[test]
fn garbage_is_an_image_error() {
    let result = ChartImage::decode(b"<html>nope</html>", ImageKind::Png);
    assert!(matches!(result, Err(ExportError::Image(_))));
}
