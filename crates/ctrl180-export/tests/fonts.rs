use ctrl180_core::measure::TextMeasure;
use ctrl180_core::models::overlay::FontVariant;
use ctrl180_export::fonts::{StandardFonts, base_font, char_width, encode_winansi, text_width};

#[test]
fn helvetica_widths_match_the_afm() {
    // H e l l o = 722 + 556 + 222 + 222 + 556
    let width = text_width("Hello", FontVariant::Regular, 10.0);
    assert!((width - 22.78).abs() < 1e-3, "{width}");
    assert_eq!(char_width(' ', FontVariant::Regular), 278);
    assert_eq!(char_width('W', FontVariant::Bold), 944);
}

#[test]
fn bold_is_wider_than_regular() {
    let regular = text_width("Assessment summary", FontVariant::Regular, 12.0);
    let bold = text_width("Assessment summary", FontVariant::Bold, 12.0);
    assert!(bold > regular);
}

#[test]
fn accented_letters_use_their_base_width() {
    assert_eq!(
        char_width('\u{00E9}', FontVariant::Regular),
        char_width('e', FontVariant::Regular)
    );
    assert_eq!(char_width('\u{2022}', FontVariant::Regular), 350);
    assert_eq!(
        char_width('\u{4E2D}', FontVariant::Regular),
        char_width('?', FontVariant::Regular)
    );
}

#[test]
fn standard_fonts_measure_through_the_trait() {
    let measure = StandardFonts;
    assert_eq!(
        measure.text_width("abc", FontVariant::Bold, 12.0),
        text_width("abc", FontVariant::Bold, 12.0)
    );
}

#[test]
fn winansi_encoding_maps_the_high_block() {
    let encoded = encode_winansi("caf\u{00E9} \u{2022} \u{201C}x\u{201D} \u{20AC}");
    assert_eq!(
        encoded,
        vec![b'c', b'a', b'f', 0xE9, b' ', 0x95, b' ', 0x93, b'x', 0x94, b' ', 0x80]
    );
}

#[test]
fn unencodable_characters_become_question_marks() {
    assert_eq!(encode_winansi("a\u{4E2D}b"), b"a?b".to_vec());
    assert_eq!(encode_winansi("tab\there"), b"tabhere".to_vec());
}

#[test]
fn base_fonts_are_the_standard_helveticas() {
    assert_eq!(base_font(FontVariant::Regular), "Helvetica");
    assert_eq!(base_font(FontVariant::Bold), "Helvetica-Bold");
}
