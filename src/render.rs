//! PDF renderer – takes a [`LayoutConfig`] and produces PDF bytes using
//! `printpdf` (v0.8 ops-based API).

use std::collections::HashMap;

use printpdf::*;

use crate::error::Result;
use crate::layout_config::{BorderStyle, LayoutBox, LayoutConfig, TextContent};
use crate::fonts::ASCENDER_FACTOR;
use crate::style::FontFamily;

/// Points to millimetres.
const PT_TO_MM: f32 = 0.352778;

/// A printpdf XObject together with the pixel dimensions of the source image.
struct ImageResource {
    xobj_id: XObjectId,
    px_width: u32,
    px_height: u32,
}

/// Render a LayoutConfig into PDF bytes.
///
/// Images whose PNG bytes printpdf cannot decode are skipped with a
/// `log::warn`.
pub fn render_pdf(config: &LayoutConfig) -> Result<Vec<u8>> {
    let page_w = Mm(config.page_width_pt * PT_TO_MM);
    let page_h = Mm(config.page_height_pt * PT_TO_MM);

    let mut doc = PdfDocument::new(&config.title);

    let mut images: HashMap<&str, ImageResource> = HashMap::new();
    let mut warnings: Vec<PdfWarnMsg> = Vec::new();
    for embedded in &config.images {
        match RawImage::decode_from_bytes(&embedded.png, &mut warnings) {
            Ok(raw) => {
                let xobj_id = doc.add_image(&raw);
                images.insert(
                    embedded.key.as_str(),
                    ImageResource {
                        xobj_id,
                        px_width: embedded.px_width,
                        px_height: embedded.px_height,
                    },
                );
            }
            Err(e) => log::warn!("Skipping image {}: PDF encode error: {e}", embedded.key),
        }
    }

    let mut pages: Vec<PdfPage> = config
        .pages
        .iter()
        .map(|page_layout| {
            let mut ops = Vec::new();
            for lbox in &page_layout.boxes {
                render_box(&mut ops, lbox, config.page_height_pt, &images);
            }
            PdfPage::new(page_w, page_h, ops)
        })
        .collect();

    if pages.is_empty() {
        pages.push(PdfPage::new(page_w, page_h, Vec::new()));
    }

    doc.with_pages(pages);
    Ok(doc.save(&PdfSaveOptions::default(), &mut Vec::new()))
}

fn rgb(c: &[f32; 4]) -> Color {
    Color::Rgb(Rgb {
        r: c[0],
        g: c[1],
        b: c[2],
        icc_profile: None,
    })
}

fn point(x: f32, y: f32) -> LinePoint {
    LinePoint {
        p: Point { x: Pt(x), y: Pt(y) },
        bezier: false,
    }
}

/// Corners of a rectangle in PDF space, counter-clockwise from bottom-left.
fn corners(x1: f32, y1: f32, x2: f32, y2: f32) -> Vec<LinePoint> {
    vec![point(x1, y1), point(x2, y1), point(x2, y2), point(x1, y2)]
}

fn builtin_font(family: &str, bold: bool) -> BuiltinFont {
    match (FontFamily::from_name(family), bold) {
        (FontFamily::Helvetica, false) => BuiltinFont::Helvetica,
        (FontFamily::Helvetica, true) => BuiltinFont::HelveticaBold,
        (FontFamily::TimesRoman, false) => BuiltinFont::TimesRoman,
        (FontFamily::TimesRoman, true) => BuiltinFont::TimesBold,
        (FontFamily::Courier, false) => BuiltinFont::Courier,
        (FontFamily::Courier, true) => BuiltinFont::CourierBold,
    }
}

/// Characters Windows-1252 places in 0x80–0x9F.
const WINANSI_EXTRAS: &str = "€‚ƒ„…†‡ˆ‰Š‹ŒŽ‘’“”•–—˜™š›œžŸ";

/// Replace characters the builtin fonts cannot show with `?`.
///
/// Builtin fonts use WinAnsiEncoding; printpdf encodes the UTF-8 text for
/// them, so the string only has to stay inside that repertoire.
fn winansi_text(s: &str) -> String {
    s.chars()
        .map(|c| match c {
            '\u{00A0}' | '\t' => ' ',
            ' '..='~' | '\u{00A1}'..='\u{00FF}' => c,
            c if WINANSI_EXTRAS.contains(c) => c,
            _ => '?',
        })
        .collect()
}

fn push_background(ops: &mut Vec<Op>, lbox: &LayoutBox, bg: &[f32; 4], pdf_top: f32) {
    ops.push(Op::SetFillColor { col: rgb(bg) });
    ops.push(Op::DrawPolygon {
        polygon: Polygon {
            rings: vec![PolygonRing {
                points: corners(lbox.x, pdf_top - lbox.height, lbox.x + lbox.width, pdf_top),
            }],
            mode: PaintMode::Fill,
            winding_order: WindingOrder::NonZero,
        },
    });
}

fn push_border(ops: &mut Vec<Op>, lbox: &LayoutBox, border: &BorderStyle, pdf_top: f32) {
    ops.push(Op::SetOutlineColor {
        col: rgb(&border.color),
    });
    ops.push(Op::SetOutlineThickness {
        pt: Pt(border.width),
    });
    ops.push(Op::DrawLine {
        line: Line {
            points: corners(lbox.x, pdf_top - lbox.height, lbox.x + lbox.width, pdf_top),
            is_closed: true,
        },
    });
}

fn push_text(ops: &mut Vec<Op>, lbox: &LayoutBox, text: &TextContent, pdf_top: f32) {
    let font = builtin_font(&text.font_family, text.bold);
    // Baseline = top of line + ascender.
    let ascender = text.font_size * ASCENDER_FACTOR;

    for line in text.lines.iter().filter(|l| !l.text.is_empty()) {
        ops.push(Op::StartTextSection);
        ops.push(Op::SetTextCursor {
            pos: Point {
                x: Pt(lbox.x + line.x_offset),
                y: Pt(pdf_top - line.y_offset - ascender),
            },
        });
        ops.push(Op::SetFontSizeBuiltinFont {
            size: Pt(text.font_size),
            font,
        });
        ops.push(Op::SetLineHeight {
            lh: Pt(text.line_height),
        });
        ops.push(Op::SetFillColor {
            col: rgb(&text.color),
        });
        ops.push(Op::WriteTextBuiltinFont {
            items: vec![TextItem::Text(winansi_text(&line.text))],
            font,
        });
        ops.push(Op::EndTextSection);
    }
}

/// Recursively render a LayoutBox and its children into PDF ops.
fn render_box(
    ops: &mut Vec<Op>,
    lbox: &LayoutBox,
    page_height: f32,
    images: &HashMap<&str, ImageResource>,
) {
    // Layout origin is top-left, PDF origin is bottom-left.
    let pdf_top = page_height - lbox.y;

    if let Some(bg) = &lbox.background_color {
        push_background(ops, lbox, bg, pdf_top);
    }
    if let Some(border) = &lbox.border {
        push_border(ops, lbox, border, pdf_top);
    }
    if let Some(text) = &lbox.text {
        push_text(ops, lbox, text, pdf_top);
    }

    if let Some(img) = &lbox.image {
        if let Some(res) = images.get(img.key.as_str()) {
            // At dpi=72 printpdf renders 1 px = 1 pt.
            let scale = |target: f32, px: u32| if px > 0 { target / px as f32 } else { 1.0 };
            ops.push(Op::UseXobject {
                id: res.xobj_id.clone(),
                transform: XObjectTransform {
                    translate_x: Some(Pt(lbox.x + img.x_offset)),
                    translate_y: Some(Pt(pdf_top - img.y_offset - img.height)),
                    dpi: Some(72.0),
                    scale_x: Some(scale(img.width, res.px_width)),
                    scale_y: Some(scale(img.height, res.px_height)),
                    rotate: None,
                },
            });
        } else {
            log::warn!("Image {} was not embedded; leaving its cell blank", img.key);
        }
    }

    for child in &lbox.children {
        render_box(ops, child, page_height, images);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout_config::{BoxRole, PageLayout, TextLine};

    #[test]
    fn render_empty_layout() {
        let config = LayoutConfig::a4_landscape();
        let bytes = render_pdf(&config).unwrap();
        assert!(bytes.len() > 100, "PDF should have content");
        assert_eq!(&bytes[0..5], b"%PDF-");
    }

    #[test]
    fn winansi_text_keeps_latin1_and_replaces_the_rest() {
        assert_eq!(winansi_text("abc"), "abc");
        assert_eq!(winansi_text("Café – 12 €"), "Café – 12 €");
        assert_eq!(winansi_text("Nguyễn \u{4e2d}"), "Nguy?n ?");
        assert_eq!(winansi_text("a\u{00A0}b\tc"), "a b c");
    }

    #[test]
    fn accented_text_renders() {
        let mut config = LayoutConfig::a4_landscape();
        let mut lbox = LayoutBox::new(BoxRole::Cell, 36.0, 36.0, 200.0, 20.0);
        lbox.text = Some(TextContent {
            lines: vec![TextLine {
                text: "Société Générale – Ørsted ½ €".to_string(),
                x_offset: 2.0,
                y_offset: 2.0,
            }],
            font_family: "Helvetica".to_string(),
            font_size: 12.0,
            bold: false,
            color: [0.0, 0.0, 0.0, 1.0],
            line_height: 16.8,
            text_align: "left".to_string(),
        });
        config.pages.push(PageLayout {
            page_index: 0,
            boxes: vec![lbox],
        });
        let bytes = render_pdf(&config).unwrap();
        assert_eq!(&bytes[0..5], b"%PDF-");
    }

    #[test]
    fn font_mapping() {
        assert!(matches!(builtin_font("Helvetica", true), BuiltinFont::HelveticaBold));
        assert!(matches!(builtin_font("Times-Roman", false), BuiltinFont::TimesRoman));
        assert!(matches!(builtin_font("unknown", false), BuiltinFont::Helvetica));
    }
}
