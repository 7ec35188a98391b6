//! Layout config – the frozen, per-page representation produced by the
//! paginator and consumed by the PDF renderer. It can be dumped as JSON for
//! inspection.

use serde::{Deserialize, Serialize};

/// A complete document layout ready for rendering.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayoutConfig {
    /// Document title embedded in the PDF metadata.
    #[serde(default = "LayoutConfig::default_title")]
    pub title: String,
    /// Width of each page in PDF points (1 pt = 1/72 inch).
    pub page_width_pt: f32,
    /// Height of each page in PDF points.
    pub page_height_pt: f32,
    /// Ordered list of pages.
    pub pages: Vec<PageLayout>,
    /// Images referenced by [`ImageContent::key`], each embedded once.
    #[serde(default)]
    pub images: Vec<EmbeddedImage>,
}

/// One page of content.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageLayout {
    pub page_index: usize,
    pub boxes: Vec<LayoutBox>,
}

/// What produced a box; lets tests and tooling find rows without parsing
/// text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BoxRole {
    Paragraph,
    HeaderRow,
    BodyRow,
    FooterRow,
    Cell,
}

/// A positioned rectangle with optional content.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayoutBox {
    pub role: BoxRole,
    /// Row index within its table, for row and cell boxes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub row: Option<usize>,

    /// Position relative to page top-left, in points.
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,

    pub background_color: Option<[f32; 4]>,
    pub border: Option<BorderStyle>,

    /// Content (mutually exclusive)
    pub text: Option<TextContent>,
    pub image: Option<ImageContent>,

    pub children: Vec<LayoutBox>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BorderStyle {
    pub width: f32,
    pub color: [f32; 4],
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TextContent {
    pub lines: Vec<TextLine>,
    pub font_family: String,
    pub font_size: f32,
    pub bold: bool,
    pub color: [f32; 4],
    pub line_height: f32,
    pub text_align: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TextLine {
    pub text: String,
    /// X offset within the layout box (for alignment)
    pub x_offset: f32,
    /// Y offset from the top of the box
    pub y_offset: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageContent {
    pub key: String,
    /// Offset of the image inside its box.
    pub x_offset: f32,
    pub y_offset: f32,
    pub width: f32,
    pub height: f32,
}

/// PNG bytes for one distinct image.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddedImage {
    pub key: String,
    pub px_width: u32,
    pub px_height: u32,
    #[serde(skip)]
    pub png: Vec<u8>,
}

impl LayoutConfig {
    /// An empty A4 landscape layout.
    pub fn a4_landscape() -> Self {
        Self {
            title: Self::default_title(),
            // A4 rotated: 297mm × 210mm = 841.89 × 595.28 points
            page_width_pt: 841.89,
            page_height_pt: 595.28,
            pages: Vec::new(),
            images: Vec::new(),
        }
    }

    fn default_title() -> String {
        "invoice-forge output".to_string()
    }

    /// Serialise to JSON.
    pub fn to_json(&self) -> crate::Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Deserialise from JSON.
    pub fn from_json(json: &str) -> crate::Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// All boxes on `page` with `role`, searching row children too.
    pub fn boxes_with_role(&self, page: usize, role: BoxRole) -> Vec<&LayoutBox> {
        fn walk<'a>(b: &'a LayoutBox, role: BoxRole, out: &mut Vec<&'a LayoutBox>) {
            if b.role == role {
                out.push(b);
            }
            for child in &b.children {
                walk(child, role, out);
            }
        }
        let mut out = Vec::new();
        if let Some(p) = self.pages.get(page) {
            for b in &p.boxes {
                walk(b, role, &mut out);
            }
        }
        out
    }
}

impl LayoutBox {
    pub fn new(role: BoxRole, x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            role,
            row: None,
            x,
            y,
            width,
            height,
            background_color: None,
            border: None,
            text: None,
            image: None,
            children: Vec::new(),
        }
    }

    /// All text lines of this box and its children, joined with `\n`.
    pub fn plain_text(&self) -> String {
        let mut parts: Vec<String> = Vec::new();
        if let Some(t) = &self.text {
            parts.extend(t.lines.iter().map(|l| l.text.clone()));
        }
        for child in &self.children {
            let s = child.plain_text();
            if !s.is_empty() {
                parts.push(s);
            }
        }
        parts.join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_round_trip_keeps_pages() {
        let mut config = LayoutConfig::a4_landscape();
        let mut row = LayoutBox::new(BoxRole::BodyRow, 36.0, 36.0, 100.0, 20.0);
        row.row = Some(0);
        config.pages.push(PageLayout {
            page_index: 0,
            boxes: vec![row],
        });
        let json = config.to_json().unwrap();
        let back = LayoutConfig::from_json(&json).unwrap();
        assert_eq!(back.pages.len(), 1);
        assert_eq!(back.boxes_with_role(0, BoxRole::BodyRow).len(), 1);
        assert!(back.page_width_pt > back.page_height_pt);
    }
}
