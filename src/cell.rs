//! Logical table cells and the styling helpers that build them.

use std::sync::Arc;

use crate::image_fit::FittedImage;
use crate::style::{Border, Color, FontRef, TextAlign};

/// Default inner padding of a cell, in points.
pub const DEFAULT_CELL_PADDING: f32 = 2.0;

/// What a cell shows. A cell holds text or an image, never both.
#[derive(Debug, Clone, PartialEq)]
pub enum CellContent {
    Text(String),
    Image(Arc<FittedImage>),
}

impl From<&str> for CellContent {
    fn from(s: &str) -> Self {
        CellContent::Text(s.to_string())
    }
}

impl From<String> for CellContent {
    fn from(s: String) -> Self {
        CellContent::Text(s)
    }
}

impl From<Arc<FittedImage>> for CellContent {
    fn from(img: Arc<FittedImage>) -> Self {
        CellContent::Image(img)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Cell {
    pub content: CellContent,
    pub font: FontRef,
    pub align: TextAlign,
    pub border: Border,
    pub background: Option<Color>,
    pub colspan: usize,
    pub rowspan: usize,
    pub padding: f32,
}

/// Build a fully specified cell. Span values are checked when the cell is
/// added to a table row.
pub fn make_cell(
    content: impl Into<CellContent>,
    font: &FontRef,
    align: TextAlign,
    border: Border,
    background: Option<Color>,
    colspan: usize,
    rowspan: usize,
) -> Cell {
    Cell {
        content: content.into(),
        font: Arc::clone(font),
        align,
        border,
        background,
        colspan,
        rowspan,
        padding: DEFAULT_CELL_PADDING,
    }
}

impl Cell {
    /// A boxed, left-aligned single-span text cell.
    pub fn text(text: impl Into<String>, font: &FontRef) -> Self {
        make_cell(
            CellContent::Text(text.into()),
            font,
            TextAlign::Left,
            Border::Box,
            None,
            1,
            1,
        )
    }

    /// A boxed single-span image cell. `font` only sizes the empty line
    /// height when the image is missing.
    pub fn image(image: Arc<FittedImage>, font: &FontRef) -> Self {
        make_cell(
            CellContent::Image(image),
            font,
            TextAlign::Left,
            Border::Box,
            None,
            1,
            1,
        )
    }

    pub fn align(mut self, align: TextAlign) -> Self {
        self.align = align;
        self
    }

    pub fn border(mut self, border: Border) -> Self {
        self.border = border;
        self
    }

    pub fn background(mut self, color: Color) -> Self {
        self.background = Some(color);
        self
    }

    pub fn colspan(mut self, n: usize) -> Self {
        self.colspan = n;
        self
    }

    pub fn rowspan(mut self, n: usize) -> Self {
        self.rowspan = n;
        self
    }

    pub fn padding(mut self, pt: f32) -> Self {
        self.padding = pt;
        self
    }

    pub fn as_text(&self) -> Option<&str> {
        match &self.content {
            CellContent::Text(t) => Some(t),
            CellContent::Image(_) => None,
        }
    }
}
