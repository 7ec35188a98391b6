//! Units of page content handed to a sink.

use std::sync::Arc;

use crate::style::{FontRef, TextAlign};
use crate::table::Table;

/// A run of text laid out as one block. `\n` starts a new line.
#[derive(Debug, Clone, PartialEq)]
pub struct Paragraph {
    pub text: String,
    pub font: FontRef,
    pub align: TextAlign,
    pub spacing_before: f32,
    pub spacing_after: f32,
}

impl Paragraph {
    pub fn new(text: impl Into<String>, font: &FontRef) -> Self {
        Self {
            text: text.into(),
            font: Arc::clone(font),
            align: TextAlign::Left,
            spacing_before: 0.0,
            spacing_after: 0.0,
        }
    }

    pub fn align(mut self, align: TextAlign) -> Self {
        self.align = align;
        self
    }
}

/// A composed piece of a page.
#[derive(Debug, Clone, PartialEq)]
pub enum Block {
    /// Two-cell band at the top of a page: logo and header text.
    HeaderBand(Table),
    Title(Paragraph),
    Table(Table),
}

impl Block {
    pub fn kind(&self) -> &'static str {
        match self {
            Block::HeaderBand(_) => "header-band",
            Block::Title(_) => "title",
            Block::Table(_) => "table",
        }
    }

    /// The table carried by this block, if any.
    pub fn table(&self) -> Option<&Table> {
        match self {
            Block::HeaderBand(t) | Block::Table(t) => Some(t),
            Block::Title(_) => None,
        }
    }
}
