//! Page composition: the header band and title repeated on every cover page,
//! the invoice detail header, and the optional line-items table.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::block::{Block, Paragraph};
use crate::cell::{make_cell, Cell, CellContent};
use crate::error::{LayoutError, Result};
use crate::image_fit::LogoOutcome;
use crate::style::{Border, Color, FontRef, StyleConfig, TextAlign};
use crate::table::{Table, TableBuilder};

/// Relative widths of the five detail-header columns.
pub const DETAIL_COLUMN_WIDTHS: [f32; 5] = [1.5, 3.5, 1.0, 3.0, 1.0];

/// Vertical gap between the title and the detail header, in points.
pub const DETAIL_SPACING_BEFORE: f32 = 12.0;

fn borderless(content: impl Into<CellContent>, font: &FontRef, align: TextAlign) -> Cell {
    make_cell(content, font, align, Border::None, None, 1, 1)
}

/// The header band (logo left, `right_text` right) followed by the centered
/// page title.
pub fn compose_header_page(
    logo: &LogoOutcome,
    right_text: &str,
    title: &str,
    style: &StyleConfig,
) -> Result<Vec<Block>> {
    let mut band = TableBuilder::with_columns(2)?;
    let left = match logo {
        LogoOutcome::Fitted(img) => Cell::image(Arc::clone(img), &style.body).border(Border::None),
        LogoOutcome::Omitted { .. } => borderless("", &style.body, TextAlign::Left),
    };
    let right = borderless(right_text, &style.header_band, TextAlign::Right);
    band.add_row(vec![left, right])?;

    let title = Paragraph::new(title, &style.title).align(TextAlign::Center);
    Ok(vec![Block::HeaderBand(band.build()?), Block::Title(title)])
}

// ---------------------------------------------------------------------------
// Detail header
// ---------------------------------------------------------------------------

/// One label/value pair. Both parts may be empty.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DetailField {
    pub label: String,
    pub value: String,
}

impl DetailField {
    pub fn new(label: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            value: value.into(),
        }
    }
}

/// One row of the detail header: two label/value pairs and a right-aligned
/// note in the last column.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DetailRow {
    pub left: DetailField,
    pub right: DetailField,
    #[serde(default)]
    pub note: String,
}

/// The customer and sales data printed under the title.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InvoiceDetails {
    pub customer: String,
    pub invoice_number: String,
    pub invoice_date: String,
    pub salesman: String,
    pub phone: String,
    pub tax_id: String,
}

impl InvoiceDetails {
    /// The fixed three-row arrangement:
    ///
    /// ```text
    /// Customer:       <customer>  Invoice No.: <number>    <date>
    ///                             Salesman:    <salesman>
    /// Federal Tax ID: <tax id>    Phone:       <phone>
    /// ```
    pub fn rows(&self) -> Vec<DetailRow> {
        vec![
            DetailRow {
                left: DetailField::new("Customer:", &self.customer),
                right: DetailField::new("Invoice No.:", &self.invoice_number),
                note: self.invoice_date.clone(),
            },
            DetailRow {
                left: DetailField::default(),
                right: DetailField::new("Salesman:", &self.salesman),
                note: String::new(),
            },
            DetailRow {
                left: DetailField::new("Federal Tax ID:", &self.tax_id),
                right: DetailField::new("Phone:", &self.phone),
                note: String::new(),
            },
        ]
    }
}

/// A borderless, all-bold 5-column table, one table row per detail row.
pub fn compose_detail_header(rows: &[DetailRow], style: &StyleConfig) -> Result<Table> {
    let mut table = TableBuilder::new(&DETAIL_COLUMN_WIDTHS)?;
    table.set_spacing_before(DETAIL_SPACING_BEFORE);

    let bold = &style.bold;
    for row in rows {
        table.add_row(vec![
            borderless(row.left.label.as_str(), bold, TextAlign::Left),
            borderless(row.left.value.as_str(), bold, TextAlign::Left),
            borderless(row.right.label.as_str(), bold, TextAlign::Left),
            borderless(row.right.value.as_str(), bold, TextAlign::Left),
            borderless(row.note.as_str(), bold, TextAlign::Right),
        ])?;
    }
    table.build()
}

// ---------------------------------------------------------------------------
// Line items
// ---------------------------------------------------------------------------

/// A titled grid of invoice lines.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineItems {
    /// Text of the caption row spanning all columns.
    pub caption: String,
    pub columns: Vec<String>,
    /// Relative column widths; equal widths when omitted.
    #[serde(default)]
    pub widths: Vec<f32>,
    pub rows: Vec<Vec<String>>,
    /// Background of every other body row.
    #[serde(default)]
    pub banding: Option<Color>,
}

/// Caption and column-header rows repeat at the top of every page the table
/// spans; the column-header row also closes every page as the footer.
pub fn compose_line_items(items: &LineItems, style: &StyleConfig) -> Result<Table> {
    let columns = items.columns.len();
    let mut table = if items.widths.is_empty() {
        TableBuilder::with_columns(columns)?
    } else if items.widths.len() == columns {
        TableBuilder::new(&items.widths)?
    } else {
        return Err(LayoutError::WidthCount {
            given: items.widths.len(),
            columns,
        }
        .into());
    };

    let column_header = || -> Vec<Cell> {
        items
            .columns
            .iter()
            .map(|c| Cell::text(c.as_str(), &style.body).background(style.column_header_background))
            .collect()
    };

    table.add_row(vec![Cell::text(items.caption.as_str(), &style.caption)
        .background(style.caption_background)
        .align(TextAlign::Center)
        .colspan(columns)])?;
    table.add_row(column_header())?;
    for row in &items.rows {
        table.add_row(row.iter().map(|v| Cell::text(v.as_str(), &style.body)).collect())?;
    }
    table.add_row(column_header())?;

    table
        .set_header_rows(2)
        .set_footer_rows(1)
        .set_banding(items.banding);
    table.build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::image_fit::ImageFitter;
    use image::DynamicImage;

    fn details() -> InvoiceDetails {
        InvoiceDetails {
            customer: "C20000 - Maxi Teq:".into(),
            invoice_number: "366".into(),
            invoice_date: "2/11/2017".into(),
            salesman: "Salesman 2 -".into(),
            phone: "0868603494".into(),
            tax_id: "79 933 596 217".into(),
        }
    }

    #[test]
    fn header_page_with_logo() {
        let style = StyleConfig::default();
        let img = ImageFitter::fit(&DynamicImage::new_rgb8(260, 100), 130).unwrap();
        let logo = LogoOutcome::Fitted(Arc::new(img));
        let blocks =
            compose_header_page(&logo, "OEC Computers Australia\n/ LEVEL 1", "SALES INVOICE", &style)
                .unwrap();
        assert_eq!(blocks.len(), 2);

        let Block::HeaderBand(band) = &blocks[0] else {
            panic!("expected header band, got {}", blocks[0].kind());
        };
        assert_eq!(band.columns(), 2);
        let cells = &band.rows()[0].cells;
        assert!(matches!(cells[0].cell.content, CellContent::Image(_)));
        assert_eq!(cells[1].cell.align, TextAlign::Right);
        assert!(cells[1].cell.font.bold);
        assert_eq!(cells[1].cell.font.size, 14.0);
        assert!(cells.iter().all(|p| p.cell.border == Border::None));

        let Block::Title(title) = &blocks[1] else {
            panic!("expected title");
        };
        assert_eq!(title.text, "SALES INVOICE");
        assert_eq!(title.align, TextAlign::Center);
        assert_eq!(title.font.size, 22.0);
        assert!(title.font.bold);
    }

    #[test]
    fn header_page_without_logo() {
        let style = StyleConfig::default();
        let logo = LogoOutcome::Omitted {
            reason: "missing".into(),
        };
        let blocks = compose_header_page(&logo, "X", "T", &style).unwrap();
        let band = blocks[0].table().unwrap();
        assert_eq!(band.rows()[0].cells[0].cell.as_text(), Some(""));
    }

    #[test]
    fn detail_header_layout() {
        let style = StyleConfig::default();
        let table = compose_detail_header(&details().rows(), &style).unwrap();
        assert_eq!(table.columns(), 5);
        assert_eq!(table.column_widths(), &DETAIL_COLUMN_WIDTHS);
        assert_eq!(table.rows().len(), 3);
        assert_eq!(table.spacing_before(), 12.0);

        let text = |r: usize, c: usize| table.rows()[r].cells[c].cell.as_text().unwrap().to_string();
        assert_eq!(text(0, 0), "Customer:");
        assert_eq!(text(0, 3), "366");
        assert_eq!(text(0, 4), "2/11/2017");
        assert_eq!(text(1, 2), "Salesman:");
        assert_eq!(text(2, 1), "79 933 596 217");
        assert_eq!(text(2, 3), "0868603494");

        for row in table.rows() {
            for p in &row.cells {
                assert!(p.cell.font.bold);
                assert_eq!(p.cell.border, Border::None);
            }
            assert_eq!(row.cells[4].cell.align, TextAlign::Right);
        }
    }

    #[test]
    fn line_items_table() {
        let style = StyleConfig::default();
        let items = LineItems {
            caption: "Day".into(),
            columns: ["Location", "Time", "Run Length", "Title", "Year", "Directors", "Countries"]
                .map(String::from)
                .to_vec(),
            widths: vec![2.0, 1.0, 2.0, 5.0, 1.0, 3.0, 2.0],
            rows: (0..10)
                .map(|_| ["1:1", "2h00", "600", "Film", "2017", "Day", "Day"].map(String::from).to_vec())
                .collect(),
            banding: Some(Color::LIGHT_GRAY),
        };
        let table = compose_line_items(&items, &style).unwrap();
        assert_eq!(table.rows().len(), 13);
        assert_eq!((table.header_rows(), table.footer_rows()), (2, 1));
        let caption = &table.rows()[0].cells[0].cell;
        assert_eq!(caption.colspan, 7);
        assert_eq!(caption.background, Some(Color::BLACK));
        assert_eq!(caption.font.color, Color::WHITE);
        assert_eq!(table.rows()[12].cells[0].cell.as_text(), Some("Location"));
    }

    #[test]
    fn line_items_reject_ragged_rows() {
        let style = StyleConfig::default();
        let items = LineItems {
            caption: "Day".into(),
            columns: vec!["A".into(), "B".into()],
            widths: vec![],
            rows: vec![vec!["1".into()]],
            banding: None,
        };
        assert!(matches!(
            compose_line_items(&items, &style),
            Err(Error::InvalidLayout(LayoutError::Coverage {
                row: 2,
                expected: 2,
                actual: 1
            }))
        ));

        let bad_widths = LineItems {
            widths: vec![1.0],
            ..items
        };
        assert!(matches!(
            compose_line_items(&bad_widths, &style),
            Err(Error::InvalidLayout(LayoutError::WidthCount {
                given: 1,
                columns: 2
            }))
        ));
    }
}
