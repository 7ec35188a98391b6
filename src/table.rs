//! Table assembly with column-coverage validation.
//!
//! A [`TableBuilder`] checks every row as it is added: the colspans of its
//! cells plus the columns still held by rowspans from earlier rows must add
//! up to exactly the declared column count. Header and footer row counts are
//! recorded so the sink can reprint them when the table is split across
//! pages.

use crate::cell::Cell;
use crate::error::{LayoutError, Result};
use crate::style::Color;

/// A cell pinned to the grid column where it starts.
#[derive(Debug, Clone, PartialEq)]
pub struct PlacedCell {
    pub column: usize,
    pub cell: Cell,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Row {
    pub cells: Vec<PlacedCell>,
}

impl Row {
    /// Last row index (absolute) reached by any rowspan starting here.
    fn span_end(&self, index: usize) -> usize {
        self.cells
            .iter()
            .map(|p| index.saturating_add(p.cell.rowspan.max(1) - 1))
            .max()
            .unwrap_or(index)
    }
}

/// An immutable, validated table.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    column_widths: Vec<f32>,
    rows: Vec<Row>,
    header_rows: usize,
    footer_rows: usize,
    spacing_before: f32,
    width_percentage: f32,
    skip_last_footer: bool,
    banding: Option<Color>,
}

impl Table {
    pub fn columns(&self) -> usize {
        self.column_widths.len()
    }

    pub fn column_widths(&self) -> &[f32] {
        &self.column_widths
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn header_rows(&self) -> usize {
        self.header_rows
    }

    pub fn footer_rows(&self) -> usize {
        self.footer_rows
    }

    pub fn spacing_before(&self) -> f32 {
        self.spacing_before
    }

    pub fn width_percentage(&self) -> f32 {
        self.width_percentage
    }

    pub fn skip_last_footer(&self) -> bool {
        self.skip_last_footer
    }

    pub fn banding(&self) -> Option<Color> {
        self.banding
    }

    /// Index range of the rows between the header and footer rows.
    pub fn body_range(&self) -> std::ops::Range<usize> {
        self.header_rows..self.rows.len() - self.footer_rows
    }

    /// Absolute widths of each column for a table `table_width` points wide.
    pub fn resolve_widths(&self, table_width: f32) -> Vec<f32> {
        let total: f32 = self.column_widths.iter().sum();
        self.column_widths
            .iter()
            .map(|w| w / total * table_width)
            .collect()
    }

    /// Background a body row picks up from banding, if any.
    pub fn band_for_row(&self, index: usize) -> Option<Color> {
        let body = self.body_range();
        if body.contains(&index) && (index - body.start) % 2 == 1 {
            self.banding
        } else {
            None
        }
    }

    /// Split `range` into groups of rows that must stay together because a
    /// rowspan ties them.
    pub fn row_groups(&self, range: std::ops::Range<usize>) -> Vec<std::ops::Range<usize>> {
        let mut groups = Vec::new();
        let mut start = range.start;
        while start < range.end {
            let mut end = start;
            let mut i = start;
            while i <= end {
                end = end.max(self.rows[i].span_end(i));
                i += 1;
            }
            let end = (end + 1).min(range.end);
            groups.push(start..end);
            start = end;
        }
        groups
    }
}

/// Incrementally builds a [`Table`].
#[derive(Debug, Clone)]
pub struct TableBuilder {
    column_widths: Vec<f32>,
    rows: Vec<Row>,
    /// Remaining rows each column is held by an open rowspan.
    open_spans: Vec<usize>,
    header_rows: usize,
    footer_rows: usize,
    spacing_before: f32,
    width_percentage: f32,
    skip_last_footer: bool,
    banding: Option<Color>,
}

impl TableBuilder {
    /// Start a table with relative column weights.
    pub fn new(column_widths: &[f32]) -> Result<Self> {
        if column_widths.is_empty() {
            return Err(LayoutError::NoColumns.into());
        }
        if let Some(w) = column_widths.iter().find(|w| !(**w > 0.0) || !w.is_finite()) {
            return Err(LayoutError::BadWeight(*w).into());
        }
        Ok(Self {
            column_widths: column_widths.to_vec(),
            rows: Vec::new(),
            open_spans: vec![0; column_widths.len()],
            header_rows: 0,
            footer_rows: 0,
            spacing_before: 0.0,
            width_percentage: 100.0,
            skip_last_footer: false,
            banding: None,
        })
    }

    /// A table with `columns` equally weighted columns.
    pub fn with_columns(columns: usize) -> Result<Self> {
        Self::new(&vec![1.0; columns])
    }

    pub fn columns(&self) -> usize {
        self.column_widths.len()
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Append a row, placing each cell in the next column not held by a
    /// rowspan from an earlier row.
    pub fn add_row(&mut self, cells: Vec<Cell>) -> Result<()> {
        let row = self.rows.len();
        let columns = self.columns();
        if let Some(cell) = cells.iter().find(|c| c.colspan == 0 || c.rowspan == 0) {
            return Err(LayoutError::ZeroSpan {
                row,
                colspan: cell.colspan,
                rowspan: cell.rowspan,
            }
            .into());
        }
        if let Some(cell) = cells.iter().find(|c| c.colspan > columns) {
            return Err(LayoutError::SpanTooWide {
                row,
                colspan: cell.colspan,
                columns,
            }
            .into());
        }

        let held = self.open_spans.iter().filter(|n| **n > 0).count();
        let actual = cells
            .iter()
            .fold(held, |sum, c| sum.saturating_add(c.colspan));
        let mismatch = || LayoutError::Coverage {
            row,
            expected: columns,
            actual,
        };
        if actual != columns {
            return Err(mismatch().into());
        }

        let mut placed = Vec::with_capacity(cells.len());
        let mut taken = self.open_spans.iter().map(|n| *n > 0).collect::<Vec<_>>();
        let mut column = 0;
        for cell in cells {
            while column < columns && taken[column] {
                column += 1;
            }
            let end = column + cell.colspan;
            if end > columns || taken[column..end].iter().any(|t| *t) {
                return Err(mismatch().into());
            }
            taken[column..end].iter_mut().for_each(|t| *t = true);
            placed.push(PlacedCell { column, cell });
            column = end;
        }

        for n in self.open_spans.iter_mut() {
            *n = n.saturating_sub(1);
        }
        for p in &placed {
            for c in p.column..p.column + p.cell.colspan {
                self.open_spans[c] = p.cell.rowspan - 1;
            }
        }

        self.rows.push(Row { cells: placed });
        Ok(())
    }

    pub fn set_header_rows(&mut self, n: usize) -> &mut Self {
        self.header_rows = n;
        self
    }

    pub fn set_footer_rows(&mut self, n: usize) -> &mut Self {
        self.footer_rows = n;
        self
    }

    pub fn set_spacing_before(&mut self, pt: f32) -> &mut Self {
        self.spacing_before = pt.max(0.0);
        self
    }

    pub fn set_width_percentage(&mut self, percent: f32) -> &mut Self {
        self.width_percentage = percent.clamp(1.0, 100.0);
        self
    }

    pub fn set_skip_last_footer(&mut self, skip: bool) -> &mut Self {
        self.skip_last_footer = skip;
        self
    }

    /// Background for every other body row (cells with their own
    /// background keep it).
    pub fn set_banding(&mut self, color: Option<Color>) -> &mut Self {
        self.banding = color;
        self
    }

    /// First row, at or after `from`, whose rowspans reach row `limit` or
    /// beyond.
    fn span_reaching(&self, from: usize, to: usize, limit: usize) -> Option<usize> {
        (from..to).find(|&i| self.rows[i].span_end(i) >= limit)
    }

    /// Freeze the table. Rowspans must end inside the table and must not
    /// cross from the header into the body or from the body into the footer.
    pub fn build(self) -> Result<Table> {
        let rows = self.rows.len();
        if let Some(row) = self.span_reaching(0, rows, rows) {
            return Err(LayoutError::DanglingRowspan { row, rows }.into());
        }
        if self.header_rows.saturating_add(self.footer_rows) > rows {
            return Err(LayoutError::SectionOverflow {
                header: self.header_rows,
                footer: self.footer_rows,
                rows,
            }
            .into());
        }
        let body_end = rows - self.footer_rows;
        if let Some(row) = self.span_reaching(0, self.header_rows, self.header_rows) {
            return Err(LayoutError::SpanCrossesSection {
                row,
                section: "header",
            }
            .into());
        }
        if let Some(row) = self.span_reaching(self.header_rows, body_end, body_end) {
            return Err(LayoutError::SpanCrossesSection { row, section: "body" }.into());
        }
        Ok(Table {
            column_widths: self.column_widths,
            rows: self.rows,
            header_rows: self.header_rows,
            footer_rows: self.footer_rows,
            spacing_before: self.spacing_before,
            width_percentage: self.width_percentage,
            skip_last_footer: self.skip_last_footer,
            banding: self.banding,
        })
    }
}
