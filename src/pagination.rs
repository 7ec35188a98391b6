//! Pagination – places a flow of blocks and explicit page breaks onto
//! fixed-size pages.
//!
//! Handles:
//! - Explicit page breaks
//! - Paragraph wrapping and alignment
//! - Table column resolution from relative weights
//! - Table splitting across pages, keeping rowspan-tied rows together and
//!   reprinting header rows at the top and footer rows at the bottom of
//!   every page the table touches

use std::collections::BTreeMap;

use crate::block::{Block, Paragraph};
use crate::cell::{Cell, CellContent};
use crate::fonts::TextMetrics;
use crate::layout_config::*;
use crate::style::{Border, Color, Font, TextAlign, BORDER_WIDTH_PT};
use crate::table::Table;

/// Default page margins in points.
pub const PAGE_MARGIN_PT: f32 = 36.0;

/// Physical page geometry.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageSetup {
    pub width: f32,
    pub height: f32,
    pub margin: f32,
}

impl PageSetup {
    /// A4 rotated to landscape.
    pub fn a4_landscape() -> Self {
        Self {
            width: 841.89,
            height: 595.28,
            margin: PAGE_MARGIN_PT,
        }
    }

    pub fn content_width(&self) -> f32 {
        self.width - 2.0 * self.margin
    }

    pub fn content_height(&self) -> f32 {
        self.height - 2.0 * self.margin
    }
}

impl Default for PageSetup {
    fn default() -> Self {
        Self::a4_landscape()
    }
}

/// One item of the document flow, in order.
#[derive(Debug, Clone, PartialEq)]
pub enum FlowItem {
    Block(Block),
    PageBreak,
}

/// Lay out `items` into pages.
pub fn paginate(items: &[FlowItem], setup: &PageSetup, title: &str) -> LayoutConfig {
    let mut p = Paginator::new(*setup);
    for item in items {
        match item {
            FlowItem::Block(Block::Title(para)) => p.place_paragraph(para),
            FlowItem::Block(Block::HeaderBand(table)) | FlowItem::Block(Block::Table(table)) => {
                p.place_table(table)
            }
            FlowItem::PageBreak => p.page_break(),
        }
    }
    p.finish(title)
}

struct Paginator {
    setup: PageSetup,
    metrics: TextMetrics,
    pages: Vec<PageLayout>,
    current: Vec<LayoutBox>,
    /// Page-absolute y of the next free line.
    cursor: f32,
    images: BTreeMap<String, EmbeddedImage>,
}

/// Column geometry of a table placed on the page.
struct TableGeometry {
    x: f32,
    width: f32,
    column_x: Vec<f32>,
    column_widths: Vec<f32>,
    row_heights: Vec<f32>,
}

impl TableGeometry {
    fn span_width(&self, column: usize, colspan: usize) -> f32 {
        self.column_widths[column..column + colspan].iter().sum()
    }

    fn span_height(&self, row: usize, rowspan: usize) -> f32 {
        self.row_heights[row..row + rowspan].iter().sum()
    }

    fn range_height(&self, range: std::ops::Range<usize>) -> f32 {
        self.row_heights[range].iter().sum()
    }
}

impl Paginator {
    fn new(setup: PageSetup) -> Self {
        Self {
            setup,
            metrics: TextMetrics,
            pages: Vec::new(),
            current: Vec::new(),
            cursor: setup.margin,
            images: BTreeMap::new(),
        }
    }

    fn bottom(&self) -> f32 {
        self.setup.height - self.setup.margin
    }

    fn fits(&self, height: f32) -> bool {
        self.cursor + height <= self.bottom() + 0.01
    }

    fn new_page(&mut self) {
        let boxes = std::mem::take(&mut self.current);
        self.pages.push(PageLayout {
            page_index: self.pages.len(),
            boxes,
        });
        self.cursor = self.setup.margin;
        log::debug!("Starting page {}", self.pages.len() + 1);
    }

    /// A break on an empty page is ignored.
    fn page_break(&mut self) {
        if !self.current.is_empty() {
            self.new_page();
        }
    }

    fn finish(mut self, title: &str) -> LayoutConfig {
        if !self.current.is_empty() || self.pages.is_empty() {
            self.new_page();
        }
        LayoutConfig {
            title: title.to_string(),
            page_width_pt: self.setup.width,
            page_height_pt: self.setup.height,
            pages: self.pages,
            images: self.images.into_values().collect(),
        }
    }

    /// Wrap and align `text` inside a box `max_width` wide, offset by
    /// `inset` on both axes. Returns the content and its height.
    fn text_content(
        &self,
        text: &str,
        font: &Font,
        max_width: f32,
        align: TextAlign,
        inset: f32,
    ) -> (TextContent, f32) {
        let line_height = self.metrics.line_height(font);
        let lines: Vec<TextLine> = self
            .metrics
            .wrap(text, font, max_width)
            .into_iter()
            .enumerate()
            .map(|(i, line)| {
                let w = self.metrics.measure(&line, font);
                TextLine {
                    x_offset: inset + align.offset(max_width, w),
                    y_offset: inset + i as f32 * line_height,
                    text: line,
                }
            })
            .collect();
        let height = lines.len() as f32 * line_height;
        let content = TextContent {
            lines,
            font_family: font.family.name().to_string(),
            font_size: font.size,
            bold: font.bold,
            color: font.color.to_array(),
            line_height,
            text_align: align.as_str().to_string(),
        };
        (content, height)
    }

    fn place_paragraph(&mut self, para: &Paragraph) {
        let width = self.setup.content_width();
        let (text, height) = self.text_content(&para.text, &para.font, width, para.align, 0.0);

        self.cursor += para.spacing_before;
        if !self.fits(height) && !self.current.is_empty() {
            self.new_page();
        }

        let mut lb = LayoutBox::new(
            BoxRole::Paragraph,
            self.setup.margin,
            self.cursor,
            width,
            height,
        );
        lb.text = Some(text);
        self.current.push(lb);
        self.cursor += height + para.spacing_after;
    }

    // ── Tables ────────────────────────────────────────────────────────────

    fn cell_height(&self, cell: &Cell, inner_width: f32) -> f32 {
        let content = match &cell.content {
            CellContent::Text(text) => {
                let lines = self.metrics.wrap(text, &cell.font, inner_width).len();
                lines as f32 * self.metrics.line_height(&cell.font)
            }
            CellContent::Image(img) => scaled_image_size(img.width, img.height, inner_width).1,
        };
        content + 2.0 * cell.padding
    }

    fn measure_table(&self, table: &Table) -> TableGeometry {
        let content_width = self.setup.content_width();
        let width = content_width * table.width_percentage() / 100.0;
        let x = self.setup.margin + (content_width - width) / 2.0;
        let column_widths = table.resolve_widths(width);
        let column_x = column_widths
            .iter()
            .scan(x, |acc, w| {
                let start = *acc;
                *acc += w;
                Some(start)
            })
            .collect();

        let mut geometry = TableGeometry {
            x,
            width,
            column_x,
            column_widths,
            row_heights: vec![0.0; table.rows().len()],
        };

        for (r, row) in table.rows().iter().enumerate() {
            for placed in row.cells.iter().filter(|p| p.cell.rowspan == 1) {
                let inner = geometry.span_width(placed.column, placed.cell.colspan)
                    - 2.0 * placed.cell.padding;
                let h = self.cell_height(&placed.cell, inner);
                geometry.row_heights[r] = geometry.row_heights[r].max(h);
            }
        }
        // Tall cells stretch the last row they cover.
        for (r, row) in table.rows().iter().enumerate() {
            for placed in row.cells.iter().filter(|p| p.cell.rowspan > 1) {
                let inner = geometry.span_width(placed.column, placed.cell.colspan)
                    - 2.0 * placed.cell.padding;
                let needed = self.cell_height(&placed.cell, inner);
                let have = geometry.span_height(r, placed.cell.rowspan);
                if needed > have {
                    geometry.row_heights[r + placed.cell.rowspan - 1] += needed - have;
                }
            }
        }
        geometry
    }

    fn place_table(&mut self, table: &Table) {
        let rows = table.rows().len();
        if rows == 0 {
            return;
        }
        let geometry = self.measure_table(table);
        let header = 0..table.header_rows();
        let footer = rows - table.footer_rows()..rows;
        let groups = table.row_groups(table.body_range());

        let header_h = geometry.range_height(header.clone());
        let footer_h = geometry.range_height(footer.clone());
        let first_h = groups
            .first()
            .map(|g| geometry.range_height(g.clone()))
            .unwrap_or(0.0);

        self.cursor += table.spacing_before();
        if !self.fits(header_h + first_h + footer_h) && !self.current.is_empty() {
            self.new_page();
        }

        self.emit_rows(table, &geometry, header.clone(), BoxRole::HeaderRow);
        let mut on_page = 0usize;
        for group in groups {
            let group_h = geometry.range_height(group.clone());
            if on_page > 0 && !self.fits(group_h + footer_h) {
                self.emit_rows(table, &geometry, footer.clone(), BoxRole::FooterRow);
                self.new_page();
                self.emit_rows(table, &geometry, header.clone(), BoxRole::HeaderRow);
                on_page = 0;
            }
            if !self.fits(group_h + footer_h) {
                log::warn!(
                    "Rows {}..{} ({group_h:.1} pt) do not fit on a page; they will overflow",
                    group.start,
                    group.end
                );
            }
            self.emit_rows(table, &geometry, group, BoxRole::BodyRow);
            on_page += 1;
        }
        if !table.skip_last_footer() {
            self.emit_rows(table, &geometry, footer, BoxRole::FooterRow);
        }
    }

    fn emit_rows(
        &mut self,
        table: &Table,
        geometry: &TableGeometry,
        range: std::ops::Range<usize>,
        role: BoxRole,
    ) {
        for r in range {
            let height = geometry.row_heights[r];
            let mut row_box = LayoutBox::new(role, geometry.x, self.cursor, geometry.width, height);
            row_box.row = Some(r);
            let band = table.band_for_row(r);
            for placed in &table.rows()[r].cells {
                let cell_box = self.cell_box(
                    &placed.cell,
                    geometry.column_x[placed.column],
                    geometry.span_width(placed.column, placed.cell.colspan),
                    geometry.span_height(r, placed.cell.rowspan),
                    band,
                    r,
                );
                row_box.children.push(cell_box);
            }
            self.current.push(row_box);
            self.cursor += height;
        }
    }

    fn cell_box(
        &mut self,
        cell: &Cell,
        x: f32,
        width: f32,
        height: f32,
        band: Option<Color>,
        row: usize,
    ) -> LayoutBox {
        let mut lb = LayoutBox::new(BoxRole::Cell, x, self.cursor, width, height);
        lb.row = Some(row);
        lb.background_color = cell.background.or(band).map(Color::to_array);
        if cell.border == Border::Box {
            lb.border = Some(BorderStyle {
                width: BORDER_WIDTH_PT,
                color: Color::BLACK.to_array(),
            });
        }

        let inner = width - 2.0 * cell.padding;
        match &cell.content {
            CellContent::Text(text) => {
                let (content, _) =
                    self.text_content(text, &cell.font, inner, cell.align, cell.padding);
                lb.text = Some(content);
            }
            CellContent::Image(img) => {
                let (w, h) = scaled_image_size(img.width, img.height, inner);
                self.images
                    .entry(img.key.clone())
                    .or_insert_with(|| EmbeddedImage {
                        key: img.key.clone(),
                        px_width: img.width,
                        px_height: img.height,
                        png: img.png.clone(),
                    });
                lb.image = Some(ImageContent {
                    key: img.key.clone(),
                    x_offset: cell.padding + cell.align.offset(inner, w),
                    y_offset: cell.padding,
                    width: w,
                    height: h,
                });
            }
        }
        lb
    }
}

/// Image size in points (1 px = 1 pt), shrunk to `max_width` if needed.
fn scaled_image_size(px_width: u32, px_height: u32, max_width: f32) -> (f32, f32) {
    let (w, h) = (px_width as f32, px_height as f32);
    if w > max_width && max_width > 0.0 {
        (max_width, h * max_width / w)
    } else {
        (w, h)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::style::FontRef;
    use crate::table::TableBuilder;

    fn font() -> FontRef {
        Font::helvetica(12.0).shared()
    }

    fn long_table(header: usize, footer: usize, body: usize) -> Table {
        let f = font();
        let mut t = TableBuilder::with_columns(2).unwrap();
        for i in 0..header {
            t.add_row(vec![Cell::text(format!("H{i}"), &f), Cell::text("h", &f)])
                .unwrap();
        }
        for i in 0..body {
            t.add_row(vec![Cell::text(format!("B{i}"), &f), Cell::text("b", &f)])
                .unwrap();
        }
        for i in 0..footer {
            t.add_row(vec![Cell::text(format!("F{i}"), &f), Cell::text("f", &f)])
                .unwrap();
        }
        t.set_header_rows(header).set_footer_rows(footer);
        t.build().unwrap()
    }

    fn rows_on(config: &LayoutConfig, page: usize) -> Vec<(BoxRole, usize)> {
        config.pages[page]
            .boxes
            .iter()
            .filter(|b| b.role != BoxRole::Paragraph)
            .map(|b| (b.role, b.row.unwrap()))
            .collect()
    }

    #[test]
    fn explicit_breaks_make_pages() {
        let title = Paragraph::new("SALES INVOICE", &font()).align(TextAlign::Center);
        let items = vec![
            FlowItem::Block(Block::Title(title.clone())),
            FlowItem::PageBreak,
            FlowItem::Block(Block::Title(title)),
        ];
        let config = paginate(&items, &PageSetup::a4_landscape(), "t");
        assert_eq!(config.pages.len(), 2);
    }

    #[test]
    fn break_on_empty_page_is_ignored() {
        let items = vec![FlowItem::PageBreak, FlowItem::PageBreak];
        let config = paginate(&items, &PageSetup::a4_landscape(), "t");
        assert_eq!(config.pages.len(), 1);
        assert!(config.pages[0].boxes.is_empty());
    }

    #[test]
    fn centered_title_offset() {
        let f = Font::helvetica_bold(22.0).shared();
        let items = vec![FlowItem::Block(Block::Title(
            Paragraph::new("SALES INVOICE", &f).align(TextAlign::Center),
        ))];
        let setup = PageSetup::a4_landscape();
        let config = paginate(&items, &setup, "t");
        let line = &config.pages[0].boxes[0].text.as_ref().unwrap().lines[0];
        let w = TextMetrics.measure("SALES INVOICE", &f);
        assert!((line.x_offset - (setup.content_width() - w) / 2.0).abs() < 0.01);
    }

    #[test]
    fn long_table_repeats_header_and_footer() {
        let table = long_table(2, 1, 80);
        let items = vec![FlowItem::Block(Block::Table(table))];
        let config = paginate(&items, &PageSetup::a4_landscape(), "t");
        let pages = config.pages.len();
        assert!(pages > 1, "expected a split, got {pages} page(s)");

        let mut body_seen = Vec::new();
        for page in 0..pages {
            let rows = rows_on(&config, page);
            assert_eq!(rows[0], (BoxRole::HeaderRow, 0), "page {page}");
            assert_eq!(rows[1], (BoxRole::HeaderRow, 1), "page {page}");
            assert_eq!(*rows.last().unwrap(), (BoxRole::FooterRow, 82), "page {page}");
            body_seen.extend(
                rows.iter()
                    .filter(|(role, _)| *role == BoxRole::BodyRow)
                    .map(|(_, r)| *r),
            );
        }
        assert_eq!(body_seen, (2..82).collect::<Vec<_>>());
    }

    #[test]
    fn skip_last_footer() {
        let f = font();
        let mut t = TableBuilder::with_columns(1).unwrap();
        t.add_row(vec![Cell::text("H", &f)]).unwrap();
        for i in 0..60 {
            t.add_row(vec![Cell::text(format!("B{i}"), &f)]).unwrap();
        }
        t.add_row(vec![Cell::text("F", &f)]).unwrap();
        t.set_header_rows(1).set_footer_rows(1).set_skip_last_footer(true);
        let items = vec![FlowItem::Block(Block::Table(t.build().unwrap()))];
        let config = paginate(&items, &PageSetup::a4_landscape(), "t");
        let last = config.pages.len() - 1;
        assert!(last > 0);
        for page in 0..last {
            assert_eq!(rows_on(&config, page).last().unwrap().0, BoxRole::FooterRow);
        }
        assert_eq!(rows_on(&config, last).last().unwrap().0, BoxRole::BodyRow);
    }

    #[test]
    fn rowspan_rows_stay_together() {
        let f = font();
        let mut t = TableBuilder::with_columns(2).unwrap();
        for i in 0..40 {
            t.add_row(vec![Cell::text("pair", &f).rowspan(2), Cell::text(format!("{i}a"), &f)])
                .unwrap();
            t.add_row(vec![Cell::text(format!("{i}b"), &f)]).unwrap();
        }
        let items = vec![FlowItem::Block(Block::Table(t.build().unwrap()))];
        let config = paginate(&items, &PageSetup::a4_landscape(), "t");
        assert!(config.pages.len() > 1);
        for page in 0..config.pages.len() {
            let rows = rows_on(&config, page);
            assert_eq!(rows[0].1 % 2, 0, "page {page} starts mid-rowspan");
            assert_eq!(rows.last().unwrap().1 % 2, 1);
        }
    }

    #[test]
    fn column_positions_follow_weights() {
        let f = font();
        let mut t = TableBuilder::new(&[1.5, 3.5, 1.0, 3.0, 1.0]).unwrap();
        t.add_row((0..5).map(|i| Cell::text(i.to_string(), &f)).collect())
            .unwrap();
        let items = vec![FlowItem::Block(Block::Table(t.build().unwrap()))];
        let setup = PageSetup::a4_landscape();
        let config = paginate(&items, &setup, "t");
        let cells = &config.pages[0].boxes[0].children;
        let unit = setup.content_width() / 10.0;
        let widths: Vec<f32> = cells.iter().map(|c| c.width).collect();
        for (w, weight) in widths.iter().zip([1.5, 3.5, 1.0, 3.0, 1.0]) {
            assert!((w - weight * unit).abs() < 0.01);
        }
        assert!((cells[1].x - (setup.margin + 1.5 * unit)).abs() < 0.01);
    }

    #[test]
    fn narrow_table_is_centered() {
        let f = font();
        let mut t = TableBuilder::with_columns(2).unwrap();
        t.add_row(vec![Cell::text("a", &f), Cell::text("b", &f)])
            .unwrap();
        t.set_width_percentage(50.0);
        let items = vec![FlowItem::Block(Block::Table(t.build().unwrap()))];
        let setup = PageSetup::a4_landscape();
        let config = paginate(&items, &setup, "t");
        let row = &config.pages[0].boxes[0];
        let cells = &row.children;
        let half = setup.content_width() / 2.0;
        assert!((cells[0].width + cells[1].width - half).abs() < 0.01);
        assert!((cells[0].x - (setup.margin + half / 2.0)).abs() < 0.01);
    }

    #[test]
    fn banded_rows_get_background() {
        let f = font();
        let mut t = TableBuilder::with_columns(1).unwrap();
        for i in 0..4 {
            t.add_row(vec![Cell::text(i.to_string(), &f)]).unwrap();
        }
        t.set_banding(Some(Color::LIGHT_GRAY));
        let items = vec![FlowItem::Block(Block::Table(t.build().unwrap()))];
        let config = paginate(&items, &PageSetup::a4_landscape(), "t");
        let bg: Vec<bool> = config.pages[0]
            .boxes
            .iter()
            .map(|row| row.children[0].background_color.is_some())
            .collect();
        assert_eq!(bg, vec![false, true, false, true]);
    }
}
