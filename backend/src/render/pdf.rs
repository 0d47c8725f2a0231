//! PDF output through `printpdf`.
//!
//! Rendering happens in two steps. [`layout`] flows the document blocks onto pages and
//! produces positioned [`PageOp`]s in PDF space (points, origin at the bottom-left of
//! the page). [`emit`] then replays those ops onto a `printpdf` document.

use log::{debug, info, warn};
use printpdf::path::{PaintMode, WindingOrder};
use printpdf::{
    BuiltinFont, Color, Greyscale, IndirectFontRef, Line, LineDashPattern, Mm, PdfDocument,
    PdfDocumentReference, PdfLayerReference, Point, Polygon, Pt,
};
use std::path::Path;

use super::{write_output, DocumentRenderer, FontFace, RenderError};
use crate::domain::models::report::{Block, DrawPrimitive, Drawing, PageSize, ReportDocument, Table};

const TITLE_FONT_SIZE: f64 = 18.0;
const TITLE_HEIGHT: f64 = 30.0;
const LINE_HEIGHT_FACTOR: f64 = 1.4;
const ROW_HEIGHT_FACTOR: f64 = 2.0;
/// Average glyph width relative to the font size, used for wrapping and centering
const GLYPH_WIDTH_FACTOR: f64 = 0.55;
const HEADER_GREY: f32 = 0.5;
const LAYER_NAME: &str = "Layer 1";

#[derive(Debug, Clone, Default)]
pub struct PdfRenderer;

impl DocumentRenderer for PdfRenderer {
    fn extension(&self) -> &'static str {
        "pdf"
    }

    fn render(
        &self,
        document: &ReportDocument,
        font: &FontFace,
        path: &Path,
    ) -> Result<(), RenderError> {
        let pages = layout(document)?;
        let bytes = emit(document, font, &pages)?;
        write_output(path, &bytes)?;

        info!(
            "Wrote {} report ({} pages) to {}",
            document.kind,
            pages.len(),
            path.display()
        );
        Ok(())
    }
}

/// One drawing operation on a page, in points from the bottom-left corner
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum PageOp {
    /// Text starting at its baseline origin
    Text {
        x: f64,
        y: f64,
        content: String,
        font_size: f64,
    },
    Line {
        x1: f64,
        y1: f64,
        x2: f64,
        y2: f64,
        dash: Option<[f64; 2]>,
    },
    /// Outlined table cell; `y` is the bottom edge
    Cell {
        x: f64,
        y: f64,
        width: f64,
        height: f64,
        shaded: bool,
    },
}

pub(crate) fn layout(document: &ReportDocument) -> Result<Vec<Vec<PageOp>>, RenderError> {
    let mut flow = PageFlow::new(document.page_size, document.margin);

    for block in &document.blocks {
        match block {
            Block::Title(text) => flow.title(text),
            Block::Paragraph { text, font_size } => flow.paragraph(text, *font_size),
            Block::Spacer(height) => flow.spacer(*height),
            Block::Table(table) => flow.table(table)?,
            Block::Figure(drawing) => flow.figure(drawing),
        }
    }

    Ok(flow.finish())
}

/// Flows blocks down the page, starting a new page when the next element does not fit.
/// The cursor is measured from the top of the page; ops are stored bottom-up.
struct PageFlow {
    page: PageSize,
    margin: f64,
    pages: Vec<Vec<PageOp>>,
    current: Vec<PageOp>,
    cursor_y: f64,
}

impl PageFlow {
    fn new(page: PageSize, margin: f64) -> Self {
        Self {
            page,
            margin,
            pages: Vec::new(),
            current: Vec::new(),
            cursor_y: margin,
        }
    }

    fn content_width(&self) -> f64 {
        self.page.width - 2.0 * self.margin
    }

    fn bottom(&self) -> f64 {
        self.page.height - self.margin
    }

    /// PDF y coordinate of a distance from the top of the page
    fn from_top(&self, y: f64) -> f64 {
        self.page.height - y
    }

    fn new_page(&mut self) {
        self.pages.push(std::mem::take(&mut self.current));
        self.cursor_y = self.margin;
        debug!("Starting page {}", self.pages.len() + 1);
    }

    /// Move to a new page unless `height` fits below the cursor. An element taller
    /// than a page still goes on the current page if that page is empty.
    fn reserve(&mut self, height: f64) {
        if self.cursor_y + height > self.bottom() && self.cursor_y > self.margin {
            self.new_page();
        }
    }

    fn text(&mut self, x: f64, baseline_from_top: f64, content: &str, font_size: f64) {
        let y = self.from_top(baseline_from_top);
        self.current.push(PageOp::Text {
            x,
            y,
            content: content.to_string(),
            font_size,
        });
    }

    fn centered_text(&mut self, center_x: f64, baseline_from_top: f64, content: &str, font_size: f64) {
        let x = center_x - estimated_width(content, font_size) / 2.0;
        self.text(x, baseline_from_top, content, font_size);
    }

    fn title(&mut self, text: &str) {
        self.reserve(TITLE_HEIGHT);
        let baseline = self.cursor_y + TITLE_FONT_SIZE;
        self.centered_text(self.page.width / 2.0, baseline, text, TITLE_FONT_SIZE);
        self.cursor_y += TITLE_HEIGHT;
    }

    fn paragraph(&mut self, text: &str, font_size: f64) {
        let line_height = font_size * LINE_HEIGHT_FACTOR;
        let max_chars = (self.content_width() / (font_size * GLYPH_WIDTH_FACTOR)).max(1.0) as usize;

        for line in wrap(text, max_chars) {
            self.reserve(line_height);
            let baseline = self.cursor_y + font_size;
            self.text(self.margin, baseline, &line, font_size);
            self.cursor_y += line_height;
        }
    }

    fn spacer(&mut self, height: f64) {
        self.cursor_y = (self.cursor_y + height).min(self.bottom());
    }

    fn table(&mut self, table: &Table) -> Result<(), RenderError> {
        let columns = table.header.len();
        for (index, row) in table.rows.iter().enumerate() {
            if row.len() != columns {
                return Err(RenderError::RaggedTable {
                    row: index,
                    found: row.len(),
                    expected: columns,
                });
            }
        }

        let widths: Vec<f64> = if table.column_widths.len() == columns {
            table.column_widths.clone()
        } else {
            vec![self.content_width() / columns.max(1) as f64; columns]
        };
        let row_height = table.font_size * ROW_HEIGHT_FACTOR;

        self.reserve(row_height * 2.0);
        self.table_row(&table.header, &widths, table.font_size, true);
        for row in &table.rows {
            if self.cursor_y + row_height > self.bottom() {
                self.new_page();
                self.table_row(&table.header, &widths, table.font_size, true);
            }
            self.table_row(row, &widths, table.font_size, false);
        }
        Ok(())
    }

    fn table_row(&mut self, cells: &[String], widths: &[f64], font_size: f64, header: bool) {
        let row_height = font_size * ROW_HEIGHT_FACTOR;
        let total: f64 = widths.iter().sum();
        let mut x = (self.page.width - total) / 2.0;
        let bottom = self.from_top(self.cursor_y + row_height);

        for (cell, width) in cells.iter().zip(widths) {
            self.current.push(PageOp::Cell {
                x,
                y: bottom,
                width: *width,
                height: row_height,
                shaded: header,
            });
            let baseline = self.cursor_y + row_height / 2.0 + font_size / 3.0;
            self.centered_text(x + width / 2.0, baseline, cell, font_size);
            x += width;
        }
        self.cursor_y += row_height;
    }

    /// Places a figure centered on the page. Drawing coordinates are already y-up, so
    /// they only need shifting to the figure's bottom-left corner.
    fn figure(&mut self, drawing: &Drawing) {
        self.reserve(drawing.height);
        let origin_x = (self.page.width - drawing.width) / 2.0;
        let origin_y = self.from_top(self.cursor_y + drawing.height);

        for primitive in &drawing.primitives {
            let op = match primitive {
                DrawPrimitive::Line {
                    x1,
                    y1,
                    x2,
                    y2,
                    dash,
                } => PageOp::Line {
                    x1: origin_x + x1,
                    y1: origin_y + y1,
                    x2: origin_x + x2,
                    y2: origin_y + y2,
                    dash: *dash,
                },
                DrawPrimitive::Text {
                    x,
                    y,
                    content,
                    font_size,
                } => PageOp::Text {
                    x: origin_x + x,
                    y: origin_y + y,
                    content: content.clone(),
                    font_size: *font_size,
                },
            };
            self.current.push(op);
        }
        self.cursor_y += drawing.height;
    }

    fn finish(mut self) -> Vec<Vec<PageOp>> {
        self.pages.push(self.current);
        self.pages
    }
}

fn emit(
    document: &ReportDocument,
    font: &FontFace,
    pages: &[Vec<PageOp>],
) -> Result<Vec<u8>, RenderError> {
    let width = points(document.page_size.width);
    let height = points(document.page_size.height);
    let (pdf, first_page, first_layer) =
        PdfDocument::new(document.title.as_str(), width, height, LAYER_NAME);
    let pdf_font = load_font(&pdf, font)?;

    let mut targets = vec![(first_page, first_layer)];
    for _ in 1..pages.len() {
        targets.push(pdf.add_page(width, height, LAYER_NAME));
    }

    for ((page, layer), ops) in targets.into_iter().zip(pages) {
        let layer = pdf.get_page(page).get_layer(layer);
        layer.set_outline_color(black());
        layer.set_outline_thickness(1.0);
        layer.set_fill_color(black());
        for op in ops {
            draw(&layer, &pdf_font, op);
        }
    }

    pdf.save_to_bytes()
        .map_err(|err| RenderError::Pdf(err.to_string()))
}

/// Embeds the configured font, or falls back to built-in Helvetica
fn load_font(pdf: &PdfDocumentReference, font: &FontFace) -> Result<IndirectFontRef, RenderError> {
    if let Some(data) = &font.data {
        match pdf.add_external_font(data.as_slice()) {
            Ok(embedded) => return Ok(embedded),
            Err(err) => warn!(
                "Could not embed font {}, using Helvetica: {}",
                font.family, err
            ),
        }
    }
    pdf.add_builtin_font(BuiltinFont::Helvetica)
        .map_err(|err| RenderError::Pdf(err.to_string()))
}

fn draw(layer: &PdfLayerReference, font: &IndirectFontRef, op: &PageOp) {
    match op {
        PageOp::Text {
            x,
            y,
            content,
            font_size,
        } => {
            layer.use_text(content.as_str(), *font_size as f32, points(*x), points(*y), font);
        }
        PageOp::Line {
            x1,
            y1,
            x2,
            y2,
            dash,
        } => {
            layer.set_line_dash_pattern(dash_pattern(*dash));
            layer.add_line(Line {
                points: vec![
                    (Point::new(points(*x1), points(*y1)), false),
                    (Point::new(points(*x2), points(*y2)), false),
                ],
                is_closed: false,
            });
        }
        PageOp::Cell {
            x,
            y,
            width,
            height,
            shaded,
        } => {
            layer.set_line_dash_pattern(LineDashPattern::default());
            let fill = if *shaded { HEADER_GREY } else { 1.0 };
            layer.set_fill_color(Color::Greyscale(Greyscale::new(fill, None)));
            layer.add_polygon(Polygon {
                rings: vec![vec![
                    (Point::new(points(*x), points(*y)), false),
                    (Point::new(points(x + width), points(*y)), false),
                    (Point::new(points(x + width), points(y + height)), false),
                    (Point::new(points(*x), points(y + height)), false),
                ]],
                mode: PaintMode::FillStroke,
                winding_order: WindingOrder::NonZero,
            });
            // Cell text is drawn in the fill colour
            layer.set_fill_color(black());
        }
    }
}

fn dash_pattern(dash: Option<[f64; 2]>) -> LineDashPattern {
    match dash {
        Some([on, off]) => LineDashPattern {
            dash_1: Some(on.round() as i64),
            gap_1: Some(off.round() as i64),
            ..LineDashPattern::default()
        },
        None => LineDashPattern::default(),
    }
}

fn black() -> Color {
    Color::Greyscale(Greyscale::new(0.0, None))
}

fn points(value: f64) -> Mm {
    Mm::from(Pt(value as f32))
}

fn estimated_width(text: &str, font_size: f64) -> f64 {
    text.chars().count() as f64 * font_size * GLYPH_WIDTH_FACTOR
}

/// Greedy word wrap; words longer than a line are split
fn wrap(text: &str, max_chars: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut line = String::new();

    for word in text.split_whitespace() {
        let mut word: Vec<char> = word.chars().collect();
        while word.len() > max_chars {
            if !line.is_empty() {
                lines.push(std::mem::take(&mut line));
            }
            lines.push(word.drain(..max_chars).collect());
        }
        let word: String = word.into_iter().collect();

        let needed = if line.is_empty() {
            word.chars().count()
        } else {
            line.chars().count() + 1 + word.chars().count()
        };
        if needed > max_chars && !line.is_empty() {
            lines.push(std::mem::take(&mut line));
        }
        if !line.is_empty() {
            line.push(' ');
        }
        line.push_str(&word);
    }

    if !line.is_empty() || lines.is_empty() {
        lines.push(line);
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::ReportKind;
    use std::fs;
    use tempfile::TempDir;

    fn document() -> ReportDocument {
        ReportDocument::new(
            ReportKind::ExpenseLedger,
            "Expense report: Lada Vesta",
            PageSize::A4,
            56.0,
        )
    }

    fn table(rows: usize) -> Table {
        Table {
            header: vec!["Expense type".into(), "Amount".into(), "Date".into()],
            rows: (0..rows)
                .map(|i| vec!["Fuel".into(), format!("{}.00", i), "2024-03-01".into()])
                .collect(),
            column_widths: vec![200.0, 100.0, 100.0],
            font_size: 10.0,
        }
    }

    fn texts(page: &[PageOp]) -> Vec<&str> {
        page.iter()
            .filter_map(|op| match op {
                PageOp::Text { content, .. } => Some(content.as_str()),
                _ => None,
            })
            .collect()
    }

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-6
    }

    #[test]
    fn test_long_table_spans_pages_with_repeated_grey_header() {
        let mut doc = document();
        doc.push(Block::Spacer(12.0));
        doc.push(Block::Table(table(60)));

        let pages = layout(&doc).unwrap();
        assert!(pages.len() >= 2);
        for page in &pages {
            assert!(texts(page).contains(&"Expense type"));
            let shaded = page
                .iter()
                .filter(|op| matches!(op, PageOp::Cell { shaded: true, .. }))
                .count();
            assert_eq!(shaded, 3);
        }
        assert_eq!(texts(&pages[0])[0], "Expense report: Lada Vesta");

        // Every cell stays inside the page margins
        for op in pages.iter().flatten() {
            if let PageOp::Cell { y, height, .. } = op {
                assert!(*y >= doc.margin - 1e-6);
                assert!(y + height <= PageSize::A4.height - doc.margin + 1e-6);
            }
        }
    }

    #[test]
    fn test_figure_is_centered_and_keeps_dashes() {
        let mut drawing = Drawing::new(500.0, 400.0);
        drawing.line(50.0, 350.0, 50.0, 50.0);
        drawing.dashed_line(50.0, 100.0, 60.0, 100.0, [4.0, 2.0]);
        drawing.text(70.0, 100.0, "2024-01-10", 10.0);
        let mut doc = document();
        doc.push(Block::Figure(drawing));

        let pages = layout(&doc).unwrap();
        assert_eq!(pages.len(), 1);

        // Title takes the first 30pt below the top margin
        let origin_x = (PageSize::A4.width - 500.0) / 2.0;
        let origin_y = PageSize::A4.height - (56.0 + TITLE_HEIGHT + 400.0);
        let lines: Vec<&PageOp> = pages[0]
            .iter()
            .filter(|op| matches!(op, PageOp::Line { .. }))
            .collect();
        assert_eq!(lines.len(), 2);
        match lines[0] {
            PageOp::Line {
                x1, y1, x2, y2, dash,
            } => {
                assert!(close(*x1, origin_x + 50.0) && close(*x2, origin_x + 50.0));
                assert!(close(*y1, origin_y + 350.0) && close(*y2, origin_y + 50.0));
                assert_eq!(*dash, None);
            }
            other => panic!("unexpected op {:?}", other),
        }
        if let PageOp::Line { dash, .. } = lines[1] {
            assert_eq!(*dash, Some([4.0, 2.0]));
        }
        assert!(pages[0].iter().any(|op| matches!(
            op,
            PageOp::Text { content, y, .. } if content == "2024-01-10" && close(*y, origin_y + 100.0)
        )));
    }

    #[test]
    fn test_render_writes_a_pdf() {
        let mut doc = document();
        doc.push(Block::Paragraph {
            text: "Make: Lada".to_string(),
            font_size: 12.0,
        });
        doc.push(Block::Table(table(80)));
        let mut drawing = Drawing::new(500.0, 400.0);
        drawing.dashed_line(50.0, 100.0, 60.0, 100.0, [4.0, 2.0]);
        doc.push(Block::Figure(drawing));

        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("Report_Lada_Vesta.pdf");
        PdfRenderer
            .render(&doc, &FontFace::fallback("DejaVu Sans"), &path)
            .unwrap();

        let bytes = fs::read(&path).unwrap();
        assert!(bytes.starts_with(b"%PDF"));
        assert!(!temp_dir.path().join("Report_Lada_Vesta.tmp").exists());
    }

    #[test]
    fn test_ragged_table_is_rejected() {
        let mut bad = table(2);
        bad.rows[1].pop();
        let mut doc = document();
        doc.push(Block::Table(bad));

        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("bad.pdf");
        let result = PdfRenderer.render(&doc, &FontFace::fallback("DejaVu Sans"), &path);
        assert!(matches!(
            result,
            Err(RenderError::RaggedTable {
                row: 1,
                found: 2,
                expected: 3
            })
        ));
        assert!(!path.exists());
    }

    #[test]
    fn test_dash_pattern() {
        let dashed = dash_pattern(Some([4.0, 2.0]));
        assert_eq!(dashed.dash_1, Some(4));
        assert_eq!(dashed.gap_1, Some(2));
        assert_eq!(dash_pattern(None).dash_1, None);
    }

    #[test]
    fn test_wrap() {
        assert_eq!(wrap("one two three", 7), vec!["one two", "three"]);
        assert_eq!(wrap("abcdefghij", 4), vec!["abcd", "efgh", "ij"]);
        assert_eq!(wrap("", 10), vec![""]);
    }
}
