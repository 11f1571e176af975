// Document renderer.
//
// Landscape A4 with the built-in Helvetica faces; consumes the same
// ReportData as the spreadsheet renderer and the shared palette from
// models::colors. Layout is cursor-driven from the top of each page.

use std::io::BufWriter;

use printpdf::{
    BuiltinFont, Color, IndirectFontRef, Line, Mm, PdfDocument, PdfDocumentReference,
    PdfLayerReference, Point, Rgb,
};

use crate::core::{money, AppError, Result};
use crate::modules::reports::exporters::DETAIL_HEADERS;
use crate::modules::reports::models::colors;
use crate::modules::reports::models::{ReportData, ReportPeriod};

const PAGE_WIDTH: f64 = 297.0;
const PAGE_HEIGHT: f64 = 210.0;
const MARGIN: f64 = 10.0;
const ROW_HEIGHT: f64 = 6.0;
const TABLE_FONT_SIZE: f64 = 7.0;

/// Detail column widths in mm; sums to the printable width
const COLUMN_WIDTHS: [f64; 11] = [
    8.0, 30.0, 48.0, 24.0, 24.0, 22.0, 14.0, 22.0, 16.0, 28.0, 41.0,
];

const BLACK: colors::Rgb = colors::Rgb::new(0x00, 0x00, 0x00);
const WHITE: colors::Rgb = colors::Rgb::new(0xFF, 0xFF, 0xFF);
const HEADER_GRAY: colors::Rgb = colors::Rgb::new(0x80, 0x80, 0x80);

/// PDF export of a period report
pub struct PdfExporter {
    organization: String,
}

impl PdfExporter {
    pub fn new(organization: impl Into<String>) -> Self {
        Self {
            organization: organization.into(),
        }
    }

    /// Render the report document and return its bytes
    pub fn render(&self, data: &ReportData, period: &ReportPeriod) -> Result<Vec<u8>> {
        let (doc, page_index, layer_index) = PdfDocument::new(
            period.label(),
            Mm(PAGE_WIDTH),
            Mm(PAGE_HEIGHT),
            "Layer 1",
        );
        let font = doc
            .add_builtin_font(BuiltinFont::Helvetica)
            .map_err(pdf_err)?;
        let bold = doc
            .add_builtin_font(BuiltinFont::HelveticaBold)
            .map_err(pdf_err)?;

        {
            let mut page = Page {
                doc: &doc,
                layer: doc.get_page(page_index).get_layer(layer_index),
                y: PAGE_HEIGHT - 15.0,
            };

            // Header block
            page.centered_text(&self.organization, 14.0, &bold);
            page.advance(8.0);
            page.centered_text(&period.label(), 18.0, &bold);
            page.advance(12.0);

            // Summary metrics
            page.heading("Summary Metrics", &bold);
            let metrics = [
                ("Created", data.created),
                ("Completed", data.completed),
                ("In Progress", data.in_progress),
                ("Overdue", data.overdue),
            ];
            for (label, value) in metrics {
                page.metric_line(label, value, &font);
            }

            if !data.requests.is_empty() {
                page.advance(3.0);
                page.heading("Status Breakdown", &bold);
                for (label, count) in data.working_set_breakdown() {
                    page.metric_line(label, count, &font);
                }

                // Detail table
                page.advance(4.0);
                page.heading("Request Details", &bold);
                page.detail_header_row(&bold);

                for (index, request) in data.requests.iter().enumerate() {
                    page.ensure_space(ROW_HEIGHT, |p| p.detail_header_row(&bold));

                    let row_y = page.y - ROW_HEIGHT;
                    page.fill_row(row_y, colors::status_color(&request.status));
                    if request.is_overdue() {
                        page.fill_cell(row_y, 8, colors::OVERDUE_HIGHLIGHT);
                    }

                    let sent_out = request
                        .sent_out_date
                        .map(|d| d.to_string())
                        .unwrap_or_else(|| "N/A".to_string());
                    let target = request
                        .target_days
                        .map(|t| t.to_string())
                        .unwrap_or_else(|| "N/A".to_string());
                    let cells = [
                        (index + 1).to_string(),
                        request.customer_name.clone(),
                        request.description.clone(),
                        money::format_ngn(request.boq_cost),
                        request.requester_name.clone().unwrap_or_default(),
                        request.date_request_received.to_string(),
                        target,
                        sent_out,
                        request.duration_days.to_string(),
                        request.team_member_involved.clone(),
                        request.comment.clone().unwrap_or_default(),
                    ];
                    page.detail_row(row_y, &cells, &font);
                    page.y = row_y;
                }

                // Color guide
                page.advance(8.0);
                page.ensure_space(
                    ROW_HEIGHT * (colors::legend().len() as f64 + 2.0),
                    |_| {},
                );
                page.heading("Color Guide", &bold);
                for (label, color) in colors::legend() {
                    let row_y = page.y - ROW_HEIGHT;
                    page.fill_rect(MARGIN + 55.0, row_y, 25.0, ROW_HEIGHT, color);
                    page.text(label, 8.0, MARGIN, row_y + 1.8, &font, BLACK);
                    page.y = row_y;
                }
            }
        }

        let mut buffer: Vec<u8> = Vec::new();
        {
            let mut writer = BufWriter::new(&mut buffer);
            doc.save(&mut writer).map_err(pdf_err)?;
        }
        Ok(buffer)
    }
}

/// Cursor over the current page; `y` is the baseline of the next block
struct Page<'a> {
    doc: &'a PdfDocumentReference,
    layer: PdfLayerReference,
    y: f64,
}

impl Page<'_> {
    /// Start a fresh page when fewer than `needed` mm remain, re-running
    /// `after_break` (e.g. to repeat a table header) on the new page
    fn ensure_space(&mut self, needed: f64, after_break: impl FnOnce(&mut Self)) {
        if self.y - needed < MARGIN {
            let (page_index, layer_index) =
                self.doc
                    .add_page(Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), "Layer 1");
            self.layer = self.doc.get_page(page_index).get_layer(layer_index);
            self.y = PAGE_HEIGHT - MARGIN;
            after_break(self);
        }
    }

    fn advance(&mut self, amount: f64) {
        self.y -= amount;
    }

    fn heading(&mut self, title: &str, bold: &IndirectFontRef) {
        self.ensure_space(10.0, |_| {});
        self.text(title, 12.0, MARGIN, self.y, bold, BLACK);
        self.advance(7.0);
    }

    fn metric_line(&mut self, label: &str, value: i64, font: &IndirectFontRef) {
        self.ensure_space(6.0, |_| {});
        self.text(&format!("{}: {}", label, value), 10.0, MARGIN + 2.0, self.y, font, BLACK);
        self.advance(5.5);
    }

    fn centered_text(&mut self, content: &str, size: f64, font: &IndirectFontRef) {
        let x = ((PAGE_WIDTH - approx_width(content, size)) / 2.0).max(MARGIN);
        self.text(content, size, x, self.y, font, BLACK);
    }

    fn detail_header_row(&mut self, bold: &IndirectFontRef) {
        let row_y = self.y - ROW_HEIGHT;
        self.fill_row(row_y, HEADER_GRAY);

        let mut x = MARGIN;
        for (header, width) in DETAIL_HEADERS.iter().zip(COLUMN_WIDTHS) {
            let clipped = clip(header, width);
            self.text(&clipped, TABLE_FONT_SIZE, x + 1.0, row_y + 1.8, bold, WHITE);
            x += width;
        }
        self.y = row_y;
    }

    fn detail_row(&mut self, row_y: f64, cells: &[String; 11], font: &IndirectFontRef) {
        let mut x = MARGIN;
        for (cell, width) in cells.iter().zip(COLUMN_WIDTHS) {
            let clipped = clip(cell, width);
            self.text(&clipped, TABLE_FONT_SIZE, x + 1.0, row_y + 1.8, font, BLACK);
            x += width;
        }
    }

    fn fill_row(&self, row_y: f64, color: colors::Rgb) {
        let width: f64 = COLUMN_WIDTHS.iter().sum();
        self.fill_rect(MARGIN, row_y, width, ROW_HEIGHT, color);
    }

    fn fill_cell(&self, row_y: f64, column: usize, color: colors::Rgb) {
        let x = MARGIN + COLUMN_WIDTHS[..column].iter().sum::<f64>();
        self.fill_rect(x, row_y, COLUMN_WIDTHS[column], ROW_HEIGHT, color);
    }

    fn fill_rect(&self, x: f64, y: f64, width: f64, height: f64, color: colors::Rgb) {
        let (r, g, b) = color.unit();
        self.layer.set_fill_color(Color::Rgb(Rgb::new(r, g, b, None)));

        let points = vec![
            (Point::new(Mm(x), Mm(y)), false),
            (Point::new(Mm(x + width), Mm(y)), false),
            (Point::new(Mm(x + width), Mm(y + height)), false),
            (Point::new(Mm(x), Mm(y + height)), false),
        ];
        self.layer.add_shape(Line {
            points,
            is_closed: true,
            has_fill: true,
            has_stroke: false,
            is_clipping_path: false,
        });
    }

    fn text(
        &self,
        content: &str,
        size: f64,
        x: f64,
        y: f64,
        font: &IndirectFontRef,
        color: colors::Rgb,
    ) {
        let (r, g, b) = color.unit();
        self.layer.set_fill_color(Color::Rgb(Rgb::new(r, g, b, None)));
        self.layer.use_text(content, size, Mm(x), Mm(y), font);
    }
}

/// Rough Helvetica width in mm, good enough for centering headings
fn approx_width(content: &str, size: f64) -> f64 {
    content.chars().count() as f64 * size * 0.18
}

/// Truncate cell text to what fits the column at the table font size
fn clip(content: &str, width_mm: f64) -> String {
    let max_chars = ((width_mm - 2.0) / 1.25).max(3.0) as usize;
    if content.chars().count() <= max_chars {
        content.to_string()
    } else {
        content.chars().take(max_chars).collect()
    }
}

fn pdf_err(e: printpdf::Error) -> AppError {
    AppError::internal(format!("PDF rendering failed: {}", e))
}
