// Spreadsheet renderer.
//
// Consumes the same ReportData as the document renderer and applies the
// shared status palette from models::colors; only the workbook plumbing
// lives here.

use rust_xlsxwriter::{Color, Format, FormatAlign, FormatBorder, Workbook, XlsxError};

use crate::core::{money, AppError, Result};
use crate::modules::reports::exporters::DETAIL_HEADERS;
use crate::modules::reports::models::colors;
use crate::modules::reports::models::{ReportData, ReportPeriod};

const HEADER_FILL: u32 = 0x366092;

/// Excel export of a period report
pub struct ExcelExporter {
    organization: String,
}

impl ExcelExporter {
    pub fn new(organization: impl Into<String>) -> Self {
        Self {
            organization: organization.into(),
        }
    }

    /// Render the report workbook and return its bytes
    pub fn render(&self, data: &ReportData, period: &ReportPeriod) -> Result<Vec<u8>> {
        let mut workbook = Workbook::new();

        let org_format = Format::new()
            .set_bold()
            .set_font_size(18)
            .set_font_color(Color::RGB(HEADER_FILL))
            .set_align(FormatAlign::Center)
            .set_align(FormatAlign::VerticalCenter);
        let title_format = Format::new()
            .set_bold()
            .set_font_size(16)
            .set_align(FormatAlign::Center);
        let section_format = Format::new().set_bold().set_font_size(14);
        let subsection_format = Format::new().set_bold().set_font_size(12);
        let header_format = Format::new()
            .set_bold()
            .set_font_color(Color::White)
            .set_background_color(Color::RGB(HEADER_FILL))
            .set_align(FormatAlign::Center)
            .set_align(FormatAlign::VerticalCenter)
            .set_border(FormatBorder::Thin);
        let metric_label_format = Format::new().set_bold().set_border(FormatBorder::Thin);
        let metric_value_format = Format::new().set_border(FormatBorder::Thin);

        let worksheet = workbook.add_worksheet();
        worksheet.set_name(sheet_name(period)).map_err(xlsx_err)?;

        let last_col = (DETAIL_HEADERS.len() - 1) as u16;
        worksheet
            .merge_range(0, 0, 0, last_col, &self.organization, &org_format)
            .map_err(xlsx_err)?;
        worksheet
            .merge_range(1, 0, 1, last_col, &period.label(), &title_format)
            .map_err(xlsx_err)?;

        // Summary metrics
        let mut row: u32 = 3;
        worksheet
            .write_string_with_format(row, 0, "Summary Metrics", &section_format)
            .map_err(xlsx_err)?;
        row += 1;

        let metrics = [
            ("Created", data.created),
            ("Completed", data.completed),
            ("In Progress", data.in_progress),
            ("Overdue", data.overdue),
        ];
        for (label, value) in metrics {
            worksheet
                .write_string_with_format(row, 0, label, &metric_label_format)
                .map_err(xlsx_err)?;
            worksheet
                .write_number_with_format(row, 1, value as f64, &metric_value_format)
                .map_err(xlsx_err)?;
            row += 1;
        }

        if !data.requests.is_empty() {
            // Status breakdown of the working set
            row += 1;
            worksheet
                .write_string_with_format(row, 0, "Status Breakdown", &subsection_format)
                .map_err(xlsx_err)?;
            row += 1;
            for (label, count) in data.working_set_breakdown() {
                worksheet
                    .write_string_with_format(row, 0, label, &metric_label_format)
                    .map_err(xlsx_err)?;
                worksheet
                    .write_number_with_format(row, 1, count as f64, &metric_value_format)
                    .map_err(xlsx_err)?;
                row += 1;
            }

            // Detail table
            row += 2;
            worksheet
                .write_string_with_format(row, 0, "Request Details", &section_format)
                .map_err(xlsx_err)?;
            row += 1;
            for (col, header) in DETAIL_HEADERS.iter().enumerate() {
                worksheet
                    .write_string_with_format(row, col as u16, *header, &header_format)
                    .map_err(xlsx_err)?;
            }

            for (index, request) in data.requests.iter().enumerate() {
                row += 1;

                let fill = colors::status_color(&request.status);
                let cell = Format::new()
                    .set_background_color(Color::RGB(fill.packed()))
                    .set_border(FormatBorder::Thin);
                let centered = cell.clone().set_align(FormatAlign::Center);
                let duration_format = if request.is_overdue() {
                    Format::new()
                        .set_background_color(Color::RGB(colors::OVERDUE_HIGHLIGHT.packed()))
                        .set_border(FormatBorder::Thin)
                        .set_align(FormatAlign::Center)
                } else {
                    centered.clone()
                };

                worksheet
                    .write_number_with_format(row, 0, (index + 1) as f64, &centered)
                    .map_err(xlsx_err)?;
                worksheet
                    .write_string_with_format(row, 1, &request.customer_name, &cell)
                    .map_err(xlsx_err)?;
                worksheet
                    .write_string_with_format(row, 2, &request.description, &cell)
                    .map_err(xlsx_err)?;
                worksheet
                    .write_string_with_format(row, 3, &money::format_ngn(request.boq_cost), &cell)
                    .map_err(xlsx_err)?;
                worksheet
                    .write_string_with_format(
                        row,
                        4,
                        request.requester_name.as_deref().unwrap_or(""),
                        &cell,
                    )
                    .map_err(xlsx_err)?;
                worksheet
                    .write_string_with_format(
                        row,
                        5,
                        &request.date_request_received.to_string(),
                        &cell,
                    )
                    .map_err(xlsx_err)?;
                match request.target_days {
                    Some(target) => worksheet
                        .write_number_with_format(row, 6, target as f64, &centered)
                        .map_err(xlsx_err)?,
                    None => worksheet
                        .write_string_with_format(row, 6, "N/A", &centered)
                        .map_err(xlsx_err)?,
                };
                let sent_out = request
                    .sent_out_date
                    .map(|d| d.to_string())
                    .unwrap_or_else(|| "N/A".to_string());
                worksheet
                    .write_string_with_format(row, 7, &sent_out, &cell)
                    .map_err(xlsx_err)?;
                worksheet
                    .write_number_with_format(row, 8, request.duration_days as f64, &duration_format)
                    .map_err(xlsx_err)?;
                worksheet
                    .write_string_with_format(row, 9, &request.team_member_involved, &cell)
                    .map_err(xlsx_err)?;
                worksheet
                    .write_string_with_format(
                        row,
                        10,
                        request.comment.as_deref().unwrap_or(""),
                        &cell,
                    )
                    .map_err(xlsx_err)?;
            }

            // Color guide
            row += 3;
            worksheet
                .write_string_with_format(row, 0, "Color Guide", &section_format)
                .map_err(xlsx_err)?;
            row += 1;
            worksheet
                .write_string_with_format(row, 0, "Status", &header_format)
                .map_err(xlsx_err)?;
            worksheet
                .write_string_with_format(row, 1, "Color", &header_format)
                .map_err(xlsx_err)?;

            for (label, color) in colors::legend() {
                row += 1;
                worksheet
                    .write_string_with_format(row, 0, label, &metric_value_format)
                    .map_err(xlsx_err)?;
                let swatch = Format::new()
                    .set_background_color(Color::RGB(color.packed()))
                    .set_border(FormatBorder::Thin);
                worksheet
                    .write_string_with_format(row, 1, "", &swatch)
                    .map_err(xlsx_err)?;
            }
        }

        worksheet.autofit();

        workbook.save_to_buffer().map_err(xlsx_err)
    }
}

fn sheet_name(period: &ReportPeriod) -> &'static str {
    match period {
        ReportPeriod::Daily(_) => "Daily Report",
        ReportPeriod::Weekly { .. } => "Weekly Report",
        ReportPeriod::Monthly { .. } => "Monthly Report",
    }
}

fn xlsx_err(e: XlsxError) -> AppError {
    AppError::internal(format!("Excel rendering failed: {}", e))
}
