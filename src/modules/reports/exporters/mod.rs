pub mod excel;
pub mod pdf;

pub use excel::ExcelExporter;
pub use pdf::PdfExporter;

use crate::core::{AppError, Result};

/// Column headers shared by both renderers
pub(crate) const DETAIL_HEADERS: [&str; 11] = [
    "S/N",
    "Customer",
    "Description",
    "BOQ-Cost (NGN)",
    "BM (Name)",
    "Date Request Received",
    "Target (working days)",
    "Date Sent Out (Date sent to BD/RDIS/EBG)",
    "Duration (Working days)",
    "Team Member Involved",
    "Comment",
];

/// Export format selector from the request path
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Pdf,
    Excel,
}

impl ExportFormat {
    /// Case-insensitive parse; anything but `pdf`/`excel` is a client error
    pub fn parse(raw: &str) -> Result<Self> {
        match raw.to_lowercase().as_str() {
            "pdf" => Ok(ExportFormat::Pdf),
            "excel" => Ok(ExportFormat::Excel),
            other => Err(AppError::validation(format!(
                "Invalid format type: {}",
                other
            ))),
        }
    }

    pub fn content_type(&self) -> &'static str {
        match self {
            ExportFormat::Pdf => "application/pdf",
            ExportFormat::Excel => {
                "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"
            }
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Pdf => "pdf",
            ExportFormat::Excel => "xlsx",
        }
    }
}
