// Reports module

pub mod controllers;
pub mod exporters;
pub mod models;
pub mod repositories;
pub mod services;

pub use exporters::{ExcelExporter, ExportFormat, PdfExporter};
pub use models::{ReportData, ReportPeriod};
pub use repositories::ReportRepository;
pub use services::ReportService;
