pub mod colors;
pub mod report_data;

pub use report_data::{
    DepartmentBreakdown, ReportData, ReportPeriod, StatusCount, TeamPerformance, TypeBreakdown,
};
