use chrono::{Datelike, Duration, NaiveDate};
use serde::Serialize;

use crate::core::{AppError, Result};
use crate::modules::requests::models::{ActivityLogWithCustomer, RequestStatus, ServiceRequest};

/// A reporting period: one day, one ISO week or one calendar month
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportPeriod {
    Daily(NaiveDate),
    Weekly { year: i32, week: u32 },
    Monthly { year: i32, month: u32 },
}

impl ReportPeriod {
    /// Inclusive date bounds of the period.
    ///
    /// Week N of a year starts at Jan 1 plus N-1 weeks, normalized back to
    /// that week's Monday; months run first day to last day.
    pub fn bounds(&self) -> Result<(NaiveDate, NaiveDate)> {
        match *self {
            ReportPeriod::Daily(date) => Ok((date, date)),
            ReportPeriod::Weekly { year, week } => {
                if !(1..=53).contains(&week) {
                    return Err(AppError::validation(format!("Invalid week number: {}", week)));
                }
                let jan_1 = NaiveDate::from_ymd_opt(year, 1, 1)
                    .ok_or_else(|| AppError::validation(format!("Invalid year: {}", year)))?;
                let start = jan_1 + Duration::weeks(week as i64 - 1)
                    - Duration::days(jan_1.weekday().num_days_from_monday() as i64);
                Ok((start, start + Duration::days(6)))
            }
            ReportPeriod::Monthly { year, month } => {
                let start = NaiveDate::from_ymd_opt(year, month, 1).ok_or_else(|| {
                    AppError::validation(format!("Invalid month: {}-{:02}", year, month))
                })?;
                let next_month = if month == 12 {
                    NaiveDate::from_ymd_opt(year + 1, 1, 1)
                } else {
                    NaiveDate::from_ymd_opt(year, month + 1, 1)
                };
                let end = next_month
                    .and_then(|d| d.pred_opt())
                    .ok_or_else(|| AppError::validation("Month out of range".to_string()))?;
                Ok((start, end))
            }
        }
    }

    /// Heading printed on reports and exports
    pub fn label(&self) -> String {
        match *self {
            ReportPeriod::Daily(date) => format!("Daily Report - {}", date),
            ReportPeriod::Weekly { year, week } => {
                format!("Weekly Report - Week {}, {}", week, year)
            }
            ReportPeriod::Monthly { year, month } => {
                match NaiveDate::from_ymd_opt(year, month, 1) {
                    Some(start) => format!("Monthly Report - {}", start.format("%B %Y")),
                    None => format!("Monthly Report - {}-{:02}", year, month),
                }
            }
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            ReportPeriod::Daily(_) => "daily",
            ReportPeriod::Weekly { .. } => "weekly",
            ReportPeriod::Monthly { .. } => "monthly",
        }
    }

    /// Cap on activity entries included in the report
    pub fn activity_limit(&self) -> i64 {
        match self {
            ReportPeriod::Daily(_) => 50,
            ReportPeriod::Weekly { .. } => 100,
            ReportPeriod::Monthly { .. } => 200,
        }
    }

    /// Stem for export download filenames
    pub fn file_stem(&self) -> String {
        match *self {
            ReportPeriod::Daily(date) => format!("daily_report_{}", date),
            ReportPeriod::Weekly { year, week } => {
                format!("weekly_report_{}_W{:02}", year, week)
            }
            ReportPeriod::Monthly { year, month } => {
                format!("monthly_report_{}_{:02}", year, month)
            }
        }
    }
}

/// Count of requests created in the period per status
#[derive(Debug, Clone, Serialize)]
pub struct StatusCount {
    pub name: String,
    pub count: i64,
}

/// Per-team-member completion counts for the weekly report
#[derive(Debug, Clone, Serialize)]
pub struct TeamPerformance {
    pub name: String,
    pub completed: i64,
}

/// Project-type distribution with average duration for the monthly report
#[derive(Debug, Clone, Serialize)]
pub struct TypeBreakdown {
    pub name: String,
    pub count: i64,
    pub avg_days: f64,
}

/// Department distribution with formatted average response time
#[derive(Debug, Clone, Serialize)]
pub struct DepartmentBreakdown {
    pub name: String,
    pub requests: i64,
    pub avg_response: String,
}

/// Everything a period report contains; both renderers consume this
/// structure unchanged
#[derive(Debug, Clone, Serialize)]
pub struct ReportData {
    /// Requests created within the period
    pub created: i64,
    /// Requests closed within the period
    pub completed: i64,
    /// Currently in progress, not period-scoped
    pub in_progress: i64,
    /// Currently overdue, not period-scoped
    pub overdue: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status_breakdown: Option<Vec<StatusCount>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub team_performance: Option<Vec<TeamPerformance>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_types: Option<Vec<TypeBreakdown>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub departments: Option<Vec<DepartmentBreakdown>>,
    /// Period activity, newest first, capped per period kind
    pub activities: Vec<ActivityLogWithCustomer>,
    /// The working set: every open request plus the period's closures,
    /// sorted by status priority
    pub requests: Vec<ServiceRequest>,
}

impl ReportData {
    /// Status counts over the working set, in display order
    pub fn working_set_breakdown(&self) -> [(&'static str, i64); 5] {
        let count = |status: RequestStatus| {
            self.requests.iter().filter(|r| r.status == status).count() as i64
        };

        [
            ("In Progress", count(RequestStatus::InProgress)),
            ("Pending with Presales", count(RequestStatus::PendingPresales)),
            ("Pending Review", count(RequestStatus::PendingReview)),
            ("Pending Approval", count(RequestStatus::PendingApproval)),
            ("Closed Requests", count(RequestStatus::Closed)),
        ]
    }
}
