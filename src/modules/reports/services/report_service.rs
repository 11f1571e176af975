use chrono::Local;
use tracing::info;

use crate::core::Result;
use crate::modules::reports::models::{ReportData, ReportPeriod};
use crate::modules::reports::repositories::ReportRepository;
use crate::modules::requests::models::RequestStatus;
use crate::modules::requests::repositories::{LogRepository, RequestRepository};

/// Service assembling period reports from the aggregate queries
pub struct ReportService {
    reports: ReportRepository,
    requests: RequestRepository,
    logs: LogRepository,
}

impl ReportService {
    pub fn new(reports: ReportRepository, requests: RequestRepository, logs: LogRepository) -> Self {
        Self {
            reports,
            requests,
            logs,
        }
    }

    /// Build the report for a period.
    ///
    /// Created/completed are period-scoped; in-progress and overdue reflect
    /// the current backlog. The weekly report adds status and team
    /// breakdowns, the monthly report project-type and department
    /// breakdowns. Working-set durations are projected live before the set
    /// is sorted by status priority.
    pub async fn build_report(&self, period: ReportPeriod) -> Result<ReportData> {
        let (from, to) = period.bounds()?;
        let today = Local::now().date_naive();

        let created = self.reports.count_created(from, to).await?;
        let completed = self.reports.count_completed(from, to).await?;
        let in_progress = self
            .requests
            .count_with_status(&RequestStatus::InProgress)
            .await?;
        let overdue = self.requests.overdue_count(today).await?;

        let (status_breakdown, team_performance, project_types, departments) = match period {
            ReportPeriod::Daily(_) => (None, None, None, None),
            ReportPeriod::Weekly { .. } => (
                Some(self.reports.status_breakdown(from, to).await?),
                Some(self.reports.team_performance(from, to).await?),
                None,
                None,
            ),
            ReportPeriod::Monthly { .. } => (
                None,
                None,
                Some(self.reports.project_type_breakdown(from, to).await?),
                Some(self.reports.department_breakdown(from, to).await?),
            ),
        };

        let activities = self
            .logs
            .list_between(from, to, period.activity_limit())
            .await?;

        let mut requests = self.reports.working_set(from, to).await?;
        for request in &mut requests {
            request.project_duration(today)?;
        }
        // Stable sort: ties keep their fetch order
        requests.sort_by_key(|r| r.status.sort_rank());

        info!(
            kind = period.kind(),
            from = %from,
            to = %to,
            working_set = requests.len(),
            "Report built"
        );

        Ok(ReportData {
            created,
            completed,
            in_progress,
            overdue,
            status_breakdown,
            team_performance,
            project_types,
            departments,
            activities,
            requests,
        })
    }
}
