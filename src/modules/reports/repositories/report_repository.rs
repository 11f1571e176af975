// Aggregation queries for period reports.
//
// Created/completed counts are period-scoped on the creation and close
// dates; the working set is every open request plus the period's closures.

use chrono::NaiveDate;
use sqlx::SqlitePool;

use crate::core::Result;
use crate::modules::reports::models::{
    DepartmentBreakdown, StatusCount, TeamPerformance, TypeBreakdown,
};
use crate::modules::requests::models::{RequestStatus, ServiceRequest};
use crate::modules::requests::repositories::request_repository::{RequestRow, REQUEST_COLUMNS};

/// Repository for report aggregation queries
#[derive(Clone)]
pub struct ReportRepository {
    pool: SqlitePool,
}

impl ReportRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Requests created within the period
    pub async fn count_created(&self, from: NaiveDate, to: NaiveDate) -> Result<i64> {
        let count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM requests WHERE DATE(created_date) BETWEEN ? AND ?",
        )
        .bind(from)
        .bind(to)
        .fetch_one(&self.pool)
        .await?;
        Ok(count)
    }

    /// Requests closed within the period
    pub async fn count_completed(&self, from: NaiveDate, to: NaiveDate) -> Result<i64> {
        let count = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*) FROM requests
            WHERE status = ? AND sent_out_date IS NOT NULL
              AND DATE(sent_out_date) BETWEEN ? AND ?
            "#,
        )
        .bind(RequestStatus::Closed.as_str())
        .bind(from)
        .bind(to)
        .fetch_one(&self.pool)
        .await?;
        Ok(count)
    }

    /// Status distribution of requests created within the period
    pub async fn status_breakdown(&self, from: NaiveDate, to: NaiveDate) -> Result<Vec<StatusCount>> {
        let rows = sqlx::query_as::<_, (String, i64)>(
            r#"
            SELECT status, COUNT(*) FROM requests
            WHERE DATE(created_date) BETWEEN ? AND ?
            GROUP BY status
            "#,
        )
        .bind(from)
        .bind(to)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|(name, count)| StatusCount { name, count })
            .collect())
    }

    /// Completion counts per team member over requests created in the period
    pub async fn team_performance(
        &self,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<TeamPerformance>> {
        let rows = sqlx::query_as::<_, (String, i64)>(
            r#"
            SELECT team_member_involved,
                   COUNT(CASE WHEN status = ? THEN 1 END)
            FROM requests
            WHERE DATE(created_date) BETWEEN ? AND ?
            GROUP BY team_member_involved
            "#,
        )
        .bind(RequestStatus::Closed.as_str())
        .bind(from)
        .bind(to)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|(name, completed)| TeamPerformance { name, completed })
            .collect())
    }

    /// Project-type distribution with average stored duration, most common
    /// first
    pub async fn project_type_breakdown(
        &self,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<TypeBreakdown>> {
        let rows = sqlx::query_as::<_, (String, i64, Option<f64>)>(
            r#"
            SELECT project_type, COUNT(*), AVG(duration_days)
            FROM requests
            WHERE DATE(created_date) BETWEEN ? AND ?
            GROUP BY project_type
            ORDER BY COUNT(*) DESC
            "#,
        )
        .bind(from)
        .bind(to)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|(name, count, avg)| TypeBreakdown {
                name,
                count,
                avg_days: round1(avg.unwrap_or(0.0)),
            })
            .collect())
    }

    /// Department distribution with formatted average response time
    pub async fn department_breakdown(
        &self,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<DepartmentBreakdown>> {
        let rows = sqlx::query_as::<_, (String, i64, Option<f64>)>(
            r#"
            SELECT COALESCE(department, ''), COUNT(*), AVG(duration_days)
            FROM requests
            WHERE DATE(created_date) BETWEEN ? AND ?
            GROUP BY COALESCE(department, '')
            ORDER BY COUNT(*) DESC
            "#,
        )
        .bind(from)
        .bind(to)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|(name, requests, avg)| DepartmentBreakdown {
                name,
                requests,
                avg_response: format!("{} days", round1(avg.unwrap_or(0.0))),
            })
            .collect())
    }

    /// The working set: every request that is not closed, plus every request
    /// closed within the period
    pub async fn working_set(&self, from: NaiveDate, to: NaiveDate) -> Result<Vec<ServiceRequest>> {
        let rows = sqlx::query_as::<_, RequestRow>(&format!(
            r#"
            SELECT {REQUEST_COLUMNS} FROM requests
            WHERE status != ?
               OR (sent_out_date IS NOT NULL AND DATE(sent_out_date) BETWEEN ? AND ?)
            "#
        ))
        .bind(RequestStatus::Closed.as_str())
        .bind(from)
        .bind(to)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(RequestRow::into_request).collect())
    }
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
