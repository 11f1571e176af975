// SQLite persistence for service requests.
//
// Rows are fetched into a primitive RequestRow and converted to the domain
// model; enum and decimal columns are stored as text.

use chrono::{DateTime, Duration, NaiveDate, Utc};
use rust_decimal::Decimal;
use sqlx::{Sqlite, SqlitePool, Transaction};
use std::str::FromStr;

use crate::core::{AppError, Result};
use crate::modules::requests::models::{NewRequest, RequestStatus, ServiceRequest};

pub(crate) const REQUEST_COLUMNS: &str = "id, custom_id, customer_name, description, project_type, \
     service_type, status, boq_cost, requester_name, department, date_request_received, \
     target_days, sent_out_date, duration_days, team_member_involved, comment, \
     created_date, updated_date";

/// Optional filters for listing requests
#[derive(Debug, Clone, Default)]
pub struct RequestFilter {
    pub date_from: Option<NaiveDate>,
    pub date_to: Option<NaiveDate>,
    pub overdue_only: bool,
}

/// Repository for request database operations
#[derive(Clone)]
pub struct RequestRepository {
    pool: SqlitePool,
}

impl RequestRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Insert a new request within an existing transaction.
    ///
    /// The caller supplies the generated custom id and the initial duration;
    /// status is always the initial pipeline state.
    pub async fn insert_in_tx(
        &self,
        tx: &mut Transaction<'_, Sqlite>,
        new: &NewRequest,
        custom_id: &str,
        duration_days: i64,
        now: DateTime<Utc>,
    ) -> Result<i64> {
        let result = sqlx::query(
            r#"
            INSERT INTO requests (
                custom_id, customer_name, description, project_type, service_type,
                status, boq_cost, requester_name, department, date_request_received,
                target_days, sent_out_date, duration_days, team_member_involved,
                comment, created_date, updated_date
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, NULL, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(custom_id)
        .bind(new.customer_name.as_deref().unwrap_or_default())
        .bind(new.description.as_deref().unwrap_or_default())
        .bind(&new.project_type)
        .bind(new.service_type.label())
        .bind(RequestStatus::InProgress.as_str())
        .bind(new.boq_cost.map(|d| d.to_string()))
        .bind(&new.requester_name)
        .bind(&new.department)
        .bind(new.date_request_received)
        .bind(new.target_days)
        .bind(duration_days)
        .bind(new.team_member_involved.as_deref().unwrap_or_default())
        .bind(new.comment.as_deref().unwrap_or_default())
        .bind(now)
        .bind(now)
        .execute(&mut **tx)
        .await?;

        Ok(result.last_insert_rowid())
    }

    pub async fn find_by_id(&self, id: i64) -> Result<Option<ServiceRequest>> {
        let row = sqlx::query_as::<_, RequestRow>(&format!(
            "SELECT {REQUEST_COLUMNS} FROM requests WHERE id = ?"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(RequestRow::into_request))
    }

    pub async fn find_by_id_in_tx(
        &self,
        tx: &mut Transaction<'_, Sqlite>,
        id: i64,
    ) -> Result<Option<ServiceRequest>> {
        let row = sqlx::query_as::<_, RequestRow>(&format!(
            "SELECT {REQUEST_COLUMNS} FROM requests WHERE id = ?"
        ))
        .bind(id)
        .fetch_optional(&mut **tx)
        .await?;

        Ok(row.map(RequestRow::into_request))
    }

    /// List requests matching the filter, newest first.
    ///
    /// Date bounds are inclusive on the received date. The overdue filter is
    /// applied by the caller after live-duration projection, not here.
    pub async fn list(&self, filter: &RequestFilter) -> Result<Vec<ServiceRequest>> {
        let mut sql = format!("SELECT {REQUEST_COLUMNS} FROM requests");
        let mut conditions: Vec<&str> = Vec::new();

        if filter.date_from.is_some() {
            conditions.push("date_request_received >= ?");
        }
        if filter.date_to.is_some() {
            conditions.push("date_request_received <= ?");
        }
        if !conditions.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&conditions.join(" AND "));
        }
        sql.push_str(" ORDER BY created_date DESC, id DESC");

        let mut query = sqlx::query_as::<_, RequestRow>(&sql);
        if let Some(date_from) = filter.date_from {
            query = query.bind(date_from);
        }
        if let Some(date_to) = filter.date_to {
            query = query.bind(date_to);
        }

        let rows = query.fetch_all(&self.pool).await?;
        Ok(rows.into_iter().map(RequestRow::into_request).collect())
    }

    /// Persist the merged state of an updated request
    pub async fn update_in_tx(
        &self,
        tx: &mut Transaction<'_, Sqlite>,
        request: &ServiceRequest,
        now: DateTime<Utc>,
    ) -> Result<()> {
        let result = sqlx::query(
            r#"
            UPDATE requests SET
                customer_name = ?, description = ?, project_type = ?, service_type = ?,
                status = ?, boq_cost = ?, requester_name = ?, department = ?,
                date_request_received = ?, target_days = ?, sent_out_date = ?,
                duration_days = ?, team_member_involved = ?, comment = ?, updated_date = ?
            WHERE id = ?
            "#,
        )
        .bind(&request.customer_name)
        .bind(&request.description)
        .bind(&request.project_type)
        .bind(request.service_type.label())
        .bind(request.status.as_str())
        .bind(request.boq_cost.map(|d| d.to_string()))
        .bind(&request.requester_name)
        .bind(&request.department)
        .bind(request.date_request_received)
        .bind(request.target_days)
        .bind(request.sent_out_date)
        .bind(request.duration_days)
        .bind(&request.team_member_involved)
        .bind(&request.comment)
        .bind(now)
        .bind(request.id)
        .execute(&mut **tx)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(format!("Request {} not found", request.id)));
        }

        Ok(())
    }

    /// Hard delete; activity log entries are intentionally left in place
    pub async fn delete(&self, id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM requests WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    pub async fn count_all(&self) -> Result<i64> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM requests")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    pub async fn count_with_status(&self, status: &RequestStatus) -> Result<i64> {
        let count =
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM requests WHERE status = ?")
                .bind(status.as_str())
                .fetch_one(&self.pool)
                .await?;
        Ok(count)
    }

    /// Per-status counts across the whole table
    pub async fn status_counts(&self) -> Result<Vec<(String, i64)>> {
        let rows = sqlx::query_as::<_, (String, i64)>(
            "SELECT status, COUNT(*) FROM requests GROUP BY status",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// Requests that have a target at all; overdue judgement happens on the
    /// projected durations
    pub async fn list_with_target(&self) -> Result<Vec<ServiceRequest>> {
        let rows = sqlx::query_as::<_, RequestRow>(&format!(
            "SELECT {REQUEST_COLUMNS} FROM requests WHERE target_days IS NOT NULL"
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(RequestRow::into_request).collect())
    }

    /// Live overdue count: open requests re-derive their duration as of
    /// `today`, closed ones keep the frozen value
    pub async fn overdue_count(&self, today: NaiveDate) -> Result<i64> {
        let mut count = 0;
        for mut request in self.list_with_target().await? {
            request.project_duration(today)?;
            if request.is_overdue() {
                count += 1;
            }
        }
        Ok(count)
    }

    /// Requests closed within the trailing seven days from `today`
    pub async fn closed_since(&self, today: NaiveDate) -> Result<i64> {
        let cutoff = today - Duration::days(7);
        let count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM requests WHERE status = ? AND sent_out_date >= ?",
        )
        .bind(RequestStatus::Closed.as_str())
        .bind(cutoff)
        .fetch_one(&self.pool)
        .await?;
        Ok(count)
    }

    pub async fn begin(&self) -> Result<Transaction<'_, Sqlite>> {
        self.pool.begin().await.map_err(AppError::Database)
    }
}

// Helper struct for database mapping, shared with the report queries

#[derive(Debug, sqlx::FromRow)]
pub(crate) struct RequestRow {
    id: i64,
    custom_id: String,
    customer_name: String,
    description: String,
    project_type: String,
    service_type: String,
    status: String,
    boq_cost: Option<String>,
    requester_name: Option<String>,
    department: Option<String>,
    date_request_received: NaiveDate,
    target_days: Option<i64>,
    sent_out_date: Option<NaiveDate>,
    duration_days: i64,
    team_member_involved: String,
    comment: Option<String>,
    created_date: DateTime<Utc>,
    updated_date: DateTime<Utc>,
}

impl RequestRow {
    pub(crate) fn into_request(self) -> ServiceRequest {
        // Enum parses are infallible: unrecognised text maps to the
        // fallback variants rather than failing the whole read
        let status = self.status.parse().unwrap_or_default();
        let service_type = self.service_type.parse().unwrap_or_default();
        let boq_cost = self
            .boq_cost
            .as_deref()
            .and_then(|s| Decimal::from_str(s).ok());

        ServiceRequest {
            id: self.id,
            custom_id: self.custom_id,
            customer_name: self.customer_name,
            description: self.description,
            project_type: self.project_type,
            service_type,
            status,
            boq_cost,
            requester_name: self.requester_name,
            department: self.department,
            date_request_received: self.date_request_received,
            target_days: self.target_days,
            sent_out_date: self.sent_out_date,
            duration_days: self.duration_days,
            team_member_involved: self.team_member_involved,
            comment: self.comment,
            created_date: self.created_date,
            updated_date: self.updated_date,
        }
    }
}
