use chrono::{DateTime, NaiveDate, Utc};
use sqlx::SqlitePool;

use crate::core::Result;
use crate::modules::requests::models::{ActivityLogEntry, ActivityLogWithCustomer, NewLogEntry};

/// Repository for the append-only request activity log
#[derive(Clone)]
pub struct LogRepository {
    pool: SqlitePool,
}

impl LogRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, entry: &NewLogEntry, now: DateTime<Utc>) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO request_logs (
                request_id, user_id, user_name, action, field_name,
                old_value, new_value, timestamp
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(entry.request_id)
        .bind(entry.user_id)
        .bind(&entry.user_name)
        .bind(&entry.action)
        .bind(&entry.field_name)
        .bind(&entry.old_value)
        .bind(&entry.new_value)
        .bind(now)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Full history of one request, newest first
    pub async fn list_for_request(&self, request_id: i64) -> Result<Vec<ActivityLogEntry>> {
        let rows = sqlx::query_as::<_, LogRow>(
            r#"
            SELECT id, request_id, user_id, user_name, action, field_name,
                   old_value, new_value, timestamp
            FROM request_logs
            WHERE request_id = ?
            ORDER BY timestamp DESC, id DESC
            "#,
        )
        .bind(request_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(LogRow::into_entry).collect())
    }

    /// Entries within an inclusive date range, newest first, joined with the
    /// customer of the owning request for report display
    pub async fn list_between(
        &self,
        from: NaiveDate,
        to: NaiveDate,
        limit: i64,
    ) -> Result<Vec<ActivityLogWithCustomer>> {
        let rows = sqlx::query_as::<_, LogWithCustomerRow>(
            r#"
            SELECT rl.id, rl.request_id, rl.user_id, rl.user_name, rl.action,
                   rl.field_name, rl.old_value, rl.new_value, rl.timestamp,
                   r.customer_name
            FROM request_logs rl
            JOIN requests r ON rl.request_id = r.id
            WHERE DATE(rl.timestamp) BETWEEN ? AND ?
            ORDER BY rl.timestamp DESC, rl.id DESC
            LIMIT ?
            "#,
        )
        .bind(from)
        .bind(to)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(LogWithCustomerRow::into_entry).collect())
    }
}

// Helper structs for database mapping

#[derive(Debug, sqlx::FromRow)]
struct LogRow {
    id: i64,
    request_id: i64,
    user_id: i64,
    user_name: String,
    action: String,
    field_name: Option<String>,
    old_value: Option<String>,
    new_value: Option<String>,
    timestamp: DateTime<Utc>,
}

impl LogRow {
    fn into_entry(self) -> ActivityLogEntry {
        ActivityLogEntry {
            id: self.id,
            request_id: self.request_id,
            user_id: self.user_id,
            user_name: self.user_name,
            action: self.action,
            field_name: self.field_name,
            old_value: self.old_value,
            new_value: self.new_value,
            timestamp: self.timestamp,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct LogWithCustomerRow {
    id: i64,
    request_id: i64,
    user_id: i64,
    user_name: String,
    action: String,
    field_name: Option<String>,
    old_value: Option<String>,
    new_value: Option<String>,
    timestamp: DateTime<Utc>,
    customer_name: String,
}

impl LogWithCustomerRow {
    fn into_entry(self) -> ActivityLogWithCustomer {
        ActivityLogWithCustomer {
            entry: ActivityLogEntry {
                id: self.id,
                request_id: self.request_id,
                user_id: self.user_id,
                user_name: self.user_name,
                action: self.action,
                field_name: self.field_name,
                old_value: self.old_value,
                new_value: self.new_value,
                timestamp: self.timestamp,
            },
            customer_name: self.customer_name,
        }
    }
}
