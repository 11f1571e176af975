use std::collections::HashMap;

use chrono::{Local, Utc};
use serde::Serialize;
use tracing::warn;

use crate::core::{workdays, AppError, Result};
use crate::modules::requests::models::{
    field_label, ActivityLogEntry, NewLogEntry, NewRequest, RequestPatch, RequestStatus,
    ServiceRequest,
};
use crate::modules::requests::repositories::{LogRepository, RequestFilter, RequestRepository};
use crate::modules::requests::services::id_generator;

/// How many times a create retries when two callers race for the same
/// custom-id bucket
const CREATE_ATTEMPTS: u32 = 3;

/// The authenticated user on whose behalf an update runs
#[derive(Debug, Clone)]
pub struct Actor {
    pub id: i64,
    pub name: String,
}

/// Dashboard counters
#[derive(Debug, Clone, Serialize)]
pub struct DashboardStats {
    pub total: i64,
    pub in_progress: i64,
    pub pending: i64,
    pub closed: i64,
    pub overdue: i64,
    pub closed_week: i64,
}

/// Service for request lifecycle operations
pub struct RequestService {
    requests: RequestRepository,
    logs: LogRepository,
}

impl RequestService {
    pub fn new(requests: RequestRepository, logs: LogRepository) -> Self {
        Self { requests, logs }
    }

    /// Create a request: validates required fields, assigns the next custom
    /// id for the (month, service-type) bucket and computes the initial
    /// duration. Status always starts at `in_progress`.
    pub async fn create(&self, new: NewRequest) -> Result<i64> {
        new.validate()?;

        let today = Local::now().date_naive();
        let received = new
            .date_request_received
            .ok_or_else(|| AppError::validation("Missing required fields: date_request_received"))?;
        let duration = workdays::working_days(received, today.max(received))?;
        let now = Utc::now();

        for attempt in 1..=CREATE_ATTEMPTS {
            let mut tx = self.requests.begin().await?;
            let custom_id = id_generator::next_custom_id(&mut tx, &new.service_type, today).await?;

            match self
                .requests
                .insert_in_tx(&mut tx, &new, &custom_id, duration, now)
                .await
            {
                Ok(id) => {
                    tx.commit().await.map_err(AppError::Database)?;
                    tracing::info!(request_id = id, custom_id = %custom_id, "Request created");
                    return Ok(id);
                }
                Err(e) if is_unique_violation(&e) && attempt < CREATE_ATTEMPTS => {
                    warn!(custom_id = %custom_id, attempt, "Custom id taken, retrying");
                    tx.rollback().await.ok();
                }
                Err(e) => return Err(e),
            }
        }

        Err(AppError::internal("Could not allocate a unique custom id"))
    }

    /// List requests with optional received-date bounds and the overdue
    /// filter. Durations of open requests are projected live before the
    /// overdue test, so the filter never works off stale stored values.
    pub async fn get_all(&self, filter: RequestFilter) -> Result<Vec<ServiceRequest>> {
        let today = Local::now().date_naive();
        let mut requests = self.requests.list(&filter).await?;

        for request in &mut requests {
            request.project_duration(today)?;
        }

        if filter.overdue_only {
            requests.retain(|r| !r.status.is_closed() && r.is_overdue());
        }

        Ok(requests)
    }

    /// Apply a partial update.
    ///
    /// Moving into the closed state stamps today's close date when the
    /// caller did not supply one and freezes the duration, recomputed from
    /// the received date to the close date. When an actor is known, each
    /// changed field is appended to the activity log after the update
    /// commits; log failures are reported but never undo the update.
    pub async fn update(&self, id: i64, patch: RequestPatch, actor: Option<Actor>) -> Result<()> {
        let today = Local::now().date_naive();
        let now = Utc::now();

        let mut tx = self.requests.begin().await?;
        let current = self
            .requests
            .find_by_id_in_tx(&mut tx, id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Request {} not found", id)))?;

        let mut patch = patch;
        let entering_closed = patch.status.as_ref().map_or(false, |s| s.is_closed())
            && !current.status.is_closed();
        if entering_closed && patch.sent_out_date.is_none() {
            patch.sent_out_date = Some(today);
        }

        let mut merged = patch.apply_to(&current);

        if patch.date_request_received.is_some() || entering_closed {
            let end = if merged.status.is_closed() {
                merged.sent_out_date.unwrap_or(today)
            } else {
                today
            };
            merged.duration_days = workdays::working_days(
                merged.date_request_received,
                end.max(merged.date_request_received),
            )?;
        }

        self.requests.update_in_tx(&mut tx, &merged, now).await?;
        tx.commit().await.map_err(AppError::Database)?;

        if let Some(actor) = actor {
            self.log_changes(&actor, &current, &patch, &merged).await;
        }

        Ok(())
    }

    /// Hard delete. Log entries for the request are left in place.
    pub async fn delete(&self, id: i64) -> Result<()> {
        if self.requests.delete(id).await? {
            Ok(())
        } else {
            Err(AppError::not_found(format!("Request {} not found", id)))
        }
    }

    pub async fn get_logs(&self, request_id: i64) -> Result<Vec<ActivityLogEntry>> {
        self.logs.list_for_request(request_id).await
    }

    /// Dashboard counters; the overdue count re-derives live durations for
    /// open requests and skips targets that are absent or non-positive
    pub async fn get_stats(&self) -> Result<DashboardStats> {
        let today = Local::now().date_naive();

        let total = self.requests.count_all().await?;
        let by_status: HashMap<String, i64> =
            self.requests.status_counts().await?.into_iter().collect();

        let count_of = |status: RequestStatus| *by_status.get(status.as_str()).unwrap_or(&0);
        let pending = count_of(RequestStatus::PendingPresales)
            + count_of(RequestStatus::PendingReview)
            + count_of(RequestStatus::PendingApproval);

        Ok(DashboardStats {
            total,
            in_progress: count_of(RequestStatus::InProgress),
            pending,
            closed: count_of(RequestStatus::Closed),
            overdue: self.requests.overdue_count(today).await?,
            closed_week: self.requests.closed_since(today).await?,
        })
    }

    /// Best-effort activity logging after a committed update
    async fn log_changes(
        &self,
        actor: &Actor,
        before: &ServiceRequest,
        patch: &RequestPatch,
        after: &ServiceRequest,
    ) {
        let now = Utc::now();
        for (field, old, new) in changed_fields(before, patch, after) {
            let entry = NewLogEntry {
                request_id: before.id,
                user_id: actor.id,
                user_name: actor.name.clone(),
                action: format!(
                    "Changed {} from '{}' to '{}'",
                    field_label(field),
                    old,
                    new
                ),
                field_name: Some(field.to_string()),
                old_value: (!old.is_empty()).then_some(old),
                new_value: (!new.is_empty()).then_some(new),
            };

            if let Err(e) = self.logs.create(&entry, now).await {
                warn!(request_id = before.id, field, error = %e, "Activity log write failed");
            }
        }
    }
}

/// The supplied fields whose string representation actually changed,
/// as (field name, old, new). Derived fields never appear here because
/// they are not part of the patch.
fn changed_fields(
    before: &ServiceRequest,
    patch: &RequestPatch,
    after: &ServiceRequest,
) -> Vec<(&'static str, String, String)> {
    let mut changes = Vec::new();

    let mut push = |field: &'static str, supplied: bool, old: String, new: String| {
        if supplied && old != new {
            changes.push((field, old, new));
        }
    };

    push(
        "status",
        patch.status.is_some(),
        before.status.to_string(),
        after.status.to_string(),
    );
    push(
        "customer_name",
        patch.customer_name.is_some(),
        before.customer_name.clone(),
        after.customer_name.clone(),
    );
    push(
        "description",
        patch.description.is_some(),
        before.description.clone(),
        after.description.clone(),
    );
    push(
        "project_type",
        patch.project_type.is_some(),
        before.project_type.clone(),
        after.project_type.clone(),
    );
    push(
        "service_type",
        patch.service_type.is_some(),
        before.service_type.to_string(),
        after.service_type.to_string(),
    );
    push(
        "boq_cost",
        patch.boq_cost.is_some(),
        decimal_text(before.boq_cost),
        decimal_text(after.boq_cost),
    );
    push(
        "requester_name",
        patch.requester_name.is_some(),
        optional_text(&before.requester_name),
        optional_text(&after.requester_name),
    );
    push(
        "department",
        patch.department.is_some(),
        optional_text(&before.department),
        optional_text(&after.department),
    );
    push(
        "date_request_received",
        patch.date_request_received.is_some(),
        before.date_request_received.to_string(),
        after.date_request_received.to_string(),
    );
    push(
        "target_days",
        patch.target_days.is_some(),
        before.target_days.map(|t| t.to_string()).unwrap_or_default(),
        after.target_days.map(|t| t.to_string()).unwrap_or_default(),
    );
    push(
        "sent_out_date",
        patch.sent_out_date.is_some(),
        before.sent_out_date.map(|d| d.to_string()).unwrap_or_default(),
        after.sent_out_date.map(|d| d.to_string()).unwrap_or_default(),
    );
    push(
        "team_member_involved",
        patch.team_member_involved.is_some(),
        before.team_member_involved.clone(),
        after.team_member_involved.clone(),
    );
    push(
        "comment",
        patch.comment.is_some(),
        optional_text(&before.comment),
        optional_text(&after.comment),
    );

    changes
}

fn optional_text(value: &Option<String>) -> String {
    value.clone().unwrap_or_default()
}

fn decimal_text(value: Option<rust_decimal::Decimal>) -> String {
    value.map(|d| d.normalize().to_string()).unwrap_or_default()
}

fn is_unique_violation(error: &AppError) -> bool {
    match error {
        AppError::Database(e) => e
            .as_database_error()
            .map_or(false, |db| db.is_unique_violation()),
        _ => false,
    }
}
