use chrono::{DateTime, Utc};
use serde::Serialize;

/// Append-only change-history entry for a request.
///
/// Written as a side effect of an authenticated update, one entry per
/// changed field; never mutated or deleted afterwards.
#[derive(Debug, Clone, Serialize)]
pub struct ActivityLogEntry {
    pub id: i64,
    pub request_id: i64,
    pub user_id: i64,
    pub user_name: String,
    /// Human-readable sentence, e.g. `Changed Status from 'x' to 'y'`
    pub action: String,
    pub field_name: Option<String>,
    pub old_value: Option<String>,
    pub new_value: Option<String>,
    pub timestamp: DateTime<Utc>,
}

/// Log entry joined with the customer of the request it belongs to,
/// as shown in report activity sections
#[derive(Debug, Clone, Serialize)]
pub struct ActivityLogWithCustomer {
    #[serde(flatten)]
    pub entry: ActivityLogEntry,
    pub customer_name: String,
}

/// A pending log write
#[derive(Debug, Clone)]
pub struct NewLogEntry {
    pub request_id: i64,
    pub user_id: i64,
    pub user_name: String,
    pub action: String,
    pub field_name: Option<String>,
    pub old_value: Option<String>,
    pub new_value: Option<String>,
}

/// Display label for a field in generated log sentences; fields without a
/// mapping fall back to their raw name
pub fn field_label(field: &str) -> &str {
    match field {
        "status" => "Status",
        "customer_name" => "Customer Name",
        "description" => "Description",
        "project_type" => "Project Type",
        "boq_cost" => "BOQ Cost",
        "requester_name" => "BM Name",
        "department" => "Department",
        "date_request_received" => "Date Request Received",
        "target_days" => "Target Days",
        "sent_out_date" => "Sent Out Date",
        "team_member_involved" => "Team Member Involved",
        "comment" => "Comment",
        other => other,
    }
}
