// Service request model and the typed create/patch inputs.
//
// A request moves through a fixed five-state pipeline. Its working-day
// duration is derived: live for open requests, frozen once closed.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::core::{workdays, AppError, Result};

/// Pipeline states in priority order (lowest rank is shown first in reports)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum RequestStatus {
    /// Terminal state
    Closed,
    PendingPresales,
    PendingReview,
    PendingApproval,
    /// Initial state for every newly created request
    InProgress,
    /// Legacy rows carry status strings outside the pipeline
    Other(String),
}

impl RequestStatus {
    pub fn as_str(&self) -> &str {
        match self {
            RequestStatus::Closed => "Closed Request",
            RequestStatus::PendingPresales => "Pending with Presales",
            RequestStatus::PendingReview => "Pending review",
            RequestStatus::PendingApproval => "Pending approval",
            RequestStatus::InProgress => "in_progress",
            RequestStatus::Other(s) => s,
        }
    }

    /// Sort order for report tables; unknown statuses go last
    pub fn sort_rank(&self) -> u32 {
        match self {
            RequestStatus::Closed => 1,
            RequestStatus::PendingPresales => 2,
            RequestStatus::PendingReview => 3,
            RequestStatus::PendingApproval => 4,
            RequestStatus::InProgress => 5,
            RequestStatus::Other(_) => 999,
        }
    }

    pub fn is_closed(&self) -> bool {
        matches!(self, RequestStatus::Closed)
    }

    /// The three intermediate pending states
    pub fn is_pending(&self) -> bool {
        matches!(
            self,
            RequestStatus::PendingPresales
                | RequestStatus::PendingReview
                | RequestStatus::PendingApproval
        )
    }
}

impl Default for RequestStatus {
    fn default() -> Self {
        RequestStatus::InProgress
    }
}

impl std::fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for RequestStatus {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(match s {
            "Closed Request" => RequestStatus::Closed,
            "Pending with Presales" => RequestStatus::PendingPresales,
            "Pending review" => RequestStatus::PendingReview,
            "Pending approval" => RequestStatus::PendingApproval,
            "in_progress" => RequestStatus::InProgress,
            other => RequestStatus::Other(other.to_string()),
        })
    }
}

impl From<RequestStatus> for String {
    fn from(status: RequestStatus) -> Self {
        status.as_str().to_string()
    }
}

impl TryFrom<String> for RequestStatus {
    type Error = std::convert::Infallible;

    fn try_from(s: String) -> std::result::Result<Self, Self::Error> {
        s.parse()
    }
}

/// Service catalogue used for custom id generation and monthly breakdowns
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum ServiceType {
    InternetService,
    LeaseLine,
    DarkFibre,
    NetworkMonitoring,
    OthersConnectivity,
    Collocation,
    CrossConnection,
    CollocationRenewal,
    Ecs,
    DisasterRecovery,
    BackupService,
    ObjectStorage,
    EmailService,
    OthersCloud,
    DocumentManagement,
    CapacityBuilding,
    NetworkSecurity,
    SecurityRenewal,
    /// Free-form entries outside the catalogue
    Other(String),
}

const OTHERS_CONNECTIVITY: &str =
    "Others - Connectivity (Renewal, Upgrade, IT Device, IP Addresses, Consultation, Support etc)";
const OTHERS_CLOUD: &str =
    "Others - Cloud (Renewal, Upgrade of Cloud Resources, IP Address, Licenses etc)";

impl ServiceType {
    /// The 18 catalogue entries, in menu order
    pub fn catalogue() -> [ServiceType; 18] {
        [
            ServiceType::InternetService,
            ServiceType::LeaseLine,
            ServiceType::DarkFibre,
            ServiceType::NetworkMonitoring,
            ServiceType::OthersConnectivity,
            ServiceType::Collocation,
            ServiceType::CrossConnection,
            ServiceType::CollocationRenewal,
            ServiceType::Ecs,
            ServiceType::DisasterRecovery,
            ServiceType::BackupService,
            ServiceType::ObjectStorage,
            ServiceType::EmailService,
            ServiceType::OthersCloud,
            ServiceType::DocumentManagement,
            ServiceType::CapacityBuilding,
            ServiceType::NetworkSecurity,
            ServiceType::SecurityRenewal,
        ]
    }

    pub fn label(&self) -> &str {
        match self {
            ServiceType::InternetService => "Internet Service",
            ServiceType::LeaseLine => "Lease line",
            ServiceType::DarkFibre => "Dark Fibre",
            ServiceType::NetworkMonitoring => "Network Monitoring",
            ServiceType::OthersConnectivity => OTHERS_CONNECTIVITY,
            ServiceType::Collocation => "Collocation",
            ServiceType::CrossConnection => "Cross Connection",
            ServiceType::CollocationRenewal => "Collocation & Cross-connect Renewal",
            ServiceType::Ecs => "ECS",
            ServiceType::DisasterRecovery => "Disaster Recovery",
            ServiceType::BackupService => "Backup Service",
            ServiceType::ObjectStorage => "Object Storage",
            ServiceType::EmailService => "Email Service",
            ServiceType::OthersCloud => OTHERS_CLOUD,
            ServiceType::DocumentManagement => "Document Management System - EDMS",
            ServiceType::CapacityBuilding => "Capacity Building - Training",
            ServiceType::NetworkSecurity => "Network Security",
            ServiceType::SecurityRenewal => "Security Renewal",
            ServiceType::Other(s) => s,
        }
    }

    /// Two-letter slug used in custom ids; entries outside the catalogue
    /// share the `OT` bucket
    pub fn slug(&self) -> &'static str {
        match self {
            ServiceType::InternetService => "IS",
            ServiceType::LeaseLine => "LL",
            ServiceType::DarkFibre => "DF",
            ServiceType::NetworkMonitoring => "NM",
            ServiceType::OthersConnectivity => "OC",
            ServiceType::Collocation => "CS",
            ServiceType::CrossConnection => "CC",
            ServiceType::CollocationRenewal => "CR",
            ServiceType::Ecs => "EC",
            ServiceType::DisasterRecovery => "DR",
            ServiceType::BackupService => "BS",
            ServiceType::ObjectStorage => "OS",
            ServiceType::EmailService => "ES",
            ServiceType::OthersCloud => "OR",
            ServiceType::DocumentManagement => "DM",
            ServiceType::CapacityBuilding => "CB",
            ServiceType::NetworkSecurity => "NS",
            ServiceType::SecurityRenewal => "SR",
            ServiceType::Other(_) => "OT",
        }
    }
}

impl Default for ServiceType {
    fn default() -> Self {
        ServiceType::InternetService
    }
}

impl std::fmt::Display for ServiceType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

impl std::str::FromStr for ServiceType {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(ServiceType::catalogue()
            .into_iter()
            .find(|t| t.label() == s)
            .unwrap_or_else(|| ServiceType::Other(s.to_string())))
    }
}

impl From<ServiceType> for String {
    fn from(service_type: ServiceType) -> Self {
        service_type.label().to_string()
    }
}

impl TryFrom<String> for ServiceType {
    type Error = std::convert::Infallible;

    fn try_from(s: String) -> std::result::Result<Self, Self::Error> {
        s.parse()
    }
}

/// A customer service request
#[derive(Debug, Clone, Serialize)]
pub struct ServiceRequest {
    pub id: i64,
    /// Business-facing code, unique and immutable once assigned
    pub custom_id: String,
    pub customer_name: String,
    pub description: String,
    /// Legacy classification label, retained but unused in new logic
    pub project_type: String,
    pub service_type: ServiceType,
    pub status: RequestStatus,
    pub boq_cost: Option<Decimal>,
    pub requester_name: Option<String>,
    pub department: Option<String>,
    pub date_request_received: NaiveDate,
    pub target_days: Option<i64>,
    pub sent_out_date: Option<NaiveDate>,
    /// Derived working-day duration; live for open requests, frozen at close
    pub duration_days: i64,
    pub team_member_involved: String,
    pub comment: Option<String>,
    pub created_date: DateTime<Utc>,
    pub updated_date: DateTime<Utc>,
}

impl ServiceRequest {
    /// Read-time projection of the derived duration.
    ///
    /// Open requests are measured from the received date to `today`; closed
    /// requests keep the duration frozen when they were closed. Never stored
    /// back except when closing.
    pub fn project_duration(&mut self, today: NaiveDate) -> Result<()> {
        if !self.status.is_closed() {
            self.duration_days =
                workdays::working_days(self.date_request_received, today.max(self.date_request_received))?;
        }
        Ok(())
    }

    /// Overdue regardless of status: a target exists and the (live or
    /// frozen) duration exceeds it
    pub fn is_overdue(&self) -> bool {
        matches!(self.target_days, Some(target) if target > 0 && self.duration_days > target)
    }
}

/// Payload for creating a request
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewRequest {
    pub customer_name: Option<String>,
    pub description: Option<String>,
    #[serde(default)]
    pub project_type: String,
    #[serde(default)]
    pub service_type: ServiceType,
    pub boq_cost: Option<Decimal>,
    pub requester_name: Option<String>,
    pub department: Option<String>,
    pub date_request_received: Option<NaiveDate>,
    #[serde(default, deserialize_with = "lenient_days")]
    pub target_days: Option<i64>,
    pub team_member_involved: Option<String>,
    pub comment: Option<String>,
}

impl NewRequest {
    /// Required-field validation; reports every missing field at once
    pub fn validate(&self) -> Result<()> {
        let mut missing = Vec::new();

        if self.customer_name.as_deref().map_or(true, |s| s.trim().is_empty()) {
            missing.push("customer_name");
        }
        if self.description.as_deref().map_or(true, |s| s.trim().is_empty()) {
            missing.push("description");
        }
        if self.date_request_received.is_none() {
            missing.push("date_request_received");
        }
        if self
            .team_member_involved
            .as_deref()
            .map_or(true, |s| s.trim().is_empty())
        {
            missing.push("team_member_involved");
        }

        if missing.is_empty() {
            Ok(())
        } else {
            Err(AppError::validation(format!(
                "Missing required fields: {}",
                missing.join(", ")
            )))
        }
    }
}

/// Partial update for a request; unspecified fields retain their values
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RequestPatch {
    pub status: Option<RequestStatus>,
    pub customer_name: Option<String>,
    pub description: Option<String>,
    pub project_type: Option<String>,
    pub service_type: Option<ServiceType>,
    pub boq_cost: Option<Decimal>,
    pub requester_name: Option<String>,
    pub department: Option<String>,
    pub date_request_received: Option<NaiveDate>,
    #[serde(default, deserialize_with = "lenient_days")]
    pub target_days: Option<i64>,
    pub sent_out_date: Option<NaiveDate>,
    pub team_member_involved: Option<String>,
    pub comment: Option<String>,
}

impl RequestPatch {
    /// Typed merge: supplied fields overwrite, the rest carry over
    pub fn apply_to(&self, current: &ServiceRequest) -> ServiceRequest {
        let mut merged = current.clone();

        if let Some(status) = &self.status {
            merged.status = status.clone();
        }
        if let Some(customer_name) = &self.customer_name {
            merged.customer_name = customer_name.clone();
        }
        if let Some(description) = &self.description {
            merged.description = description.clone();
        }
        if let Some(project_type) = &self.project_type {
            merged.project_type = project_type.clone();
        }
        if let Some(service_type) = &self.service_type {
            merged.service_type = service_type.clone();
        }
        if let Some(boq_cost) = self.boq_cost {
            merged.boq_cost = Some(boq_cost);
        }
        if let Some(requester_name) = &self.requester_name {
            merged.requester_name = Some(requester_name.clone());
        }
        if let Some(department) = &self.department {
            merged.department = Some(department.clone());
        }
        if let Some(date_request_received) = self.date_request_received {
            merged.date_request_received = date_request_received;
        }
        if let Some(target_days) = self.target_days {
            merged.target_days = Some(target_days);
        }
        if let Some(sent_out_date) = self.sent_out_date {
            merged.sent_out_date = Some(sent_out_date);
        }
        if let Some(team_member_involved) = &self.team_member_involved {
            merged.team_member_involved = team_member_involved.clone();
        }
        if let Some(comment) = &self.comment {
            merged.comment = Some(comment.clone());
        }

        merged
    }
}

/// Accepts target days as a number or a numeric string; `"N/A"` and other
/// non-numeric values read as absent instead of failing the whole payload
fn lenient_days<'de, D>(deserializer: D) -> std::result::Result<Option<i64>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::Number(n)) => n.as_i64(),
        Some(serde_json::Value::String(s)) => s.trim().parse::<i64>().ok(),
        _ => None,
    })
}
