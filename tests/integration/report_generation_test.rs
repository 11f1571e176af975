// Period report assembly: counts, breakdowns, activities and the
// working-set contract.

use chrono::{DateTime, Local, NaiveDate, Utc};
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::SqlitePool;

use servicedesk::modules::reports::models::ReportPeriod;
use servicedesk::modules::reports::repositories::ReportRepository;
use servicedesk::modules::reports::services::ReportService;
use servicedesk::modules::requests::models::{NewRequest, RequestPatch, RequestStatus, ServiceType};
use servicedesk::modules::requests::repositories::{LogRepository, RequestRepository};
use servicedesk::modules::requests::services::{Actor, RequestService};
use servicedesk::modules::users::models::Role;
use servicedesk::modules::users::repositories::UserRepository;
use servicedesk::modules::users::services::hash_password;

async fn setup_pool() -> SqlitePool {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("in-memory database");
    sqlx::migrate!().run(&pool).await.expect("migrations");
    pool
}

fn request_service(pool: &SqlitePool) -> RequestService {
    RequestService::new(
        RequestRepository::new(pool.clone()),
        LogRepository::new(pool.clone()),
    )
}

fn report_service(pool: &SqlitePool) -> ReportService {
    ReportService::new(
        ReportRepository::new(pool.clone()),
        RequestRepository::new(pool.clone()),
        LogRepository::new(pool.clone()),
    )
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn midday(d: NaiveDate) -> DateTime<Utc> {
    d.and_hms_opt(12, 0, 0).unwrap().and_utc()
}

async fn backdate_created(pool: &SqlitePool, id: i64, d: NaiveDate) {
    sqlx::query("UPDATE requests SET created_date = ? WHERE id = ?")
        .bind(midday(d))
        .bind(id)
        .execute(pool)
        .await
        .unwrap();
}

async fn seed(
    pool: &SqlitePool,
    customer: &str,
    created: NaiveDate,
    team: &str,
    department: Option<&str>,
    project_type: &str,
) -> i64 {
    let service = request_service(pool);
    let new = NewRequest {
        customer_name: Some(customer.to_string()),
        description: Some("work".to_string()),
        project_type: project_type.to_string(),
        service_type: ServiceType::InternetService,
        date_request_received: Some(created),
        team_member_involved: Some(team.to_string()),
        department: department.map(|s| s.to_string()),
        ..Default::default()
    };
    let id = service.create(new).await.unwrap();
    backdate_created(pool, id, created).await;
    id
}

async fn close_on(pool: &SqlitePool, id: i64, d: NaiveDate) {
    let service = request_service(pool);
    let patch = RequestPatch {
        status: Some(RequestStatus::Closed),
        sent_out_date: Some(d),
        ..Default::default()
    };
    service.update(id, patch, None).await.unwrap();
}

#[tokio::test]
async fn test_daily_report_counts_and_working_set() {
    let pool = setup_pool().await;
    let target_day = date(2025, 3, 5);

    // Open request created long before the period
    seed(&pool, "Old Open", date(2025, 1, 6), "Ada", None, "Review").await;
    // Created inside the period, still open
    seed(&pool, "Fresh", target_day, "Ada", None, "Review").await;
    // Closed inside the period
    let closed_in = seed(&pool, "Closed In", date(2025, 3, 3), "Grace", None, "Review").await;
    close_on(&pool, closed_in, target_day).await;
    // Closed the day before: outside the period
    let closed_out = seed(&pool, "Closed Out", date(2025, 3, 3), "Grace", None, "Review").await;
    close_on(&pool, closed_out, date(2025, 3, 4)).await;

    let report = report_service(&pool)
        .build_report(ReportPeriod::Daily(target_day))
        .await
        .unwrap();

    assert_eq!(report.created, 1);
    assert_eq!(report.completed, 1);
    assert_eq!(report.in_progress, 2);

    // Daily reports carry no optional breakdowns
    assert!(report.status_breakdown.is_none());
    assert!(report.team_performance.is_none());
    assert!(report.project_types.is_none());
    assert!(report.departments.is_none());

    // Working set: every open request regardless of age, plus this day's
    // closure; the other closure is out
    let names: Vec<&str> = report
        .requests
        .iter()
        .map(|r| r.customer_name.as_str())
        .collect();
    assert_eq!(report.requests.len(), 3);
    assert!(names.contains(&"Old Open"));
    assert!(names.contains(&"Fresh"));
    assert!(names.contains(&"Closed In"));
    assert!(!names.contains(&"Closed Out"));

    // Sorted by status priority: the closure leads, open requests follow
    assert_eq!(report.requests[0].customer_name, "Closed In");
    assert!(report.requests[1..]
        .iter()
        .all(|r| r.status == RequestStatus::InProgress));
}

#[tokio::test]
async fn test_weekly_report_breakdowns() {
    let pool = setup_pool().await;
    // 2025-W10 runs Monday 2025-03-03 through Sunday 2025-03-09
    let period = ReportPeriod::Weekly {
        year: 2025,
        week: 10,
    };

    seed(&pool, "A", date(2025, 3, 3), "Ada", None, "Review").await;
    let b = seed(&pool, "B", date(2025, 3, 4), "Ada", None, "Review").await;
    close_on(&pool, b, date(2025, 3, 6)).await;
    seed(&pool, "C", date(2025, 3, 5), "Grace", None, "Review").await;
    // Outside the week entirely
    seed(&pool, "Elsewhere", date(2025, 2, 3), "Grace", None, "Review").await;

    let report = report_service(&pool).build_report(period).await.unwrap();

    assert_eq!(report.created, 3);
    assert_eq!(report.completed, 1);

    let breakdown = report.status_breakdown.expect("weekly status breakdown");
    let closed = breakdown
        .iter()
        .find(|s| s.name == "Closed Request")
        .map(|s| s.count);
    let open = breakdown
        .iter()
        .find(|s| s.name == "in_progress")
        .map(|s| s.count);
    assert_eq!(closed, Some(1));
    assert_eq!(open, Some(2));

    let team = report.team_performance.expect("weekly team performance");
    let ada = team.iter().find(|t| t.name == "Ada").unwrap();
    let grace = team.iter().find(|t| t.name == "Grace").unwrap();
    assert_eq!(ada.completed, 1);
    assert_eq!(grace.completed, 0);

    assert!(report.project_types.is_none());
    assert!(report.departments.is_none());
}

#[tokio::test]
async fn test_monthly_report_breakdowns() {
    let pool = setup_pool().await;
    let period = ReportPeriod::Monthly {
        year: 2025,
        month: 3,
    };

    let a = seed(
        &pool,
        "A",
        date(2025, 3, 3),
        "Ada",
        Some("Sales"),
        "Cloud Service",
    )
    .await;
    close_on(&pool, a, date(2025, 3, 5)).await;
    seed(
        &pool,
        "B",
        date(2025, 3, 10),
        "Ada",
        Some("Sales"),
        "Cloud Service",
    )
    .await;
    seed(
        &pool,
        "C",
        date(2025, 3, 12),
        "Grace",
        Some("Finance"),
        "Security",
    )
    .await;

    let report = report_service(&pool).build_report(period).await.unwrap();

    assert_eq!(report.created, 3);
    assert_eq!(report.completed, 1);
    assert!(report.status_breakdown.is_none());
    assert!(report.team_performance.is_none());

    let types = report.project_types.expect("monthly project types");
    assert_eq!(types[0].name, "Cloud Service");
    assert_eq!(types[0].count, 2);
    assert!(types[0].avg_days >= 1.0);
    assert_eq!(types[1].name, "Security");

    let departments = report.departments.expect("monthly departments");
    let sales = departments.iter().find(|d| d.name == "Sales").unwrap();
    assert_eq!(sales.requests, 2);
    assert!(sales.avg_response.ends_with(" days"));
}

#[tokio::test]
async fn test_overdue_count_is_global_and_live() {
    let pool = setup_pool().await;
    let service = request_service(&pool);

    // Far past its target and still open; created long before the period
    let new = NewRequest {
        customer_name: Some("Ancient".to_string()),
        description: Some("work".to_string()),
        date_request_received: Some(date(2024, 1, 1)),
        target_days: Some(5),
        team_member_involved: Some("Ada".to_string()),
        ..Default::default()
    };
    let id = service.create(new).await.unwrap();
    backdate_created(&pool, id, date(2024, 1, 1)).await;

    let report = report_service(&pool)
        .build_report(ReportPeriod::Daily(date(2025, 3, 5)))
        .await
        .unwrap();

    // Not created, not closed in the period, yet globally overdue and in
    // the working set
    assert_eq!(report.created, 0);
    assert_eq!(report.overdue, 1);
    assert_eq!(report.requests.len(), 1);
    assert!(report.requests[0].is_overdue());
}

#[tokio::test]
async fn test_activities_appear_newest_first() {
    let pool = setup_pool().await;
    let service = request_service(&pool);
    let today = Local::now().date_naive();

    let users = UserRepository::new(pool.clone());
    let hash = hash_password("pw").unwrap();
    let user_id = users
        .create("jane", &hash, "Jane Doe", None, None, Role::User, Utc::now())
        .await
        .unwrap();
    let actor = Actor {
        id: user_id,
        name: "Jane Doe".to_string(),
    };

    let new = NewRequest {
        customer_name: Some("Acme".to_string()),
        description: Some("work".to_string()),
        date_request_received: Some(today),
        team_member_involved: Some("Ada".to_string()),
        ..Default::default()
    };
    let id = service.create(new).await.unwrap();

    let first = RequestPatch {
        status: Some(RequestStatus::PendingReview),
        ..Default::default()
    };
    service.update(id, first, Some(actor.clone())).await.unwrap();
    let second = RequestPatch {
        status: Some(RequestStatus::PendingApproval),
        ..Default::default()
    };
    service.update(id, second, Some(actor)).await.unwrap();

    let report = report_service(&pool)
        .build_report(ReportPeriod::Daily(today))
        .await
        .unwrap();

    assert_eq!(report.activities.len(), 2);
    assert!(report.activities[0].entry.timestamp >= report.activities[1].entry.timestamp);
    assert_eq!(report.activities[0].customer_name, "Acme");
    assert!(report.activities[0]
        .entry
        .action
        .contains("Pending approval"));
}
