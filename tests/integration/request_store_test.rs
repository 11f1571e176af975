// Request store lifecycle against an in-memory SQLite database.

use chrono::{Local, NaiveDate};
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::SqlitePool;

use servicedesk::core::AppError;
use servicedesk::modules::requests::models::{NewRequest, RequestPatch, RequestStatus, ServiceType};
use servicedesk::modules::requests::repositories::{LogRepository, RequestFilter, RequestRepository};
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

fn service(pool: &SqlitePool) -> RequestService {
    RequestService::new(
        RequestRepository::new(pool.clone()),
        LogRepository::new(pool.clone()),
    )
}

fn new_request(customer: &str, received: NaiveDate) -> NewRequest {
    NewRequest {
        customer_name: Some(customer.to_string()),
        description: Some("Connectivity for the new branch".to_string()),
        service_type: ServiceType::InternetService,
        date_request_received: Some(received),
        team_member_involved: Some("Ada".to_string()),
        ..Default::default()
    }
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

async fn seed_actor(pool: &SqlitePool) -> Actor {
    let users = UserRepository::new(pool.clone());
    let hash = hash_password("pw").unwrap();
    let id = users
        .create(
            "jane",
            &hash,
            "Jane Doe",
            None,
            None,
            Role::User,
            chrono::Utc::now(),
        )
        .await
        .unwrap();
    Actor {
        id,
        name: "Jane Doe".to_string(),
    }
}

#[tokio::test]
async fn test_create_assigns_code_and_initial_state() {
    let pool = setup_pool().await;
    let service = service(&pool);
    let today = Local::now().date_naive();

    let id = service
        .create(new_request("Acme", today))
        .await
        .expect("create");
    assert!(id > 0);

    let all = service.get_all(RequestFilter::default()).await.unwrap();
    assert_eq!(all.len(), 1);

    let request = &all[0];
    assert_eq!(request.status, RequestStatus::InProgress);
    assert!(request.custom_id.starts_with("GBB_SDA_"));
    assert!(request.custom_id.ends_with("_IS_001"));
    // Created and read back the same day
    assert_eq!(request.duration_days, 1);
}

#[tokio::test]
async fn test_create_rejects_missing_required_fields() {
    let pool = setup_pool().await;
    let service = service(&pool);

    let err = service.create(NewRequest::default()).await.unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));
    assert!(err.to_string().contains("customer_name"));
}

#[tokio::test]
async fn test_sequential_creates_get_increasing_codes() {
    let pool = setup_pool().await;
    let service = service(&pool);
    let today = Local::now().date_naive();

    for _ in 0..3 {
        service
            .create(new_request("Acme", today))
            .await
            .expect("create");
    }

    let mut codes: Vec<String> = service
        .get_all(RequestFilter::default())
        .await
        .unwrap()
        .into_iter()
        .map(|r| r.custom_id)
        .collect();
    codes.sort();

    assert_eq!(codes.len(), 3);
    assert!(codes[0].ends_with("_001"));
    assert!(codes[1].ends_with("_002"));
    assert!(codes[2].ends_with("_003"));
}

#[tokio::test]
async fn test_closing_without_date_stamps_today() {
    let pool = setup_pool().await;
    let service = service(&pool);
    let today = Local::now().date_naive();

    let id = service.create(new_request("Acme", today)).await.unwrap();

    let patch = RequestPatch {
        status: Some(RequestStatus::Closed),
        ..Default::default()
    };
    service.update(id, patch, None).await.unwrap();

    let all = service.get_all(RequestFilter::default()).await.unwrap();
    let request = &all[0];
    assert_eq!(request.status, RequestStatus::Closed);
    assert_eq!(request.sent_out_date, Some(today));
    assert_eq!(request.duration_days, 1);
}

#[tokio::test]
async fn test_closing_freezes_duration_at_close_date() {
    let pool = setup_pool().await;
    let service = service(&pool);

    // Received Mon 2024-01-01; closing Wed 2024-01-03 spans 3 working days,
    // far less than the live duration would be today
    let id = service
        .create(new_request("Acme", date(2024, 1, 1)))
        .await
        .unwrap();

    let patch = RequestPatch {
        status: Some(RequestStatus::Closed),
        sent_out_date: Some(date(2024, 1, 3)),
        ..Default::default()
    };
    service.update(id, patch, None).await.unwrap();

    let all = service.get_all(RequestFilter::default()).await.unwrap();
    assert_eq!(all[0].duration_days, 3);

    // Reading again does not drift: the value stays frozen
    let again = service.get_all(RequestFilter::default()).await.unwrap();
    assert_eq!(again[0].duration_days, 3);
}

#[tokio::test]
async fn test_reclosing_does_not_overwrite_close_date() {
    let pool = setup_pool().await;
    let service = service(&pool);

    let id = service
        .create(new_request("Acme", date(2024, 1, 1)))
        .await
        .unwrap();
    let close = RequestPatch {
        status: Some(RequestStatus::Closed),
        sent_out_date: Some(date(2024, 1, 3)),
        ..Default::default()
    };
    service.update(id, close, None).await.unwrap();

    // A later update that re-sends the closed status without a date
    let patch = RequestPatch {
        status: Some(RequestStatus::Closed),
        comment: Some("final".to_string()),
        ..Default::default()
    };
    service.update(id, patch, None).await.unwrap();

    let all = service.get_all(RequestFilter::default()).await.unwrap();
    assert_eq!(all[0].sent_out_date, Some(date(2024, 1, 3)));
}

#[tokio::test]
async fn test_update_unknown_id_is_not_found() {
    let pool = setup_pool().await;
    let service = service(&pool);

    let err = service
        .update(999, RequestPatch::default(), None)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));
}

#[tokio::test]
async fn test_update_with_actor_logs_each_changed_field() {
    let pool = setup_pool().await;
    let service = service(&pool);
    let actor = seed_actor(&pool).await;
    let today = Local::now().date_naive();

    let id = service.create(new_request("Acme", today)).await.unwrap();

    let patch = RequestPatch {
        status: Some(RequestStatus::PendingReview),
        customer_name: Some("Acme Ltd".to_string()),
        target_days: Some(7),
        // Same value as before: must not be logged
        team_member_involved: Some("Ada".to_string()),
        ..Default::default()
    };
    service.update(id, patch, Some(actor)).await.unwrap();

    let logs = service.get_logs(id).await.unwrap();
    assert_eq!(logs.len(), 3);
    assert!(logs.iter().all(|l| l.user_name == "Jane Doe"));

    let actions: Vec<&str> = logs.iter().map(|l| l.action.as_str()).collect();
    assert!(actions.contains(&"Changed Status from 'in_progress' to 'Pending review'"));
    assert!(actions.contains(&"Changed Customer Name from 'Acme' to 'Acme Ltd'"));
    assert!(actions.contains(&"Changed Target Days from '' to '7'"));
}

#[tokio::test]
async fn test_update_without_actor_logs_nothing() {
    let pool = setup_pool().await;
    let service = service(&pool);
    let today = Local::now().date_naive();

    let id = service.create(new_request("Acme", today)).await.unwrap();
    let patch = RequestPatch {
        status: Some(RequestStatus::PendingApproval),
        ..Default::default()
    };
    service.update(id, patch, None).await.unwrap();

    assert!(service.get_logs(id).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_delete_leaves_log_entries_orphaned() {
    let pool = setup_pool().await;
    let service = service(&pool);
    let actor = seed_actor(&pool).await;
    let today = Local::now().date_naive();

    let id = service.create(new_request("Acme", today)).await.unwrap();
    let patch = RequestPatch {
        status: Some(RequestStatus::PendingReview),
        ..Default::default()
    };
    service.update(id, patch, Some(actor)).await.unwrap();

    service.delete(id).await.unwrap();
    assert!(service.get_all(RequestFilter::default()).await.unwrap().is_empty());

    // History survives the delete
    assert_eq!(service.get_logs(id).await.unwrap().len(), 1);

    let err = service.delete(id).await.unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));
}

#[tokio::test]
async fn test_date_filters_are_inclusive() {
    let pool = setup_pool().await;
    let service = service(&pool);

    service
        .create(new_request("Early", date(2024, 1, 1)))
        .await
        .unwrap();
    service
        .create(new_request("Mid", date(2024, 1, 10)))
        .await
        .unwrap();
    service
        .create(new_request("Late", date(2024, 1, 20)))
        .await
        .unwrap();

    let filter = RequestFilter {
        date_from: Some(date(2024, 1, 10)),
        date_to: Some(date(2024, 1, 20)),
        overdue_only: false,
    };
    let hits = service.get_all(filter).await.unwrap();
    let names: Vec<&str> = hits.iter().map(|r| r.customer_name.as_str()).collect();
    assert_eq!(hits.len(), 2);
    assert!(names.contains(&"Mid"));
    assert!(names.contains(&"Late"));
}

#[tokio::test]
async fn test_overdue_filter_and_stats() {
    let pool = setup_pool().await;
    let service = service(&pool);
    let today = Local::now().date_naive();

    // Open and far past its 5-day target
    let mut overdue_open = new_request("Overdue Open", date(2024, 1, 1));
    overdue_open.target_days = Some(5);
    service.create(overdue_open).await.unwrap();

    // Closed after 3 working days against a 2-day target: overdue but closed
    let mut overdue_closed = new_request("Overdue Closed", date(2024, 1, 1));
    overdue_closed.target_days = Some(2);
    let id = service.create(overdue_closed).await.unwrap();
    let patch = RequestPatch {
        status: Some(RequestStatus::Closed),
        sent_out_date: Some(date(2024, 1, 3)),
        ..Default::default()
    };
    service.update(id, patch, None).await.unwrap();

    // Closed comfortably inside its target
    let mut on_time = new_request("On Time", date(2024, 1, 1));
    on_time.target_days = Some(10);
    let id = service.create(on_time).await.unwrap();
    let patch = RequestPatch {
        status: Some(RequestStatus::Closed),
        sent_out_date: Some(date(2024, 1, 3)),
        ..Default::default()
    };
    service.update(id, patch, None).await.unwrap();

    // Open with no target at all
    service
        .create(new_request("No Target", today))
        .await
        .unwrap();

    let filter = RequestFilter {
        overdue_only: true,
        ..Default::default()
    };
    let overdue = service.get_all(filter).await.unwrap();
    assert_eq!(overdue.len(), 1);
    assert_eq!(overdue[0].customer_name, "Overdue Open");

    let stats = service.get_stats().await.unwrap();
    assert_eq!(stats.total, 4);
    assert_eq!(stats.in_progress, 2);
    assert_eq!(stats.closed, 2);
    assert_eq!(stats.pending, 0);
    // The closed-but-late request still counts as overdue
    assert_eq!(stats.overdue, 2);
    // Both closures carry dates far outside the trailing week
    assert_eq!(stats.closed_week, 0);
}

#[tokio::test]
async fn test_closing_today_counts_toward_weekly_closures() {
    let pool = setup_pool().await;
    let service = service(&pool);
    let today = Local::now().date_naive();

    let id = service.create(new_request("Acme", today)).await.unwrap();
    let patch = RequestPatch {
        status: Some(RequestStatus::Closed),
        ..Default::default()
    };
    service.update(id, patch, None).await.unwrap();

    let stats = service.get_stats().await.unwrap();
    assert_eq!(stats.closed_week, 1);
}
