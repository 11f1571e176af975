// Both renderers against the same ReportData: artifacts are produced and
// the shared color/overdue policy holds.

use chrono::{NaiveDate, Utc};
use servicedesk::modules::reports::exporters::{ExcelExporter, ExportFormat, PdfExporter};
use servicedesk::modules::reports::models::colors;
use servicedesk::modules::reports::models::{ReportData, ReportPeriod};
use servicedesk::modules::requests::models::{RequestStatus, ServiceRequest, ServiceType};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn request(
    id: i64,
    customer: &str,
    status: RequestStatus,
    target: Option<i64>,
    duration: i64,
) -> ServiceRequest {
    ServiceRequest {
        id,
        custom_id: format!("GBB_SDA_0325_IS_{:03}", id),
        customer_name: customer.to_string(),
        description: "Link upgrade for the regional office".to_string(),
        project_type: String::new(),
        service_type: ServiceType::InternetService,
        status,
        boq_cost: Some(rust_decimal::Decimal::new(1_250_000_50, 2)),
        requester_name: Some("Bisi".to_string()),
        department: Some("Sales".to_string()),
        date_request_received: date(2025, 3, 3),
        target_days: target,
        sent_out_date: None,
        duration_days: duration,
        team_member_involved: "Ada".to_string(),
        comment: Some("awaiting survey".to_string()),
        created_date: Utc::now(),
        updated_date: Utc::now(),
    }
}

fn sample_report() -> ReportData {
    ReportData {
        created: 2,
        completed: 1,
        in_progress: 3,
        overdue: 2,
        status_breakdown: None,
        team_performance: None,
        project_types: None,
        departments: None,
        activities: vec![],
        requests: vec![
            request(1, "Closed Fine", RequestStatus::Closed, Some(10), 3),
            request(2, "Closed Late", RequestStatus::Closed, Some(2), 5),
            request(3, "Waiting", RequestStatus::PendingApproval, None, 4),
            request(4, "Running Over", RequestStatus::InProgress, Some(3), 9),
            request(5, "Running", RequestStatus::InProgress, Some(30), 2),
        ],
    }
}

#[test]
fn test_pdf_artifact_is_produced() {
    let exporter = PdfExporter::new("GBB Solution Design Team");
    let bytes = exporter
        .render(&sample_report(), &ReportPeriod::Daily(date(2025, 3, 5)))
        .unwrap();

    assert!(bytes.starts_with(b"%PDF"));
    assert!(bytes.len() > 1000);
}

#[test]
fn test_excel_artifact_is_produced() {
    let exporter = ExcelExporter::new("GBB Solution Design Team");
    let bytes = exporter
        .render(&sample_report(), &ReportPeriod::Daily(date(2025, 3, 5)))
        .unwrap();

    // XLSX is a zip container
    assert!(bytes.starts_with(b"PK"));
    assert!(bytes.len() > 1000);
}

#[test]
fn test_renderers_accept_an_empty_working_set() {
    let mut data = sample_report();
    data.requests.clear();

    let pdf = PdfExporter::new("GBB Solution Design Team")
        .render(&data, &ReportPeriod::Monthly { year: 2025, month: 3 })
        .unwrap();
    let excel = ExcelExporter::new("GBB Solution Design Team")
        .render(&data, &ReportPeriod::Monthly { year: 2025, month: 3 })
        .unwrap();

    assert!(pdf.starts_with(b"%PDF"));
    assert!(excel.starts_with(b"PK"));
}

#[test]
fn test_renderers_share_one_overdue_subset() {
    // Both renderers key their highlight off the same model predicate, so
    // the flagged subset is identical by construction; pin down what that
    // subset is for the sample data.
    let data = sample_report();
    let flagged: Vec<&str> = data
        .requests
        .iter()
        .filter(|r| r.is_overdue())
        .map(|r| r.customer_name.as_str())
        .collect();

    // The closed-but-late request is flagged alongside the running one
    assert_eq!(flagged, vec!["Closed Late", "Running Over"]);
}

#[test]
fn test_renderers_share_one_status_palette() {
    let data = sample_report();
    for request in &data.requests {
        let color = colors::status_color(&request.status);
        // Hex (spreadsheet) and packed (document math) views agree
        assert_eq!(format!("{:06X}", color.packed()), color.hex());
    }
}

#[test]
fn test_working_set_breakdown_counts_by_status() {
    let data = sample_report();
    let breakdown = data.working_set_breakdown();

    assert_eq!(breakdown[0], ("In Progress", 2));
    assert_eq!(breakdown[1], ("Pending with Presales", 0));
    assert_eq!(breakdown[2], ("Pending Review", 0));
    assert_eq!(breakdown[3], ("Pending Approval", 1));
    assert_eq!(breakdown[4], ("Closed Requests", 2));
}

#[test]
fn test_format_selector() {
    assert_eq!(ExportFormat::parse("EXCEL").unwrap().extension(), "xlsx");
    assert_eq!(ExportFormat::parse("pdf").unwrap().content_type(), "application/pdf");
    assert!(ExportFormat::parse("docx").is_err());
}
