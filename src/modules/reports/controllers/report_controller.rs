use std::sync::Arc;

use actix_identity::Identity;
use actix_web::{web, HttpResponse};
use chrono::{Datelike, Local, NaiveDate};
use serde::Deserialize;

use crate::core::error::AppError;
use crate::modules::reports::exporters::{ExcelExporter, ExportFormat, PdfExporter};
use crate::modules::reports::models::ReportPeriod;
use crate::modules::reports::services::ReportService;
use crate::modules::users::controllers::require_user;
use crate::modules::users::services::AuthService;

#[derive(Debug, Deserialize)]
pub struct DailyQuery {
    pub date: Option<NaiveDate>,
}

#[derive(Debug, Deserialize)]
pub struct WeeklyQuery {
    /// `YYYY-Www`, e.g. `2025-W09`
    pub week: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct MonthlyQuery {
    /// `YYYY-MM`, e.g. `2025-03`
    pub month: Option<String>,
}

fn daily_period(query: &DailyQuery) -> ReportPeriod {
    ReportPeriod::Daily(query.date.unwrap_or_else(|| Local::now().date_naive()))
}

fn weekly_period(query: &WeeklyQuery) -> Result<ReportPeriod, AppError> {
    match &query.week {
        None => {
            let week = Local::now().date_naive().iso_week();
            Ok(ReportPeriod::Weekly {
                year: week.year(),
                week: week.week(),
            })
        }
        Some(raw) => {
            let (year, week) = raw
                .split_once("-W")
                .ok_or_else(|| AppError::validation(format!("Invalid week format: {}", raw)))?;
            Ok(ReportPeriod::Weekly {
                year: year
                    .parse()
                    .map_err(|_| AppError::validation(format!("Invalid week format: {}", raw)))?,
                week: week
                    .parse()
                    .map_err(|_| AppError::validation(format!("Invalid week format: {}", raw)))?,
            })
        }
    }
}

fn monthly_period(query: &MonthlyQuery) -> Result<ReportPeriod, AppError> {
    match &query.month {
        None => {
            let today = Local::now().date_naive();
            Ok(ReportPeriod::Monthly {
                year: today.year(),
                month: today.month(),
            })
        }
        Some(raw) => {
            let (year, month) = raw
                .split_once('-')
                .ok_or_else(|| AppError::validation(format!("Invalid month format: {}", raw)))?;
            Ok(ReportPeriod::Monthly {
                year: year
                    .parse()
                    .map_err(|_| AppError::validation(format!("Invalid month format: {}", raw)))?,
                month: month
                    .parse()
                    .map_err(|_| AppError::validation(format!("Invalid month format: {}", raw)))?,
            })
        }
    }
}

/// Daily report data
/// GET /api/reports/daily
pub async fn get_daily_report(
    service: web::Data<Arc<ReportService>>,
    auth: web::Data<Arc<AuthService>>,
    identity: Option<Identity>,
    query: web::Query<DailyQuery>,
) -> Result<HttpResponse, AppError> {
    require_user(identity, &auth).await?;

    let data = service.build_report(daily_period(&query)).await?;
    Ok(HttpResponse::Ok().json(data))
}

/// Weekly report data
/// GET /api/reports/weekly
pub async fn get_weekly_report(
    service: web::Data<Arc<ReportService>>,
    auth: web::Data<Arc<AuthService>>,
    identity: Option<Identity>,
    query: web::Query<WeeklyQuery>,
) -> Result<HttpResponse, AppError> {
    require_user(identity, &auth).await?;

    let data = service.build_report(weekly_period(&query)?).await?;
    Ok(HttpResponse::Ok().json(data))
}

/// Monthly report data
/// GET /api/reports/monthly
pub async fn get_monthly_report(
    service: web::Data<Arc<ReportService>>,
    auth: web::Data<Arc<AuthService>>,
    identity: Option<Identity>,
    query: web::Query<MonthlyQuery>,
) -> Result<HttpResponse, AppError> {
    require_user(identity, &auth).await?;

    let data = service.build_report(monthly_period(&query)?).await?;
    Ok(HttpResponse::Ok().json(data))
}

/// Shared export path: build the report, pick the renderer, attach the file
async fn export(
    service: &ReportService,
    pdf: &PdfExporter,
    excel: &ExcelExporter,
    period: ReportPeriod,
    format_raw: &str,
) -> Result<HttpResponse, AppError> {
    let format = ExportFormat::parse(format_raw)?;
    let data = service.build_report(period).await?;

    let bytes = match format {
        ExportFormat::Pdf => pdf.render(&data, &period)?,
        ExportFormat::Excel => excel.render(&data, &period)?,
    };

    let filename = format!("{}.{}", period.file_stem(), format.extension());
    Ok(HttpResponse::Ok()
        .content_type(format.content_type())
        .insert_header((
            "Content-Disposition",
            format!("attachment; filename=\"{}\"", filename),
        ))
        .body(bytes))
}

/// Export the daily report
/// GET /api/reports/daily/export/{format}
pub async fn export_daily_report(
    service: web::Data<Arc<ReportService>>,
    pdf: web::Data<Arc<PdfExporter>>,
    excel: web::Data<Arc<ExcelExporter>>,
    auth: web::Data<Arc<AuthService>>,
    identity: Option<Identity>,
    path: web::Path<String>,
    query: web::Query<DailyQuery>,
) -> Result<HttpResponse, AppError> {
    require_user(identity, &auth).await?;
    export(&service, &pdf, &excel, daily_period(&query), &path).await
}

/// Export the weekly report
/// GET /api/reports/weekly/export/{format}
pub async fn export_weekly_report(
    service: web::Data<Arc<ReportService>>,
    pdf: web::Data<Arc<PdfExporter>>,
    excel: web::Data<Arc<ExcelExporter>>,
    auth: web::Data<Arc<AuthService>>,
    identity: Option<Identity>,
    path: web::Path<String>,
    query: web::Query<WeeklyQuery>,
) -> Result<HttpResponse, AppError> {
    require_user(identity, &auth).await?;
    export(&service, &pdf, &excel, weekly_period(&query)?, &path).await
}

/// Export the monthly report
/// GET /api/reports/monthly/export/{format}
pub async fn export_monthly_report(
    service: web::Data<Arc<ReportService>>,
    pdf: web::Data<Arc<PdfExporter>>,
    excel: web::Data<Arc<ExcelExporter>>,
    auth: web::Data<Arc<AuthService>>,
    identity: Option<Identity>,
    path: web::Path<String>,
    query: web::Query<MonthlyQuery>,
) -> Result<HttpResponse, AppError> {
    require_user(identity, &auth).await?;
    export(&service, &pdf, &excel, monthly_period(&query)?, &path).await
}

/// Configure report routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/reports")
            .route("/daily", web::get().to(get_daily_report))
            .route("/daily/export/{format}", web::get().to(export_daily_report))
            .route("/weekly", web::get().to(get_weekly_report))
            .route(
                "/weekly/export/{format}",
                web::get().to(export_weekly_report),
            )
            .route("/monthly", web::get().to(get_monthly_report))
            .route(
                "/monthly/export/{format}",
                web::get().to(export_monthly_report),
            ),
    );
}
