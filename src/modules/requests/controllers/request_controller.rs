use std::sync::Arc;

use actix_identity::Identity;
use actix_web::{web, HttpResponse};
use chrono::NaiveDate;
use serde::Deserialize;

use crate::core::error::AppError;
use crate::modules::requests::models::{NewRequest, RequestPatch, ServiceType};
use crate::modules::requests::repositories::RequestFilter;
use crate::modules::requests::services::{Actor, RequestService};
use crate::modules::users::controllers::require_user;
use crate::modules::users::services::AuthService;

/// Query parameters for listing requests
#[derive(Debug, Deserialize)]
pub struct ListRequestsQuery {
    pub date_from: Option<NaiveDate>,
    pub date_to: Option<NaiveDate>,
    #[serde(default)]
    pub overdue_only: bool,
}

/// List requests with optional filters
/// GET /api/requests
pub async fn get_requests(
    service: web::Data<Arc<RequestService>>,
    query: web::Query<ListRequestsQuery>,
) -> Result<HttpResponse, AppError> {
    let filter = RequestFilter {
        date_from: query.date_from,
        date_to: query.date_to,
        overdue_only: query.overdue_only,
    };

    let requests = service.get_all(filter).await?;
    Ok(HttpResponse::Ok().json(requests))
}

/// Create a new request
/// POST /api/requests
pub async fn create_request(
    service: web::Data<Arc<RequestService>>,
    auth: web::Data<Arc<AuthService>>,
    identity: Option<Identity>,
    payload: web::Json<NewRequest>,
) -> Result<HttpResponse, AppError> {
    require_user(identity, &auth).await?;

    let id = service.create(payload.into_inner()).await?;
    Ok(HttpResponse::Ok().json(serde_json::json!({
        "id": id,
        "message": "Request created successfully"
    })))
}

/// Apply a partial update, logging field changes under the session user
/// PUT /api/requests/{id}
pub async fn update_request(
    service: web::Data<Arc<RequestService>>,
    auth: web::Data<Arc<AuthService>>,
    identity: Option<Identity>,
    path: web::Path<i64>,
    payload: web::Json<RequestPatch>,
) -> Result<HttpResponse, AppError> {
    let user = require_user(identity, &auth).await?;
    let actor = Actor {
        id: user.id,
        name: user.full_name,
    };

    service
        .update(path.into_inner(), payload.into_inner(), Some(actor))
        .await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": "Request updated successfully"
    })))
}

/// Hard delete a request
/// DELETE /api/requests/{id}
pub async fn delete_request(
    service: web::Data<Arc<RequestService>>,
    auth: web::Data<Arc<AuthService>>,
    identity: Option<Identity>,
    path: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
    require_user(identity, &auth).await?;

    service.delete(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": "Request deleted successfully"
    })))
}

/// Change history of one request, newest first
/// GET /api/requests/{id}/logs
pub async fn get_request_logs(
    service: web::Data<Arc<RequestService>>,
    auth: web::Data<Arc<AuthService>>,
    identity: Option<Identity>,
    path: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
    require_user(identity, &auth).await?;

    let logs = service.get_logs(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(logs))
}

/// The service catalogue for request forms
/// GET /api/service-types
pub async fn get_service_types(
    auth: web::Data<Arc<AuthService>>,
    identity: Option<Identity>,
) -> Result<HttpResponse, AppError> {
    require_user(identity, &auth).await?;

    let catalogue = ServiceType::catalogue();
    let labels: Vec<&str> = catalogue.iter().map(|t| t.label()).collect();
    Ok(HttpResponse::Ok().json(labels))
}

/// Dashboard statistics
/// GET /api/dashboard/stats
pub async fn get_dashboard_stats(
    service: web::Data<Arc<RequestService>>,
    auth: web::Data<Arc<AuthService>>,
    identity: Option<Identity>,
) -> Result<HttpResponse, AppError> {
    require_user(identity, &auth).await?;

    let stats = service.get_stats().await?;
    Ok(HttpResponse::Ok().json(stats))
}

/// Configure request routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/requests")
            .route("", web::get().to(get_requests))
            .route("", web::post().to(create_request))
            .route("/{id}", web::put().to(update_request))
            .route("/{id}", web::delete().to(delete_request))
            .route("/{id}/logs", web::get().to(get_request_logs)),
    )
    .route("/service-types", web::get().to(get_service_types))
    .route("/dashboard/stats", web::get().to(get_dashboard_stats));
}
