use std::sync::Arc;

use actix_identity::Identity;
use actix_web::{web, HttpMessage, HttpRequest, HttpResponse};

use crate::core::error::AppError;
use crate::modules::users::models::{LoginRequest, User};
use crate::modules::users::services::AuthService;

/// Resolve the logged-in account, or fail with 401.
///
/// Shared by every handler that needs an authenticated caller.
pub async fn require_user(
    identity: Option<Identity>,
    auth: &AuthService,
) -> Result<User, AppError> {
    let identity = identity.ok_or_else(|| AppError::unauthorized("Login required"))?;
    let id = identity
        .id()
        .map_err(|_| AppError::unauthorized("Invalid session"))?
        .parse::<i64>()
        .map_err(|_| AppError::unauthorized("Invalid session"))?;

    auth.user_by_id(id).await
}

/// Log in with username and password
/// POST /api/auth/login
pub async fn login(
    req: HttpRequest,
    auth: web::Data<Arc<AuthService>>,
    payload: web::Json<LoginRequest>,
) -> Result<HttpResponse, AppError> {
    let user = auth.login(&payload.username, &payload.password).await?;

    Identity::login(&req.extensions(), user.id.to_string())
        .map_err(|e| AppError::internal(format!("Failed to establish session: {}", e)))?;

    tracing::info!(user_id = user.id, username = %user.username, "User logged in");
    Ok(HttpResponse::Ok().json(user))
}

/// Clear the session
/// POST /api/auth/logout
pub async fn logout(identity: Option<Identity>) -> Result<HttpResponse, AppError> {
    if let Some(identity) = identity {
        identity.logout();
    }

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": "You have been logged out"
    })))
}

/// List all users for team-member selection
/// GET /api/users
pub async fn list_users(
    identity: Option<Identity>,
    auth: web::Data<Arc<AuthService>>,
) -> Result<HttpResponse, AppError> {
    require_user(identity, &auth).await?;

    let users = auth.list_users().await?;
    Ok(HttpResponse::Ok().json(users))
}

/// Configure auth and user routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/auth")
            .route("/login", web::post().to(login))
            .route("/logout", web::post().to(logout)),
    )
    .route("/users", web::get().to(list_users));
}
