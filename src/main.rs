use std::sync::Arc;

use actix_cors::Cors;
use actix_identity::IdentityMiddleware;
use actix_session::{storage::CookieSessionStore, SessionMiddleware};
use actix_web::{cookie::Key, web, App, HttpServer};
use tracing_actix_web::TracingLogger;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use servicedesk::config::Config;
use servicedesk::middleware::RequestId;
use servicedesk::modules::health::controllers::health_controller;
use servicedesk::modules::reports::controllers::report_controller;
use servicedesk::modules::reports::{ExcelExporter, PdfExporter, ReportRepository, ReportService};
use servicedesk::modules::requests::controllers::request_controller;
use servicedesk::modules::requests::{LogRepository, RequestRepository, RequestService};
use servicedesk::modules::users::controllers::auth_controller;
use servicedesk::modules::users::{AuthService, UserRepository};

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "servicedesk=debug,actix_web=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = Config::from_env()?;
    config.validate()?;

    tracing::info!("Starting ServiceDesk request tracker");
    tracing::info!("Environment: {}", config.app.env);

    // Create database connection pool and apply migrations
    let db_pool = config.database.create_pool().await?;
    sqlx::migrate!().run(&db_pool).await?;
    tracing::info!("Database ready at {}", config.database.url);

    // Repositories and services
    let request_repo = RequestRepository::new(db_pool.clone());
    let log_repo = LogRepository::new(db_pool.clone());
    let user_repo = UserRepository::new(db_pool.clone());
    let report_repo = ReportRepository::new(db_pool.clone());

    let auth_service = Arc::new(AuthService::new(user_repo));
    auth_service.ensure_default_admin().await?;

    let request_service = Arc::new(RequestService::new(request_repo.clone(), log_repo.clone()));
    let report_service = Arc::new(ReportService::new(report_repo, request_repo, log_repo));
    let pdf_exporter = Arc::new(PdfExporter::new(config.app.organization.clone()));
    let excel_exporter = Arc::new(ExcelExporter::new(config.app.organization.clone()));

    let session_key = Key::derive_from(config.security.session_secret.as_bytes());
    let secure_cookies = config.app.env == "production";
    let bind_address = config.server.bind_address();

    let server = HttpServer::new(move || {
        App::new()
            .app_data(web::Data::new(db_pool.clone()))
            .app_data(web::Data::new(auth_service.clone()))
            .app_data(web::Data::new(request_service.clone()))
            .app_data(web::Data::new(report_service.clone()))
            .app_data(web::Data::new(pdf_exporter.clone()))
            .app_data(web::Data::new(excel_exporter.clone()))
            .wrap(TracingLogger::default())
            .wrap(RequestId)
            .wrap(IdentityMiddleware::default())
            .wrap(
                SessionMiddleware::builder(
                    CookieSessionStore::default(),
                    session_key.clone(),
                )
                .cookie_secure(secure_cookies)
                .build(),
            )
            .wrap(Cors::permissive())
            .configure(health_controller::configure)
            .service(
                web::scope("/api")
                    .configure(auth_controller::configure)
                    .configure(request_controller::configure)
                    .configure(report_controller::configure),
            )
    })
    .bind(&bind_address)?
    .run();

    tracing::info!("Server started at http://{}", bind_address);

    server.await?;
    Ok(())
}
