use crate::core::{AppError, Result};
use serde::Deserialize;
use std::env;

pub mod database;
pub mod server;

pub use database::DatabaseConfig;
pub use server::ServerConfig;

/// Main application configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub app: AppConfig,
    pub database: DatabaseConfig,
    pub server: ServerConfig,
    pub security: SecurityConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub env: String,
    pub log_level: String,
    /// Organization name printed in report headers
    pub organization: String,
}

#[derive(Debug, Clone)]
pub struct SecurityConfig {
    /// Key material for the session cookie; at least 32 bytes
    pub session_secret: String,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        // Load .env file if present
        dotenvy::dotenv().ok();

        let config = Config {
            app: AppConfig {
                env: env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
                log_level: env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
                organization: env::var("ORGANIZATION_NAME")
                    .unwrap_or_else(|_| "GBB Solution Design Team".to_string()),
            },
            database: DatabaseConfig::from_env()?,
            server: ServerConfig::from_env()?,
            security: SecurityConfig {
                session_secret: env::var("SECRET_KEY").unwrap_or_else(|_| {
                    "dev-only-session-secret-change-this-in-production-0123456789".to_string()
                }),
            },
        };

        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.security.session_secret.len() < 32 {
            return Err(AppError::Configuration(
                "SECRET_KEY must be at least 32 bytes".to_string(),
            ));
        }

        if self.app.organization.trim().is_empty() {
            return Err(AppError::Configuration(
                "ORGANIZATION_NAME must not be empty".to_string(),
            ));
        }

        Ok(())
    }
}
