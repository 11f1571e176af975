use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Account role; admins may manage users, everyone else just works requests
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    User,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::User => "user",
        }
    }
}

impl Default for Role {
    fn default() -> Self {
        Role::User
    }
}

impl std::str::FromStr for Role {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(match s {
            "admin" => Role::Admin,
            _ => Role::User,
        })
    }
}

/// A named team member able to log in and act on requests
#[derive(Debug, Clone, Serialize)]
pub struct User {
    pub id: i64,
    pub username: String,
    /// Argon2 hash; never serialized
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub full_name: String,
    pub email: Option<String>,
    pub department: Option<String>,
    pub role: Role,
    pub created_date: DateTime<Utc>,
}

/// Login payload
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}
