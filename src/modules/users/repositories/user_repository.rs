use chrono::{DateTime, Utc};
use sqlx::SqlitePool;

use crate::core::Result;
use crate::modules::users::models::{Role, User};

const USER_COLUMNS: &str =
    "id, username, password_hash, full_name, email, department, role, created_date";

/// Repository for user accounts
#[derive(Clone)]
pub struct UserRepository {
    pool: SqlitePool,
}

impl UserRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn create(
        &self,
        username: &str,
        password_hash: &str,
        full_name: &str,
        email: Option<&str>,
        department: Option<&str>,
        role: Role,
        now: DateTime<Utc>,
    ) -> Result<i64> {
        let result = sqlx::query(
            r#"
            INSERT INTO users (username, password_hash, full_name, email, department, role, created_date)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(username)
        .bind(password_hash)
        .bind(full_name)
        .bind(email)
        .bind(department)
        .bind(role.as_str())
        .bind(now)
        .execute(&self.pool)
        .await?;

        Ok(result.last_insert_rowid())
    }

    pub async fn find_by_username(&self, username: &str) -> Result<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE username = ?"
        ))
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(UserRow::into_user))
    }

    pub async fn find_by_id(&self, id: i64) -> Result<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = ?"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(UserRow::into_user))
    }

    /// All users, ordered for team-member selection menus
    pub async fn list_all(&self) -> Result<Vec<User>> {
        let rows = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users ORDER BY full_name"
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(UserRow::into_user).collect())
    }

    pub async fn count(&self) -> Result<i64> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}

#[derive(Debug, sqlx::FromRow)]
struct UserRow {
    id: i64,
    username: String,
    password_hash: String,
    full_name: String,
    email: Option<String>,
    department: Option<String>,
    role: String,
    created_date: DateTime<Utc>,
}

impl UserRow {
    fn into_user(self) -> User {
        User {
            id: self.id,
            username: self.username,
            password_hash: self.password_hash,
            full_name: self.full_name,
            email: self.email,
            department: self.department,
            role: self.role.parse().unwrap_or_default(),
            created_date: self.created_date,
        }
    }
}
